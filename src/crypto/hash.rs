use chrono::{DateTime, Utc};
use sha3::{Digest, Keccak256};

/// Keccak256 digest of raw bytes
pub fn keccak256(data: &[u8]) -> Vec<u8> {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    hasher.finalize().to_vec()
}

/// Keccak256 digest as lowercase hex, no prefix
pub fn keccak256_hex(data: &[u8]) -> String {
    hex::encode(keccak256(data))
}

/// Short identifier derived from a wall-clock instant.
///
/// Two calls with the same instant yield the same fingerprint; uniqueness across
/// rounds started within the same clock tick is not guaranteed.
pub fn time_fingerprint(at: DateTime<Utc>, len: usize) -> String {
    let stamp = at.to_rfc3339_opts(chrono::SecondsFormat::Nanos, true);
    let mut digest = keccak256_hex(stamp.as_bytes());
    digest.truncate(len);
    digest
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn keccak256_hex_matches_empty_string_vector() {
        let digest = keccak256_hex(b"");
        assert_eq!(
            digest,
            "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
    }

    #[test]
    fn time_fingerprint_is_truncated_hex() {
        let at = Utc.with_ymd_and_hms(2026, 1, 17, 10, 30, 0).unwrap();
        let fp = time_fingerprint(at, 12);
        assert_eq!(fp.len(), 12);
        assert!(fp.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn time_fingerprint_is_deterministic_per_instant() {
        let at = Utc.with_ymd_and_hms(2026, 1, 17, 10, 30, 0).unwrap();
        let later = at + chrono::Duration::nanoseconds(1);
        assert_eq!(time_fingerprint(at, 12), time_fingerprint(at, 12));
        assert_ne!(time_fingerprint(at, 12), time_fingerprint(later, 12));
    }
}
