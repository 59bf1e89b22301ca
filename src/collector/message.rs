use serde_json::{Map, Value};

use crate::{
    constants::{ADVANCE_TYPES, BACKFILL_TYPE, CASHOUT_TYPES, LOSS_TYPES, START_TYPES},
    error::CollectorError,
};

/// A game socket message reduced to the parts the reconstructor acts on.
#[derive(Debug, Clone, PartialEq)]
pub enum GameMessage {
    Start { round_id: Option<String> },
    Advance { multiplier: Option<f64> },
    Loss,
    Cashout { multiplier: Option<f64> },
    Backfill { entries: Vec<BackfillEntry> },
    Unknown,
}

/// One summary row of a `history` message.
#[derive(Debug, Clone, PartialEq)]
pub struct BackfillEntry {
    pub round_id: String,
    pub lanes: u32,
    pub won: bool,
    pub multiplier: f64,
}

/// Decode a raw frame into a [`GameMessage`].
///
/// Only unparseable payloads and non-object JSON are errors; a well-formed object
/// with an unknown or missing type decodes to [`GameMessage::Unknown`].
pub fn decode_frame(raw: &str) -> Result<GameMessage, CollectorError> {
    let value: Value = serde_json::from_str(raw)?;
    match value {
        Value::Object(fields) => Ok(classify(&fields)),
        _ => Err(CollectorError::NotAnObject),
    }
}

pub fn classify(fields: &Map<String, Value>) -> GameMessage {
    let Some(msg_type) = message_type(fields) else {
        return GameMessage::Unknown;
    };

    if START_TYPES.contains(&msg_type) {
        return GameMessage::Start {
            round_id: fields.get("gameId").and_then(identifier),
        };
    }
    if ADVANCE_TYPES.contains(&msg_type) {
        return GameMessage::Advance {
            multiplier: fields.get("multiplier").and_then(multiplier),
        };
    }
    if LOSS_TYPES.contains(&msg_type) {
        return GameMessage::Loss;
    }
    if CASHOUT_TYPES.contains(&msg_type) {
        return GameMessage::Cashout {
            multiplier: fields.get("multiplier").and_then(multiplier),
        };
    }
    if msg_type == BACKFILL_TYPE {
        let entries = fields
            .get("games")
            .and_then(Value::as_array)
            .map(|games| games.iter().filter_map(backfill_entry).collect())
            .unwrap_or_default();
        return GameMessage::Backfill { entries };
    }

    GameMessage::Unknown
}

// `type` wins when it holds a usable string, `action` otherwise.
fn message_type(fields: &Map<String, Value>) -> Option<&str> {
    let non_empty = |key: &str| {
        fields
            .get(key)
            .and_then(Value::as_str)
            .filter(|value| !value.is_empty())
    };
    non_empty("type").or_else(|| non_empty("action"))
}

fn identifier(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn multiplier(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    (parsed.is_finite() && parsed >= 0.0).then_some(parsed)
}

fn lanes(value: &Value) -> u32 {
    let parsed = match value {
        Value::Number(n) => n.as_u64().map(|whole| whole as f64).or_else(|| n.as_f64()),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match parsed {
        Some(f) if f >= 0.0 && f.fract() == 0.0 && f <= u32::MAX as f64 => f as u32,
        _ => 0,
    }
}

fn backfill_entry(value: &Value) -> Option<BackfillEntry> {
    let entry = value.as_object()?;
    Some(BackfillEntry {
        round_id: entry.get("id").and_then(identifier).unwrap_or_default(),
        lanes: entry.get("lanes").map(lanes).unwrap_or(0),
        won: entry.get("won").and_then(Value::as_bool).unwrap_or(false),
        multiplier: entry.get("multiplier").and_then(multiplier).unwrap_or(0.0),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_rejects_garbage() {
        let err = decode_frame("not json {").unwrap_err();
        assert!(matches!(err, CollectorError::Decode(_)));
        assert!(matches!(
            decode_frame("[1,2,3]"),
            Err(CollectorError::NotAnObject)
        ));
    }

    #[test]
    fn missing_type_is_unknown() {
        assert_eq!(decode_frame(r#"{"gameId":"x"}"#).unwrap(), GameMessage::Unknown);
        assert_eq!(decode_frame(r#"{"type":"ping"}"#).unwrap(), GameMessage::Unknown);
        assert_eq!(decode_frame(r#"{"type":7}"#).unwrap(), GameMessage::Unknown);
    }

    #[test]
    fn action_field_is_used_when_type_is_empty() {
        let msg = decode_frame(r#"{"type":"","action":"crash"}"#).unwrap();
        assert_eq!(msg, GameMessage::Loss);
        let msg = decode_frame(r#"{"action":"collect","multiplier":3.0}"#).unwrap();
        assert_eq!(msg, GameMessage::Cashout { multiplier: Some(3.0) });
    }

    #[test]
    fn start_reads_string_or_numeric_id() {
        assert_eq!(
            decode_frame(r#"{"type":"game_start","gameId":"abc"}"#).unwrap(),
            GameMessage::Start { round_id: Some("abc".to_string()) }
        );
        assert_eq!(
            decode_frame(r#"{"type":"start","gameId":42}"#).unwrap(),
            GameMessage::Start { round_id: Some("42".to_string()) }
        );
        assert_eq!(
            decode_frame(r#"{"type":"start","gameId":""}"#).unwrap(),
            GameMessage::Start { round_id: None }
        );
    }

    #[test]
    fn advance_multiplier_accepts_numeric_strings_and_drops_negatives() {
        assert_eq!(
            decode_frame(r#"{"type":"safe","multiplier":"1.5"}"#).unwrap(),
            GameMessage::Advance { multiplier: Some(1.5) }
        );
        assert_eq!(
            decode_frame(r#"{"type":"cross","multiplier":-2}"#).unwrap(),
            GameMessage::Advance { multiplier: None }
        );
        assert_eq!(
            decode_frame(r#"{"type":"lane_cleared"}"#).unwrap(),
            GameMessage::Advance { multiplier: None }
        );
    }

    #[test]
    fn history_entries_fill_defaults() {
        let msg = decode_frame(
            r#"{"type":"history","games":[
                {"id":"a","lanes":3,"won":true,"multiplier":2.5,"hash":"h1"},
                {"lanes":2.0},
                {"id":9,"lanes":-1},
                "junk"
            ]}"#,
        )
        .unwrap();
        let GameMessage::Backfill { entries } = msg else {
            panic!("expected backfill");
        };
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].lanes, 3);
        assert_eq!(entries[1].round_id, "");
        assert_eq!(entries[1].lanes, 2);
        assert!(!entries[1].won);
        assert_eq!(entries[1].multiplier, 0.0);
        assert_eq!(entries[2].round_id, "9");
        assert_eq!(entries[2].lanes, 0);
    }

    #[test]
    fn history_lanes_accept_numeric_strings() {
        let msg = decode_frame(
            r#"{"type":"history","games":[
                {"id":"a","lanes":"3","won":true},
                {"id":"b","lanes":" 2.0 "},
                {"id":"c","lanes":"2.5"},
                {"id":"d","lanes":"many"}
            ]}"#,
        )
        .unwrap();
        let GameMessage::Backfill { entries } = msg else {
            panic!("expected backfill");
        };
        let lanes: Vec<u32> = entries.iter().map(|e| e.lanes).collect();
        assert_eq!(lanes, vec![3, 2, 0, 0]);
    }

    #[test]
    fn history_without_games_is_empty_backfill() {
        assert_eq!(
            decode_frame(r#"{"type":"history","games":"nope"}"#).unwrap(),
            GameMessage::Backfill { entries: vec![] }
        );
    }
}
