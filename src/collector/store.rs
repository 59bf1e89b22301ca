use crate::{db::Database, error::Result, models::CompletedRound};

/// Persistence seam of the collector.
#[async_trait::async_trait]
pub trait RoundStore: Send + Sync {
    /// Insert the round unless its id is already stored.
    ///
    /// Returns `Ok(true)` when a row was written and `Ok(false)` for a known id.
    async fn insert_if_absent(&self, round: &CompletedRound) -> Result<bool>;
}

#[async_trait::async_trait]
impl RoundStore for Database {
    async fn insert_if_absent(&self, round: &CompletedRound) -> Result<bool> {
        self.insert_round_if_absent(round).await
    }
}

#[cfg(test)]
pub(crate) mod memory {
    use super::RoundStore;
    use crate::{
        error::{AppError, Result},
        models::CompletedRound,
    };
    use std::collections::HashSet;
    use std::sync::Mutex;

    /// In-memory store keyed by round id, with optional forced failures.
    #[derive(Default)]
    pub struct MemoryRoundStore {
        rows: Mutex<Vec<CompletedRound>>,
        failing_ids: Mutex<HashSet<String>>,
    }

    impl MemoryRoundStore {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn fail_on(&self, round_id: &str) {
            self.failing_ids
                .lock()
                .unwrap()
                .insert(round_id.to_string());
        }

        pub fn rows(&self) -> Vec<CompletedRound> {
            self.rows.lock().unwrap().clone()
        }
    }

    #[async_trait::async_trait]
    impl RoundStore for MemoryRoundStore {
        async fn insert_if_absent(&self, round: &CompletedRound) -> Result<bool> {
            if self.failing_ids.lock().unwrap().contains(&round.round_id) {
                return Err(AppError::Internal("store unavailable".to_string()));
            }
            let mut rows = self.rows.lock().unwrap();
            if rows.iter().any(|row| row.round_id == round.round_id) {
                return Ok(false);
            }
            rows.push(round.clone());
            Ok(true)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::memory::MemoryRoundStore;
    use super::*;

    #[tokio::test]
    async fn reinsert_is_a_silent_noop() {
        let store = MemoryRoundStore::new();
        let round = CompletedRound::crossed("r1", 3, 2.5);

        assert!(store.insert_if_absent(&round).await.unwrap());
        let again = CompletedRound::hit("r1", 7);
        assert!(!store.insert_if_absent(&again).await.unwrap());

        assert_eq!(store.rows(), vec![round]);
    }
}
