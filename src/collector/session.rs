use chrono::{DateTime, Utc};

use super::message::{BackfillEntry, GameMessage};
use crate::{
    constants::{FINGERPRINT_LEN, INITIAL_MULTIPLIER},
    crypto::hash::time_fingerprint,
    models::{CompletedRound, Outcome},
};

/// Round currently being played on a session.
#[derive(Debug, Clone, PartialEq)]
pub struct InProgressRound {
    pub id: String,
    pub lanes_crossed: u32,
    pub current_multiplier: f64,
}

impl InProgressRound {
    fn start(id: String) -> Self {
        Self {
            id,
            lanes_crossed: 0,
            current_multiplier: INITIAL_MULTIPLIER,
        }
    }
}

/// Reconstruction state of one observed connection.
///
/// Owned by the task that reads the connection; never shared between sessions.
#[derive(Debug)]
pub struct Session {
    id: u64,
    current: Option<InProgressRound>,
}

impl Session {
    pub fn new(id: u64) -> Self {
        Self { id, current: None }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    #[cfg(test)]
    pub fn current(&self) -> Option<&InProgressRound> {
        self.current.as_ref()
    }

    /// Fold one message into the session, returning the rounds it completed.
    pub fn apply(&mut self, message: GameMessage) -> Vec<CompletedRound> {
        self.apply_at(message, Utc::now())
    }

    /// Same as [`Session::apply`] with an explicit clock for synthesized round ids.
    pub fn apply_at(&mut self, message: GameMessage, now: DateTime<Utc>) -> Vec<CompletedRound> {
        match message {
            GameMessage::Start { round_id } => {
                let id = round_id.unwrap_or_else(|| time_fingerprint(now, FINGERPRINT_LEN));
                if let Some(discarded) = self.current.replace(InProgressRound::start(id)) {
                    tracing::debug!(
                        "Session {}: round {} replaced before finishing ({} lanes), not saved",
                        self.id,
                        discarded.id,
                        discarded.lanes_crossed
                    );
                }
                Vec::new()
            }
            GameMessage::Advance { multiplier } => {
                if let Some(round) = self.current.as_mut() {
                    round.lanes_crossed = round.lanes_crossed.saturating_add(1);
                    if let Some(value) = multiplier {
                        round.current_multiplier = value;
                    }
                }
                Vec::new()
            }
            GameMessage::Loss => self
                .current
                .take()
                .map(|round| CompletedRound::hit(round.id, round.lanes_crossed))
                .into_iter()
                .collect(),
            GameMessage::Cashout { multiplier } => self
                .current
                .take()
                .map(|round| {
                    let final_multiplier = multiplier.unwrap_or(round.current_multiplier);
                    CompletedRound::crossed(round.id, round.lanes_crossed, final_multiplier)
                })
                .into_iter()
                .collect(),
            GameMessage::Backfill { entries } => entries
                .into_iter()
                .filter(|entry| entry.lanes > 0)
                .map(backfilled_round)
                .collect(),
            GameMessage::Unknown => Vec::new(),
        }
    }

    /// End the session, handing back any round that never reached a terminal event.
    pub fn close(self) -> Option<InProgressRound> {
        self.current
    }
}

// Backfill summaries never carry a provenance hash into storage.
fn backfilled_round(entry: BackfillEntry) -> CompletedRound {
    match Outcome::from_won(entry.won) {
        Outcome::Crossed => CompletedRound::crossed(entry.round_id, entry.lanes, entry.multiplier),
        Outcome::Hit => CompletedRound::hit(entry.round_id, entry.lanes),
    }
}
