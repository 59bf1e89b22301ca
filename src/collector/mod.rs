pub mod message;
pub mod session;
pub mod store;

pub use session::Session;
pub use store::RoundStore;

use futures_util::{Stream, StreamExt};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::{error::CollectorError, models::CompletedRound};
use message::decode_frame;

static NEXT_SESSION_ID: AtomicU64 = AtomicU64::new(1);

/// Allocate an id for a newly observed session (used in logs only).
pub fn next_session_id() -> u64 {
    NEXT_SESSION_ID.fetch_add(1, Ordering::Relaxed)
}

/// Raw payload as delivered by the transport.
#[derive(Debug, Clone)]
pub enum RawFrame {
    Text(String),
    Binary(Vec<u8>),
}

impl RawFrame {
    fn as_text(&self) -> Result<&str, CollectorError> {
        match self {
            RawFrame::Text(text) => Ok(text),
            RawFrame::Binary(bytes) => {
                std::str::from_utf8(bytes).map_err(|_| CollectorError::NotUtf8)
            }
        }
    }
}

/// What a single decoded frame produced.
#[derive(Debug, Default)]
pub struct FrameOutcome {
    pub emitted: usize,
    pub inserted: usize,
    pub duplicates: usize,
    pub failures: Vec<CollectorError>,
}

/// Totals for one session, returned when its frame stream ends.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SessionReport {
    pub session_id: u64,
    pub frames: u64,
    pub decode_failures: u64,
    pub rounds_emitted: u64,
    pub inserted: u64,
    pub duplicates: u64,
    pub store_failures: u64,
    pub abandoned_round: Option<String>,
}

/// Turns raw game frames into persisted rounds.
#[derive(Clone)]
pub struct Collector {
    store: Arc<dyn RoundStore>,
}

impl Collector {
    pub fn new(store: Arc<dyn RoundStore>) -> Self {
        Self { store }
    }

    /// Idempotently persist one completed round.
    pub async fn save_round(&self, round: &CompletedRound) -> Result<bool, CollectorError> {
        self.store
            .insert_if_absent(round)
            .await
            .map_err(|source| CollectorError::Store {
                round_id: round.round_id.clone(),
                source,
            })
    }

    /// Decode one frame, fold it into the session and save whatever it completed.
    ///
    /// `Err` means the frame was dropped before reaching the session. Storage
    /// failures are collected in [`FrameOutcome::failures`] so the remaining rounds
    /// of a backfill still get their insert attempt.
    pub async fn handle_frame(
        &self,
        session: &mut Session,
        frame: &RawFrame,
    ) -> Result<FrameOutcome, CollectorError> {
        let message = decode_frame(frame.as_text()?)?;
        let rounds = session.apply(message);

        let mut outcome = FrameOutcome {
            emitted: rounds.len(),
            ..FrameOutcome::default()
        };
        for round in &rounds {
            match self.save_round(round).await {
                Ok(true) => {
                    tracing::info!(
                        "Session {}: saved round {} ({} lanes, {}x, {})",
                        session.id(),
                        round.round_id,
                        round.lanes_crossed,
                        round.final_multiplier,
                        round.outcome
                    );
                    outcome.inserted += 1;
                }
                Ok(false) => {
                    tracing::debug!(
                        "Session {}: round {} already stored",
                        session.id(),
                        round.round_id
                    );
                    outcome.duplicates += 1;
                }
                Err(e) => outcome.failures.push(e),
            }
        }
        Ok(outcome)
    }

    /// Drive a session until its frame stream ends.
    pub async fn run_session<S>(&self, mut session: Session, frames: S) -> SessionReport
    where
        S: Stream<Item = RawFrame>,
    {
        let mut report = SessionReport {
            session_id: session.id(),
            ..SessionReport::default()
        };
        let mut frames = std::pin::pin!(frames);

        while let Some(frame) = frames.next().await {
            report.frames += 1;
            match self.handle_frame(&mut session, &frame).await {
                Ok(outcome) => {
                    report.rounds_emitted += outcome.emitted as u64;
                    report.inserted += outcome.inserted as u64;
                    report.duplicates += outcome.duplicates as u64;
                    for failure in outcome.failures {
                        tracing::warn!("Session {}: {}", session.id(), failure);
                        report.store_failures += 1;
                    }
                }
                Err(e) => {
                    tracing::debug!("Session {}: dropped frame: {}", session.id(), e);
                    report.decode_failures += 1;
                }
            }
        }

        if let Some(unfinished) = session.close() {
            tracing::debug!(
                "Session {}: round {} still in progress at close, discarded",
                report.session_id,
                unfinished.id
            );
            report.abandoned_round = Some(unfinished.id);
        }
        report
    }
}
