use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;

// ==================== OUTCOME ====================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Crossed,
    Hit,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Crossed => "crossed",
            Outcome::Hit => "hit",
        }
    }

    pub fn from_won(won: bool) -> Self {
        if won {
            Outcome::Crossed
        } else {
            Outcome::Hit
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Outcome {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "crossed" => Ok(Outcome::Crossed),
            "hit" => Ok(Outcome::Hit),
            other => Err(format!("unknown outcome: {other}")),
        }
    }
}

// ==================== COMPLETED ROUND ====================
/// A finished round as handed to the store. `recorded_at` is assigned by the database.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletedRound {
    pub round_id: String,
    pub lanes_crossed: u32,
    pub final_multiplier: f64,
    pub outcome: Outcome,
    pub provenance_hash: Option<String>,
}

impl CompletedRound {
    /// A round lost to an obstacle. The multiplier is always zero.
    pub fn hit(round_id: impl Into<String>, lanes_crossed: u32) -> Self {
        Self {
            round_id: round_id.into(),
            lanes_crossed,
            final_multiplier: 0.0,
            outcome: Outcome::Hit,
            provenance_hash: None,
        }
    }

    pub fn crossed(round_id: impl Into<String>, lanes_crossed: u32, final_multiplier: f64) -> Self {
        Self {
            round_id: round_id.into(),
            lanes_crossed,
            final_multiplier: final_multiplier.max(0.0),
            outcome: Outcome::Crossed,
            provenance_hash: None,
        }
    }
}

// ==================== STORED ROUND ====================
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RoundRecord {
    pub round_id: String,
    pub lanes_crossed: i32,
    pub final_multiplier: f64,
    pub outcome: String,
    pub provenance_hash: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hit_round_forces_zero_multiplier() {
        let round = CompletedRound::hit("r1", 4);
        assert_eq!(round.final_multiplier, 0.0);
        assert_eq!(round.outcome, Outcome::Hit);
    }

    #[test]
    fn outcome_round_trips_through_text() {
        assert_eq!("crossed".parse::<Outcome>(), Ok(Outcome::Crossed));
        assert_eq!(Outcome::Hit.to_string(), "hit");
        assert!("won".parse::<Outcome>().is_err());
    }

    #[test]
    fn outcome_serializes_lowercase() {
        let json = serde_json::to_string(&Outcome::Crossed).unwrap();
        assert_eq!(json, "\"crossed\"");
    }
}
