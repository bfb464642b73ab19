//! Common types used throughout the rating engine

use crate::math::GaussianBelief;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for club members taking part in matches
pub type ParticipantId = String;

/// Unique identifier for a game (the thing a rating is scoped to)
pub type GameId = Uuid;

/// Unique identifier for a stored rating record
pub type RatingId = Uuid;

/// Persisted skill belief for one (participant, game) pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillRating {
    pub id: RatingId,
    pub participant_id: ParticipantId,
    pub game_id: GameId,
    pub mean: f64,
    /// Always strictly positive
    pub deviation: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SkillRating {
    /// Create a fresh record holding the given prior
    pub fn new(participant_id: ParticipantId, game_id: GameId, mean: f64, deviation: f64) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            participant_id,
            game_id,
            mean,
            deviation,
            created_at: now,
            updated_at: now,
        }
    }

    /// The rating viewed as a Gaussian belief
    pub fn belief(&self) -> GaussianBelief {
        GaussianBelief::from_mean_and_deviation(self.mean, self.deviation)
    }

    /// Copy of this record carrying a new belief; identity and timestamps are untouched
    pub fn with_belief(&self, belief: &GaussianBelief) -> Self {
        Self {
            mean: belief.mean(),
            deviation: belief.standard_deviation(),
            ..self.clone()
        }
    }
}

/// How a match ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MatchOutcome {
    /// The side at `winning_side` beat every other side
    Win { winning_side: usize },
    Draw,
}

impl MatchOutcome {
    /// Result of the side at `side` under this outcome
    pub fn result_for(&self, side: usize) -> SideResult {
        match *self {
            MatchOutcome::Win { winning_side } if winning_side == side => SideResult::Win,
            MatchOutcome::Win { .. } => SideResult::Loss,
            MatchOutcome::Draw => SideResult::Draw,
        }
    }

    /// Label used in logs and metrics
    pub fn label(&self) -> &'static str {
        match self {
            MatchOutcome::Win { .. } => "win",
            MatchOutcome::Draw => "draw",
        }
    }
}

/// Result of one side relative to the sides it faced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SideResult {
    Win,
    Loss,
    Draw,
}

impl SideResult {
    /// Signed outcome multiplier (+1 win, 0 draw, -1 loss)
    pub fn multiplier(&self) -> f64 {
        match self {
            SideResult::Win => 1.0,
            SideResult::Loss => -1.0,
            SideResult::Draw => 0.0,
        }
    }
}

impl std::fmt::Display for SideResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SideResult::Win => write!(f, "win"),
            SideResult::Loss => write!(f, "loss"),
            SideResult::Draw => write!(f, "draw"),
        }
    }
}

/// Rating change information for a participant
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatingChange {
    pub participant_id: ParticipantId,
    /// Index of the side the participant played on
    pub side: usize,
    pub result: SideResult,
    pub old_mean: f64,
    pub old_deviation: f64,
    pub new_mean: f64,
    pub new_deviation: f64,
    /// Distance between prior and posterior beliefs
    pub significance: f64,
}

impl RatingChange {
    pub fn mean_delta(&self) -> f64 {
        self.new_mean - self.old_mean
    }
}
