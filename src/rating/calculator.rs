//! Rating calculator trait
//!
//! This module defines the interface the settlement workflow uses to turn a
//! finished match into updated ratings.

use crate::error::RatingResult;
use crate::types::{GameId, MatchOutcome, ParticipantId, RatingChange, SkillRating};
use serde::{Deserialize, Serialize};

/// Result of settling one match
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settlement {
    /// One updated rating per input participant, in input order (sides flattened)
    pub ratings: Vec<SkillRating>,
    /// Rating changes for all participants, same order as `ratings`
    pub changes: Vec<RatingChange>,
    /// Quality score of the match (0.0 to 1.0, higher is more balanced)
    pub match_quality: f64,
}

/// Trait for calculating rating changes after matches.
///
/// Implementations are pure: the same sides, outcome and configuration always
/// produce the same settlement, and a failure never yields partial output.
pub trait RatingCalculator: Send + Sync {
    /// Settle a match
    ///
    /// # Arguments
    /// * `sides` - Current ratings of each side's members, in side order
    /// * `outcome` - How the match ended
    fn settle(&self, sides: &[Vec<SkillRating>], outcome: MatchOutcome)
        -> RatingResult<Settlement>;

    /// Rating record for a participant seen for the first time in a game
    fn initial_rating(&self, participant_id: ParticipantId, game_id: GameId) -> SkillRating;

    /// Get current configuration as JSON
    fn config(&self) -> serde_json::Value;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settlement_serializes() {
        let settlement = Settlement {
            ratings: vec![],
            changes: vec![],
            match_quality: 0.8,
        };

        let json = serde_json::to_value(&settlement).unwrap();
        assert_eq!(json["match_quality"], 0.8);
        assert!(json["ratings"].as_array().unwrap().is_empty());
    }
}
