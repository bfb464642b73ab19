//! Rating storage interface and in-memory implementation
//!
//! The store owns the persisted [`SkillRating`] rows. Persisting a batch is
//! all-or-nothing and guarded by a compare-and-swap on `updated_at`, which is
//! what serializes concurrent settlements touching the same participant.

use crate::config::RatingConfig;
use crate::types::{GameId, ParticipantId, SkillRating};
use async_trait::async_trait;
use chrono::Duration;
use std::collections::HashMap;
use std::sync::RwLock;

/// Storage-specific failures
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Rating for participant {participant_id} in game {game_id} changed since it was read")]
    StaleRating {
        participant_id: ParticipantId,
        game_id: GameId,
    },

    #[error("No stored rating for participant {participant_id} in game {game_id}")]
    UnknownRating {
        participant_id: ParticipantId,
        game_id: GameId,
    },

    #[error("Rating store lock poisoned")]
    LockPoisoned,
}

/// Trait for rating storage operations
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RatingStore: Send + Sync {
    /// Ratings for the given participants in input order, creating default
    /// priors for participants seen for the first time
    async fn fetch_ratings(
        &self,
        participant_ids: &[ParticipantId],
        game_id: GameId,
    ) -> crate::error::Result<Vec<SkillRating>>;

    /// Get a single rating without creating it
    async fn get_rating(
        &self,
        participant_id: &str,
        game_id: GameId,
    ) -> crate::error::Result<Option<SkillRating>>;

    /// Store a settled batch atomically. Fails with [`StoreError::StaleRating`]
    /// if any record was updated after it was fetched.
    async fn persist(&self, batch: Vec<SkillRating>) -> crate::error::Result<()>;

    /// Get total number of stored ratings
    async fn rating_count(&self) -> crate::error::Result<usize>;
}

type RatingKey = (ParticipantId, GameId);

/// In-memory rating storage implementation
#[derive(Debug)]
pub struct InMemoryRatingStore {
    ratings: RwLock<HashMap<RatingKey, SkillRating>>,
    start_mean: f64,
    start_deviation: f64,
}

impl InMemoryRatingStore {
    /// Create a store that hands out the configured prior on first sight
    pub fn new(config: &RatingConfig) -> Self {
        Self {
            ratings: RwLock::new(HashMap::new()),
            start_mean: config.start_mean,
            start_deviation: config.start_deviation,
        }
    }

    /// Every stored rating for a game, in no particular order
    pub fn ratings_for_game(&self, game_id: GameId) -> crate::error::Result<Vec<SkillRating>> {
        let ratings = self.ratings.read().map_err(|_| StoreError::LockPoisoned)?;

        Ok(ratings
            .values()
            .filter(|rating| rating.game_id == game_id)
            .cloned()
            .collect())
    }
}

impl Default for InMemoryRatingStore {
    fn default() -> Self {
        Self::new(&RatingConfig::default())
    }
}

#[async_trait]
impl RatingStore for InMemoryRatingStore {
    async fn fetch_ratings(
        &self,
        participant_ids: &[ParticipantId],
        game_id: GameId,
    ) -> crate::error::Result<Vec<SkillRating>> {
        let mut ratings = self.ratings.write().map_err(|_| StoreError::LockPoisoned)?;

        let fetched = participant_ids
            .iter()
            .map(|participant_id| {
                ratings
                    .entry((participant_id.clone(), game_id))
                    .or_insert_with(|| {
                        SkillRating::new(
                            participant_id.clone(),
                            game_id,
                            self.start_mean,
                            self.start_deviation,
                        )
                    })
                    .clone()
            })
            .collect();

        Ok(fetched)
    }

    async fn get_rating(
        &self,
        participant_id: &str,
        game_id: GameId,
    ) -> crate::error::Result<Option<SkillRating>> {
        let ratings = self.ratings.read().map_err(|_| StoreError::LockPoisoned)?;

        Ok(ratings.get(&(participant_id.to_string(), game_id)).cloned())
    }

    async fn persist(&self, batch: Vec<SkillRating>) -> crate::error::Result<()> {
        let mut ratings = self.ratings.write().map_err(|_| StoreError::LockPoisoned)?;

        // Check the whole batch before touching anything
        for rating in &batch {
            let key = (rating.participant_id.clone(), rating.game_id);
            let stored = ratings.get(&key).ok_or_else(|| StoreError::UnknownRating {
                participant_id: rating.participant_id.clone(),
                game_id: rating.game_id,
            })?;

            if stored.id != rating.id || stored.updated_at != rating.updated_at {
                return Err(StoreError::StaleRating {
                    participant_id: rating.participant_id.clone(),
                    game_id: rating.game_id,
                }
                .into());
            }
        }

        let now = crate::utils::current_timestamp();
        for mut rating in batch {
            // updated_at must move forward even on coarse clocks
            let earliest = rating.updated_at + Duration::microseconds(1);
            rating.updated_at = now.max(earliest);
            ratings.insert((rating.participant_id.clone(), rating.game_id), rating);
        }

        Ok(())
    }

    async fn rating_count(&self) -> crate::error::Result<usize> {
        let ratings = self.ratings.read().map_err(|_| StoreError::LockPoisoned)?;

        Ok(ratings.len())
    }
}
