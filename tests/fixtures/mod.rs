//! Test fixtures and store wrappers for integration testing

use async_trait::async_trait;
use league_skill::config::RatingConfig;
use league_skill::error::Result;
use league_skill::rating::{InMemoryRatingStore, RatingStore, RatingUpdateAlgorithm};
use league_skill::types::{GameId, MatchOutcome, ParticipantId, SkillRating};
use league_skill::{MatchRequest, SettlementService};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Store that yields to the scheduler after every fetch, so concurrently
/// running settlements interleave between their read and their write
#[derive(Debug, Default)]
pub struct YieldingRatingStore {
    inner: InMemoryRatingStore,
    persist_calls: AtomicUsize,
}

impl YieldingRatingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of persist attempts, successful or not
    pub fn persist_calls(&self) -> usize {
        self.persist_calls.load(Ordering::SeqCst)
    }

    pub fn inner(&self) -> &InMemoryRatingStore {
        &self.inner
    }
}

#[async_trait]
impl RatingStore for YieldingRatingStore {
    async fn fetch_ratings(
        &self,
        participant_ids: &[ParticipantId],
        game_id: GameId,
    ) -> Result<Vec<SkillRating>> {
        let fetched = self.inner.fetch_ratings(participant_ids, game_id).await?;
        tokio::task::yield_now().await;
        Ok(fetched)
    }

    async fn get_rating(
        &self,
        participant_id: &str,
        game_id: GameId,
    ) -> Result<Option<SkillRating>> {
        self.inner.get_rating(participant_id, game_id).await
    }

    async fn persist(&self, batch: Vec<SkillRating>) -> Result<()> {
        self.persist_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.persist(batch).await
    }

    async fn rating_count(&self) -> Result<usize> {
        self.inner.rating_count().await
    }
}

/// Service over the given store using the default configuration
pub fn create_service(store: Arc<dyn RatingStore>, max_retry_attempts: u32) -> SettlementService {
    let calculator = Arc::new(RatingUpdateAlgorithm::new(RatingConfig::default()).unwrap());
    SettlementService::new(store, calculator, max_retry_attempts).unwrap()
}

/// Build a request from participant names
pub fn request(sides: &[&[&str]], outcome: MatchOutcome) -> MatchRequest {
    MatchRequest::new(
        sides
            .iter()
            .map(|side| side.iter().map(|id| id.to_string()).collect())
            .collect(),
        outcome,
    )
}

/// Rating records for one side, from (name, mean, deviation) triples
pub fn side(game_id: GameId, members: &[(&str, f64, f64)]) -> Vec<SkillRating> {
    members
        .iter()
        .map(|(name, mean, deviation)| {
            SkillRating::new(name.to_string(), game_id, *mean, *deviation)
        })
        .collect()
}

pub fn win(winning_side: usize) -> MatchOutcome {
    MatchOutcome::Win { winning_side }
}
