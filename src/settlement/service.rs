//! Match settlement workflow
//!
//! Ties the store and the calculator together: fetch the current ratings,
//! settle the match, persist the batch. A persist that loses the race against
//! another settlement is retried from the fetch, which is safe because the
//! calculation itself has no side effects.

use crate::error::{RatingError, RatingResult};
use crate::math::matrix::MAX_EXACT_DIMENSION;
use crate::metrics::MetricsCollector;
use crate::rating::{RatingCalculator, RatingStore, Settlement, StoreError};
use crate::types::{GameId, MatchOutcome, ParticipantId, SkillRating};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// A finished match, identified by participant ids only
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRequest {
    /// Participant ids of each side, in side order
    pub sides: Vec<Vec<ParticipantId>>,
    pub outcome: MatchOutcome,
}

impl MatchRequest {
    pub fn new(sides: Vec<Vec<ParticipantId>>, outcome: MatchOutcome) -> Self {
        Self { sides, outcome }
    }

    /// Every participant, sides flattened in order
    pub fn participants(&self) -> Vec<ParticipantId> {
        self.sides.iter().flatten().cloned().collect()
    }

    /// Reject malformed requests before anything is read from the store
    pub fn validate(&self) -> RatingResult<()> {
        if self.sides.len() < 2 {
            return Err(RatingError::invalid_input(format!(
                "a match needs at least two sides, got {}",
                self.sides.len()
            )));
        }
        if self.sides.len() - 1 > MAX_EXACT_DIMENSION {
            return Err(RatingError::invalid_input(format!(
                "{} sides exceeds the supported maximum of {}",
                self.sides.len(),
                MAX_EXACT_DIMENSION + 1
            )));
        }
        if let Some(empty) = self.sides.iter().position(Vec::is_empty) {
            return Err(RatingError::invalid_input(format!(
                "side {} has no participants",
                empty
            )));
        }
        if let MatchOutcome::Win { winning_side } = self.outcome {
            if winning_side >= self.sides.len() {
                return Err(RatingError::invalid_input(format!(
                    "winning side {} does not exist in a {}-side match",
                    winning_side,
                    self.sides.len()
                )));
            }
        }

        let mut seen = HashSet::new();
        for participant_id in self.sides.iter().flatten() {
            if participant_id.is_empty() {
                return Err(RatingError::invalid_input("participant id cannot be empty"));
            }
            if !seen.insert(participant_id.as_str()) {
                return Err(RatingError::invalid_input(format!(
                    "participant {} appears more than once",
                    participant_id
                )));
            }
        }

        Ok(())
    }
}

/// One line of a match history: a request together with the game it was played in
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub game_id: GameId,
    #[serde(flatten)]
    pub request: MatchRequest,
}

/// Settles matches against a rating store
#[derive(Clone)]
pub struct SettlementService {
    store: Arc<dyn RatingStore>,
    calculator: Arc<dyn RatingCalculator>,
    /// Extra read-modify-write cycles allowed after a stale persist
    max_retry_attempts: u32,
    metrics: Arc<MetricsCollector>,
}

impl SettlementService {
    /// Create a service with its own metrics registry
    pub fn new(
        store: Arc<dyn RatingStore>,
        calculator: Arc<dyn RatingCalculator>,
        max_retry_attempts: u32,
    ) -> crate::error::Result<Self> {
        let metrics = Arc::new(MetricsCollector::new()?);
        Ok(Self::with_metrics(
            store,
            calculator,
            max_retry_attempts,
            metrics,
        ))
    }

    /// Create a service reporting into an existing collector
    pub fn with_metrics(
        store: Arc<dyn RatingStore>,
        calculator: Arc<dyn RatingCalculator>,
        max_retry_attempts: u32,
        metrics: Arc<MetricsCollector>,
    ) -> Self {
        Self {
            store,
            calculator,
            max_retry_attempts,
            metrics,
        }
    }

    pub fn metrics(&self) -> Arc<MetricsCollector> {
        self.metrics.clone()
    }

    /// Settle one match and persist the new ratings.
    ///
    /// The returned settlement carries the ratings as computed; the stored
    /// copies additionally have a fresh `updated_at`.
    pub async fn settle_match(
        &self,
        game_id: GameId,
        request: &MatchRequest,
    ) -> RatingResult<Settlement> {
        let timer = self.metrics.start_timer();

        match self.try_settle(game_id, request).await {
            Ok(settlement) => {
                let duration = timer.stop();
                self.metrics
                    .record_settlement(request.outcome, &settlement, duration);

                info!(
                    "Settled {} match in game {} - sides: {}, participants: {}, quality: {:.3}, took {:?}",
                    request.outcome.label(),
                    game_id,
                    request.sides.len(),
                    settlement.ratings.len(),
                    settlement.match_quality,
                    duration
                );
                Ok(settlement)
            }
            Err(err) => {
                self.metrics.record_failure(&err);
                warn!("Failed to settle match in game {}: {}", game_id, err);
                Err(err)
            }
        }
    }

    async fn try_settle(
        &self,
        game_id: GameId,
        request: &MatchRequest,
    ) -> RatingResult<Settlement> {
        request.validate()?;
        let participants = request.participants();

        let mut attempt = 0;
        loop {
            let fetched = self
                .store
                .fetch_ratings(&participants, game_id)
                .await
                .map_err(|err| RatingError::persistence(game_id, &participants, err))?;
            let sides = regroup(request, game_id, fetched)
                .map_err(|err| RatingError::persistence(game_id, &participants, err))?;

            debug!(
                "Settling game {} attempt {} with {} participants",
                game_id,
                attempt + 1,
                participants.len()
            );
            let settlement = self.calculator.settle(&sides, request.outcome)?;

            match self.store.persist(settlement.ratings.clone()).await {
                Ok(()) => return Ok(settlement),
                Err(err) => {
                    let stale = matches!(
                        err.downcast_ref::<StoreError>(),
                        Some(StoreError::StaleRating { .. })
                    );
                    if !stale {
                        return Err(RatingError::persistence(game_id, &participants, err));
                    }

                    self.metrics.record_conflict();
                    if attempt >= self.max_retry_attempts {
                        warn!(
                            "Giving up on game {} after {} conflicting attempts",
                            game_id,
                            attempt + 1
                        );
                        return Err(RatingError::persistence(game_id, &participants, err));
                    }

                    attempt += 1;
                    warn!(
                        "Concurrent update in game {} ({}), retrying ({}/{})",
                        game_id, err, attempt, self.max_retry_attempts
                    );
                }
            }
        }
    }
}

/// Split the flat fetch result back into the request's sides.
///
/// The store must return exactly the requested participants, in request
/// order, all rated for `game_id`.
fn regroup(
    request: &MatchRequest,
    game_id: GameId,
    fetched: Vec<SkillRating>,
) -> anyhow::Result<Vec<Vec<SkillRating>>> {
    let expected: usize = request.sides.iter().map(Vec::len).sum();
    if fetched.len() != expected {
        anyhow::bail!(
            "store returned {} ratings for {} participants",
            fetched.len(),
            expected
        );
    }

    for (requested, rating) in request.sides.iter().flatten().zip(&fetched) {
        if rating.participant_id != *requested {
            anyhow::bail!(
                "store returned a rating for {} where {} was requested",
                rating.participant_id,
                requested
            );
        }
        if rating.game_id != game_id {
            anyhow::bail!(
                "store returned {}'s rating for game {}, expected {}",
                requested,
                rating.game_id,
                game_id
            );
        }
    }

    let mut fetched = fetched.into_iter();
    Ok(request
        .sides
        .iter()
        .map(|side| fetched.by_ref().take(side.len()).collect())
        .collect())
}
