//! Bayesian rating update for a settled match
//!
//! Each side is reduced to one belief, widened by the configured performance
//! variance, and resolved against the combined belief of every side it faced.
//! Every participant then moves by an amount proportional to how surprising
//! the outcome was and to their own uncertainty, while their deviation shrinks
//! toward the configured floor.
//!
//! Settlement is a pure function. Callers that persist the result must
//! serialize the read-modify-write cycle per participant themselves; two
//! matches settled concurrently from the same stored priors will each compute
//! a valid but conflicting batch.

use crate::config::RatingConfig;
use crate::error::{RatingError, RatingResult};
use crate::math::matrix::MAX_EXACT_DIMENSION;
use crate::math::{GaussianBelief, Matrix};
use crate::rating::aggregation::{ArithmeticMeanAggregator, SideAggregator};
use crate::rating::calculator::{RatingCalculator, Settlement};
use crate::types::{GameId, MatchOutcome, ParticipantId, RatingChange, SideResult, SkillRating};
use std::collections::HashSet;
use std::f64::consts::PI;
use std::sync::Arc;
use tracing::{debug, trace};

/// Rating update algorithm with an immutable configuration
#[derive(Clone)]
pub struct RatingUpdateAlgorithm {
    config: RatingConfig,
    aggregator: Arc<dyn SideAggregator>,
}

impl std::fmt::Debug for RatingUpdateAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RatingUpdateAlgorithm")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl RatingUpdateAlgorithm {
    /// Create an algorithm using arithmetic-mean side aggregation
    pub fn new(config: RatingConfig) -> RatingResult<Self> {
        Self::with_aggregator(config, Arc::new(ArithmeticMeanAggregator))
    }

    /// Create an algorithm with a custom side aggregation strategy
    pub fn with_aggregator(
        config: RatingConfig,
        aggregator: Arc<dyn SideAggregator>,
    ) -> RatingResult<Self> {
        config.validate()?;

        Ok(Self { config, aggregator })
    }

    pub fn rating_config(&self) -> &RatingConfig {
        &self.config
    }

    /// Probability that side `a` beats side `b`
    pub fn win_probability(&self, a: &[SkillRating], b: &[SkillRating]) -> RatingResult<f64> {
        let a = self.side_belief(a)?;
        let b = self.side_belief(b)?;
        let spread = (a.variance() + b.variance() + 2.0 * self.config.performance_variance).sqrt();
        Ok(GaussianBelief::standard().cumulative_at((a.mean() - b.mean()) / spread))
    }

    fn side_belief(&self, members: &[SkillRating]) -> RatingResult<GaussianBelief> {
        if members.is_empty() {
            return Err(RatingError::invalid_input("side has no participants"));
        }
        for rating in members {
            validate_rating(rating)?;
        }
        let beliefs: Vec<GaussianBelief> = members.iter().map(SkillRating::belief).collect();
        let side = self.aggregator.aggregate(&beliefs);

        let variance = side.variance();
        if !side.mean().is_finite() || !variance.is_finite() || variance <= 0.0 {
            return Err(RatingError::invalid_input(format!(
                "side aggregation produced mean {} and variance {}",
                side.mean(),
                variance
            )));
        }
        Ok(side)
    }

    /// Side belief widened by single-match performance noise
    fn performance(&self, side: &GaussianBelief) -> GaussianBelief {
        let variance = side.variance() + self.config.performance_variance;
        GaussianBelief::from_mean_and_deviation(side.mean(), variance.sqrt())
    }

    /// Pool several opposing performances into one effective opponent.
    ///
    /// Generalized least squares over `Σ = diag(variances)`: the pooled mean is
    /// `1ᵀΣ⁻¹μ / 1ᵀΣ⁻¹1` and the pooled variance `1 / 1ᵀΣ⁻¹1`.
    fn effective_opponent(&self, opponents: &[GaussianBelief]) -> RatingResult<GaussianBelief> {
        if let [single] = opponents {
            return Ok(*single);
        }

        let variances: Vec<f64> = opponents.iter().map(GaussianBelief::variance).collect();
        let means: Vec<f64> = opponents.iter().map(GaussianBelief::mean).collect();

        let precision = Matrix::diagonal(&variances)?.inverse()?;
        let ones = Matrix::column(&vec![1.0; opponents.len()])?;
        let weights = precision.multiply(&ones)?;

        let total_precision = ones.transpose().multiply(&weights)?.get(0, 0)?;
        let precision_mean = weights
            .transpose()
            .multiply(&Matrix::column(&means)?)?
            .get(0, 0)?;

        Ok(GaussianBelief::from_precision(precision_mean, total_precision))
    }

    /// Draw probability density of two performances, scaled into (0, 1]
    fn match_quality(&self, own: &GaussianBelief, opponent: &GaussianBelief) -> f64 {
        let log_density = GaussianBelief::log_product_normalization(own, opponent);
        let scale = (2.0 * self.config.performance_variance).sqrt();
        ((log_density + (2.0 * PI).sqrt().ln()).exp() * scale).min(1.0)
    }

    /// Posterior belief of one participant.
    ///
    /// How surprising the result was depends on the side as a whole; how far
    /// the participant moves depends on their own uncertainty.
    fn update_participant(
        &self,
        prior: &GaussianBelief,
        side: &GaussianBelief,
        opponent: &GaussianBelief,
        result: SideResult,
    ) -> GaussianBelief {
        let floor_variance = self.config.deviation_floor * self.config.deviation_floor;
        let spread_squared = prior.variance() + self.config.performance_variance + opponent.variance();
        let spread = spread_squared.sqrt();
        let standard_score = (side.mean() - opponent.mean()) / spread;

        let standard = GaussianBelief::standard();
        let p_ahead = standard.cumulative_at(standard_score);
        let p_behind = standard.cumulative_at(-standard_score);

        let r = result.multiplier();
        let surprise = 0.5 * (1.0 + r) * p_behind - 0.5 * (1.0 - r) * p_ahead;
        let mean = prior.mean() + prior.variance() / spread * surprise;

        let information = 4.0 * p_ahead * p_behind;
        let shrink = 1.0 - prior.variance() / spread_squared * information;
        let excess = (prior.variance() - floor_variance).max(0.0);
        let deviation = (floor_variance + excess * shrink).sqrt();

        GaussianBelief::from_mean_and_deviation(mean, deviation)
    }

    fn validate(&self, sides: &[Vec<SkillRating>], outcome: MatchOutcome) -> RatingResult<()> {
        if sides.len() < 2 {
            return Err(RatingError::invalid_input(format!(
                "a match needs at least two sides, got {}",
                sides.len()
            )));
        }
        if sides.len() - 1 > MAX_EXACT_DIMENSION {
            return Err(RatingError::invalid_input(format!(
                "{} sides exceeds the supported maximum of {}",
                sides.len(),
                MAX_EXACT_DIMENSION + 1
            )));
        }
        if let Some(empty) = sides.iter().position(Vec::is_empty) {
            return Err(RatingError::invalid_input(format!(
                "side {} has no participants",
                empty
            )));
        }
        if let MatchOutcome::Win { winning_side } = outcome {
            if winning_side >= sides.len() {
                return Err(RatingError::invalid_input(format!(
                    "winning side {} does not exist in a {}-side match",
                    winning_side,
                    sides.len()
                )));
            }
        }

        let game_id = sides[0][0].game_id;
        let mut seen: HashSet<&str> = HashSet::new();
        for rating in sides.iter().flatten() {
            validate_rating(rating)?;
            if rating.game_id != game_id {
                return Err(RatingError::invalid_input(format!(
                    "participant {} is rated for game {}, expected {}",
                    rating.participant_id, rating.game_id, game_id
                )));
            }
            if !seen.insert(rating.participant_id.as_str()) {
                return Err(RatingError::invalid_input(format!(
                    "participant {} appears more than once",
                    rating.participant_id
                )));
            }
        }

        Ok(())
    }
}

fn validate_rating(rating: &SkillRating) -> RatingResult<()> {
    if !rating.mean.is_finite() {
        return Err(RatingError::invalid_input(format!(
            "participant {} has a non-finite mean",
            rating.participant_id
        )));
    }
    if !rating.deviation.is_finite() || rating.deviation <= 0.0 {
        return Err(RatingError::invalid_input(format!(
            "participant {} has invalid deviation {}",
            rating.participant_id, rating.deviation
        )));
    }
    Ok(())
}

impl RatingCalculator for RatingUpdateAlgorithm {
    fn settle(
        &self,
        sides: &[Vec<SkillRating>],
        outcome: MatchOutcome,
    ) -> RatingResult<Settlement> {
        self.validate(sides, outcome)?;

        let side_beliefs = sides
            .iter()
            .map(|members| self.side_belief(members))
            .collect::<RatingResult<Vec<_>>>()?;
        let performances: Vec<GaussianBelief> =
            side_beliefs.iter().map(|side| self.performance(side)).collect();

        let mut opponents = Vec::with_capacity(sides.len());
        for index in 0..sides.len() {
            let others: Vec<GaussianBelief> = performances
                .iter()
                .enumerate()
                .filter(|(other, _)| *other != index)
                .map(|(_, performance)| *performance)
                .collect();
            opponents.push(self.effective_opponent(&others)?);
        }

        let match_quality = performances
            .iter()
            .zip(&opponents)
            .map(|(own, opponent)| self.match_quality(own, opponent))
            .sum::<f64>()
            / sides.len() as f64;

        let mut ratings = Vec::with_capacity(sides.iter().map(Vec::len).sum());
        let mut changes = Vec::with_capacity(ratings.capacity());
        for (index, members) in sides.iter().enumerate() {
            let result = outcome.result_for(index);
            for rating in members {
                let prior = rating.belief();
                let posterior =
                    self.update_participant(&prior, &side_beliefs[index], &opponents[index], result);

                trace!(
                    participant = %rating.participant_id,
                    side = index,
                    %result,
                    old_mean = prior.mean(),
                    new_mean = posterior.mean(),
                    new_deviation = posterior.standard_deviation(),
                    "Updated participant rating"
                );

                changes.push(RatingChange {
                    participant_id: rating.participant_id.clone(),
                    side: index,
                    result,
                    old_mean: prior.mean(),
                    old_deviation: prior.standard_deviation(),
                    new_mean: posterior.mean(),
                    new_deviation: posterior.standard_deviation(),
                    significance: prior.distance(&posterior),
                });
                ratings.push(rating.with_belief(&posterior));
            }
        }

        debug!(
            sides = sides.len(),
            participants = ratings.len(),
            outcome = outcome.label(),
            match_quality,
            "Settled match"
        );

        Ok(Settlement {
            ratings,
            changes,
            match_quality,
        })
    }

    fn initial_rating(&self, participant_id: ParticipantId, game_id: GameId) -> SkillRating {
        SkillRating::new(
            participant_id,
            game_id,
            self.config.start_mean,
            self.config.start_deviation,
        )
    }

    fn config(&self) -> serde_json::Value {
        serde_json::to_value(self.config).unwrap_or(serde_json::Value::Null)
    }
}
