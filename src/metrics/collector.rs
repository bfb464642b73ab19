//! Metrics collection using Prometheus
//!
//! This module provides metrics for match settlement: throughput by outcome,
//! failures by error kind, persistence conflicts, latency, and the size of
//! rating moves.

use crate::error::RatingError;
use crate::rating::Settlement;
use crate::types::MatchOutcome;
use anyhow::Result;
use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry, TextEncoder,
};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Main metrics collector for the rating engine
#[derive(Clone)]
pub struct MetricsCollector {
    /// Prometheus registry
    registry: Arc<Registry>,

    /// Settlement metrics
    settlement_metrics: SettlementMetrics,
}

/// Settlement-related metrics
#[derive(Clone)]
pub struct SettlementMetrics {
    /// Matches settled and persisted, by outcome kind
    pub settlements_total: IntCounterVec,

    /// Settlements abandoned, by error kind
    pub settlement_failures_total: IntCounterVec,

    /// Persist attempts rejected because a rating changed underneath
    pub persist_conflicts_total: IntCounter,

    /// End-to-end settlement time including store round trips
    pub settlement_duration_seconds: Histogram,

    /// Absolute mean shift per participant
    pub rating_mean_shift: Histogram,

    /// Match quality of settled matches
    pub match_quality: Histogram,
}

impl MetricsCollector {
    /// Create a new metrics collector with its own registry
    pub fn new() -> Result<Self> {
        let registry = Arc::new(Registry::new());
        Self::with_registry(registry)
    }

    /// Create a new metrics collector with custom registry
    pub fn with_registry(registry: Arc<Registry>) -> Result<Self> {
        let settlement_metrics = SettlementMetrics::new(&registry)?;

        Ok(Self {
            registry,
            settlement_metrics,
        })
    }

    /// Get the Prometheus registry
    pub fn registry(&self) -> Arc<Registry> {
        self.registry.clone()
    }

    /// Get settlement metrics
    pub fn settlement(&self) -> &SettlementMetrics {
        &self.settlement_metrics
    }

    /// Record a settlement that was persisted
    pub fn record_settlement(
        &self,
        outcome: MatchOutcome,
        settlement: &Settlement,
        duration: Duration,
    ) {
        self.settlement_metrics
            .settlements_total
            .with_label_values(&[outcome.label()])
            .inc();

        self.settlement_metrics
            .settlement_duration_seconds
            .observe(duration.as_secs_f64());

        self.settlement_metrics
            .match_quality
            .observe(settlement.match_quality);

        for change in &settlement.changes {
            self.settlement_metrics
                .rating_mean_shift
                .observe(change.mean_delta().abs());
        }
    }

    /// Record a settlement that failed
    pub fn record_failure(&self, error: &RatingError) {
        self.settlement_metrics
            .settlement_failures_total
            .with_label_values(&[error.kind()])
            .inc();
    }

    /// Record a persist attempt that hit a stale rating
    pub fn record_conflict(&self) {
        self.settlement_metrics.persist_conflicts_total.inc();
    }

    /// Render all metrics in the Prometheus text exposition format
    pub fn gather_text(&self) -> Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }

    /// Create a timer for measuring operation duration
    pub fn start_timer(&self) -> MetricsTimer {
        MetricsTimer::new()
    }
}

/// Timer for measuring operation durations
pub struct MetricsTimer {
    start: Instant,
}

impl MetricsTimer {
    fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Get the elapsed duration
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Stop the timer and return the duration
    pub fn stop(self) -> Duration {
        self.elapsed()
    }
}

impl SettlementMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let settlements_total = IntCounterVec::new(
            Opts::new(
                "league_skill_settlements_total",
                "Total matches settled and persisted",
            ),
            &["outcome"],
        )?;
        registry.register(Box::new(settlements_total.clone()))?;

        let settlement_failures_total = IntCounterVec::new(
            Opts::new(
                "league_skill_settlement_failures_total",
                "Total settlements abandoned",
            ),
            &["kind"],
        )?;
        registry.register(Box::new(settlement_failures_total.clone()))?;

        let persist_conflicts_total = IntCounter::new(
            "league_skill_persist_conflicts_total",
            "Persist attempts rejected by a stale rating",
        )?;
        registry.register(Box::new(persist_conflicts_total.clone()))?;

        let settlement_duration_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "league_skill_settlement_duration_seconds",
                "Time to fetch, settle and persist a match",
            )
            .buckets(vec![0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0]),
        )?;
        registry.register(Box::new(settlement_duration_seconds.clone()))?;

        let rating_mean_shift = Histogram::with_opts(
            HistogramOpts::new(
                "league_skill_rating_mean_shift",
                "Absolute change of a participant's mean per match",
            )
            .buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.0, 5.0]),
        )?;
        registry.register(Box::new(rating_mean_shift.clone()))?;

        let match_quality = Histogram::with_opts(
            HistogramOpts::new("league_skill_match_quality", "Quality of settled matches")
                .buckets(vec![0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7, 0.8, 0.9, 1.0]),
        )?;
        registry.register(Box::new(match_quality.clone()))?;

        Ok(Self {
            settlements_total,
            settlement_failures_total,
            persist_conflicts_total,
            settlement_duration_seconds,
            rating_mean_shift,
            match_quality,
        })
    }
}
