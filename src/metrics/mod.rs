//! Metrics for the rating engine
//!
//! This module provides Prometheus metrics collection for match settlement.

pub mod collector;

pub use collector::{MetricsCollector, MetricsTimer, SettlementMetrics};
