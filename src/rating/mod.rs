//! Skill-rating engine
//!
//! This module provides the match settlement algorithm, its side-aggregation
//! strategies, the calculator seam used by the settlement workflow, and the
//! storage interface for persisted ratings.

pub mod aggregation;
pub mod algorithm;
pub mod calculator;
pub mod storage;

// Re-export commonly used types
pub use aggregation::{ArithmeticMeanAggregator, SideAggregator};
pub use algorithm::RatingUpdateAlgorithm;
pub use calculator::{RatingCalculator, Settlement};
pub use storage::{InMemoryRatingStore, RatingStore, StoreError};
