//! League Skill - Bayesian skill ratings for game clubs
//!
//! This crate keeps a Gaussian belief about every participant's skill per
//! game and updates those beliefs from match outcomes, including team and
//! multi-side matches. Settlements are persisted through a pluggable store
//! with optimistic concurrency.

pub mod config;
pub mod error;
pub mod math;
pub mod metrics;
pub mod rating;
pub mod settlement;
pub mod types;
pub mod utils;

// Re-export commonly used types and traits
pub use error::{RatingError, RatingResult, Result};
pub use types::*;

// Re-export key components
pub use math::{GaussianBelief, Matrix};
pub use rating::{RatingCalculator, RatingStore, RatingUpdateAlgorithm, Settlement};
pub use settlement::{MatchRecord, MatchRequest, SettlementService};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
