//! Match settlement
//!
//! This module turns finished matches into persisted rating updates.

pub mod service;

pub use service::{MatchRecord, MatchRequest, SettlementService};
