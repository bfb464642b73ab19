//! Utility functions for the rating engine

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Tolerance used when comparing derived floating point quantities
pub const DEFAULT_TOLERANCE: f64 = 1e-9;

/// Generate a new unique game ID
pub fn generate_game_id() -> Uuid {
    Uuid::new_v4()
}

/// Get the current UTC timestamp
pub fn current_timestamp() -> DateTime<Utc> {
    Utc::now()
}

/// Check if two values are within the given tolerance
pub fn approx_eq(a: f64, b: f64, tolerance: f64) -> bool {
    (a - b).abs() <= tolerance
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_unique_ids() {
        let id1 = generate_game_id();
        let id2 = generate_game_id();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_approx_eq() {
        assert!(approx_eq(1.0, 1.0 + 1e-12, DEFAULT_TOLERANCE));
        assert!(!approx_eq(1.0, 1.001, DEFAULT_TOLERANCE));
        assert!(approx_eq(-2.0, -2.0, 0.0));
    }
}
