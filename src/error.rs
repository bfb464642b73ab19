//! Error types for the rating engine
//!
//! The pure engine (beliefs, matrices, settlement) reports failures through the
//! closed [`RatingError`] taxonomy. Outer layers such as configuration loading
//! and the CLI use `anyhow` for context-rich propagation.

use crate::types::GameId;

/// Result type alias for the outer layers
pub type Result<T> = anyhow::Result<T>;

/// Result type alias for the engine
pub type RatingResult<T> = std::result::Result<T, RatingError>;

/// Every way a settlement or one of its building blocks can fail
#[derive(Debug, thiserror::Error)]
pub enum RatingError {
    #[error("Invalid input: {reason}")]
    InvalidInput { reason: String },

    #[error("Invalid matrix dimensions: {rows}x{cols}")]
    InvalidDimensions { rows: usize, cols: usize },

    #[error("Dimension mismatch: {reason}")]
    DimensionMismatch { reason: String },

    #[error("Index ({row}, {col}) out of range for {rows}x{cols} matrix")]
    IndexOutOfRange {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    #[error("Matrix is not square: {rows}x{cols}")]
    NotSquare { rows: usize, cols: usize },

    #[error("Matrix is singular (determinant {determinant:e})")]
    SingularMatrix { determinant: f64 },

    #[error("Failed to persist ratings for game {game_id} (participants: {participants})")]
    PersistenceFailure {
        game_id: GameId,
        participants: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },

    #[error("Configuration error: {message}")]
    ConfigurationError { message: String },
}

impl RatingError {
    /// Shorthand for the most common validation failure
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }

    /// Wrap a store failure with the game and participants it concerned
    pub fn persistence(game_id: GameId, participants: &[String], source: anyhow::Error) -> Self {
        Self::PersistenceFailure {
            game_id,
            participants: participants.join(", "),
            source: source.into(),
        }
    }

    /// Stable label for logs and metrics
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidInput { .. } => "invalid_input",
            Self::InvalidDimensions { .. } => "invalid_dimensions",
            Self::DimensionMismatch { .. } => "dimension_mismatch",
            Self::IndexOutOfRange { .. } => "index_out_of_range",
            Self::NotSquare { .. } => "not_square",
            Self::SingularMatrix { .. } => "singular_matrix",
            Self::PersistenceFailure { .. } => "persistence_failure",
            Self::ConfigurationError { .. } => "configuration_error",
        }
    }
}
