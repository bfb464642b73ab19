//! Numeric building blocks for the rating engine
//!
//! Gaussian belief arithmetic and small dense matrices, both immutable value
//! types that are safe to share across threads.

pub mod gaussian;
pub mod matrix;

pub use gaussian::GaussianBelief;
pub use matrix::Matrix;
