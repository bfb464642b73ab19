//! Dense matrices with exact cofactor-based inversion
//!
//! Matrices here are sized by the number of sides in a match, so determinants
//! use Laplace expansion along the first row, skipping zero coefficients.
//! Dense operands are factorial in the dimension, which is the reason
//! [`MAX_EXACT_DIMENSION`] exists; the diagonal matrices settlement inverts
//! stay cheap. Swap the determinant/inverse implementation behind this same API
//! before using it with larger operands.

use crate::error::{RatingError, RatingResult};
use serde::{Deserialize, Serialize};

/// Determinants smaller than this (in magnitude) mark a matrix as singular
pub const SINGULARITY_THRESHOLD: f64 = 1e-10;

/// Largest dimension the cofactor expansion is expected to handle
pub const MAX_EXACT_DIMENSION: usize = 10;

/// Row-major `rows x cols` grid of reals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "MatrixRepr")]
pub struct Matrix {
    rows: usize,
    cols: usize,
    values: Vec<f64>,
}

/// Wire shape of [`Matrix`]; decoding goes through [`Matrix::from_values`]
#[derive(Deserialize)]
struct MatrixRepr {
    rows: usize,
    cols: usize,
    values: Vec<f64>,
}

impl TryFrom<MatrixRepr> for Matrix {
    type Error = RatingError;

    fn try_from(repr: MatrixRepr) -> RatingResult<Self> {
        Matrix::from_values(repr.rows, repr.cols, repr.values)
    }
}

impl Matrix {
    /// Zero-filled matrix
    pub fn new(rows: usize, cols: usize) -> RatingResult<Self> {
        if rows == 0 || cols == 0 {
            return Err(RatingError::InvalidDimensions { rows, cols });
        }
        Ok(Self {
            rows,
            cols,
            values: vec![0.0; rows * cols],
        })
    }

    /// Matrix filled from row-major values
    pub fn from_values(rows: usize, cols: usize, values: Vec<f64>) -> RatingResult<Self> {
        if rows == 0 || cols == 0 {
            return Err(RatingError::InvalidDimensions { rows, cols });
        }
        if values.len() != rows * cols {
            return Err(RatingError::DimensionMismatch {
                reason: format!(
                    "{} values supplied for a {}x{} matrix",
                    values.len(),
                    rows,
                    cols
                ),
            });
        }
        Ok(Self { rows, cols, values })
    }

    /// Matrix from nested rows; every row must have the same length
    pub fn from_rows(rows: Vec<Vec<f64>>) -> RatingResult<Self> {
        let row_count = rows.len();
        let col_count = rows.first().map(Vec::len).unwrap_or(0);
        if let Some(ragged) = rows.iter().position(|row| row.len() != col_count) {
            return Err(RatingError::DimensionMismatch {
                reason: format!(
                    "row {} has {} columns, expected {}",
                    ragged,
                    rows[ragged].len(),
                    col_count
                ),
            });
        }
        Self::from_values(row_count, col_count, rows.into_iter().flatten().collect())
    }

    /// `n x n` identity
    pub fn identity(n: usize) -> RatingResult<Self> {
        Self::diagonal(&vec![1.0; n])
    }

    /// Square matrix with `entries` on the diagonal
    pub fn diagonal(entries: &[f64]) -> RatingResult<Self> {
        let n = entries.len();
        let mut matrix = Self::new(n, n)?;
        for (i, value) in entries.iter().enumerate() {
            matrix.values[i * n + i] = *value;
        }
        Ok(matrix)
    }

    /// `n x 1` matrix holding `entries`
    pub fn column(entries: &[f64]) -> RatingResult<Self> {
        Self::from_values(entries.len(), 1, entries.to_vec())
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn is_square(&self) -> bool {
        self.rows == self.cols
    }

    pub fn get(&self, row: usize, col: usize) -> RatingResult<f64> {
        self.check_index(row, col)?;
        Ok(self.values[row * self.cols + col])
    }

    pub fn set(&mut self, row: usize, col: usize, value: f64) -> RatingResult<()> {
        self.check_index(row, col)?;
        self.values[row * self.cols + col] = value;
        Ok(())
    }

    fn check_index(&self, row: usize, col: usize) -> RatingResult<()> {
        if row >= self.rows || col >= self.cols {
            return Err(RatingError::IndexOutOfRange {
                row,
                col,
                rows: self.rows,
                cols: self.cols,
            });
        }
        Ok(())
    }

    // Bounds are guaranteed by the callers below
    fn at(&self, row: usize, col: usize) -> f64 {
        self.values[row * self.cols + col]
    }

    fn require_square(&self) -> RatingResult<()> {
        if !self.is_square() {
            return Err(RatingError::NotSquare {
                rows: self.rows,
                cols: self.cols,
            });
        }
        Ok(())
    }

    pub fn transpose(&self) -> Matrix {
        let mut values = Vec::with_capacity(self.values.len());
        for col in 0..self.cols {
            for row in 0..self.rows {
                values.push(self.at(row, col));
            }
        }
        Matrix {
            rows: self.cols,
            cols: self.rows,
            values,
        }
    }

    /// Matrix with `skip_row` and `skip_col` removed; needs at least 2x2
    fn minor(&self, skip_row: usize, skip_col: usize) -> Matrix {
        let mut values = Vec::with_capacity((self.rows - 1) * (self.cols - 1));
        for row in (0..self.rows).filter(|&r| r != skip_row) {
            for col in (0..self.cols).filter(|&c| c != skip_col) {
                values.push(self.at(row, col));
            }
        }
        Matrix {
            rows: self.rows - 1,
            cols: self.cols - 1,
            values,
        }
    }

    pub fn determinant(&self) -> RatingResult<f64> {
        self.require_square()?;
        Ok(self.expand_determinant())
    }

    fn expand_determinant(&self) -> f64 {
        match self.rows {
            1 => self.at(0, 0),
            2 => self.at(0, 0) * self.at(1, 1) - self.at(0, 1) * self.at(1, 0),
            n => (0..n)
                .filter(|&col| self.at(0, col) != 0.0)
                .map(|col| {
                    let sign = if col % 2 == 0 { 1.0 } else { -1.0 };
                    sign * self.at(0, col) * self.minor(0, col).expand_determinant()
                })
                .sum(),
        }
    }

    fn cofactor(&self, row: usize, col: usize) -> f64 {
        let sign = if (row + col) % 2 == 0 { 1.0 } else { -1.0 };
        sign * self.minor(row, col).expand_determinant()
    }

    /// Transposed cofactor matrix
    pub fn adjugate(&self) -> RatingResult<Matrix> {
        self.require_square()?;
        let n = self.rows;

        if n == 1 {
            return Matrix::from_values(1, 1, vec![1.0]);
        }

        let mut values = vec![0.0; n * n];
        for row in 0..n {
            for col in 0..n {
                values[col * n + row] = self.cofactor(row, col);
            }
        }
        Matrix::from_values(n, n, values)
    }

    pub fn inverse(&self) -> RatingResult<Matrix> {
        self.require_square()?;

        let determinant = self.expand_determinant();
        if !determinant.is_finite() || determinant.abs() < SINGULARITY_THRESHOLD {
            return Err(RatingError::SingularMatrix { determinant });
        }

        if self.rows == 1 {
            return Matrix::from_values(1, 1, vec![1.0 / determinant]);
        }
        Ok(self.adjugate()?.scale(1.0 / determinant))
    }

    pub fn add(&self, other: &Matrix) -> RatingResult<Matrix> {
        if self.rows != other.rows || self.cols != other.cols {
            return Err(RatingError::DimensionMismatch {
                reason: format!(
                    "cannot add {}x{} and {}x{}",
                    self.rows, self.cols, other.rows, other.cols
                ),
            });
        }

        let values = self
            .values
            .iter()
            .zip(&other.values)
            .map(|(a, b)| a + b)
            .collect();
        Matrix::from_values(self.rows, self.cols, values)
    }

    pub fn multiply(&self, other: &Matrix) -> RatingResult<Matrix> {
        if self.cols != other.rows {
            return Err(RatingError::DimensionMismatch {
                reason: format!(
                    "cannot multiply {}x{} by {}x{}",
                    self.rows, self.cols, other.rows, other.cols
                ),
            });
        }

        let mut values = vec![0.0; self.rows * other.cols];
        for row in 0..self.rows {
            for col in 0..other.cols {
                let mut sum = 0.0;
                for k in 0..self.cols {
                    sum += self.at(row, k) * other.at(k, col);
                }
                values[row * other.cols + col] = sum;
            }
        }
        Matrix::from_values(self.rows, other.cols, values)
    }

    /// Element-wise scaling
    pub fn scale(&self, factor: f64) -> Matrix {
        Matrix {
            rows: self.rows,
            cols: self.cols,
            values: self.values.iter().map(|v| v * factor).collect(),
        }
    }

    /// Same shape and every entry within `tolerance`
    pub fn approx_eq(&self, other: &Matrix, tolerance: f64) -> bool {
        self.rows == other.rows
            && self.cols == other.cols
            && self
                .values
                .iter()
                .zip(&other.values)
                .all(|(a, b)| (a - b).abs() <= tolerance)
    }
}
