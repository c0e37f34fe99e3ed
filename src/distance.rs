//! Pairwise distance computation over embedding batches.
//!
//! Distances are computed in vectorized form from the Gram matrix:
//! `d2(i, j) = ||x_i||^2 + ||x_j||^2 - 2 * <x_i, x_j>`, clipped at zero to
//! absorb the small negative values floating-point cancellation produces for
//! near-identical rows. The result has an exactly zero diagonal and exact
//! symmetry (each off-diagonal value is computed once and mirrored).

use crate::error::{Result, TernaError};
use crate::primitives::Matrix;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Distance metric applied to embedding differences.
///
/// `SquaredEuclidean` is the default: it preserves the ordering of Euclidean
/// distances while skipping the square root, and it is what the semi-hard
/// margin band is calibrated against in most metric-learning recipes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Metric {
    /// Squared L2 distance: `sum((a - b)^2)`.
    #[default]
    SquaredEuclidean,
    /// L2 distance: `sqrt(sum((a - b)^2))`.
    Euclidean,
}

impl Metric {
    /// Canonical lowercase name, matching the strings [`FromStr`] accepts.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::SquaredEuclidean => "squaredeuclidean",
            Metric::Euclidean => "euclidean",
        }
    }

    /// Distance for a precomputed difference vector `a - b`.
    #[must_use]
    pub fn from_diff(&self, diff: &[f32]) -> f32 {
        let sq: f32 = diff.iter().map(|d| d * d).sum();
        match self {
            Metric::SquaredEuclidean => sq,
            Metric::Euclidean => sq.sqrt(),
        }
    }
}

impl FromStr for Metric {
    type Err = TernaError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "squaredeuclidean" => Ok(Metric::SquaredEuclidean),
            "euclidean" => Ok(Metric::Euclidean),
            _ => Err(TernaError::UnknownMetric {
                value: s.to_string(),
            }),
        }
    }
}

/// Computes the full pairwise distance matrix for a batch of embeddings.
///
/// `x` holds one embedding per row. The returned matrix is square with a
/// zero diagonal; entry `(i, j)` equals entry `(j, i)` exactly.
///
/// # Examples
///
/// ```
/// use terna::distance::{pairwise_distances, Metric};
/// use terna::primitives::Matrix;
///
/// let x = Matrix::from_vec(2, 2, vec![0.0, 0.0, 3.0, 4.0]).expect("2x2");
/// let d = pairwise_distances(&x, Metric::SquaredEuclidean);
/// assert!((d.get(0, 1) - 25.0).abs() < 1e-5);
/// assert!((d.get(0, 0)).abs() < 1e-6);
/// ```
#[must_use]
pub fn pairwise_distances(x: &Matrix<f32>, metric: Metric) -> Matrix<f32> {
    let n = x.n_rows();
    let mut out = Matrix::zeros(n, n);

    // Squared row norms, computed once.
    let norms: Vec<f32> = (0..n)
        .map(|i| x.row_slice(i).iter().map(|v| v * v).sum())
        .collect();

    for i in 0..n {
        let ri = x.row_slice(i);
        for j in (i + 1)..n {
            let rj = x.row_slice(j);
            let dot: f32 = ri.iter().zip(rj.iter()).map(|(a, b)| a * b).sum();
            // Clip at zero: cancellation can push near-zero results negative.
            let sq = (norms[i] + norms[j] - 2.0 * dot).max(0.0);
            let d = match metric {
                Metric::SquaredEuclidean => sq,
                Metric::Euclidean => sq.sqrt(),
            };
            out.set(i, j, d);
            out.set(j, i, d);
        }
    }

    out
}

/// Distance between two rows of an embedding batch.
///
/// # Panics
///
/// Panics if `i` or `j` is out of bounds.
#[must_use]
pub fn distance_between(x: &Matrix<f32>, i: usize, j: usize, metric: Metric) -> f32 {
    let diff: Vec<f32> = x
        .row_slice(i)
        .iter()
        .zip(x.row_slice(j).iter())
        .map(|(a, b)| a - b)
        .collect();
    metric.from_diff(&diff)
}


#[cfg(test)]
#[path = "distance_tests_contract.rs"]
mod tests_contract;
