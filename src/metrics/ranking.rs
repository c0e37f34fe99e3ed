//! Retrieval metrics over labeled distance matrices.
//!
//! Each item plays the query role against every other item in the batch,
//! ranked by ascending distance. Items whose class has no other member are
//! skipped: they have no correct answer to retrieve. Ties break toward the
//! lower index, so rankings are deterministic.

use crate::error::{Result, TernaError};
use crate::primitives::Matrix;

/// Recall@K: fraction of queries whose top-K neighbors contain a same-class
/// item.
///
/// Queries without any same-class mate in the batch are excluded from the
/// denominator; a batch with no eligible query yields 0.0.
///
/// # Errors
///
/// Returns an error if `distances` is not square with one row per label, or
/// `k` is zero.
///
/// # Examples
///
/// ```
/// use terna::distance::{pairwise_distances, Metric};
/// use terna::metrics::recall_at_k;
/// use terna::primitives::Matrix;
///
/// // Two tight clusters: every nearest neighbor is a class mate.
/// let x = Matrix::from_vec(4, 1, vec![0.0, 0.1, 5.0, 5.1]).expect("4x1");
/// let d = pairwise_distances(&x, Metric::SquaredEuclidean);
/// let recall = recall_at_k(&d, &[0, 0, 1, 1], 1).expect("valid input");
/// assert!((recall - 1.0).abs() < 1e-6);
/// ```
pub fn recall_at_k(distances: &Matrix<f32>, labels: &[i32], k: usize) -> Result<f32> {
    validate_square(distances, labels)?;
    if k == 0 {
        return Err(TernaError::invalid_hyperparameter("k", k, ">= 1"));
    }

    let n = labels.len();
    let mut eligible = 0_usize;
    let mut hits = 0_usize;

    for i in 0..n {
        let has_mate = (0..n).any(|j| j != i && labels[j] == labels[i]);
        if !has_mate {
            continue;
        }
        eligible += 1;

        let order = ranked_others(distances, i);
        if order.iter().take(k).any(|&j| labels[j] == labels[i]) {
            hits += 1;
        }
    }

    if eligible == 0 {
        return Ok(0.0);
    }
    Ok(hits as f32 / eligible as f32)
}

/// Mean average precision over all eligible queries.
///
/// For each query, average precision rewards rankings that place every
/// same-class item ahead of the other classes; the mean runs over queries
/// with at least one same-class mate. A batch with no eligible query yields
/// 0.0.
///
/// # Errors
///
/// Returns an error if `distances` is not square with one row per label.
///
/// # Examples
///
/// ```
/// use terna::distance::{pairwise_distances, Metric};
/// use terna::metrics::mean_average_precision;
/// use terna::primitives::Matrix;
///
/// let x = Matrix::from_vec(4, 1, vec![0.0, 0.1, 5.0, 5.1]).expect("4x1");
/// let d = pairwise_distances(&x, Metric::SquaredEuclidean);
/// let map = mean_average_precision(&d, &[0, 0, 1, 1]).expect("valid input");
/// assert!((map - 1.0).abs() < 1e-6);
/// ```
pub fn mean_average_precision(distances: &Matrix<f32>, labels: &[i32]) -> Result<f32> {
    validate_square(distances, labels)?;

    let n = labels.len();
    let mut ap_sum = 0.0_f32;
    let mut eligible = 0_usize;

    for i in 0..n {
        let total_relevant = (0..n).filter(|&j| j != i && labels[j] == labels[i]).count();
        if total_relevant == 0 {
            continue;
        }
        eligible += 1;

        let order = ranked_others(distances, i);
        let mut found = 0_usize;
        let mut precision_sum = 0.0_f32;
        for (rank, &j) in order.iter().enumerate() {
            if labels[j] == labels[i] {
                found += 1;
                precision_sum += found as f32 / (rank + 1) as f32;
            }
        }
        ap_sum += precision_sum / total_relevant as f32;
    }

    if eligible == 0 {
        return Ok(0.0);
    }
    Ok(ap_sum / eligible as f32)
}

/// All positions except `i`, ranked by ascending distance from `i`, ties
/// broken toward the lower index.
fn ranked_others(distances: &Matrix<f32>, i: usize) -> Vec<usize> {
    let n = distances.n_rows();
    let mut order: Vec<usize> = (0..n).filter(|&j| j != i).collect();
    order.sort_by(|&a, &b| {
        distances
            .get(i, a)
            .partial_cmp(&distances.get(i, b))
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.cmp(&b))
    });
    order
}

fn validate_square(distances: &Matrix<f32>, labels: &[i32]) -> Result<()> {
    let n = labels.len();
    let (rows, cols) = distances.shape();
    if rows != n || cols != n {
        return Err(TernaError::DimensionMismatch {
            expected: format!("{n}x{n} distance matrix"),
            actual: format!("{rows}x{cols}"),
        });
    }
    Ok(())
}
