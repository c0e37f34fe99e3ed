//! Loss functions for metric learning over mined triplets.
//!
//! # Usage
//!
//! ```
//! use terna::distance::Metric;
//! use terna::loss::triplet_loss;
//! use terna::primitives::Vector;
//!
//! let anchor = Vector::from_slice(&[1.0, 0.0]);
//! let positive = Vector::from_slice(&[0.9, 0.1]);
//! let negative = Vector::from_slice(&[0.0, 1.0]);
//!
//! let loss = triplet_loss(&anchor, &positive, &negative, 0.2, Metric::SquaredEuclidean);
//! assert!(loss >= 0.0);
//! ```

use crate::distance::{distance_between, Metric};
use crate::error::{Result, TernaError};
use crate::primitives::{Matrix, Vector};

/// Triplet loss for a single (anchor, positive, negative) triple.
///
/// Computes the hinge over the distance gap:
///
/// ```text
/// L = max(0, d(anchor, positive) - d(anchor, negative) + margin)
/// ```
///
/// Distances follow the given metric, matching whatever the miner used to
/// select the triple.
///
/// # Arguments
///
/// * `anchor` - Anchor embedding
/// * `positive` - Positive example (same class as anchor)
/// * `negative` - Negative example (different class)
/// * `margin` - Minimum distance margin between positive and negative
/// * `metric` - Distance metric applied to embedding differences
///
/// # Returns
///
/// The triplet loss value (0 if the constraint is satisfied)
///
/// # Panics
///
/// Panics if the three embeddings do not share one dimension.
///
/// # Example
///
/// ```
/// use terna::distance::Metric;
/// use terna::loss::triplet_loss;
/// use terna::primitives::Vector;
///
/// let anchor = Vector::from_slice(&[0.0, 0.0]);
/// let positive = Vector::from_slice(&[0.1, 0.0]);  // close to anchor
/// let negative = Vector::from_slice(&[3.0, 0.0]);  // far from anchor
///
/// let loss = triplet_loss(&anchor, &positive, &negative, 0.2, Metric::SquaredEuclidean);
/// assert!((loss - 0.0).abs() < 1e-6);
/// ```
#[must_use]
pub fn triplet_loss(
    anchor: &Vector<f32>,
    positive: &Vector<f32>,
    negative: &Vector<f32>,
    margin: f32,
    metric: Metric,
) -> f32 {
    assert_eq!(
        anchor.len(),
        positive.len(),
        "Anchor and positive must have same dimension"
    );
    assert_eq!(
        anchor.len(),
        negative.len(),
        "Anchor and negative must have same dimension"
    );

    let d_pos = pair_distance(anchor, positive, metric);
    let d_neg = pair_distance(anchor, negative, metric);

    (d_pos - d_neg + margin).max(0.0)
}

/// Distance between two vectors under the given metric.
fn pair_distance(a: &Vector<f32>, b: &Vector<f32>, metric: Metric) -> f32 {
    let mut sum = 0.0;
    for i in 0..a.len() {
        let diff = a[i] - b[i];
        sum += diff * diff;
    }
    match metric {
        Metric::SquaredEuclidean => sum,
        Metric::Euclidean => sum.sqrt(),
    }
}

/// Mean triplet loss over a flat mined index list.
///
/// `indices` comes straight from a
/// [`TripletSelection`](crate::mining::TripletSelection): consecutive
/// (anchor, positive, negative) groups of three, each referring to a row of
/// `embeddings`. An empty list yields zero.
///
/// # Errors
///
/// Returns an error if the list length is not a multiple of three or any
/// index falls outside the embedding rows.
///
/// # Example
///
/// ```
/// use terna::distance::Metric;
/// use terna::loss::mean_triplet_loss;
/// use terna::primitives::Matrix;
///
/// let embeddings = Matrix::from_vec(3, 1, vec![0.0, 0.1, 3.0]).expect("3x1");
/// let indices = [0, 1, 2]; // one triplet
/// let loss = mean_triplet_loss(&embeddings, &indices, 0.2, Metric::SquaredEuclidean)
///     .expect("well-formed indices");
/// assert!((loss - 0.0).abs() < 1e-6);
/// ```
pub fn mean_triplet_loss(
    embeddings: &Matrix<f32>,
    indices: &[usize],
    margin: f32,
    metric: Metric,
) -> Result<f32> {
    if indices.len() % 3 != 0 {
        return Err(TernaError::DimensionMismatch {
            expected: "index list length divisible by 3".to_string(),
            actual: indices.len().to_string(),
        });
    }
    let n = embeddings.n_rows();
    if let Some(&bad) = indices.iter().find(|&&i| i >= n) {
        return Err(TernaError::index_out_of_bounds(bad, n));
    }
    if indices.is_empty() {
        return Ok(0.0);
    }

    let mut total = 0.0;
    for triplet in indices.chunks_exact(3) {
        let d_pos = distance_between(embeddings, triplet[0], triplet[1], metric);
        let d_neg = distance_between(embeddings, triplet[0], triplet[2], metric);
        total += (d_pos - d_neg + margin).max(0.0);
    }
    Ok(total / (indices.len() / 3) as f32)
}

/// Lifted structured loss over a labeled distance matrix.
///
/// For every unordered positive pair (i, j) the log-sum-exp over both items'
/// negatives forms a smooth hardest-negative bound:
///
/// ```text
/// J_ij = log( Σ_k exp(margin - d(i,k)) + Σ_k exp(margin - d(j,k)) ) + d(i,j)
/// L    = 1 / (2|P|) * Σ_(i,j) max(0, J_ij)²
/// ```
///
/// where k ranges over positions with a different label. The log-sum-exp is
/// evaluated in max-shifted form, so large margins and distances cannot
/// overflow. Batches without a positive pair yield zero.
///
/// # Errors
///
/// Returns an error if `distances` is not square with one row per label, or
/// the margin is not positive and finite.
///
/// # Example
///
/// ```
/// use terna::loss::lifted_struct_loss;
/// use terna::primitives::Matrix;
///
/// let distances = Matrix::from_vec(
///     3,
///     3,
///     vec![
///         0.0, 1.0, 25.0, //
///         1.0, 0.0, 16.0, //
///         25.0, 16.0, 0.0,
///     ],
/// )
/// .expect("3x3");
/// let loss = lifted_struct_loss(&distances, &[0, 0, 1], 1.0).expect("square matrix");
/// assert!(loss >= 0.0);
/// ```
pub fn lifted_struct_loss(distances: &Matrix<f32>, labels: &[i32], margin: f32) -> Result<f32> {
    let n = labels.len();
    let (rows, cols) = distances.shape();
    if rows != n || cols != n {
        return Err(TernaError::DimensionMismatch {
            expected: format!("{n}x{n} distance matrix"),
            actual: format!("{rows}x{cols}"),
        });
    }
    if !margin.is_finite() || margin <= 0.0 {
        return Err(TernaError::invalid_hyperparameter(
            "margin",
            margin,
            "> 0 and finite",
        ));
    }

    let mut total = 0.0_f32;
    let mut n_pairs = 0_usize;

    for i in 0..n {
        for j in (i + 1)..n {
            if labels[i] != labels[j] {
                continue;
            }
            n_pairs += 1;

            // Same label on i and j, so both share one negative set.
            let mut args: Vec<f32> = Vec::new();
            for k in 0..n {
                if labels[k] != labels[i] {
                    args.push(margin - distances.get(i, k));
                    args.push(margin - distances.get(j, k));
                }
            }
            if args.is_empty() {
                // No negatives anywhere: the bound is -inf, hinged to zero.
                continue;
            }

            let max_arg = args.iter().fold(f32::NEG_INFINITY, |m, &v| m.max(v));
            let sum_exp: f32 = args.iter().map(|&v| (v - max_arg).exp()).sum();
            let hinge_arg = max_arg + sum_exp.ln() + distances.get(i, j);

            if hinge_arg > 0.0 {
                total += hinge_arg * hinge_arg;
            }
        }
    }

    if n_pairs == 0 {
        return Ok(0.0);
    }
    Ok(total / (2.0 * n_pairs as f32))
}
