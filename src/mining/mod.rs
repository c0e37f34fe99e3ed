//! Online triplet selection for metric learning.
//!
//! Given a labeled batch of embeddings (or a precomputed pairwise distance
//! matrix), [`TripletMiner`] selects (anchor, positive, negative) index
//! triplets for a triplet-style embedding loss. Anchor-positive pairs are
//! enumerated per class through shuffled, exhaustible cursors and consumed
//! round-robin across classes, so no class dominates the front of a batch
//! and the walk terminates even when the requested number of triplets
//! exceeds what the batch can supply.
//!
//! Two selection policies are available:
//!
//! - [`SelectionPolicy::SemiHard`] (the FaceNet recipe): a negative must lie
//!   strictly farther from the anchor than the positive, but by less than
//!   the margin. Pairs with an empty band are skipped, not failed.
//! - [`SelectionPolicy::Random`]: negatives are drawn uniformly from every
//!   position with a different label; no distances are consulted.
//!
//! An empty result is a skip signal for the caller's training loop, never an
//! error. Malformed input (label/matrix shape disagreement, unparseable
//! policy or metric names, labels-only input under a distance-based policy)
//! is always a hard error.
//!
//! # Examples
//!
//! ```
//! use terna::mining::TripletMiner;
//! use terna::primitives::Matrix;
//!
//! // Two classes, close enough that semi-hard negatives exist for
//! // every anchor-positive pair under the default 0.2 margin.
//! let labels = vec![0, 0, 0, 1, 1, 1];
//! let embeddings = Matrix::from_vec(
//!     6,
//!     2,
//!     vec![
//!         0.00, 0.0, //
//!         0.01, 0.0, //
//!         0.02, 0.0, //
//!         0.40, 0.0, //
//!         0.41, 0.0, //
//!         0.42, 0.0,
//!     ],
//! )
//! .expect("6x2");
//!
//! let miner = TripletMiner::new(4).with_random_state(7);
//! let selection = miner.select_from_embeddings(&embeddings, &labels).expect("valid input");
//!
//! assert_eq!(selection.num_triplets(), 4);
//! for (a, p, n) in selection.triplets() {
//!     assert_eq!(labels[a], labels[p]);
//!     assert_ne!(labels[a], labels[n]);
//! }
//! ```

mod class_index;
mod pair_cursor;

pub use class_index::ClassIndex;
pub use pair_cursor::PairCursor;

use crate::distance::{pairwise_distances, Metric};
use crate::error::{Result, TernaError};
use crate::primitives::Matrix;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// How negatives are chosen for each anchor-positive pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SelectionPolicy {
    /// FaceNet semi-hard mining: a negative must be strictly farther from
    /// the anchor than the positive, but by less than the margin.
    #[default]
    SemiHard,
    /// Uniform draws over every position with a different label.
    Random,
}

impl SelectionPolicy {
    /// Canonical lowercase name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            SelectionPolicy::SemiHard => "semihard",
            SelectionPolicy::Random => "random",
        }
    }
}

impl FromStr for SelectionPolicy {
    type Err = TernaError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            // "facenet" is the historical name for semi-hard selection.
            "facenet" | "semihard" | "semi-hard" => Ok(SelectionPolicy::SemiHard),
            "random" => Ok(SelectionPolicy::Random),
            _ => Err(TernaError::UnknownPolicy {
                value: s.to_string(),
            }),
        }
    }
}

/// How many negatives each accepted anchor-positive pair yields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NegativeDraws {
    /// Always `num_negative` draws (with replacement). Small candidate sets
    /// produce repeated negatives.
    #[default]
    Fixed,
    /// At most `num_negative` draws, capped by the candidate-set size, so a
    /// pair never repeats negatives purely for quota.
    CappedByCandidates,
}

/// Result of one mining call: a flat index list plus a diagnostic.
///
/// Indices come in consecutive (anchor, positive, negative) groups of three,
/// referring to rows of the batch the miner was called with. An empty
/// selection means the batch had nothing to offer under the configured
/// policy; callers typically skip the training step and move on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripletSelection {
    indices: Vec<usize>,
    mean_candidates: Option<f32>,
}

impl TripletSelection {
    /// Number of complete triplets selected.
    #[must_use]
    pub fn num_triplets(&self) -> usize {
        self.indices.len() / 3
    }

    /// True when no triplets were selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Flat index list, length `3 * num_triplets()`.
    #[must_use]
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// Mean semi-hard candidate-set size over all evaluated pairs.
    ///
    /// `None` under the random policy, and when no pair was evaluated.
    #[must_use]
    pub fn mean_candidates(&self) -> Option<f32> {
        self.mean_candidates
    }

    /// Iterates triplets as `(anchor, positive, negative)` index tuples.
    pub fn triplets(&self) -> impl Iterator<Item = (usize, usize, usize)> + '_ {
        self.indices.chunks_exact(3).map(|c| (c[0], c[1], c[2]))
    }
}

/// Internal switch for where negatives come from during one mining pass.
enum NegativeSource<'a> {
    /// Semi-hard band over a pairwise distance matrix.
    Banded(&'a Matrix<f32>),
    /// Every position with a different label.
    AnyOtherLabel,
}

/// Configurable triplet selector.
///
/// Built with [`TripletMiner::new`] and `with_*` methods; all configuration
/// has defaults matching the common FaceNet recipe (semi-hard policy,
/// margin 0.2, three negatives per pair, squared-Euclidean distances).
///
/// Seeding through [`with_random_state`](TripletMiner::with_random_state)
/// makes every selection reproducible; unseeded miners draw fresh entropy
/// per call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripletMiner {
    triplet_per_batch: usize,
    margin: f32,
    num_negative: usize,
    policy: SelectionPolicy,
    negative_draws: NegativeDraws,
    background_label: Option<i32>,
    metric: Metric,
    random_state: Option<u64>,
}

impl Default for TripletMiner {
    fn default() -> Self {
        Self::new(100)
    }
}

impl TripletMiner {
    /// Creates a miner targeting `triplet_per_batch` triplets per call.
    #[must_use]
    pub fn new(triplet_per_batch: usize) -> Self {
        Self {
            triplet_per_batch,
            margin: 0.2,
            num_negative: 3,
            policy: SelectionPolicy::SemiHard,
            negative_draws: NegativeDraws::Fixed,
            background_label: None,
            metric: Metric::SquaredEuclidean,
            random_state: None,
        }
    }

    /// Sets the semi-hard margin (default: 0.2).
    #[must_use]
    pub fn with_margin(mut self, margin: f32) -> Self {
        self.margin = margin;
        self
    }

    /// Sets negatives requested per accepted pair (default: 3).
    #[must_use]
    pub fn with_num_negative(mut self, num_negative: usize) -> Self {
        self.num_negative = num_negative;
        self
    }

    /// Sets the selection policy (default: semi-hard).
    #[must_use]
    pub fn with_policy(mut self, policy: SelectionPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Sets the negative-draw mode (default: fixed count).
    #[must_use]
    pub fn with_negative_draws(mut self, negative_draws: NegativeDraws) -> Self {
        self.negative_draws = negative_draws;
        self
    }

    /// Excludes one label from anchor and positive roles (default: none).
    ///
    /// Items carrying this label remain eligible as negatives.
    #[must_use]
    pub fn with_background_label(mut self, label: i32) -> Self {
        self.background_label = Some(label);
        self
    }

    /// Sets the distance metric used over embeddings (default: squared
    /// Euclidean).
    #[must_use]
    pub fn with_metric(mut self, metric: Metric) -> Self {
        self.metric = metric;
        self
    }

    /// Seeds the internal RNG for reproducible selections.
    #[must_use]
    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = Some(seed);
        self
    }

    /// Selects triplets from a labeled embedding batch.
    ///
    /// `embeddings` holds one row per item; `labels[i]` is the class of row
    /// `i`. Under the semi-hard policy the full pairwise distance matrix is
    /// computed with the configured metric; the random policy never touches
    /// the embedding values.
    ///
    /// # Errors
    ///
    /// Returns an error for invalid hyperparameters or when `labels` length
    /// disagrees with the number of embedding rows.
    pub fn select_from_embeddings(
        &self,
        embeddings: &Matrix<f32>,
        labels: &[i32],
    ) -> Result<TripletSelection> {
        self.validate()?;
        if labels.len() != embeddings.n_rows() {
            return Err(TernaError::DimensionMismatch {
                expected: format!(
                    "{} labels for {} embedding rows",
                    embeddings.n_rows(),
                    embeddings.n_rows()
                ),
                actual: format!("{} labels", labels.len()),
            });
        }
        match self.policy {
            SelectionPolicy::SemiHard => {
                let distances = pairwise_distances(embeddings, self.metric);
                Ok(self.mine(labels, &NegativeSource::Banded(&distances)))
            }
            SelectionPolicy::Random => Ok(self.mine(labels, &NegativeSource::AnyOtherLabel)),
        }
    }

    /// Selects triplets from a precomputed pairwise distance matrix.
    ///
    /// The matrix must be square with one row per label. Entries are used
    /// as-is; the configured metric is not consulted.
    ///
    /// # Errors
    ///
    /// Returns an error for invalid hyperparameters or when `distances` is
    /// not `n x n` for `n = labels.len()`.
    pub fn select_from_distances(
        &self,
        distances: &Matrix<f32>,
        labels: &[i32],
    ) -> Result<TripletSelection> {
        self.validate()?;
        let n = labels.len();
        let (rows, cols) = distances.shape();
        if rows != n || cols != n {
            return Err(TernaError::DimensionMismatch {
                expected: format!("{n}x{n} distance matrix"),
                actual: format!("{rows}x{cols}"),
            });
        }
        match self.policy {
            SelectionPolicy::SemiHard => Ok(self.mine(labels, &NegativeSource::Banded(distances))),
            SelectionPolicy::Random => Ok(self.mine(labels, &NegativeSource::AnyOtherLabel)),
        }
    }

    /// Selects triplets from labels alone.
    ///
    /// Only the random policy can work without distances; the semi-hard
    /// policy needs them and fails fast here.
    ///
    /// # Errors
    ///
    /// Returns [`TernaError::MissingDistances`] under the semi-hard policy,
    /// or an error for invalid hyperparameters.
    pub fn select_from_labels(&self, labels: &[i32]) -> Result<TripletSelection> {
        self.validate()?;
        match self.policy {
            SelectionPolicy::SemiHard => Err(TernaError::MissingDistances {
                policy: self.policy.as_str().to_string(),
            }),
            SelectionPolicy::Random => Ok(self.mine(labels, &NegativeSource::AnyOtherLabel)),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.triplet_per_batch == 0 {
            return Err(TernaError::invalid_hyperparameter(
                "triplet_per_batch",
                self.triplet_per_batch,
                ">= 1",
            ));
        }
        if self.num_negative == 0 {
            return Err(TernaError::invalid_hyperparameter(
                "num_negative",
                self.num_negative,
                ">= 1",
            ));
        }
        if !self.margin.is_finite() || self.margin <= 0.0 {
            return Err(TernaError::invalid_hyperparameter(
                "margin",
                self.margin,
                "> 0 and finite",
            ));
        }
        Ok(())
    }

    fn rng(&self) -> StdRng {
        match self.random_state {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }

    /// Round-robin mining loop shared by both policies.
    ///
    /// Each round visits every surviving class once and asks its cursor for
    /// one anchor-positive pair. Exhausted cursors are retired after the
    /// round (never mid-iteration), so classes with few pairs drop out while
    /// larger ones keep contributing. The loop stops the moment the index
    /// budget is met, even mid-pair, or when every cursor has retired.
    fn mine(&self, labels: &[i32], negatives: &NegativeSource<'_>) -> TripletSelection {
        let mut rng = self.rng();
        let index = ClassIndex::build(labels, &mut rng);

        let mut active: Vec<(i32, PairCursor)> = index
            .foreground_labels(self.background_label)
            .into_iter()
            .map(|label| {
                let members = index.members(label).unwrap_or(&[]);
                (label, PairCursor::new(members))
            })
            .collect();

        let target = 3 * self.triplet_per_batch;
        let mut indices: Vec<usize> = Vec::with_capacity(target);
        let mut candidate_counts: Vec<usize> = Vec::new();

        'rounds: while !active.is_empty() && indices.len() < target {
            let mut retired: Vec<usize> = Vec::new();

            for slot in 0..active.len() {
                if indices.len() >= target {
                    break 'rounds;
                }

                let (label, cursor) = &mut active[slot];
                let label = *label;
                let Some((anchor, positive)) = cursor.next_pair() else {
                    retired.push(slot);
                    continue;
                };

                let candidates: Vec<usize> = match negatives {
                    NegativeSource::Banded(distances) => {
                        let pos_dist = distances.get(anchor, positive);
                        let row = distances.row_slice(anchor);
                        let banded: Vec<usize> = row
                            .iter()
                            .enumerate()
                            .filter(|&(j, &d)| {
                                labels[j] != label && d > pos_dist && d - pos_dist < self.margin
                            })
                            .map(|(j, _)| j)
                            .collect();
                        // Recorded before the empty check: pairs with an
                        // empty band count toward the mean.
                        candidate_counts.push(banded.len());
                        banded
                    }
                    NegativeSource::AnyOtherLabel => {
                        (0..labels.len()).filter(|&j| labels[j] != label).collect()
                    }
                };

                if candidates.is_empty() {
                    continue;
                }

                let draws = match self.negative_draws {
                    NegativeDraws::Fixed => self.num_negative,
                    NegativeDraws::CappedByCandidates => self.num_negative.min(candidates.len()),
                };

                for _ in 0..draws {
                    let negative = candidates[rng.gen_range(0..candidates.len())];
                    indices.push(anchor);
                    indices.push(positive);
                    indices.push(negative);
                    if indices.len() >= target {
                        break 'rounds;
                    }
                }
            }

            // Deferred retirement: highest slot first so indices stay valid.
            for &slot in retired.iter().rev() {
                active.remove(slot);
            }
        }

        let mean_candidates = if candidate_counts.is_empty() {
            None
        } else {
            Some(candidate_counts.iter().sum::<usize>() as f32 / candidate_counts.len() as f32)
        };

        TripletSelection {
            indices,
            mean_candidates,
        }
    }
}


#[cfg(test)]
#[path = "tests_class_index_contract.rs"]
mod tests_class_index_contract;


#[cfg(test)]
#[path = "tests_miner_contract.rs"]
mod tests_miner_contract;
