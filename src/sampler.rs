//! Class-balanced batch sampling.
//!
//! Builds training batches by visiting classes in shuffled order and taking
//! a random-sized subsample from each, so every batch carries enough
//! same-class items to form anchor-positive pairs. One pass over the classes
//! bounds the work: when the classes run out before the batch fills, the
//! shorter batch is returned as-is rather than retrying forever.

use crate::error::{Result, TernaError};
use crate::mining::ClassIndex;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Samples batches with several items per class.
///
/// Each call visits the batch's classes in a fresh shuffled order, drawing
/// between `min_per_class` and `max_per_class` items from each (capped by
/// class size) until `batch_size` positions are collected.
///
/// # Examples
///
/// ```
/// use terna::sampler::BalancedBatchSampler;
///
/// let labels: Vec<i32> = (0..60).map(|i| i % 6).collect();
/// let sampler = BalancedBatchSampler::new(20).with_random_state(3);
/// let batch = sampler.sample(&labels).expect("valid configuration");
///
/// assert_eq!(batch.len(), 20);
/// assert!(batch.iter().all(|&i| i < 60));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalancedBatchSampler {
    batch_size: usize,
    min_per_class: usize,
    max_per_class: usize,
    random_state: Option<u64>,
}

impl Default for BalancedBatchSampler {
    fn default() -> Self {
        Self::new(64)
    }
}

impl BalancedBatchSampler {
    /// Creates a sampler producing batches of at most `batch_size` positions.
    #[must_use]
    pub fn new(batch_size: usize) -> Self {
        Self {
            batch_size,
            min_per_class: 5,
            max_per_class: 10,
            random_state: None,
        }
    }

    /// Sets the per-class subsample range (default: 5..=10).
    #[must_use]
    pub fn with_per_class_range(mut self, min_per_class: usize, max_per_class: usize) -> Self {
        self.min_per_class = min_per_class;
        self.max_per_class = max_per_class;
        self
    }

    /// Seeds the internal RNG for reproducible batches.
    #[must_use]
    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = Some(seed);
        self
    }

    /// Draws one batch of positions from a labeled pool.
    ///
    /// Returns fewer than `batch_size` positions when the pool's classes are
    /// exhausted first; the caller decides whether a short batch is usable.
    ///
    /// # Errors
    ///
    /// Returns an error for invalid hyperparameters.
    pub fn sample(&self, labels: &[i32]) -> Result<Vec<usize>> {
        self.validate()?;

        let mut rng = match self.random_state {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        // ClassIndex shuffles each member list, so a prefix of it is
        // already a uniform subsample.
        let index = ClassIndex::build(labels, &mut rng);
        let mut class_order: Vec<i32> = index.class_labels().to_vec();
        class_order.shuffle(&mut rng);

        let mut batch: Vec<usize> = Vec::with_capacity(self.batch_size);
        for label in class_order {
            if batch.len() >= self.batch_size {
                break;
            }
            let members = index.members(label).unwrap_or(&[]);
            let take = rng
                .gen_range(self.min_per_class..=self.max_per_class)
                .min(members.len());
            batch.extend_from_slice(&members[..take]);
        }

        batch.truncate(self.batch_size);
        Ok(batch)
    }

    fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(TernaError::invalid_hyperparameter(
                "batch_size",
                self.batch_size,
                ">= 1",
            ));
        }
        if self.min_per_class == 0 {
            return Err(TernaError::invalid_hyperparameter(
                "min_per_class",
                self.min_per_class,
                ">= 1",
            ));
        }
        if self.min_per_class > self.max_per_class {
            return Err(TernaError::invalid_hyperparameter(
                "max_per_class",
                self.max_per_class,
                ">= min_per_class",
            ));
        }
        Ok(())
    }
}
