//! Convenience re-exports for common usage.
//!
//! # Usage
//!
//! ```
//! use terna::prelude::*;
//! ```

pub use crate::primitives::{Matrix, Vector};
pub use crate::error::{Result, TernaError};
pub use crate::distance::{pairwise_distances, Metric};
pub use crate::mining::{NegativeDraws, SelectionPolicy, TripletMiner, TripletSelection};
pub use crate::sampler::BalancedBatchSampler;
pub use crate::loss::{lifted_struct_loss, mean_triplet_loss, triplet_loss};
pub use crate::metrics::{mean_average_precision, recall_at_k};
