//! Terna: Online triplet mining for metric learning in pure Rust.
//!
//! Terna selects training triplets (anchor, positive, negative) from a
//! labeled batch of embeddings, with a focus on semi-hard negative
//! mining, deterministic seeding, and ergonomic APIs.
//!
//! # Quick Start
//!
//! ```
//! use terna::prelude::*;
//!
//! // Two tight clusters of three points each.
//! let labels = vec![0, 0, 0, 1, 1, 1];
//! let x = Matrix::from_vec(6, 2, vec![
//!     0.00, 0.0,
//!     0.01, 0.0,
//!     0.02, 0.0,
//!     0.40, 0.0,
//!     0.41, 0.0,
//!     0.42, 0.0,
//! ]).unwrap();
//!
//! // Mine four semi-hard triplets with a fixed seed.
//! let miner = TripletMiner::new(4).with_random_state(7);
//! let selection = miner.select_from_embeddings(&x, &labels).unwrap();
//! assert_eq!(selection.num_triplets(), 4);
//!
//! // Anchor and positive share a label; the negative does not.
//! for (a, p, n) in selection.triplets() {
//!     assert_eq!(labels[a], labels[p]);
//!     assert_ne!(labels[a], labels[n]);
//! }
//! ```
//!
//! # Modules
//!
//! - [`primitives`]: Core Vector and Matrix types
//! - [`distance`]: Pairwise distance computation (squared Euclidean, Euclidean)
//! - [`mining`]: Triplet selection policies (semi-hard, random)
//! - [`sampler`]: Class-balanced batch sampling
//! - [`loss`]: Triplet and lifted structured losses
//! - [`metrics`]: Retrieval metrics (Recall@K, mean average precision)

pub mod distance;
pub mod error;
pub mod loss;
pub mod metrics;
/// Online triplet selection with semi-hard negative mining.
pub mod mining;
pub mod prelude;
pub mod primitives;
pub mod sampler;

pub use error::{Result, TernaError};
pub use mining::{TripletMiner, TripletSelection};
pub use primitives::{Matrix, Vector};
