//! Evaluation metrics for learned embeddings.
//!
//! Retrieval-style metrics computed directly over a labeled pairwise
//! distance matrix: Recall@K and mean average precision. Both treat every
//! item as a query against the rest of the batch, so no separate gallery
//! set is needed.

pub mod ranking;

pub use ranking::{mean_average_precision, recall_at_k};
