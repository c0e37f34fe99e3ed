//! Core compute primitives (Vector, Matrix).
//!
//! Row-major storage throughout; embedding batches are `Matrix<f32>` with one
//! row per item, and pairwise distances are square `Matrix<f32>`.

mod matrix;
mod vector;

pub use matrix::Matrix;
pub use vector::Vector;
