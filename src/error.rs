//! Error types for terna operations.
//!
//! Malformed input (mismatched label counts, non-square distance matrices,
//! out-of-range triplet indices) is always a hard error. An *empty* mining
//! result is not: it is reported through
//! [`crate::mining::TripletSelection::is_empty`] so callers can skip the
//! batch and move on.

use std::fmt;

/// Main error type for terna operations.
///
/// # Examples
///
/// ```
/// use terna::error::TernaError;
///
/// let err = TernaError::DimensionMismatch {
///     expected: "6x6 distance matrix".to_string(),
///     actual: "6x5".to_string(),
/// };
/// assert!(err.to_string().contains("dimension mismatch"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TernaError {
    /// Input dimensions don't match what the operation requires.
    DimensionMismatch {
        /// Expected dimensions description
        expected: String,
        /// Actual dimensions found
        actual: String,
    },

    /// Invalid hyperparameter value provided.
    InvalidHyperparameter {
        /// Parameter name
        param: String,
        /// Provided value
        value: String,
        /// Constraint description
        constraint: String,
    },

    /// Selection-policy name could not be parsed.
    UnknownPolicy {
        /// The unrecognized policy string
        value: String,
    },

    /// Distance-metric name could not be parsed.
    UnknownMetric {
        /// The unrecognized metric string
        value: String,
    },

    /// The configured policy needs pairwise distances, but only labels were
    /// provided.
    MissingDistances {
        /// Name of the policy that required distances
        policy: String,
    },

    /// Generic error with string message.
    Other(String),
}

impl fmt::Display for TernaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TernaError::DimensionMismatch { expected, actual } => {
                write!(f, "dimension mismatch: expected {expected}, got {actual}")
            }
            TernaError::InvalidHyperparameter {
                param,
                value,
                constraint,
            } => {
                write!(
                    f,
                    "Invalid hyperparameter: {param} = {value}, expected {constraint}"
                )
            }
            TernaError::UnknownPolicy { value } => {
                write!(
                    f,
                    "Unknown selection policy '{value}': expected \"facenet\", \"semihard\", or \"random\""
                )
            }
            TernaError::UnknownMetric { value } => {
                write!(
                    f,
                    "Unknown distance metric '{value}': expected \"squaredeuclidean\" or \"euclidean\""
                )
            }
            TernaError::MissingDistances { policy } => {
                write!(
                    f,
                    "Selection policy '{policy}' requires embeddings or a precomputed distance matrix"
                )
            }
            TernaError::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for TernaError {}

impl From<&str> for TernaError {
    fn from(msg: &str) -> Self {
        TernaError::Other(msg.to_string())
    }
}

impl From<String> for TernaError {
    fn from(msg: String) -> Self {
        TernaError::Other(msg)
    }
}

impl TernaError {
    /// Create a dimension mismatch error with descriptive context
    #[must_use]
    pub fn dimension_mismatch(context: &str, expected: usize, actual: usize) -> Self {
        Self::DimensionMismatch {
            expected: format!("{context}={expected}"),
            actual: format!("{actual}"),
        }
    }

    /// Create an index out of bounds error
    #[must_use]
    pub fn index_out_of_bounds(index: usize, len: usize) -> Self {
        Self::Other(format!("index {index} out of bounds (len={len})"))
    }

    /// Create an invalid hyperparameter error from a displayable value
    #[must_use]
    pub fn invalid_hyperparameter(param: &str, value: impl fmt::Display, constraint: &str) -> Self {
        Self::InvalidHyperparameter {
            param: param.to_string(),
            value: value.to_string(),
            constraint: constraint.to_string(),
        }
    }
}

#[allow(clippy::cmp_owned)]
impl PartialEq<&str> for TernaError {
    fn eq(&self, other: &&str) -> bool {
        self.to_string() == *other
    }
}

#[allow(clippy::cmp_owned)]
impl PartialEq<TernaError> for &str {
    fn eq(&self, other: &TernaError) -> bool {
        *self == other.to_string()
    }
}

/// Convenience type alias for Results.
pub type Result<T> = std::result::Result<T, TernaError>;
