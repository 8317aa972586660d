//! Error types for model construction, inference and training.

use thiserror::Error;

/// Failure modes of the HMM engine.
///
/// Every operation validates its input before doing any work, so an error
/// never leaves a model partially updated.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum HmmError {
    /// Dimension mismatch, negative or non-finite probability, a row or column
    /// that does not sum to one, or an observation symbol outside the alphabet.
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),

    /// An observation sequence (or the list of training sequences) was empty.
    #[error("observation sequence is empty")]
    EmptySequence,

    /// A non-finite value survived the log-space arithmetic. This points at
    /// pathological input, e.g. training on a sequence the model assigns zero
    /// probability to.
    #[error("numeric instability: {0}")]
    NumericInstability(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, HmmError>;
