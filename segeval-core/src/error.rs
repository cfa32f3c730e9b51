//! Error types for segmentation comparison.
//!
//! Uses `thiserror` with structured variants. Contract violations on the inputs
//! (`LengthMismatch`, `InvalidLabel`) are reported before any aggregation work;
//! `NoOverlap` and `DegenerateLabeling` describe inputs for which the metrics are
//! mathematically undefined.

use std::fmt;

/// Which of the two compared label sequences an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    A,
    B,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::A => write!(f, "labels_a"),
            Side::B => write!(f, "labels_b"),
        }
    }
}

/// Top-level error type for metric computation.
#[derive(Debug, thiserror::Error)]
pub enum EvalError {
    #[error("{side} has {actual} elements, expected {expected}")]
    LengthMismatch {
        side: Side,
        expected: usize,
        actual: usize,
    },

    #[error(
        "Invalid label {value} at index {index} of {side}: labels must be non-negative and fit in u64"
    )]
    InvalidLabel {
        side: Side,
        index: usize,
        value: String,
    },

    #[error("No overlap: labels_a has no non-background positions")]
    NoOverlap,

    #[error(
        "Degenerate labeling: {labels_a} label(s) in labels_a and {labels_b} label(s) in labels_b leave all entropies at zero"
    )]
    DegenerateLabeling { labels_a: usize, labels_b: usize },

    #[error("Configuration error: {0}")]
    Config(#[from] Box<figment::Error>),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl EvalError {
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, EvalError>;
