//! Precondition violations at the case-analysis layer.
//!
//! The engines themselves never fail; degenerate input degrades to empty or
//! zero output. These errors cover caller mistakes only.

use crate::types::ObjectId;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum AnalysisError {
    #[error("interpolation step must be positive and finite, got {0}")]
    InvalidStep(f64),

    #[error("footage duration must be non-negative and finite, got {0}")]
    InvalidDuration(f64),

    #[error("{duration}s at step {step}s exceeds the dense sample limit")]
    GridTooLong { duration: f64, step: f64 },

    #[error("profiles of {a} and {b} are not on the same time grid")]
    MisalignedProfiles { a: ObjectId, b: ObjectId },
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
