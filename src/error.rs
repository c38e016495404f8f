//! Error types for the economics engine
//!
//! `DomainError` covers non-physical or malformed inputs and always names the
//! offending field. Metrics that simply have no value under the current inputs
//! (payback on an unprofitable plant, for instance) are not errors; see
//! [`crate::economics::Metric`].

use thiserror::Error;

/// Invalid or non-physical input. Aborts the evaluation it was raised from.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DomainError {
    #[error("{field} must be a finite number (got {value})")]
    NonFinite { field: &'static str, value: f64 },

    #[error("{field} must not be negative (got {value})")]
    Negative { field: &'static str, value: f64 },

    #[error("{field} must be greater than zero (got {value})")]
    NonPositive { field: &'static str, value: f64 },

    #[error("{field} must lie within [{min}, {max}] (got {value})")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("sweep range must satisfy start < stop with finite bounds (got {start}..{stop})")]
    InvalidSweepRange { start: f64, stop: f64 },

    #[error("sweep needs at least 2 samples (got {requested})")]
    TooFewSamples { requested: usize },

    #[error("sweep requested {requested} samples, limit is {max}")]
    TooManySamples { requested: usize, max: usize },

    #[error("{field} cannot be swept: {reason}")]
    InvalidOverride {
        field: &'static str,
        reason: &'static str,
    },
}

impl DomainError {
    /// Name of the input that caused the error
    pub fn field(&self) -> &'static str {
        match self {
            DomainError::NonFinite { field, .. }
            | DomainError::Negative { field, .. }
            | DomainError::NonPositive { field, .. }
            | DomainError::OutOfRange { field, .. }
            | DomainError::InvalidOverride { field, .. } => field,
            DomainError::InvalidSweepRange { .. } => "sweep_range",
            DomainError::TooFewSamples { .. } | DomainError::TooManySamples { .. } => "sample_count",
        }
    }
}

/// Errors raised while reading scenario files
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("row {row}: {source}")]
    InvalidRow {
        row: usize,
        #[source]
        source: DomainError,
    },
}

pub(crate) fn require_finite(field: &'static str, value: f64) -> Result<f64, DomainError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(DomainError::NonFinite { field, value })
    }
}

pub(crate) fn require_non_negative(field: &'static str, value: f64) -> Result<f64, DomainError> {
    require_finite(field, value)?;
    if value < 0.0 {
        return Err(DomainError::Negative { field, value });
    }
    Ok(value)
}

pub(crate) fn require_positive(field: &'static str, value: f64) -> Result<f64, DomainError> {
    require_finite(field, value)?;
    if value <= 0.0 {
        return Err(DomainError::NonPositive { field, value });
    }
    Ok(value)
}
