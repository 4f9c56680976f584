//! Error types for the scoring crate.
//!
//! Scoring itself is infallible; the only thing that can go wrong is a
//! configuration that would make a factor's contribution meaningless.
//! Those are rejected when a scorer is built, never at scoring time.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// A core factor weight is negative, NaN or infinite
    #[error("Weight {name} must be finite and non-negative (got {value})")]
    InvalidWeight { name: &'static str, value: f64 },

    /// An optional factor was enabled with a weight that contributes nothing
    #[error("Optional weight {name} must be finite and positive when enabled (got {value}); leave it unset to disable the factor")]
    InvalidOptionalWeight { name: &'static str, value: f64 },

    /// A normalisation scale would divide by zero or flip sign
    #[error("Scale {name} must be finite and positive (got {value})")]
    InvalidScale { name: &'static str, value: f64 },

    /// Any other parameter outside its allowed range
    #[error("{name} is out of range: {reason}")]
    OutOfRange { name: &'static str, reason: String },
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, ConfigError>;
