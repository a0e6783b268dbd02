//! Error types for the anima core library.

use thiserror::Error;

/// Top-level error type for all affect-model operations.
#[derive(Error, Debug)]
pub enum AffectError {
    /// A scalar fell outside its declared range and could not be repaired.
    #[error("Value out of range for {field}: {value} (expected {min}..={max})")]
    OutOfRange {
        /// Which field was invalid.
        field: String,
        /// The offending value.
        value: f32,
        /// Lower bound of the declared range.
        min: f32,
        /// Upper bound of the declared range.
        max: f32,
    },

    /// Serialization or deserialization failure.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience Result type alias.
pub type Result<T> = std::result::Result<T, AffectError>;
