//! Error types shared across the heimdall services.
//!
//! Each layer owns a narrow error enum; [`Error`] wraps them for callers that
//! cross layers (bootstrap code, the CLI).

use thiserror::Error;

/// Result type alias for heimdall operations
pub type Result<T> = std::result::Result<T, Error>;

/// Crate-wide error type
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Anomaly model error
    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    /// Score normalization error
    #[error("Scoring error: {0}")]
    Scoring(#[from] ScoringError),

    /// Simulator error
    #[error("Simulator error: {0}")]
    Simulator(#[from] SimulatorError),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Errors raised while fitting, loading or evaluating an anomaly model
#[derive(Debug, Error)]
pub enum ModelError {
    /// Training data is unusable
    #[error("Invalid training data: {0}")]
    InvalidTrainingData(String),

    /// Feature vector has the wrong length
    #[error("Expected {expected} features, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Feature vector contains NaN or infinity
    #[error("Feature {index} is not a finite number")]
    NonFiniteFeature { index: usize },

    /// Serialized model is structurally invalid
    #[error("Corrupt model artifact: {0}")]
    Corrupt(String),

    /// Model artifact was written by an incompatible version
    #[error("Unsupported model format version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },

    /// I/O error while reading or writing an artifact
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Artifact (de)serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors raised by the score normalizer
#[derive(Debug, Error, PartialEq)]
pub enum ScoringError {
    /// Sharpness constant is unusable
    #[error("Sharpness must be a finite positive number, got {0}")]
    InvalidSharpness(f64),

    /// Raw score is NaN or infinite
    #[error("Anomaly score is not finite: {0}")]
    NonFiniteScore(f64),
}

/// Errors raised by the telemetry simulator
#[derive(Debug, Error)]
pub enum SimulatorError {
    /// Latched fault cannot be injected twice
    #[error("Fault already injected")]
    AlreadyInjected,

    /// Marker file could not be created or removed
    #[error("Fault marker error: {0}")]
    Marker(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_wrapping() {
        let err: Error = ModelError::DimensionMismatch {
            expected: 3,
            actual: 2,
        }
        .into();
        assert!(matches!(err, Error::Model(_)));
        assert_eq!(err.to_string(), "Model error: Expected 3 features, got 2");
    }

    #[test]
    fn test_scoring_error_message() {
        let err = ScoringError::InvalidSharpness(0.0);
        assert!(err.to_string().contains("finite positive"));
    }
}
