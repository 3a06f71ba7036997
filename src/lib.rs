//! # heimdall
//!
//! Astronaut vital-sign telemetry pipeline: a simulator serving random
//! readings, an isolation-forest anomaly model, and a prediction API that
//! turns the model's anomaly score into a failure probability.

pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod monitor;
pub mod prediction;
pub mod scoring;
pub mod server;
pub mod simulator;
pub mod telemetry;

pub use error::{Error, Result};
pub use model::{AnomalyModel, IsolationForest};
pub use prediction::PredictionService;
pub use scoring::ScoreNormalizer;
pub use telemetry::TelemetryReading;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = Error::Config("test".to_string());
        assert!(err.to_string().contains("test"));
    }
}
