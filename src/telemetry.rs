//! Telemetry reading shared by the simulator, the prediction API and the monitor.

use serde::{Deserialize, Serialize};

/// Number of model features carried by a reading
pub const FEATURE_COUNT: usize = 3;

/// Feature names in model input order
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = ["heart_rate", "oxygen_level", "temperature"];

/// One astronaut vital-sign sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TelemetryReading {
    /// Beats per minute
    pub heart_rate: f64,
    /// Blood oxygen saturation (%)
    pub oxygen_level: f64,
    /// Body temperature (°C)
    pub temperature: f64,
    /// Unix timestamp (seconds) stamped by the simulator
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

impl TelemetryReading {
    pub fn new(heart_rate: f64, oxygen_level: f64, temperature: f64) -> Self {
        Self {
            heart_rate,
            oxygen_level,
            temperature,
            timestamp: None,
        }
    }

    /// Attach a timestamp
    pub fn with_timestamp(mut self, timestamp: i64) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Model input vector, ordered as [`FEATURE_NAMES`]
    pub fn features(&self) -> [f64; FEATURE_COUNT] {
        [self.heart_rate, self.oxygen_level, self.temperature]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_order() {
        let reading = TelemetryReading::new(75.0, 98.5, 37.0);
        assert_eq!(reading.features(), [75.0, 98.5, 37.0]);
    }

    #[test]
    fn test_timestamp_omitted_when_absent() {
        let json = serde_json::to_value(TelemetryReading::new(75.0, 98.5, 37.0)).unwrap();
        assert!(json.get("timestamp").is_none());

        let json = serde_json::to_value(TelemetryReading::new(75.0, 98.5, 37.0).with_timestamp(10))
            .unwrap();
        assert_eq!(json["timestamp"], 10);
    }
}
