use crate::scoring::{ScoreNormalizer, DEFAULT_SHARPNESS};
use crate::simulator::FaultMode;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default bind host for both services (all interfaces)
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default prediction API port
pub const DEFAULT_PREDICTION_PORT: u16 = 5002;

/// Default simulator port
pub const DEFAULT_SIMULATOR_PORT: u16 = 5001;

/// Main application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeimdallConfig {
    /// Prediction API configuration
    pub prediction: PredictionConfig,

    /// Telemetry simulator configuration
    pub simulator: SimulatorConfig,

    /// Monitor loop configuration
    pub monitor: MonitorConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Prediction API settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionConfig {
    /// Bind host
    pub host: String,

    /// Bind port
    pub port: u16,

    /// Path of the JSON model artifact
    pub model_path: PathBuf,

    /// Sigmoid sharpness applied to anomaly scores
    pub sharpness: f64,
}

/// Telemetry simulator settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulatorConfig {
    /// Bind host
    pub host: String,

    /// Bind port
    pub port: u16,

    /// Behaviour of repeated fault injections
    pub fault_mode: FaultMode,

    /// Optional marker file mirroring the fault flag
    pub fault_marker: Option<PathBuf>,

    /// Optional RNG seed for reproducible readings
    pub seed: Option<u64>,
}

/// Monitor loop settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Base URL of the telemetry simulator
    pub simulator_url: String,

    /// Base URL of the prediction API
    pub prediction_url: String,

    /// Seconds between polls
    pub interval_secs: u64,

    /// Probability at or above which an alert is logged
    pub alert_threshold: f64,

    /// HTTP request timeout in seconds
    pub timeout_secs: u64,
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level or `EnvFilter` directive
    pub level: String,

    /// Emit JSON lines instead of human-readable output
    pub json: bool,

    /// Directory for daily-rolling log files; console only when unset
    pub log_dir: Option<PathBuf>,
}

impl Default for HeimdallConfig {
    fn default() -> Self {
        Self {
            prediction: PredictionConfig {
                host: DEFAULT_HOST.to_string(),
                port: DEFAULT_PREDICTION_PORT,
                model_path: PathBuf::from("model.json"),
                sharpness: DEFAULT_SHARPNESS,
            },
            simulator: SimulatorConfig {
                host: DEFAULT_HOST.to_string(),
                port: DEFAULT_SIMULATOR_PORT,
                fault_mode: FaultMode::Toggle,
                fault_marker: None,
                seed: None,
            },
            monitor: MonitorConfig {
                simulator_url: format!("http://127.0.0.1:{}", DEFAULT_SIMULATOR_PORT),
                prediction_url: format!("http://127.0.0.1:{}", DEFAULT_PREDICTION_PORT),
                interval_secs: 2,
                alert_threshold: 0.7,
                timeout_secs: 5,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                json: false,
                log_dir: None,
            },
        }
    }
}

impl HeimdallConfig {
    /// Reject settings that would only fail later at request time
    pub fn validate(&self) -> crate::Result<()> {
        ScoreNormalizer::new(self.prediction.sharpness)
            .map_err(|e| crate::Error::Config(format!("prediction.sharpness: {}", e)))?;

        if !(0.0..=1.0).contains(&self.monitor.alert_threshold) {
            return Err(crate::Error::Config(format!(
                "monitor.alert_threshold must lie in [0, 1], got {}",
                self.monitor.alert_threshold
            )));
        }
        if self.monitor.interval_secs == 0 {
            return Err(crate::Error::Config(
                "monitor.interval_secs must be positive".to_string(),
            ));
        }
        if self.monitor.timeout_secs == 0 {
            return Err(crate::Error::Config(
                "monitor.timeout_secs must be positive".to_string(),
            ));
        }

        Ok(())
    }
}

impl PredictionConfig {
    /// `host:port` string accepted by `TcpListener::bind`
    pub fn bind_addr(&self) -> String {
        format_bind_addr(&self.host, self.port)
    }
}

impl SimulatorConfig {
    pub fn bind_addr(&self) -> String {
        format_bind_addr(&self.host, self.port)
    }
}

fn format_bind_addr(host: &str, port: u16) -> String {
    // Bare IPv6 literals need brackets before the port is appended.
    if host.contains(':') && !host.starts_with('[') {
        format!("[{}]:{}", host, port)
    } else {
        format!("{}:{}", host, port)
    }
}
