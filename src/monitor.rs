//! Console monitor
//!
//! Pulls readings from the simulator, forwards them to the prediction API and
//! logs the resulting failure probability.

use crate::config::MonitorConfig;
use crate::prediction::PredictionResponse;
use crate::telemetry::TelemetryReading;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use thiserror::Error;
use tracing::{error, info, warn};

/// Monitor failures
#[derive(Debug, Error)]
pub enum MonitorError {
    /// Network or decoding error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Upstream answered with a non-success status
    #[error("{service} returned {status}: {message}")]
    Status {
        service: &'static str,
        status: StatusCode,
        message: String,
    },
}

/// One telemetry-to-prediction round trip
#[derive(Debug, Clone, PartialEq)]
pub struct MonitorSample {
    pub reading: TelemetryReading,
    pub failure_probability: f64,
    pub alert: bool,
}

/// Counters accumulated by [`MonitorClient::run`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MonitorSummary {
    pub attempts: u64,
    pub successes: u64,
    pub failures: u64,
    pub alerts: u64,
    /// Most recent successful sample
    pub last: Option<MonitorSample>,
}

/// HTTP client for the simulator and the prediction API
#[derive(Debug, Clone)]
pub struct MonitorClient {
    client: Client,
    config: MonitorConfig,
}

impl MonitorClient {
    pub fn new(config: MonitorConfig) -> Result<Self, MonitorError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { client, config })
    }

    /// GET /telemetry from the simulator
    pub async fn fetch_telemetry(&self) -> Result<TelemetryReading, MonitorError> {
        let url = join(&self.config.simulator_url, "telemetry");
        let response = self.client.get(url).send().await?;
        let response = check_status("simulator", response).await?;
        Ok(response.json().await?)
    }

    /// POST a reading to /predict
    pub async fn request_prediction(
        &self,
        reading: &TelemetryReading,
    ) -> Result<f64, MonitorError> {
        let url = join(&self.config.prediction_url, "predict");
        let response = self.client.post(url).json(reading).send().await?;
        let response = check_status("prediction API", response).await?;
        let body: PredictionResponse = response.json().await?;
        Ok(body.failure_probability)
    }

    /// Fetch one reading and score it
    pub async fn poll_once(&self) -> Result<MonitorSample, MonitorError> {
        let reading = self.fetch_telemetry().await?;
        let failure_probability = self.request_prediction(&reading).await?;

        Ok(MonitorSample {
            reading,
            failure_probability,
            alert: failure_probability >= self.config.alert_threshold,
        })
    }

    /// Poll until `iterations` samples were attempted, or forever when `None`.
    ///
    /// Failed polls are logged and do not stop the loop. Only counters and
    /// the latest sample are kept, so an unbounded run holds constant memory.
    pub async fn run(&self, iterations: Option<u64>) -> MonitorSummary {
        let mut interval = tokio::time::interval(Duration::from_secs(self.config.interval_secs));
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        let mut summary = MonitorSummary::default();

        info!(
            simulator = %self.config.simulator_url,
            prediction = %self.config.prediction_url,
            "monitor started"
        );

        while iterations.map_or(true, |limit| summary.attempts < limit) {
            interval.tick().await;
            summary.attempts += 1;

            match self.poll_once().await {
                Ok(sample) => {
                    let r = &sample.reading;
                    if sample.alert {
                        warn!(
                            heart_rate = r.heart_rate,
                            oxygen_level = r.oxygen_level,
                            temperature = r.temperature,
                            failure_probability = sample.failure_probability,
                            "failure risk above threshold"
                        );
                    } else {
                        info!(
                            heart_rate = r.heart_rate,
                            oxygen_level = r.oxygen_level,
                            temperature = r.temperature,
                            failure_probability = sample.failure_probability,
                            "vitals nominal"
                        );
                    }
                    summary.successes += 1;
                    if sample.alert {
                        summary.alerts += 1;
                    }
                    summary.last = Some(sample);
                }
                Err(e) => {
                    summary.failures += 1;
                    error!(error = %e, attempt = summary.attempts, "monitor poll failed");
                }
            }
        }

        summary
    }
}

fn join(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path)
}

async fn check_status(
    service: &'static str,
    response: reqwest::Response,
) -> Result<reqwest::Response, MonitorError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<serde_json::Value>(&text)
        .ok()
        .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_string))
        .unwrap_or(text);

    Err(MonitorError::Status {
        service,
        status,
        message,
    })
}
