//! Prediction API
//!
//! `POST /predict` scores one telemetry reading with the loaded
//! [`AnomalyModel`] and returns the normalized failure probability.

mod error;
mod validation;

pub use error::{PredictError, GENERIC_ERROR_MESSAGE};
pub use validation::parse_telemetry;

use crate::config::PredictionConfig;
use crate::model::{self, AnomalyModel};
use crate::scoring::ScoreNormalizer;
use crate::server;
use crate::telemetry::TelemetryReading;
use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, DefaultBodyLimit, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

/// Largest accepted `/predict` body; a reading is well under 1 KiB
pub const MAX_BODY_BYTES: usize = 16 * 1024;

/// Successful `/predict` response
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub failure_probability: f64,
}

/// Loaded model plus scoring policy, shared read-only by every request
#[derive(Clone)]
pub struct PredictionService {
    model: Option<Arc<dyn AnomalyModel>>,
    normalizer: ScoreNormalizer,
}

impl PredictionService {
    pub fn new(model: Option<Arc<dyn AnomalyModel>>, normalizer: ScoreNormalizer) -> Self {
        Self { model, normalizer }
    }

    /// Build from configuration; a missing or broken artifact leaves the
    /// service running without a model
    pub fn from_config(config: &PredictionConfig) -> crate::Result<Self> {
        let normalizer = ScoreNormalizer::new(config.sharpness)?;
        let model = model::try_load_model(&config.model_path);
        if model.is_none() {
            tracing::warn!("prediction API starting without a model; /predict will answer 503");
        }
        Ok(Self::new(model, normalizer))
    }

    pub fn model_loaded(&self) -> bool {
        self.model.is_some()
    }

    pub fn normalizer(&self) -> &ScoreNormalizer {
        &self.normalizer
    }

    fn model(&self) -> Result<&Arc<dyn AnomalyModel>, PredictError> {
        self.model.as_ref().ok_or(PredictError::ModelUnavailable)
    }

    /// Score a reading and convert it to a failure probability
    pub fn predict(&self, reading: &TelemetryReading) -> Result<f64, PredictError> {
        let model = self.model()?;

        let score = model
            .anomaly_score(&reading.features())
            .map_err(|e| PredictError::Internal(format!("{} scoring failed: {}", model.name(), e)))?;
        let probability = self
            .normalizer
            .normalize(score)
            .map_err(|e| PredictError::Internal(e.to_string()))?;

        tracing::debug!(score, probability, "reading scored");
        Ok(probability)
    }
}

impl std::fmt::Debug for PredictionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PredictionService")
            .field("model", &self.model.as_ref().map(|m| m.name().to_string()))
            .field("normalizer", &self.normalizer)
            .finish()
    }
}

/// Build the prediction router
pub fn router(service: PredictionService) -> Router {
    let routes = Router::new()
        .route("/predict", post(predict))
        .route("/health", get(health))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(Arc::new(service));

    server::with_common_layers(routes)
}

/// Load the model, bind and serve until shutdown is signalled
pub async fn serve(config: &PredictionConfig) -> crate::Result<()> {
    let service = PredictionService::from_config(config)?;
    tracing::info!(
        model_loaded = service.model_loaded(),
        sharpness = service.normalizer().sharpness(),
        "prediction API ready"
    );
    server::serve(&config.bind_addr(), router(service), "prediction API").await
}

/// POST /predict
///
/// The body is taken raw, rejection included, so that every failure uses the
/// `{"error": ...}` shape and model availability is checked before any parsing.
async fn predict(
    State(service): State<Arc<PredictionService>>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<PredictionResponse>, PredictError> {
    service.model()?;

    let body = body.map_err(|rejection| PredictError::BodyRejected {
        status: rejection.status(),
        reason: rejection.body_text(),
    })?;
    let reading = parse_telemetry(&body)?;
    let failure_probability = service.predict(&reading)?;

    tracing::info!(
        heart_rate = reading.heart_rate,
        oxygen_level = reading.oxygen_level,
        temperature = reading.temperature,
        failure_probability,
        "prediction served"
    );

    Ok(Json(PredictionResponse {
        failure_probability,
    }))
}

/// GET /health
async fn health(State(service): State<Arc<PredictionService>>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "model_loaded": service.model_loaded(),
    }))
}
