//! Telemetry simulator service
//!
//! Serves one random astronaut reading per `GET /telemetry`. `POST
//! /inject_fault` switches readings from the healthy to the anomalous
//! family. All mutable state lives in [`SimulatorState`].

mod fault;
mod generator;

pub use fault::{FaultMode, FaultSwitch, FaultTransition};
pub use generator::{VitalRanges, VitalsGenerator};

use crate::config::SimulatorConfig;
use crate::error::SimulatorError;
use crate::server;
use crate::telemetry::TelemetryReading;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;

/// Process-scoped simulator state shared by all handlers
#[derive(Debug)]
pub struct SimulatorState {
    pub fault: FaultSwitch,
    pub generator: VitalsGenerator,
    pub mode: FaultMode,
}

impl SimulatorState {
    pub fn new(fault: FaultSwitch, generator: VitalsGenerator, mode: FaultMode) -> Self {
        Self {
            fault,
            generator,
            mode,
        }
    }

    pub fn from_config(config: &SimulatorConfig) -> Self {
        let generator = match config.seed {
            Some(seed) => VitalsGenerator::seeded(seed),
            None => VitalsGenerator::new(),
        };
        Self::new(
            FaultSwitch::new(config.fault_marker.clone()),
            generator,
            config.fault_mode,
        )
    }

    /// Next reading for the current fault state
    pub fn reading(&self) -> TelemetryReading {
        self.generator.next(self.fault.is_active())
    }
}

/// Fault command response
#[derive(Debug, Serialize)]
pub struct FaultResponse {
    pub fault_active: bool,
    pub message: String,
}

impl IntoResponse for SimulatorError {
    fn into_response(self) -> Response {
        let status = match &self {
            SimulatorError::AlreadyInjected => StatusCode::BAD_REQUEST,
            SimulatorError::Marker(e) => {
                tracing::error!(error = %e, "failed to update fault marker");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        let message = match &self {
            SimulatorError::AlreadyInjected => self.to_string(),
            SimulatorError::Marker(_) => "Could not update fault state".to_string(),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Build the simulator router
pub fn router(state: Arc<SimulatorState>) -> Router {
    let routes = Router::new()
        .route("/telemetry", get(get_telemetry))
        .route("/inject_fault", post(inject_fault))
        .route("/health", get(health))
        .with_state(state);

    server::with_common_layers(routes)
}

/// Bind and serve the simulator until shutdown is signalled
pub async fn serve(config: &SimulatorConfig) -> crate::Result<()> {
    let state = Arc::new(SimulatorState::from_config(config));
    tracing::info!(
        mode = ?state.mode,
        marker = ?state.fault.marker(),
        "telemetry simulator ready"
    );
    server::serve(&config.bind_addr(), router(state), "telemetry simulator").await
}

/// GET /telemetry
async fn get_telemetry(State(state): State<Arc<SimulatorState>>) -> Json<TelemetryReading> {
    let reading = state.reading();
    tracing::debug!(?reading, "telemetry generated");
    Json(reading)
}

/// POST /inject_fault
async fn inject_fault(
    State(state): State<Arc<SimulatorState>>,
) -> Result<Json<FaultResponse>, SimulatorError> {
    let transition = state.fault.inject(state.mode).inspect_err(|e| {
        tracing::warn!(error = %e, "fault injection rejected");
    })?;

    let message = match transition {
        FaultTransition::Injected => {
            tracing::warn!("fault injected, simulating anomalous vitals");
            "Fault injected"
        }
        FaultTransition::Cleared => {
            tracing::info!("fault cleared, simulating healthy vitals");
            "Fault cleared"
        }
    };

    Ok(Json(FaultResponse {
        fault_active: transition.is_active(),
        message: message.to_string(),
    }))
}

/// GET /health
async fn health(State(state): State<Arc<SimulatorState>>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "fault_active": state.fault.is_active(),
    }))
}
