use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Body returned for every unexpected failure
pub const GENERIC_ERROR_MESSAGE: &str = "Could not process request";

/// Failures of a `/predict` request
#[derive(Debug, Error)]
pub enum PredictError {
    /// Body is not a JSON object
    #[error("Request body must be a JSON object: {0}")]
    MalformedBody(String),

    /// Body could not be read, e.g. it exceeds the size limit
    #[error("Request body rejected: {reason}")]
    BodyRejected { status: StatusCode, reason: String },

    /// Required telemetry fields are absent
    #[error("Missing required telemetry data: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    /// A telemetry field is present but not a number
    #[error("Field '{field}' must be a number")]
    InvalidField { field: &'static str },

    /// No model was loaded at startup
    #[error("Model not available")]
    ModelUnavailable,

    /// Inference or normalization failed
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PredictError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            PredictError::MalformedBody(_)
            | PredictError::MissingFields(_)
            | PredictError::InvalidField { .. } => StatusCode::BAD_REQUEST,
            PredictError::BodyRejected { status, .. } => *status,
            PredictError::ModelUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            PredictError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for PredictError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match &self {
            PredictError::Internal(detail) => {
                tracing::error!(detail = %detail, "prediction failed");
                GENERIC_ERROR_MESSAGE.to_string()
            }
            other => {
                tracing::warn!(status = status.as_u16(), error = %other, "prediction request rejected");
                other.to_string()
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            PredictError::MissingFields(vec!["heart_rate"]).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            PredictError::InvalidField { field: "heart_rate" }.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            PredictError::BodyRejected {
                status: StatusCode::PAYLOAD_TOO_LARGE,
                reason: "length limit exceeded".into(),
            }
            .status_code(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(
            PredictError::ModelUnavailable.status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            PredictError::Internal("boom".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_missing_fields_message_lists_all() {
        let err = PredictError::MissingFields(vec!["oxygen_level", "temperature"]);
        assert_eq!(
            err.to_string(),
            "Missing required telemetry data: oxygen_level, temperature"
        );
    }
}
