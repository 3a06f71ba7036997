//! Request body validation for `/predict`

use super::error::PredictError;
use crate::telemetry::{TelemetryReading, FEATURE_COUNT, FEATURE_NAMES};
use serde_json::{Map, Value};

/// Parse a raw `/predict` body into a reading.
///
/// Missing fields are reported before type errors, so a body that is both
/// incomplete and mistyped yields the missing-field error. `null` counts as
/// missing. Extra fields are ignored.
pub fn parse_telemetry(body: &[u8]) -> Result<TelemetryReading, PredictError> {
    let value: Value =
        serde_json::from_slice(body).map_err(|e| PredictError::MalformedBody(e.to_string()))?;
    let object = value
        .as_object()
        .ok_or_else(|| PredictError::MalformedBody(format!("expected an object, got {}", kind(&value))))?;

    validate_object(object)
}

fn validate_object(object: &Map<String, Value>) -> Result<TelemetryReading, PredictError> {
    let missing: Vec<&'static str> = FEATURE_NAMES
        .iter()
        .copied()
        .filter(|name| object.get(*name).map_or(true, Value::is_null))
        .collect();
    if !missing.is_empty() {
        return Err(PredictError::MissingFields(missing));
    }

    let mut features = [0.0; FEATURE_COUNT];
    for (slot, name) in features.iter_mut().zip(FEATURE_NAMES) {
        *slot = object
            .get(name)
            .and_then(Value::as_f64)
            .ok_or(PredictError::InvalidField { field: name })?;
    }

    let [heart_rate, oxygen_level, temperature] = features;
    Ok(TelemetryReading::new(heart_rate, oxygen_level, temperature))
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: Value) -> Result<TelemetryReading, PredictError> {
        parse_telemetry(&serde_json::to_vec(&value).unwrap())
    }

    #[test]
    fn test_valid_body() {
        let reading = parse(json!({
            "heart_rate": 75,
            "oxygen_level": 98.5,
            "temperature": 37.0,
            "astronaut_id": "a1b2c3d4"
        }))
        .unwrap();
        assert_eq!(reading.features(), [75.0, 98.5, 37.0]);
    }

    #[test]
    fn test_missing_field_named() {
        let err = parse(json!({ "heart_rate": 75, "temperature": 37.0 })).unwrap_err();
        match err {
            PredictError::MissingFields(fields) => assert_eq!(fields, vec!["oxygen_level"]),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_all_missing_in_order() {
        let err = parse(json!({})).unwrap_err();
        assert!(matches!(
            err,
            PredictError::MissingFields(ref f) if f == &["heart_rate", "oxygen_level", "temperature"]
        ));
    }

    #[test]
    fn test_null_counts_as_missing() {
        let err = parse(json!({
            "heart_rate": null,
            "oxygen_level": 98.5,
            "temperature": 37.0
        }))
        .unwrap_err();
        assert!(matches!(err, PredictError::MissingFields(_)));
    }

    #[test]
    fn test_non_numeric_field() {
        let err = parse(json!({
            "heart_rate": "abc",
            "oxygen_level": 98.5,
            "temperature": 37.0
        }))
        .unwrap_err();
        assert!(matches!(
            err,
            PredictError::InvalidField {
                field: "heart_rate"
            }
        ));
    }

    #[test]
    fn test_missing_reported_before_invalid() {
        let err = parse(json!({ "heart_rate": "abc", "temperature": 37.0 })).unwrap_err();
        assert!(matches!(err, PredictError::MissingFields(_)));
    }

    #[test]
    fn test_boolean_is_not_numeric() {
        let err = parse(json!({
            "heart_rate": 80,
            "oxygen_level": true,
            "temperature": 37.0
        }))
        .unwrap_err();
        assert!(matches!(
            err,
            PredictError::InvalidField {
                field: "oxygen_level"
            }
        ));
    }

    #[test]
    fn test_malformed_bodies() {
        assert!(matches!(
            parse_telemetry(b"{not json"),
            Err(PredictError::MalformedBody(_))
        ));
        assert!(matches!(
            parse_telemetry(b""),
            Err(PredictError::MalformedBody(_))
        ));
        assert!(matches!(
            parse(json!([75, 98.5, 37.0])),
            Err(PredictError::MalformedBody(_))
        ));
    }
}
