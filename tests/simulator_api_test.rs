use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use heimdall::simulator::{
    self, FaultMode, FaultSwitch, SimulatorState, VitalRanges, VitalsGenerator,
};
use heimdall::TelemetryReading;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

fn app(mode: FaultMode) -> Router {
    simulator::router(Arc::new(SimulatorState::new(
        FaultSwitch::new(None),
        VitalsGenerator::seeded(11),
        mode,
    )))
}

async fn call(app: &Router, method: &str, uri: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn telemetry(app: &Router) -> TelemetryReading {
    let (status, body) = call(app, "GET", "/telemetry").await;
    assert_eq!(status, StatusCode::OK);
    serde_json::from_value(body).unwrap()
}

#[tokio::test]
async fn test_telemetry_has_expected_fields() {
    let app = app(FaultMode::Toggle);
    let (status, body) = call(&app, "GET", "/telemetry").await;

    assert_eq!(status, StatusCode::OK);
    for field in ["heart_rate", "oxygen_level", "temperature", "timestamp"] {
        assert!(body[field].is_number(), "missing {}", field);
    }
}

#[tokio::test]
async fn test_fault_injection_switches_distribution() {
    let app = app(FaultMode::Latch);
    let healthy = VitalRanges::healthy();
    let anomalous = VitalRanges::anomalous();

    for _ in 0..20 {
        assert!(healthy.contains(&telemetry(&app).await));
    }

    let (status, body) = call(&app, "POST", "/inject_fault").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["fault_active"], true);

    for _ in 0..20 {
        let reading = telemetry(&app).await;
        assert!(anomalous.contains(&reading), "{:?}", reading);
    }
}

#[tokio::test]
async fn test_latch_mode_rejects_reinjection() {
    let app = app(FaultMode::Latch);

    let (status, _) = call(&app, "POST", "/inject_fault").await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = call(&app, "POST", "/inject_fault").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Fault already injected");

    assert!(VitalRanges::anomalous().contains(&telemetry(&app).await));
}

#[tokio::test]
async fn test_toggle_mode_restores_healthy_readings() {
    let app = app(FaultMode::Toggle);

    let (_, body) = call(&app, "POST", "/inject_fault").await;
    assert_eq!(body["fault_active"], true);
    assert!(VitalRanges::anomalous().contains(&telemetry(&app).await));

    let (status, body) = call(&app, "POST", "/inject_fault").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["fault_active"], false);
    assert!(VitalRanges::healthy().contains(&telemetry(&app).await));
}

#[tokio::test]
async fn test_marker_file_activates_fault() {
    let dir = tempfile::tempdir().unwrap();
    let marker = dir.path().join("fault");
    let app = simulator::router(Arc::new(SimulatorState::new(
        FaultSwitch::new(Some(marker.clone())),
        VitalsGenerator::seeded(3),
        FaultMode::Latch,
    )));

    assert!(VitalRanges::healthy().contains(&telemetry(&app).await));

    std::fs::write(&marker, b"").unwrap();
    assert!(VitalRanges::anomalous().contains(&telemetry(&app).await));

    let (_, body) = call(&app, "GET", "/health").await;
    assert_eq!(body["fault_active"], true);
}

#[tokio::test]
async fn test_unwritable_marker_keeps_readings_healthy() {
    let dir = tempfile::tempdir().unwrap();
    let marker = dir.path().join("missing-dir").join("fault");
    let app = simulator::router(Arc::new(SimulatorState::new(
        FaultSwitch::new(Some(marker)),
        VitalsGenerator::seeded(4),
        FaultMode::Toggle,
    )));

    let (status, body) = call(&app, "POST", "/inject_fault").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Could not update fault state");

    assert!(VitalRanges::healthy().contains(&telemetry(&app).await));
    let (_, body) = call(&app, "GET", "/health").await;
    assert_eq!(body["fault_active"], false);
}

#[tokio::test]
async fn test_get_inject_fault_not_allowed() {
    let app = app(FaultMode::Toggle);
    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/inject_fault")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}
