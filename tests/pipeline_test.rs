//! End-to-end: simulator -> monitor -> prediction API over real sockets

use axum::Router;
use heimdall::config::HeimdallConfig;
use heimdall::model::train_default_model;
use heimdall::monitor::{MonitorClient, MonitorError};
use heimdall::prediction::{self, PredictionService};
use heimdall::scoring::ScoreNormalizer;
use heimdall::simulator::{self, FaultMode, FaultSwitch, SimulatorState, VitalsGenerator};
use heimdall::AnomalyModel;
use reqwest::StatusCode;
use std::sync::Arc;
use tokio::net::TcpListener;

async fn spawn(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

async fn spawn_pipeline(model: Option<Arc<dyn AnomalyModel>>) -> (MonitorClient, String) {
    let simulator_url = spawn(simulator::router(Arc::new(SimulatorState::new(
        FaultSwitch::new(None),
        VitalsGenerator::seeded(5),
        FaultMode::Toggle,
    ))))
    .await;
    let prediction_url =
        spawn(prediction::router(PredictionService::new(model, ScoreNormalizer::default()))).await;

    let mut config = HeimdallConfig::default().monitor;
    config.simulator_url = simulator_url.clone();
    config.prediction_url = prediction_url;
    config.interval_secs = 1;
    config.alert_threshold = 0.5;

    (MonitorClient::new(config).unwrap(), simulator_url)
}

fn trained_model() -> Option<Arc<dyn AnomalyModel>> {
    Some(Arc::new(train_default_model(42).unwrap()))
}

#[tokio::test]
async fn test_fault_raises_failure_probability() {
    let (client, simulator_url) = spawn_pipeline(trained_model()).await;

    let before = client.poll_once().await.unwrap();
    assert!((0.0..=1.0).contains(&before.failure_probability));

    let response = reqwest::Client::new()
        .post(format!("{}/inject_fault", simulator_url))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let after = client.poll_once().await.unwrap();
    assert!(after.failure_probability > before.failure_probability);
    assert!(after.alert);
}

#[tokio::test]
async fn test_run_collects_requested_samples() {
    let (client, _) = spawn_pipeline(trained_model()).await;
    let summary = client.run(Some(2)).await;
    assert_eq!(summary.attempts, 2);
    assert_eq!(summary.successes, 2);
    assert_eq!(summary.failures, 0);
    assert!(summary.last.is_some());
}

#[tokio::test]
async fn test_run_survives_unreachable_simulator() {
    // Bind then drop a listener so the port refuses connections.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let refused = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let mut config = HeimdallConfig::default().monitor;
    config.simulator_url = refused.clone();
    config.prediction_url = refused;
    config.interval_secs = 1;
    config.timeout_secs = 1;
    let client = MonitorClient::new(config).unwrap();

    let summary = client.run(Some(3)).await;
    assert_eq!(summary.attempts, 3);
    assert_eq!(summary.failures, 3);
    assert_eq!(summary.successes, 0);
    assert!(summary.last.is_none());
}

#[tokio::test]
async fn test_unavailable_model_surfaces_status() {
    let (client, _) = spawn_pipeline(None).await;

    match client.poll_once().await {
        Err(MonitorError::Status {
            status, message, ..
        }) => {
            assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
            assert_eq!(message, "Model not available");
        }
        other => panic!("expected 503, got {:?}", other),
    }
}
