use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

use crate::{api, config::Config, state::AppState};

fn setup_app() -> (axum::Router, Arc<AppState>) {
    let state = Arc::new(AppState::new(&Config::from_env()));
    let app = api::routes().with_state(state.clone());
    (app, state)
}

async fn read_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("parse json")
}

#[tokio::test]
async fn health_returns_ok() {
    let (app, _state) = setup_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn status_starts_unsuspended() {
    let (app, _state) = setup_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/v1/status")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = read_json(response).await;
    assert_eq!(body["suspended"], Value::Bool(false));
    assert_eq!(body["resuming_in"], Value::String("0s".to_string()));
    assert_eq!(body["monitor"]["resume_in_ms"], serde_json::json!(0));
}

#[tokio::test]
async fn status_reflects_recorded_failures() {
    let (app, state) = setup_app();

    state.record_use();
    state.monitor().record_http();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/v1/status")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = read_json(response).await;
    assert_eq!(body["suspended"], Value::Bool(true));
    assert_eq!(body["uses"], serde_json::json!(1));
    assert_eq!(body["monitor"]["http"]["last_minute"], serde_json::json!(1));
    assert!(body["monitor"]["resume_in_ms"].as_u64().unwrap() > 0);
}
