//! Integration tests for the HTTP surface: health checks and the
//! ingestion happy path, against an in-memory core.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    routing::{get, post},
    Router,
};
use compliance_core::config::EngineConfig;
use compliance_core::repository::memory::MemoryRepository;
use compliance_core::stream::NullSink;
use compliance_server::{handlers, AppState};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

fn test_config() -> EngineConfig {
    EngineConfig {
        database_url: "memory".to_string(),
        active_rules_cache_ttl: Duration::from_secs(60),
        list_facts_cache_ttl: Duration::from_secs(30),
        behavioral_lookback_days: 30,
        cold_start_threshold: 5,
        max_inheritance_depth: 10,
        evaluation_deadline: Duration::from_secs(2),
        otel_enabled: false,
    }
}

fn test_app() -> Router {
    let uow: Arc<dyn compliance_core::repository::traits::UnitOfWork> = Arc::new(MemoryRepository::default());
    let stream: Arc<dyn compliance_core::stream::StreamSink> = Arc::new(NullSink);
    let state = AppState::new(uow, stream, test_config());

    Router::new()
        .route("/v1/organizations/:org/transactions", post(handlers::ingest_transaction))
        .route("/v1/organizations/:org/templates", get(handlers::list_templates).post(handlers::create_template))
        .route("/health/live", get(handlers::health_live))
        .route("/health/ready", get(handlers::health_ready))
        .with_state(state)
}

#[tokio::test]
async fn health_live_reports_healthy() {
    let app = test_app();
    let response = app
        .oneshot(Request::builder().uri("/health/live").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn health_ready_reports_healthy_against_a_reachable_store() {
    let app = test_app();
    let response = app
        .oneshot(Request::builder().uri("/health/ready").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn create_template_then_list_returns_it() {
    let app = test_app();
    let org = compliance_core::types::OrganizationId::new();

    let create = Request::builder()
        .method("POST")
        .uri(format!("/v1/organizations/{org}/templates"))
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&serde_json::json!({"name": "velocity"})).unwrap()))
        .unwrap();
    let response = app.clone().oneshot(create).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let list = Request::builder().uri(format!("/v1/organizations/{org}/templates")).body(Body::empty()).unwrap();
    let response = app.oneshot(list).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let templates: Vec<serde_json::Value> = serde_json::from_slice(&body).unwrap();
    assert_eq!(templates.len(), 1);
    assert_eq!(templates[0]["name"], "velocity");
}
