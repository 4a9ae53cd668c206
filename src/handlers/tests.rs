//! # Tests for Handlers
//!
//! Unit tests for handlers and helpers that need no running database.

use std::sync::Arc;

use crate::config::AppConfig;
use crate::db::init_pool;
use crate::handlers::{health, providers};
use crate::models::ServiceInfo;
use crate::server::AppState;
use axum::extract::State;
use axum::response::Json;
use serde_json::Value;

async fn test_state() -> AppState {
    let config = AppConfig {
        profile: "test".to_string(),
        database_url: "sqlite::memory:".to_string(),
        ..Default::default()
    };
    let db = init_pool(&config).await.expect("Failed to init test DB");
    AppState {
        config: Arc::new(config),
        db,
    }
}

#[tokio::test]
async fn test_health_returns_expected_service_info() {
    let state = test_state().await;

    let Json(service_info) = health(State(state)).await.expect("healthy database");

    assert_eq!(service_info.service, "providers");
    assert_eq!(service_info.version, "0.1.0");
}

#[tokio::test]
async fn test_health_returns_valid_json() {
    let state = test_state().await;

    let Json(service_info) = health(State(state)).await.expect("healthy database");

    let json_value: Value =
        serde_json::to_value(&service_info).expect("Failed to serialize ServiceInfo");

    assert_eq!(
        json_value.get("service").unwrap().as_str().unwrap(),
        "providers"
    );
    assert_eq!(
        json_value.get("version").unwrap().as_str().unwrap(),
        "0.1.0"
    );
}

#[test]
fn test_service_info_default() {
    let service_info = ServiceInfo::default();

    assert_eq!(service_info.service, "providers");
    assert_eq!(service_info.version, "0.1.0");
}

#[test]
fn test_email_validation_accepts_plausible_addresses() {
    for email in [
        "a@acme.com",
        "reservas@costabrava.example",
        "user.name+tag@sub.domain.net",
        "x@y.co",
    ] {
        assert!(providers::is_valid_email(email), "expected valid: {}", email);
    }
}

#[test]
fn test_email_validation_rejects_malformed_addresses() {
    for email in [
        "",
        "no-at-sign",
        "@missing-local.com",
        "missing-domain@",
        "two@@ats.com",
        "spaces in@local.com",
        "nodot@domain",
        "empty@parts..com",
        "trailing@dot.",
    ] {
        assert!(
            !providers::is_valid_email(email),
            "expected invalid: {}",
            email
        );
    }
}
