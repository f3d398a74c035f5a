//! Integration tests for the HTTP backend against a stub server.

use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, patch};
use axum::{Json, Router};
use client::{ApiError, BackendApi, HttpBackend};
use serde_json::{Value, json};

#[derive(Clone, Default)]
struct Captured {
    personal_access_bodies: Arc<Mutex<Vec<Value>>>,
}

async fn households_handler() -> Json<Value> {
    Json(json!([
        {
            "id": "h1",
            "name": "Personal",
            "role": "OWNER",
            "createdAt": "2024-01-01T00:00:00Z"
        },
        {},
        {"id": ""},
        {
            "id": "h2",
            "name": "Flat",
            "role": "EDITOR",
            "createdAt": "2024-03-01T00:00:00Z",
            "joinedAt": "2024-03-02T00:00:00Z"
        }
    ]))
}

async fn forbidden_handler() -> (StatusCode, Json<Value>) {
    (
        StatusCode::FORBIDDEN,
        Json(json!({"error": "not a member of this household"})),
    )
}

async fn personal_access_handler(
    State(captured): State<Captured>,
    Json(body): Json<Value>,
) -> StatusCode {
    captured.personal_access_bodies.lock().unwrap().push(body);
    StatusCode::NO_CONTENT
}

async fn spawn_server(captured: Captured) -> String {
    let app = Router::new()
        .route("/households", get(households_handler))
        .route("/households/:id/members", get(forbidden_handler))
        .route(
            "/households/:id/members/me/personal-account-access",
            patch(personal_access_handler),
        )
        .with_state(captured);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn households_discards_malformed_rows_over_http() {
    let base = spawn_server(Captured::default()).await;
    let backend = HttpBackend::new(base, None).unwrap();

    let households = backend.households().await.unwrap();
    let ids: Vec<_> = households.iter().map(|h| h.id.as_str()).collect();
    assert_eq!(ids, vec!["h1", "h2"]);
}

#[tokio::test]
async fn forbidden_surfaces_backend_message() {
    let base = spawn_server(Captured::default()).await;
    let backend = HttpBackend::new(base, None).unwrap();

    let err = backend.household_members("h9").await.unwrap_err();
    match err {
        ApiError::Status { status, message } => {
            assert_eq!(status, 403);
            assert_eq!(message, "not a member of this household");
        }
        other => panic!("expected status error, got {other:?}"),
    }
    assert!(!ApiError::Status {
        status: 403,
        message: String::new()
    }
    .is_transient());
}

#[tokio::test]
async fn posture_patch_sends_wire_shape() {
    let captured = Captured::default();
    let base = spawn_server(captured.clone()).await;
    let backend = HttpBackend::new(base, None).unwrap();

    backend
        .set_personal_account_access("h1", true)
        .await
        .unwrap();

    let bodies = captured.personal_access_bodies.lock().unwrap();
    assert_eq!(bodies.as_slice(), &[json!({"allowPersonalAccountAccess": true})]);
}

#[tokio::test]
async fn connection_refused_is_a_transient_network_error() {
    // Bind-then-drop to get a port nothing listens on.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let backend = HttpBackend::new(format!("http://{addr}"), None).unwrap();
    let err = backend.households().await.unwrap_err();
    assert!(matches!(err, ApiError::Network(_)));
    assert!(err.is_transient());
}
