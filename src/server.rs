//! server
//!
//! HTTP endpoint layer.
//!
//! # Routes
//!
//! - `POST /comment`: accept a comment and publish it
//! - `GET /healthz`: liveness probe
//!
//! # Responses
//!
//! The comment endpoint translates the publish outcome into a small JSON
//! envelope: `200 {"status":"success"}` on success,
//! `409 {"error":"Comment already exists."}` for duplicates,
//! `422 {"error":...}` for invalid payloads, and
//! `500 {"error":"Failed to create comment."}` for everything else.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use tokio::net::TcpListener;
use uuid::Uuid;

use crate::core::comment::Comment;
use crate::core::config::Settings;
use crate::forge::{Forge, PublishError};
use crate::publish::publish_comment;

/// Shared state for request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Loaded configuration, immutable for the process lifetime.
    pub settings: Arc<Settings>,
    /// Forge backend the comments are published to.
    pub forge: Arc<dyn Forge>,
}

/// Build the application router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/comment", post(comment_handler))
        .route("/healthz", get(healthz_handler))
        .with_state(state)
}

/// Run the HTTP server on the given listener until shutdown.
///
/// Shuts down gracefully on SIGTERM or SIGINT, draining in-flight
/// requests first.
pub async fn serve(listener: TcpListener, state: AppState) -> std::io::Result<()> {
    let app = build_router(state);
    axum::serve(listener, app)
        .with_graceful_shutdown(wait_for_shutdown_signal())
        .await
}

async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = signal(SignalKind::terminate()).expect("register SIGTERM");
        let mut sigint = signal(SignalKind::interrupt()).expect("register SIGINT");
        tokio::select! {
            _ = sigterm.recv() => {}
            _ = sigint.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

async fn healthz_handler() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

async fn comment_handler(
    State(state): State<AppState>,
    payload: Result<Json<Comment>, JsonRejection>,
) -> Response {
    let request_id = Uuid::new_v4();

    // Deserialization routes through Comment's validation, so a rejection
    // covers malformed JSON and constraint violations alike.
    let comment = match payload {
        Ok(Json(comment)) => comment,
        Err(rejection) => {
            let message = rejection.body_text();
            tracing::debug!(%request_id, error = %message, "rejected comment payload");
            return (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({ "error": message })),
            )
                .into_response();
        }
    };

    tracing::info!(
        %request_id,
        author = comment.author(),
        page_id = comment.page_id(),
        "comment received"
    );

    match publish_comment(&state.settings, state.forge.as_ref(), &comment).await {
        Ok(()) => (StatusCode::OK, Json(json!({ "status": "success" }))).into_response(),
        Err(PublishError::DuplicateDocument(path)) => {
            tracing::info!(%request_id, path = %path, "duplicate comment rejected");
            (
                StatusCode::CONFLICT,
                Json(json!({ "error": "Comment already exists." })),
            )
                .into_response()
        }
        Err(err) => {
            tracing::error!(%request_id, error = %err, "failed to publish comment");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to create comment." })),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::ForgeConfig;
    use crate::forge::mock::{FailOn, MockForge};
    use crate::forge::ForgeError;
    use chrono::{Duration, Utc};
    use serde_json::Value;

    fn settings(content_dir: &str) -> Settings {
        Settings {
            content_dir: content_dir.to_string(),
            comments_dir: "comments".to_string(),
            git_push: true,
            target_branch: "main".to_string(),
            log_level: "info".to_string(),
            bind_addr: "127.0.0.1:0".to_string(),
            forge: ForgeConfig {
                kind: "gitlab".to_string(),
                auth_token: "glpat-test".to_string(),
                project_id: 42,
                base_url: "https://gitlab.example.com".to_string(),
            },
        }
    }

    /// Spawn the app on an ephemeral port and return its base URL.
    ///
    /// The TempDir must stay alive for the duration of the test.
    async fn spawn_app(forge: MockForge) -> (String, tempfile::TempDir) {
        let tmp = tempfile::tempdir().unwrap();
        let state = AppState {
            settings: Arc::new(settings(tmp.path().to_str().unwrap())),
            forge: Arc::new(forge),
        };
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = build_router(state);
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{addr}"), tmp)
    }

    fn valid_body() -> Value {
        json!({
            "author": "Jane Doe",
            "message": "Nice post!",
            "archetype": "reader",
            "page_id": "hello-world",
        })
    }

    #[tokio::test]
    async fn healthz_responds_ok() {
        let (base, _tmp) = spawn_app(MockForge::new()).await;

        let response = reqwest::get(format!("{base}/healthz")).await.unwrap();
        assert_eq!(response.status(), 200);
    }

    #[tokio::test]
    async fn valid_comment_returns_success_envelope() {
        let forge = MockForge::new();
        let (base, _tmp) = spawn_app(forge.clone()).await;

        let response = reqwest::Client::new()
            .post(format!("{base}/comment"))
            .json(&valid_body())
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), 200);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body, json!({ "status": "success" }));
        assert_eq!(forge.files().len(), 1);
    }

    #[tokio::test]
    async fn duplicate_comment_returns_conflict() {
        // Seed the document at every path the server could stamp within the
        // next minute, so the existence check reports a duplicate no matter
        // which second the request lands on.
        let tmp = tempfile::tempdir().unwrap();
        let content_dir = tmp.path().to_str().unwrap().to_string();
        let mut forge = MockForge::new();
        let now = Utc::now();
        for offset in -1..=60 {
            let stamp = (now + Duration::seconds(offset)).format("%Y%m%d%H%M%S");
            forge = forge.with_existing_file(
                "main",
                format!("{content_dir}/reader/hello-world/comments/{stamp}_Jane_Doe.md"),
            );
        }

        let state = AppState {
            settings: Arc::new(settings(&content_dir)),
            forge: Arc::new(forge.clone()),
        };
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = build_router(state);
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let response = reqwest::Client::new()
            .post(format!("http://{addr}/comment"))
            .json(&valid_body())
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), 409);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body, json!({ "error": "Comment already exists." }));
        // The duplicate was detected before any push.
        assert!(forge
            .operations()
            .iter()
            .all(|op| !matches!(op, crate::forge::mock::MockOperation::PushFile { .. })));
    }

    #[tokio::test]
    async fn forge_failure_returns_internal_error() {
        let forge = MockForge::new().fail_on(FailOn::PushFile(ForgeError::ApiError {
            status: 500,
            message: "boom".to_string(),
        }));
        let (base, _tmp) = spawn_app(forge).await;

        let response = reqwest::Client::new()
            .post(format!("{base}/comment"))
            .json(&valid_body())
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), 500);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body, json!({ "error": "Failed to create comment." }));
    }

    #[tokio::test]
    async fn invalid_comment_returns_unprocessable() {
        let (base, _tmp) = spawn_app(MockForge::new()).await;

        let response = reqwest::Client::new()
            .post(format!("{base}/comment"))
            .json(&json!({
                "author": "",
                "message": "Nice post!",
                "page_id": "hello-world",
            }))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), 422);
        let body: Value = response.json().await.unwrap();
        assert!(body.get("error").is_some());
    }

    #[tokio::test]
    async fn malformed_json_returns_unprocessable() {
        let (base, _tmp) = spawn_app(MockForge::new()).await;

        let response = reqwest::Client::new()
            .post(format!("{base}/comment"))
            .header("content-type", "application/json")
            .body("{not json")
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), 422);
    }
}
