//! # HTTP Server
//!
//! JSON endpoints a host UI calls outside normal graph execution.
//!
//! | Route | Body | Effect |
//! |-------|------|--------|
//! | `POST /api/graph_plotter/reset` | `node_id` | clears one plotter's series |
//! | `POST /api/graph_plotter/save_image` | `image_data`, `save_path` | writes a base64 image |
//! | `POST /api/story_driver/reset` | `project_name`, `randomize_seed` | rewinds a project |
//! | `POST /api/nodes/execute` | node request | runs a node |
//!
//! Handlers share the process-wide [`NodeRuntime`], so a reset and a node run
//! see the same tables.

use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;

use crate::node::{NodeRequest, NodeResponse, NodeRuntime};
use crate::storage::DEFAULT_PROJECT;

type ApiResponse = (StatusCode, Json<Value>);

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("Invalid base64 image data: {0}")]
    Decode(#[from] base64::DecodeError),

    #[error("Image data URL has no ',' before the payload")]
    MissingPayload,

    #[error("{0}")]
    Io(#[from] std::io::Error),
}

fn failure(status: StatusCode, message: impl Into<String>) -> ApiResponse {
    (status, Json(json!({"success": false, "error": message.into()})))
}

fn bad_body(rejection: JsonRejection) -> ApiResponse {
    tracing::debug!(error = %rejection, "Rejected request body");
    failure(StatusCode::BAD_REQUEST, rejection.body_text())
}

/// Accepts node ids sent as strings or numbers
fn id_string(value: Option<Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.is_empty() => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[derive(Debug, Deserialize)]
struct GraphResetBody {
    #[serde(default)]
    node_id: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct SaveImageBody {
    #[serde(default)]
    image_data: Option<String>,
    #[serde(default)]
    save_path: Option<String>,
}

fn default_project() -> String {
    DEFAULT_PROJECT.to_string()
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize)]
struct StoryResetBody {
    #[serde(default = "default_project")]
    project_name: String,
    #[serde(default = "default_true")]
    randomize_seed: bool,
}

async fn reset_graph(
    State(runtime): State<Arc<NodeRuntime>>,
    body: Result<Json<GraphResetBody>, JsonRejection>,
) -> ApiResponse {
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => return bad_body(rejection),
    };
    let Some(node_id) = id_string(body.node_id) else {
        return failure(StatusCode::BAD_REQUEST, "node_id is required");
    };

    runtime.points().reset(&node_id);
    (
        StatusCode::OK,
        Json(json!({"success": true, "node_id": node_id, "message": "Graph data reset"})),
    )
}

/// Decodes a base64 image, with or without a `data:image/...;base64,` prefix
pub fn decode_image(image_data: &str) -> Result<Vec<u8>, ImageError> {
    let payload = if image_data.starts_with("data:image") {
        image_data
            .split_once(',')
            .map(|(_, data)| data)
            .ok_or(ImageError::MissingPayload)?
    } else {
        image_data
    };
    Ok(STANDARD.decode(payload.trim())?)
}

/// Writes image bytes to `path`, replacing any existing file
pub fn save_image(image_data: &str, path: &Path) -> Result<(), ImageError> {
    let bytes = decode_image(image_data)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, bytes)?;
    Ok(())
}

async fn save_graph_image(body: Result<Json<SaveImageBody>, JsonRejection>) -> ApiResponse {
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => return bad_body(rejection),
    };
    let (Some(image_data), Some(save_path)) = (
        body.image_data.filter(|s| !s.is_empty()),
        body.save_path.filter(|s| !s.is_empty()),
    ) else {
        return failure(StatusCode::BAD_REQUEST, "image_data and save_path are required");
    };

    match save_image(&image_data, &PathBuf::from(&save_path)) {
        Ok(()) => {
            tracing::info!(path = %save_path, "Graph image saved");
            (StatusCode::OK, Json(json!({"success": true, "path": save_path})))
        }
        Err(e) => {
            tracing::warn!(path = %save_path, error = %e, "Failed to save graph image");
            failure(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

async fn reset_story(
    State(runtime): State<Arc<NodeRuntime>>,
    body: Result<Json<StoryResetBody>, JsonRejection>,
) -> ApiResponse {
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => return bad_body(rejection),
    };

    let state = runtime.projects().reset(&body.project_name, body.randomize_seed);
    (
        StatusCode::OK,
        Json(json!({
            "success": true,
            "project_name": body.project_name,
            "step": state.step,
            "seed": state.seed,
        })),
    )
}

async fn execute_node(
    State(runtime): State<Arc<NodeRuntime>>,
    body: Result<Json<NodeRequest>, JsonRejection>,
) -> (StatusCode, Json<NodeResponse>) {
    match body {
        Ok(Json(request)) => (StatusCode::OK, Json(runtime.execute(&request))),
        Err(rejection) => (
            StatusCode::BAD_REQUEST,
            Json(NodeResponse::error(rejection.body_text())),
        ),
    }
}

/// Builds the router over a shared runtime
pub fn router(runtime: Arc<NodeRuntime>) -> Router {
    Router::new()
        .route("/api/graph_plotter/reset", post(reset_graph))
        .route("/api/graph_plotter/save_image", post(save_graph_image))
        .route("/api/story_driver/reset", post(reset_story))
        .route("/api/nodes/execute", post(execute_node))
        .with_state(runtime)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Could not listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}

/// Serves until Ctrl-C
pub async fn serve(runtime: Arc<NodeRuntime>, addr: SocketAddr) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(addr = %listener.local_addr()?, "Listening");

    axum::serve(listener, router(runtime))
        .with_graceful_shutdown(shutdown_signal())
        .await
}
