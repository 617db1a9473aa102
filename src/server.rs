//! HTTP front end for the converter.
//!
//! ## API Endpoints
//!
//! - `GET /health` - Server health check
//! - `POST /api/convert` - Body: extracted `conversations.json`.
//!   Response: the converted document as a JSON download.
//!   `?chronological=true` sorts each thread's messages by time.

use crate::config::{ServerConfig, DEFAULT_OUTPUT_FILE};
use crate::error::ConvertError;
use crate::export;
use crate::records::ConversionSummary;
use crate::transform::transform_with_config;
use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::{net::SocketAddr, sync::Arc, time::Instant};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

pub const THREAD_COUNT_HEADER: &str = "x-threadfold-threads";
pub const MESSAGE_COUNT_HEADER: &str = "x-threadfold-messages";

struct AppState {
    start_time: Instant,
    config: ServerConfig,
}

impl IntoResponse for ConvertError {
    fn into_response(self) -> Response {
        let status = if self.is_input_error() {
            warn!("Rejected export: {}", self);
            StatusCode::BAD_REQUEST
        } else {
            error!("Conversion failed: {}", self);
            StatusCode::INTERNAL_SERVER_ERROR
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// ============================================================================
// Health Endpoint
// ============================================================================

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    uptime_secs: u64,
    version: &'static str,
}

async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        uptime_secs: state.start_time.elapsed().as_secs(),
        version: env!("CARGO_PKG_VERSION"),
    })
}

// ============================================================================
// Convert Endpoint
// ============================================================================

#[derive(Deserialize, Default)]
struct ConvertQuery {
    #[serde(default)]
    chronological: Option<bool>,
}

async fn convert(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ConvertQuery>,
    body: Bytes,
) -> Result<Response, ConvertError> {
    let config = state.config.transform_config(query.chronological);

    // The transform is CPU-bound; keep it off the async workers
    let (document, summary) = tokio::task::spawn_blocking(move || -> Result<(String, ConversionSummary), ConvertError> {
        let conversations = export::parse_conversations(&body)?;
        info!("Converting {} conversations...", conversations.len());

        let result = transform_with_config(&conversations, &config)?;
        let summary = result.summary();
        Ok((result.to_pretty_json()?, summary))
    })
    .await
    .map_err(|e| ConvertError::Worker(e.to_string()))??;

    info!("Processed {} threads, {} messages", summary.threads, summary.messages);

    Ok((
        [
            (header::CONTENT_TYPE, "application/json".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", DEFAULT_OUTPUT_FILE),
            ),
            (header::HeaderName::from_static(THREAD_COUNT_HEADER), summary.threads.to_string()),
            (header::HeaderName::from_static(MESSAGE_COUNT_HEADER), summary.messages.to_string()),
        ],
        document,
    )
        .into_response())
}

pub fn router(config: ServerConfig) -> Router {
    let body_limit = config.body_limit_bytes;
    let state = Arc::new(AppState {
        start_time: Instant::now(),
        config,
    });

    Router::new()
        .route("/health", get(health))
        .route("/api/convert", post(convert))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and serve until the process is stopped
pub async fn serve(config: ServerConfig) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let app = router(config);

    info!("threadfold v{} listening on {}", env!("CARGO_PKG_VERSION"), addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await
}
