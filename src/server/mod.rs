//! HTTP service exposing the transcript pipeline.

use anyhow::{Context, Result};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;

use crate::config::ServerConfig;
use crate::metadata::Chapter;
use crate::transcribe::{TranscriptionPipeline, TranscriptionResult};
use crate::TranscriptorError;

const SERVICE_NAME: &str = "tubescribe";

/// Shared, immutable per-process state
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<TranscriptionPipeline>,
    pub request_timeout: Duration,
}

#[derive(Debug, Deserialize)]
pub struct TranscriptRequest {
    pub url: String,

    /// Look up title, duration and chapters (default true)
    #[serde(default = "default_include_metadata")]
    pub include_metadata: bool,
}

fn default_include_metadata() -> bool {
    true
}

#[derive(Debug, Serialize)]
pub struct TranscriptResponse {
    pub video_id: String,
    pub title: Option<String>,
    pub transcript: String,
    pub chapters: Vec<Chapter>,
    pub duration: Option<u64>,
    pub language_code: String,
    pub is_generated: bool,
    pub extracted_at: DateTime<Utc>,
}

impl From<TranscriptionResult> for TranscriptResponse {
    fn from(result: TranscriptionResult) -> Self {
        let title = result.title().map(str::to_string);
        let (chapters, duration) = match result.metadata {
            Some(metadata) => (metadata.chapters, metadata.duration),
            None => (Vec::new(), None),
        };

        Self {
            video_id: result.video_id.to_string(),
            title,
            transcript: result.transcript.into_string(),
            chapters,
            duration,
            language_code: result.language_code,
            is_generated: result.is_generated,
            extracted_at: result.extracted_at,
        }
    }
}

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: &'static str,
    pub detail: String,
}

impl ApiError {
    fn not_found(detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            error: "not_found",
            detail: detail.into(),
        }
    }

    fn invalid_request(rejection: JsonRejection) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error: "invalid_request",
            detail: rejection.body_text(),
        }
    }

    fn timeout(after: Duration) -> Self {
        Self {
            status: StatusCode::GATEWAY_TIMEOUT,
            error: "timeout",
            detail: format!("transcript extraction exceeded {}s", after.as_secs()),
        }
    }
}

impl From<TranscriptorError> for ApiError {
    fn from(err: TranscriptorError) -> Self {
        let status = match &err {
            TranscriptorError::InvalidUrl(_) => StatusCode::BAD_REQUEST,
            TranscriptorError::NoTranscriptAvailable(_) => StatusCode::NOT_FOUND,
            TranscriptorError::FetchFailed { .. } => StatusCode::BAD_GATEWAY,
        };

        Self {
            status,
            error: err.kind(),
            detail: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "error": self.error,
            "detail": self.detail,
            "timestamp": Utc::now().to_rfc3339(),
        });
        (self.status, Json(body)).into_response()
    }
}

type ApiResult<T> = std::result::Result<T, ApiError>;

/// Build the service router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/transcript", post(get_transcript))
        .route("/api/health", get(health_check))
        .fallback(not_found)
        .with_state(state)
}

/// Run the service until Ctrl+C
pub async fn serve(settings: &ServerConfig, pipeline: TranscriptionPipeline) -> Result<()> {
    let state = AppState {
        pipeline: Arc::new(pipeline),
        request_timeout: Duration::from_secs(settings.request_timeout_secs),
    };

    let addr: SocketAddr = format!("{}:{}", settings.host, settings.port)
        .parse()
        .with_context(|| format!("Invalid listen address {}:{}", settings.host, settings.port))?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("Listening on http://{}", addr);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = signal::ctrl_c().await {
        tracing::error!("Failed to install Ctrl+C handler: {}", err);
    }
}

async fn get_transcript(
    State(state): State<AppState>,
    payload: std::result::Result<Json<TranscriptRequest>, JsonRejection>,
) -> ApiResult<Json<TranscriptResponse>> {
    let Json(request) = payload.map_err(ApiError::invalid_request)?;
    tracing::info!("Transcript requested for {}", request.url);

    let work = state
        .pipeline
        .transcribe(&request.url, request.include_metadata);

    let result = match tokio::time::timeout(state.request_timeout, work).await {
        Ok(result) => result.map_err(|e| {
            tracing::warn!("Request for {} failed: {}", request.url, e);
            ApiError::from(e)
        })?,
        Err(_) => {
            tracing::warn!("Request for {} timed out", request.url);
            return Err(ApiError::timeout(state.request_timeout));
        }
    };

    Ok(Json(result.into()))
}

async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "service": SERVICE_NAME,
    }))
}

async fn not_found() -> ApiError {
    ApiError::not_found("endpoint not found")
}
