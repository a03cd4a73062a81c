//! HTTP routes for the analysis service

use axum::{
    extract::{rejection::JsonRejection, DefaultBodyLimit, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tracing::{debug, warn};

use crate::analysis::{AnalysisError, AnalysisService};

/// Shared state for request handlers
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<AnalysisService>,
}

/// Request body of `POST /api/analyze`
#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub transcript: Option<String>,
}

/// Build the router with CORS and a request body cap.
pub fn router(service: Arc<AnalysisService>, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/api/analyze", post(analyze))
        .route("/health", get(health))
        .with_state(AppState { service })
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}

async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "healthy": true,
        "provider": state.service.provider_name(),
        "version": crate::VERSION,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

async fn analyze(
    State(state): State<AppState>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Response {
    let transcript = match payload {
        Ok(Json(request)) => request.transcript.unwrap_or_default(),
        Err(rejection) if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            return rejection.into_response();
        }
        Err(rejection) => {
            debug!("Rejected analyze body: {}", rejection);
            String::new()
        }
    };

    match state.service.analyze(&transcript).await {
        Ok(outcome) => {
            let status = if outcome.is_success() {
                StatusCode::OK
            } else {
                StatusCode::INTERNAL_SERVER_ERROR
            };
            (status, Json(outcome.to_body())).into_response()
        }
        Err(AnalysisError::EmptyTranscript) => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": AnalysisError::EmptyTranscript.to_string() })),
        )
            .into_response(),
        Err(other) => {
            warn!("Unexpected analysis error: {}", other);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": other.to_string() })),
            )
                .into_response()
        }
    }
}
