use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use anyhow::{anyhow, Result};
use log::{error, info};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

use crate::client::CompletionBackend;
use crate::config::Config;
use crate::ics::{ARTIFACT_FILE_NAME, ARTIFACT_MIME_TYPE};
use crate::pipeline;
use crate::recover::RecoverError;

// API state shared across handlers
pub struct ApiState {
    pub config: Config,
    pub backend: Arc<dyn CompletionBackend>,
}

#[derive(Debug, Deserialize)]
pub struct ExtractRequest {
    pub text: String,
}

#[derive(Serialize)]
pub struct ExtractedFields {
    pub title: String,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub location: String,
    pub description: String,
}

#[derive(Serialize)]
pub struct ExtractResponse {
    pub success: bool,
    pub message: String,
    pub event: Option<ExtractedFields>,
}

// General API response
#[derive(Serialize)]
pub struct ApiResponse {
    pub success: bool,
    pub message: String,
}

fn error_status(err: &anyhow::Error) -> StatusCode {
    if err.downcast_ref::<RecoverError>().is_some() {
        StatusCode::UNPROCESSABLE_ENTITY
    } else {
        StatusCode::BAD_GATEWAY
    }
}

// Extract fields from a notice without producing the artifact
async fn extract_handler(
    State(state): State<Arc<ApiState>>,
    Json(request): Json<ExtractRequest>,
) -> Result<Json<ExtractResponse>, (StatusCode, Json<ExtractResponse>)> {
    match pipeline::run(state.backend.as_ref(), &state.config, &request.text).await {
        Ok(output) => {
            let event = output.event;
            Ok(Json(ExtractResponse {
                success: true,
                message: "Event extracted successfully".to_string(),
                event: Some(ExtractedFields {
                    title: event.name,
                    start_time: event.begin.as_ref().map(|t| t.to_string()),
                    end_time: event.end.as_ref().map(|t| t.to_string()),
                    location: event.location,
                    description: event.description,
                }),
            }))
        }
        Err(e) => {
            error!("Extraction failed: {:?}", e);
            Err((
                error_status(&e),
                Json(ExtractResponse {
                    success: false,
                    message: format!("Extraction failed: {:#}", e),
                    event: None,
                }),
            ))
        }
    }
}

// Run the pipeline and return the calendar artifact as a download
async fn calendar_handler(
    State(state): State<Arc<ApiState>>,
    Json(request): Json<ExtractRequest>,
) -> Result<impl IntoResponse, (StatusCode, Json<ApiResponse>)> {
    match pipeline::run(state.backend.as_ref(), &state.config, &request.text).await {
        Ok(output) => {
            let headers = [
                (header::CONTENT_TYPE, format!("{}; charset=utf-8", ARTIFACT_MIME_TYPE)),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", ARTIFACT_FILE_NAME),
                ),
            ];
            Ok((headers, output.ics))
        }
        Err(e) => {
            error!("Failed to produce calendar file: {:?}", e);
            Err((
                error_status(&e),
                Json(ApiResponse {
                    success: false,
                    message: format!("Failed to produce calendar file: {:#}", e),
                }),
            ))
        }
    }
}

// Health check endpoint
async fn health_check() -> &'static str {
    "SmartCal API is running"
}

// Create and start the API server
pub async fn start_api_server(config: Config, backend: Arc<dyn CompletionBackend>) -> Result<()> {
    let bind = config.server.bind.clone();
    let state = Arc::new(ApiState { config, backend });

    // Configure CORS
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);

    // Build our application with routes
    let app = Router::new()
        .route("/health", get(health_check))
        .route("/api/extract", post(extract_handler))
        .route("/api/calendar", post(calendar_handler))
        .layer(cors)
        .with_state(state);

    let addr: SocketAddr =
        bind.parse().map_err(|e| anyhow!("Invalid server bind address '{}': {}", bind, e))?;
    info!("API server starting on http://{}", addr);

    let listener =
        TcpListener::bind(addr).await.map_err(|e| anyhow!("Failed to bind to address: {}", e))?;

    info!("API server successfully bound to {}. Waiting for connections...", addr);

    axum::serve(listener, app).await.map_err(|e| anyhow!("Failed to start API server: {}", e))?;

    Ok(())
}
