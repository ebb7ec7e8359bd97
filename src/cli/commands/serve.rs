//! HTTP API server exposing the RAG pipeline.
//!
//! Two logical operations: diagnose an image and answer an auto-generated
//! follow-up question, or answer an arbitrary free-text question. Both call
//! `RagPipeline::answer`; typed pipeline errors are translated into generic
//! failure responses here.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::rag::RagPipeline;
use crate::vision::{RemoteVisionClassifier, VisionClassifier};
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::error;

/// Shared application state.
///
/// The pipeline is initialized once before the listener starts accepting
/// traffic and is read-only afterwards; request handlers share it freely.
struct AppState {
    pipeline: RagPipeline,
    vision: Option<Arc<dyn VisionClassifier>>,
}

/// Run the HTTP API server.
pub async fn run_serve(host: &str, port: u16, settings: Settings) -> anyhow::Result<()> {
    if let Err(e) = preflight::check(Operation::Serve, &settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'daun doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    // Refuse to serve at all if the pipeline cannot become ready.
    let pipeline = RagPipeline::initialize(&settings)?;

    let vision: Option<Arc<dyn VisionClassifier>> = match &settings.vision.endpoint {
        Some(endpoint) => Some(Arc::new(RemoteVisionClassifier::new(endpoint)?)),
        None => None,
    };
    if vision.is_none() {
        Output::warning("No vision endpoint configured; /api/diagnose is disabled.");
    }

    let state = Arc::new(AppState { pipeline, vision });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/health", get(health))
        .route("/api/chat", post(chat))
        .route("/api/diagnose", post(diagnose))
        .layer(cors)
        .with_state(state);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("Daun API Server");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Health", "GET  /health");
    Output::kv("Chat", "POST /api/chat");
    Output::kv("Diagnose", "POST /api/diagnose (raw image bytes)");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, app).await?;

    Ok(())
}

// === Request/Response Types ===

#[derive(Deserialize)]
struct ChatRequest {
    question: String,
}

#[derive(Serialize)]
struct ChatData {
    answer: String,
}

#[derive(Serialize)]
struct DiagnoseData {
    disease_name: String,
    confidence: f32,
    initial_response: String,
}

#[derive(Serialize)]
struct ApiResponse<T: Serialize> {
    status: &'static str,
    data: T,
}

#[derive(Serialize)]
struct ApiError {
    status: &'static str,
    message: String,
}

fn api_error(status: StatusCode, message: &str) -> axum::response::Response {
    (
        status,
        Json(ApiError {
            status: "error",
            message: message.to_string(),
        }),
    )
        .into_response()
}

// === Handlers ===

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn chat(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ChatRequest>,
) -> impl IntoResponse {
    if req.question.trim().is_empty() {
        return api_error(StatusCode::BAD_REQUEST, "Question is missing.");
    }

    match state.pipeline.answer(&req.question).await {
        Ok(answer) => Json(ApiResponse {
            status: "success",
            data: ChatData { answer },
        })
        .into_response(),
        Err(e) => {
            error!("chat failed: {}", e);
            api_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to get a response.")
        }
    }
}

async fn diagnose(State(state): State<Arc<AppState>>, image: Bytes) -> impl IntoResponse {
    let Some(vision) = &state.vision else {
        return api_error(
            StatusCode::SERVICE_UNAVAILABLE,
            "Image diagnosis is not configured.",
        );
    };

    if image.is_empty() {
        return api_error(StatusCode::BAD_REQUEST, "No image provided.");
    }

    let diagnosis = match vision.classify(&image).await {
        Ok(d) => d,
        Err(e) => {
            error!("classification failed: {}", e);
            return api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to process the image.",
            );
        }
    };

    let question = state.pipeline.diagnosis_question(&diagnosis.label);
    match state.pipeline.answer(&question).await {
        Ok(answer) => Json(ApiResponse {
            status: "success",
            data: DiagnoseData {
                disease_name: diagnosis.label,
                confidence: diagnosis.confidence,
                initial_response: answer,
            },
        })
        .into_response(),
        Err(e) => {
            error!("diagnosis follow-up failed: {}", e);
            api_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to get a response.")
        }
    }
}
