//! HTTP API server for the storefront's support assistant.
//!
//! Provides REST endpoints for grounded chat, raw generation and retrieval diagnostics.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::error::ShopliteError;
use crate::rag::{Confidence, RagAnswer};
use crate::service::ServiceContext;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// Shared application state.
type AppState = Arc<ServiceContext>;

const ENDPOINTS: [&str; 4] = ["/chat", "/generate", "/search", "/health"];

/// Run the HTTP API server.
pub async fn run_serve(host: Option<String>, port: Option<u16>, mut settings: Settings) -> anyhow::Result<()> {
    if let Some(host) = host {
        settings.server.host = host;
    }
    if let Some(port) = port {
        settings.server.port = port;
    }

    if let Err(e) = preflight::check(Operation::Serve, &settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'shoplite doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let spinner = Output::spinner("Indexing knowledge base...");
    let ctx = ServiceContext::new(settings).await;
    spinner.finish_and_clear();
    let ctx = Arc::new(ctx?);

    let addr = format!("{}:{}", ctx.settings().server.host, ctx.settings().server.port);
    let app = router(ctx.clone());
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("Shoplite LLM API");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    Output::kv("Model", ctx.model());
    Output::kv("Device", &ctx.settings().generation.device);
    Output::kv("Knowledge base", &format!("{} documents", ctx.knowledge().len()));
    println!();
    println!("Endpoints:");
    Output::kv("Info", "GET  /");
    Output::kv("Health", "GET  /health");
    Output::kv("Chat (RAG)", "POST /chat");
    Output::kv("Generate", "POST /generate");
    Output::kv("Search", "POST /search");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Build the router over a service context.
pub fn router(ctx: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);
    let timeout = Duration::from_secs(ctx.settings().server.request_timeout_secs);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/chat", post(chat))
        .route("/generate", post(generate))
        .route("/search", post(search))
        .layer(TimeoutLayer::new(timeout))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(ctx)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    Output::info("Shutting down...");
}

// === Request/Response Types ===

#[derive(Serialize)]
struct RootResponse {
    status: &'static str,
    model: String,
    device: String,
    endpoints: Vec<&'static str>,
    message: &'static str,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    llm_model: String,
    device: String,
    knowledge_base_size: usize,
}

#[derive(Deserialize)]
struct ChatRequest {
    question: String,
}

#[derive(Deserialize)]
struct GenerateRequest {
    prompt: String,
    #[serde(default)]
    max_tokens: Option<u32>,
    #[serde(default)]
    temperature: Option<f32>,
}

#[derive(Serialize)]
struct GenerateResponse {
    text: String,
}

#[derive(Deserialize)]
struct SearchRequest {
    query: String,
    #[serde(default)]
    top_k: Option<usize>,
    #[serde(default)]
    threshold: Option<f32>,
}

#[derive(Serialize)]
struct SearchResponse {
    hits: Vec<SearchHit>,
    confidence: Confidence,
}

#[derive(Serialize)]
struct SearchHit {
    id: String,
    title: String,
    distance: f32,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

fn error_response(e: &ShopliteError) -> Response {
    let status = match e {
        ShopliteError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(ErrorResponse { error: e.to_string() })).into_response()
}

// === Handlers ===

async fn root(State(ctx): State<AppState>) -> Json<RootResponse> {
    Json(RootResponse {
        status: "online",
        model: ctx.model().to_string(),
        device: ctx.settings().generation.device.clone(),
        endpoints: ENDPOINTS.to_vec(),
        message: "Shoplite LLM API is running!",
    })
}

async fn health(State(ctx): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        llm_model: ctx.model().to_string(),
        device: ctx.settings().generation.device.clone(),
        knowledge_base_size: ctx.knowledge().len(),
    })
}

async fn chat(State(ctx): State<AppState>, Json(req): Json<ChatRequest>) -> Response {
    match ctx.chat(&req.question).await {
        Ok(answer) => Json::<RagAnswer>(answer).into_response(),
        Err(e) => {
            error!("Chat failed: {}", e);
            error_response(&e)
        }
    }
}

async fn generate(State(ctx): State<AppState>, Json(req): Json<GenerateRequest>) -> Response {
    match ctx.generate(&req.prompt, req.max_tokens, req.temperature).await {
        Ok(text) => Json(GenerateResponse { text }).into_response(),
        Err(e) => {
            error!("Generation failed: {}", e);
            error_response(&e)
        }
    }
}

async fn search(State(ctx): State<AppState>, Json(req): Json<SearchRequest>) -> Response {
    match ctx.search(&req.query, req.top_k, req.threshold).await {
        Ok((hits, confidence)) => Json(SearchResponse {
            hits: hits
                .into_iter()
                .map(|h| SearchHit {
                    id: h.document.id,
                    title: h.document.title,
                    distance: h.distance,
                })
                .collect(),
            confidence,
        })
        .into_response(),
        Err(e) => error_response(&e),
    }
}
