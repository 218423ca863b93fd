//! HTTP service boundary.
//!
//! Three routes: `POST /chat` runs the orchestrator, `GET
//! /hospital-data/{category}` passes a category listing straight through
//! the gateway, and `GET /` answers liveness probes. Errors leave as
//! `{"error": ...}` envelopes; a failed chat request carries a single
//! error and no partial output.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::{Value, json};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::{AgentSettings, AppConfig};
use crate::hospital::{DataCategory, HospitalGateway};
use crate::llm::{ChatCompletionsClient, Message};
use crate::orchestrator::{ChatReply, Orchestrator};
use crate::tools::ToolCatalog;

/// Shared application state. Everything inside is immutable after startup
/// and shared read-only across requests.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The conversation orchestrator.
    pub orchestrator: Arc<Orchestrator>,
    /// Gateway for the data passthrough routes.
    pub gateway: Arc<HospitalGateway>,
}

impl AppState {
    /// Wire up the state from loaded settings.
    #[must_use]
    pub fn from_settings(settings: &AgentSettings) -> Self {
        let gateway = Arc::new(HospitalGateway::new(settings.hospital_base_url.clone()));
        let client = ChatCompletionsClient::new(
            settings.llm_base_url.clone(),
            settings.api_key.clone(),
            settings.model.clone(),
        );
        let orchestrator = Orchestrator::new(
            client,
            Arc::clone(&gateway),
            ToolCatalog::new(),
            settings.mode,
        );
        Self {
            orchestrator: Arc::new(orchestrator),
            gateway,
        }
    }
}

/// Body of a chat request.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    /// The user's message. Checked by hand so its absence is a 400 with an
    /// error envelope rather than an extractor rejection.
    pub message: Option<String>,
    /// Conversation to continue from, as echoed by a previous reply.
    #[serde(default)]
    pub conversation_history: Vec<Message>,
}

/// Build the application router.
#[must_use]
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health))
        .route("/chat", post(chat))
        .route("/hospital-data/{category}", get(hospital_data))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the server with the given configuration.
///
/// # Errors
///
/// Returns an error when the listener cannot bind or the server fails.
pub async fn start_server(config: &AppConfig, settings: AgentSettings) -> anyhow::Result<()> {
    info!(
        name: "agent.config.loaded",
        hospital_base_url = %settings.hospital_base_url,
        llm_base_url = %settings.llm_base_url,
        model = %settings.model,
        mode = %settings.mode,
        "agent configuration loaded"
    );

    let state = AppState::from_settings(&settings);
    let app = build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!(
        name: "server.started",
        address = %addr,
        "Server started"
    );

    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "message": "Smart Hospital AI Agent API is running",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn chat(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatReply>, (StatusCode, Json<Value>)> {
    let Some(message) = req.message.as_deref() else {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "Missing 'message' in request body"})),
        ));
    };

    match state
        .orchestrator
        .chat(message, &req.conversation_history)
        .await
    {
        Ok(reply) => Ok(Json(reply)),
        Err(e) => {
            tracing::error!(error = %e, "chat request failed");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": e.to_string()})),
            ))
        }
    }
}

async fn hospital_data(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let Some(cat) = DataCategory::from_slug(&category) else {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(json!({"error": format!("Unknown endpoint: {category}")})),
        ));
    };

    match state.gateway.fetch_category(cat).await {
        Ok(data) => Ok(Json(data)),
        Err(e) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": e.to_string()})),
        )),
    }
}
