//! HTTP gateway for the Vitrine assistant.
//!
//! Exposes the chat endpoint and a health check, built on Axum.
//!
//! Wire contract:
//! - `POST /chat`  — `{sessionId, message, pageContext?}` →
//!   `{answer, citations, refused}`; 400 with a fixed body when sessionId
//!   or message is missing, 500 with a fixed body on any backend fault.
//! - `GET /health` — status, version, loaded document count, uptime.
//!
//! Layers applied: HTTP trace logging, an optional exact-origin CORS layer,
//! and a request body size limit.

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use vitrine_chat::ChatEngine;
use vitrine_config::AppConfig;
use vitrine_core::chat::{ChatRequest, ChatResponse};
use vitrine_core::error::ChatError;
use vitrine_session::SessionStore;

/// Fixed client-facing body for invalid requests.
pub const VALIDATION_ERROR: &str = "sessionId and message are required and must be non-empty";

/// Fixed client-facing body for backend faults. Internal detail stays in the
/// log.
pub const FAILURE_ERROR: &str = "Chat failed. Please try again later.";

/// Maximum accepted request body size.
const MAX_BODY_BYTES: usize = 64 * 1024;

/// Shared application state for the gateway.
pub struct GatewayState {
    pub engine: ChatEngine,
    pub start_time: chrono::DateTime<chrono::Utc>,
}

pub type SharedState = Arc<GatewayState>;

/// Build the Axum router with all gateway routes.
///
/// `allowed_origin` adds an exact-origin CORS layer; `None` leaves the
/// gateway same-origin only.
pub fn build_router(state: SharedState, allowed_origin: Option<&str>) -> Router {
    let mut router = Router::new()
        .route("/health", get(health_handler))
        .route("/chat", post(chat_handler))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES));

    if let Some(origin) = allowed_origin {
        match origin.parse() {
            Ok(origin) => {
                let cors = CorsLayer::new()
                    .allow_origin(tower_http::cors::AllowOrigin::exact(origin))
                    .allow_methods([axum::http::Method::GET, axum::http::Method::POST])
                    .allow_headers([axum::http::header::CONTENT_TYPE])
                    .max_age(std::time::Duration::from_secs(3600));
                router = router.layer(cors);
            }
            Err(_) => {
                warn!(origin, "Ignoring unparseable allowed_origin — gateway stays same-origin only");
            }
        }
    }

    router
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the gateway HTTP server.
///
/// The knowledge pack is loaded first and any failure is fatal: the gateway
/// cannot honor its citation contract without one.
pub async fn start(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let pack = Arc::new(vitrine_knowledge::load_all(&config.knowledge.dir)?);
    let backend = vitrine_backends::build_from_config(&config)?;
    let sessions = Arc::new(SessionStore::new(config.session.cap));
    let engine = ChatEngine::new(backend, sessions, pack);

    let state = Arc::new(GatewayState {
        engine,
        start_time: chrono::Utc::now(),
    });

    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);
    let app = build_router(state, config.gateway.allowed_origin.as_deref());

    info!(addr = %addr, backend = %config.backend, "Vitrine gateway starting");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// --- Handlers ---

#[derive(Serialize, Deserialize)]
struct ErrorBody {
    error: String,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    documents: usize,
    uptime_secs: i64,
}

async fn health_handler(State(state): State<SharedState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        documents: state.engine.knowledge().len(),
        uptime_secs: (chrono::Utc::now() - state.start_time).num_seconds(),
    })
}

async fn chat_handler(
    State(state): State<SharedState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, (StatusCode, Json<ErrorBody>)> {
    match state.engine.handle(&request).await {
        Ok(response) => Ok(Json(response)),
        Err(ChatError::InvalidRequest) => Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorBody {
                error: VALIDATION_ERROR.into(),
            }),
        )),
        Err(ChatError::Upstream(_)) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorBody {
                error: FAILURE_ERROR.into(),
            }),
        )),
    }
}
