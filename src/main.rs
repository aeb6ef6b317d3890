//! Storyteller - HTTP bridge to a local LLM
//!
//! Serves blocking and streamed completions backed by `ollama run`, plus the
//! prompts and in-memory session state of a turn-based ruler game.

mod api;
mod game;
mod llm;
mod session;

use api::{create_router, AppState};
use llm::{LlmConfig, LlmService, LoggingService, OllamaService};
use session::SessionStore;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_PORT: u16 = 3001;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "storyteller=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    // Configuration
    let port: u16 = std::env::var("STORYTELLER_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(DEFAULT_PORT);

    let llm_config = LlmConfig::from_env();
    tracing::info!(
        binary = %llm_config.binary.display(),
        model = %llm_config.model,
        timeout_secs = llm_config.limits.timeout.as_secs(),
        kill_grace_secs = llm_config.limits.kill_grace.as_secs(),
        "LLM bridge configured"
    );

    let llm: Arc<dyn LlmService> = Arc::new(LoggingService::new(Arc::new(OllamaService::new(
        &llm_config,
    ))));

    // Create application state
    let state = AppState::new(llm, Arc::new(SessionStore::new()));

    // Create router
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let compression = CompressionLayer::new()
        .gzip(true)
        .br(true)
        .deflate(true)
        .zstd(true);

    let app = create_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(compression);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Storyteller server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
