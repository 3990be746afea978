//! HTTP surface for FinQA.
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/` | Welcome message |
//! | `GET`  | `/health` | Status, version and cached document count |
//! | `POST` | `/query/` | Multipart `file` + `query`, returns `{"response": ...}` |
//!
//! `/query` without the trailing slash is routed to the same handler.

pub mod error;
pub mod routes;

pub use error::ApiError;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use finqa_core::{AppConfig, AppResult};
use finqa_knowledge::RagPipeline;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

/// Largest accepted upload.
pub const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// Shared state handed to every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    pub pipeline: RagPipeline,
}

impl AppState {
    pub fn new(pipeline: RagPipeline) -> Self {
        Self { pipeline }
    }
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(routes::handle_root))
        .route("/health", get(routes::handle_health))
        .route("/query/", post(routes::handle_query))
        .route("/query", post(routes::handle_query))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Bind the configured address and serve until Ctrl-C.
pub async fn run_server(config: &AppConfig, pipeline: RagPipeline) -> AppResult<()> {
    let listener = TcpListener::bind(&config.bind).await?;
    serve(listener, AppState::new(pipeline)).await
}

/// Serve on an already bound listener until Ctrl-C.
pub async fn serve(listener: TcpListener, state: AppState) -> AppResult<()> {
    let addr = listener.local_addr()?;
    tracing::info!("FinQA server listening on http://{}", addr);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutdown signal received"),
        Err(e) => {
            tracing::error!("Failed to listen for shutdown signal: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
