//! HTTP surface for artscore.
//!
//! One deployment serves one [`ScoreLabel`]: the `/analyze` relay, the
//! label's prompt instructions file, and static assets from the public
//! directory for the browser client.

pub mod error;
pub mod routes;

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

use artscore_core::analysis::backend::CompletionBackend;
use artscore_core::config::Config;
use artscore_core::models::ScoreLabel;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

/// Immutable per-process state shared by all requests.
pub struct AppState {
    pub backend: Arc<dyn CompletionBackend>,
    pub label: ScoreLabel,
    pub max_tokens: u32,
    pub public_dir: PathBuf,
    pub body_limit_bytes: usize,
}

impl AppState {
    /// Build state from config. Relative public directories resolve against `base_dir`.
    pub fn from_config(
        config: &Config,
        backend: Arc<dyn CompletionBackend>,
        base_dir: &std::path::Path,
    ) -> Self {
        Self {
            backend,
            label: config.server.variant,
            max_tokens: config.upstream.max_tokens,
            public_dir: config.public_dir(base_dir),
            body_limit_bytes: config.server.body_limit_bytes,
        }
    }
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    let prompt_path = format!("/{}", state.label.prompt_file());
    let static_files = ServeDir::new(&state.public_dir);
    let body_limit = state.body_limit_bytes;

    Router::new()
        .route("/analyze", post(routes::analyze))
        .route(&prompt_path, get(routes::prompt_file))
        .fallback_service(static_files)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
        .with_state(Arc::new(state))
}

/// Serve until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr()?;
    tracing::info!(
        %addr,
        label = %state.label,
        backend = state.backend.name(),
        public_dir = %state.public_dir.display(),
        "artscore listening"
    );
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
}
