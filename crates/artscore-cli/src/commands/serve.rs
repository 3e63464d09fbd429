use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use artscore_core::analysis::openai::OpenAiBackend;
use artscore_core::config::{API_KEY_VAR, Config};
use artscore_core::models::ScoreLabel;
use artscore_server::AppState;
use tokio::net::TcpListener;

/// Assemble config (file, then environment, then flags) and run the relay until Ctrl-C.
pub async fn run(config_path: &Path, variant: Option<ScoreLabel>, port: Option<u16>) -> Result<()> {
    let mut config = Config::load(config_path)
        .with_context(|| format!("loading config from {}", config_path.display()))?;
    config.apply_env(|name| std::env::var(name).ok())?;
    if let Some(variant) = variant {
        config.server.variant = variant;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    tracing::debug!(?config, "configuration loaded");

    let backend = OpenAiBackend::new(&config.upstream)?;
    if !backend.has_credential() {
        tracing::warn!(
            "{API_KEY_VAR} is not set; /analyze will answer 500 until it is configured"
        );
    }

    let cwd = std::env::current_dir().context("getting current directory")?;
    let state = AppState::from_config(&config, Arc::new(backend), &cwd);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;

    artscore_server::serve(listener, state, shutdown_signal())
        .await
        .context("serving HTTP")?;

    tracing::info!("artscore stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "installing Ctrl-C handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
