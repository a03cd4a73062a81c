//! HTTP server for the analysis service
//!
//! Exposes `POST /api/analyze` and `GET /health`.

mod routes;

pub use routes::{router, AnalyzeRequest, AppState};

use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use crate::analysis::AnalysisService;
use crate::config::Settings;

/// Bind the configured address and serve until Ctrl-C.
pub async fn run(settings: &Settings) -> Result<()> {
    let service = AnalysisService::from_settings(settings)?;
    let listener = TcpListener::bind(&settings.server.bind)
        .await
        .with_context(|| format!("Failed to bind {}", settings.server.bind))?;

    serve(listener, Arc::new(service), settings.server.max_body_bytes).await
}

/// Serve on an already bound listener.
pub async fn serve(
    listener: TcpListener,
    service: Arc<AnalysisService>,
    max_body_bytes: usize,
) -> Result<()> {
    let addr = listener.local_addr()?;
    info!(
        "Analysis server listening on http://{} (provider: {})",
        addr,
        service.provider_name()
    );

    axum::serve(listener, router(service, max_body_bytes))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Analysis server failed")?;

    info!("Analysis server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
}
