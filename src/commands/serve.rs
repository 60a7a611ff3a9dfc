//! Serve command implementation.

use crate::config::Config;
use crate::server::{router, AppState};
use anyhow::{Context, Result};
use tracing::info;

/// Runs the HTTP API server until interrupted.
pub struct ServeCommand {
    config: Config,
}

impl ServeCommand {
    /// Creates a new serve command.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub async fn execute(&self) -> Result<()> {
        let state =
            AppState::from_config(&self.config).context("Failed to create HTTP client")?;
        let app = router(state);

        let addr = format!("{}:{}", self.config.host, self.config.port);
        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .with_context(|| format!("Failed to bind {}", addr))?;

        info!("Listening on http://{}", addr);
        axum::serve(listener, app).await.context("Server error")?;

        Ok(())
    }
}
