//! Server Implementation
//!
//! HTTP listener startup and graceful shutdown

use crate::api;
use crate::core::{Config, Result, ServerError, ServerState};

/// HTTP Server
pub struct Server {
    config: Config,
    state: Option<ServerState>,
}

impl Server {
    pub fn new(config: Config) -> Self {
        Self { config, state: None }
    }

    /// Create server with existing state
    pub fn with_state(config: Config, state: ServerState) -> Self {
        Self {
            config,
            state: Some(state),
        }
    }

    pub async fn run(&self) -> Result<()> {
        let state = match &self.state {
            Some(s) => s.clone(),
            None => ServerState::initialize(&self.config).await?,
        };

        // Registry mirrors POS categories; a catalog outage must not block startup
        match state.registry().import_system_categories().await {
            Ok(summary) => tracing::info!(
                created = summary.created,
                renamed = summary.renamed,
                unchanged = summary.unchanged,
                "System categories imported"
            ),
            Err(e) => tracing::warn!(error = %e, "System category import failed, continuing"),
        }

        let addr = std::net::SocketAddr::from(([0, 0, 0, 0], self.config.http_port));
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(ServerError::Http)?;
        tracing::info!("Menu sync server listening on {}", addr);

        let shutdown = async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutting down...");
        };

        axum::serve(listener, api::build_router(state))
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(ServerError::Http)?;

        Ok(())
    }
}
