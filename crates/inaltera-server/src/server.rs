use tokio::net::TcpListener;

use inaltera_audit::{EventCategory, Severity};

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::router::build_router;
use crate::state::AppState;

/// Inaltera ledger server.
pub struct InalteraServer {
    config: ServerConfig,
    state: AppState,
}

impl InalteraServer {
    pub fn new(config: ServerConfig) -> Self {
        let state = AppState::new(&config);
        Self { config, state }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Build the router (useful for testing).
    pub fn router(&self) -> axum::Router {
        build_router(self.state.clone())
    }

    /// Start serving requests.
    pub async fn serve(self) -> ServerResult<()> {
        self.state
            .audit
            .append(
                None,
                EventCategory::Other,
                Severity::Info,
                "Servicio Inaltera iniciado correctamente",
            )
            .map_err(|e| ServerError::Internal(e.to_string()))?;

        let app = self.router();
        let listener = TcpListener::bind(&self.config.bind_addr).await?;
        tracing::info!("inaltera server listening on {}", self.config.bind_addr);
        axum::serve(listener, app)
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))
    }
}
