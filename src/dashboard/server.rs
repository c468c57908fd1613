//! # Dashboard Server
//!
//! Binds the dashboard router with CORS and request tracing.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use super::config::DashboardConfig;
use super::routes::{dashboard_routes, DashboardState};
use crate::observability::Event;
use crate::store::DocumentBackend;

/// HTTP server for the records dashboard
pub struct DashboardServer {
    config: DashboardConfig,
    router: Router,
}

impl DashboardServer {
    pub fn with_config<B: DocumentBackend + 'static>(
        config: DashboardConfig,
        state: Arc<DashboardState<B>>,
    ) -> Self {
        let router = Self::build_router(&config, state);
        Self { config, router }
    }

    fn build_router<B: DocumentBackend + 'static>(
        config: &DashboardConfig,
        state: Arc<DashboardState<B>>,
    ) -> Router {
        let cors = if config.cors_origins.is_empty() {
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        } else {
            let origins: Vec<_> = config
                .cors_origins
                .iter()
                .filter_map(|s| s.parse().ok())
                .collect();

            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods(Any)
                .allow_headers(Any)
        };

        dashboard_routes(state)
            .layer(TraceLayer::new_for_http())
            .layer(cors)
    }

    pub fn socket_addr(&self) -> String {
        self.config.socket_addr()
    }

    /// Consume the server, returning its router (for testing)
    pub fn router(self) -> Router {
        self.router
    }

    /// Serve until the listener fails
    pub async fn start(self) -> Result<(), std::io::Error> {
        let addr: SocketAddr = self.config.socket_addr().parse().map_err(|e| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("invalid listen address '{}': {}", self.config.socket_addr(), e),
            )
        })?;

        let listener = TcpListener::bind(addr).await?;
        info!(
            event = %Event::Serving,
            addr = %addr,
            "{}",
            Event::Serving.message()
        );
        axum::serve(listener, self.router).await?;

        Ok(())
    }
}
