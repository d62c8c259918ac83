//! # Quill API Server
//!
//! Serves the article catalog and the merged listing over HTTP.
//!
//! ## Endpoints
//!
//! - `GET /articles` - HTML listing, most recent first
//! - `GET /articles.atom` - Atom feed of the same listing
//! - `GET /<route>` - One page per registered catalog route
//! - `GET /health` - Liveness and article count
//!
//! ## Example
//!
//! ```rust,ignore
//! use quill_api::{ApiServer, ApiConfig};
//!
//! let config = ApiConfig::from_env()?;
//! let server = ApiServer::new(config)?;
//! server.run(([0, 0, 0, 0], 5001)).await?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod routes;
mod handlers;
mod state;
mod dto;
mod error;
mod pjax;
pub mod markdown;
pub mod render;

pub use routes::create_router;
pub use state::{AppState, ApiConfig};
pub use error::ApiError;
pub use dto::HealthResponse;
pub use pjax::Pjax;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use quill_core::error::Result;

/// API server for Quill.
pub struct ApiServer {
    state: Arc<AppState>,
}

impl ApiServer {
    /// Creates a new API server, registering the catalog.
    ///
    /// # Errors
    ///
    /// Catalog registration or remote configuration failures. Either one
    /// means the process should not start.
    pub fn new(config: ApiConfig) -> Result<Self> {
        Ok(Self::from_state(Arc::new(AppState::new(config)?)))
    }

    /// Creates a server over prepared state.
    pub fn from_state(state: Arc<AppState>) -> Self {
        Self { state }
    }

    /// Returns the shared state.
    pub fn state(&self) -> &Arc<AppState> {
        &self.state
    }

    /// Creates the router with all routes configured.
    pub fn router(&self) -> Router {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        create_router(self.state.clone())
            .layer(cors)
            .layer(TraceLayer::new_for_http())
    }

    /// Runs the server on the given address.
    pub async fn run(self, addr: impl Into<SocketAddr>) -> std::io::Result<()> {
        let addr = addr.into();
        let listener = tokio::net::TcpListener::bind(addr).await?;

        info!(
            articles = self.state.registry.len(),
            production = self.state.config.production,
            visibility = %self.state.config.visibility,
            remote = self.state.aggregator.has_remote(),
            "Quill server listening on {}",
            addr
        );

        axum::serve(listener, self.router()).await
    }
}
