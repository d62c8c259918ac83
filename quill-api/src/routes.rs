//! API route configuration.

use std::sync::Arc;

use axum::{http::HeaderName, routing::get, Router};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tracing::warn;

use quill_core::constants::REQUEST_ID_HEADER;

use crate::handlers;
use crate::state::AppState;

/// Paths served by fixed handlers; a catalog route may not shadow them.
const RESERVED: [&str; 3] = ["/articles", "/articles.atom", "/health"];

/// Creates the router with all routes configured.
///
/// Every registered catalog route gets its own path, so unknown paths fall
/// through to the 404 handler instead of a catch-all. Each request gets an
/// `X-Request-Id` (the caller's, or a fresh UUID) that handlers log and the
/// response echoes.
pub fn create_router(state: Arc<AppState>) -> Router {
    let mut router = Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Listing
        .route("/articles", get(handlers::list_articles))
        .route("/articles.atom", get(handlers::articles_atom));

    for route in state.registry.routes() {
        if RESERVED.contains(&route.as_str()) {
            warn!(route, "Catalog route shadows a built-in path, skipping");
            continue;
        }
        router = router.route(&route, get(handlers::show_article));
    }

    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);
    router
        .fallback(handlers::not_found)
        .with_state(state)
        .layer(PropagateRequestIdLayer::new(request_id.clone()))
        .layer(SetRequestIdLayer::new(request_id, MakeRequestUuid))
}
