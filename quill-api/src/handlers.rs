//! API route handlers.

use std::sync::Arc;

use axum::{
    extract::{MatchedPath, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Response},
    Json,
};
use chrono::Utc;
use tracing::{debug, info};

use quill_core::constants::REQUEST_ID_HEADER;
use quill_feed::{ArticleResponse, RequestConditions, ResponseStatus};

use crate::dto::HealthResponse;
use crate::error::ApiError;
use crate::pjax::Pjax;
use crate::render;
use crate::state::AppState;

type Result<T> = std::result::Result<T, ApiError>;

/// GET /articles
pub async fn list_articles(
    State(state): State<Arc<AppState>>,
    Pjax(pjax): Pjax,
    headers: HeaderMap,
) -> Result<Html<String>> {
    let now = Utc::now();
    info!(request_id = request_id(&headers), pjax, route = "/articles", "access_info");

    let articles = state.aggregator.list_articles(now).await?;
    Ok(Html(render::articles_page(&articles, pjax, &state.config)))
}

/// GET /articles.atom
pub async fn articles_atom(
    State(state): State<Arc<AppState>>,
    Pjax(pjax): Pjax,
    headers: HeaderMap,
) -> Result<impl IntoResponse> {
    let now = Utc::now();
    info!(request_id = request_id(&headers), pjax, route = "/articles.atom", "access_info");
    let articles = state.aggregator.list_articles(now).await?;

    debug!(count = articles.len(), "Rendering Atom feed");
    Ok((
        [(header::CONTENT_TYPE, "application/atom+xml; charset=utf-8")],
        render::atom_feed(&articles, now, &state.config),
    ))
}

/// GET /{slug} for every registered route.
pub async fn show_article(
    State(state): State<Arc<AppState>>,
    matched: MatchedPath,
    Pjax(pjax): Pjax,
    headers: HeaderMap,
) -> Result<Response> {
    let now = Utc::now();
    let route = matched.as_str();
    info!(request_id = request_id(&headers), pjax, route, "access_info");

    let article = state
        .aggregator
        .find(route)
        .ok_or_else(|| ApiError::not_found(format!("No article at {}", route)))?;

    let conditions = RequestConditions::from_headers(
        header_str(&headers, header::IF_NONE_MATCH),
        header_str(&headers, header::IF_MODIFIED_SINCE),
    );

    let response = state.responses.respond(&article, now, &conditions, |a| {
        Ok(render::article_page(a, pjax, &state.config))
    })?;

    into_http(response, route)
}

/// GET /health
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".into(),
        version: env!("CARGO_PKG_VERSION").into(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
        articles_count: state.registry.len(),
    })
}

/// Fallback for unknown paths.
pub async fn not_found() -> ApiError {
    ApiError::not_found("No such page")
}

fn header_str(headers: &HeaderMap, name: header::HeaderName) -> Option<&str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// The ID set by the request-id layer, or `-` outside the router.
fn request_id(headers: &HeaderMap) -> &str {
    headers
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
}

fn into_http(response: ArticleResponse, route: &str) -> Result<Response> {
    let status = match response.status {
        ResponseStatus::NotFound => {
            return Err(ApiError::not_found(format!("No article at {}", route)));
        }
        ResponseStatus::NotModified => StatusCode::NOT_MODIFIED,
        ResponseStatus::Ok => StatusCode::OK,
    };

    let mut headers = HeaderMap::new();
    if let Some(etag) = &response.etag {
        headers.insert(header::ETAG, header_value(etag)?);
    }
    if let Some(last_modified) = response.last_modified_header() {
        headers.insert(header::LAST_MODIFIED, header_value(&last_modified)?);
    }

    Ok(match response.body {
        Some(body) => (status, headers, Html(body)).into_response(),
        None => (status, headers).into_response(),
    })
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value).map_err(|e| ApiError::internal(format!("Invalid header value: {}", e)))
}
