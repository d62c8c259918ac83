//! Conditional responses for single-article pages.
//!
//! A request for one article goes through a small state machine:
//!
//! ```text
//! START -> GATE_CHECK -> NOT_FOUND
//!                     -> RENDER -> HEADER_COMPUTE -> DONE
//! ```
//!
//! Rendering only happens once the gate has passed. In production mode the
//! response carries an entity tag and a `Last-Modified` date, and request
//! preconditions can short-circuit to `304 Not Modified`.

use chrono::{DateTime, Utc};
use sha3::{Digest, Sha3_256};
use tracing::debug;

use quill_core::constants::HTTP_DATE_FORMAT;
use quill_core::error::Result;
use quill_core::types::Article;
use quill_core::visibility::VisibilityPolicy;

/// Outcome of a single-article request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResponseStatus {
    /// 200, body present
    Ok,
    /// 304, body dropped
    NotModified,
    /// 404, the article is hidden by the gate
    NotFound,
}

impl ResponseStatus {
    /// HTTP status code.
    pub fn code(self) -> u16 {
        match self {
            ResponseStatus::Ok => 200,
            ResponseStatus::NotModified => 304,
            ResponseStatus::NotFound => 404,
        }
    }
}

/// A built response for one article.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArticleResponse {
    /// Response status
    pub status: ResponseStatus,
    /// Page title, set whenever the gate passed
    pub title: Option<String>,
    /// Rendered body, only for `Ok`
    pub body: Option<String>,
    /// Quoted entity tag, production only
    pub etag: Option<String>,
    /// Last modification time, production only
    pub last_modified: Option<DateTime<Utc>>,
}

impl ArticleResponse {
    fn not_found() -> Self {
        Self {
            status: ResponseStatus::NotFound,
            title: None,
            body: None,
            etag: None,
            last_modified: None,
        }
    }

    /// `Last-Modified` header value, if any.
    pub fn last_modified_header(&self) -> Option<String> {
        self.last_modified.map(http_date)
    }
}

/// Request preconditions relevant to caching.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RequestConditions {
    /// Raw `If-None-Match` header
    pub if_none_match: Option<String>,
    /// Parsed `If-Modified-Since` header
    pub if_modified_since: Option<DateTime<Utc>>,
}

impl RequestConditions {
    /// Builds conditions from raw header values.
    ///
    /// An unparseable `If-Modified-Since` is ignored.
    pub fn from_headers(if_none_match: Option<&str>, if_modified_since: Option<&str>) -> Self {
        Self {
            if_none_match: if_none_match.map(str::to_string),
            if_modified_since: if_modified_since.and_then(parse_http_date),
        }
    }

    /// Returns true if `If-None-Match` lists `etag` or `*`.
    ///
    /// Uses weak comparison, so `W/"abc"` matches `"abc"`.
    pub fn matches_etag(&self, etag: &str) -> bool {
        let Some(header) = self.if_none_match.as_deref() else {
            return false;
        };
        header.split(',').map(str::trim).any(|candidate| {
            candidate == "*" || candidate.trim_start_matches("W/") == etag.trim_start_matches("W/")
        })
    }

    /// Returns true if `last_modified` is not after `If-Modified-Since`.
    ///
    /// HTTP dates have second precision, so sub-second parts are ignored.
    pub fn not_modified_since(&self, last_modified: DateTime<Utc>) -> bool {
        self.if_modified_since
            .map(|since| last_modified.timestamp() <= since.timestamp())
            .unwrap_or(false)
    }
}

/// Computes the quoted entity tag of a rendered body.
pub fn entity_tag(body: &str) -> String {
    let digest = Sha3_256::digest(body.as_bytes());
    format!("\"{}\"", hex::encode(digest))
}

/// Formats an IMF-fixdate, e.g. `Sun, 06 Nov 1994 08:49:37 GMT`.
pub fn http_date(at: DateTime<Utc>) -> String {
    at.format(HTTP_DATE_FORMAT).to_string()
}

/// Parses an HTTP date. Returns `None` if it is malformed.
pub fn parse_http_date(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(raw.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Builds single-article responses.
#[derive(Clone, Copy, Debug, Default)]
pub struct ResponseBuilder {
    policy: VisibilityPolicy,
    production: bool,
}

impl ResponseBuilder {
    /// Creates a builder.
    pub fn new(policy: VisibilityPolicy, production: bool) -> Self {
        Self { policy, production }
    }

    /// Returns true if conditional headers are emitted.
    pub fn is_production(&self) -> bool {
        self.production
    }

    /// Returns the visibility policy.
    pub fn policy(&self) -> VisibilityPolicy {
        self.policy
    }

    /// Builds a response for an already rendered body.
    pub fn build_response(&self, article: &Article, now: DateTime<Utc>, rendered_body: String) -> ArticleResponse {
        if !self.policy.is_visible(article, now) {
            return ArticleResponse::not_found();
        }
        self.finish(article, rendered_body)
    }

    /// Runs the full request state machine.
    ///
    /// `render` is only called when the gate passes and no
    /// `If-Modified-Since` precondition already answered the request.
    ///
    /// # Errors
    ///
    /// Whatever `render` returns.
    pub fn respond<F>(
        &self,
        article: &Article,
        now: DateTime<Utc>,
        conditions: &RequestConditions,
        render: F,
    ) -> Result<ArticleResponse>
    where
        F: FnOnce(&Article) -> Result<String>,
    {
        if !self.policy.is_visible(article, now) {
            debug!(slug = %article.slug, "Article not yet published");
            return Ok(ArticleResponse::not_found());
        }

        // If-None-Match takes precedence, so the date check may only skip
        // rendering when it is absent.
        if self.production && conditions.if_none_match.is_none() {
            if let Some(last_modified) = article.last_modified_at {
                if conditions.not_modified_since(last_modified) {
                    return Ok(self.not_modified(article, None));
                }
            }
        }

        let response = self.finish(article, render(article)?);

        if let Some(etag) = response.etag.as_deref() {
            if conditions.matches_etag(etag) {
                return Ok(self.not_modified(article, response.etag.clone()));
            }
        }

        Ok(response)
    }

    fn finish(&self, article: &Article, body: String) -> ArticleResponse {
        let (etag, last_modified) = if self.production {
            (Some(entity_tag(&body)), article.last_modified_at)
        } else {
            (None, None)
        };

        ArticleResponse {
            status: ResponseStatus::Ok,
            title: Some(article.title.clone()),
            body: Some(body),
            etag,
            last_modified,
        }
    }

    fn not_modified(&self, article: &Article, etag: Option<String>) -> ArticleResponse {
        ArticleResponse {
            status: ResponseStatus::NotModified,
            title: Some(article.title.clone()),
            body: None,
            etag,
            last_modified: article.last_modified_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use quill_core::error::QuillError;
    use quill_core::types::ArticleSource;
    use test_case::test_case;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2014, 1, 1, 0, 0, 0).unwrap()
    }

    fn boot() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2013, 12, 31, 12, 0, 0).unwrap()
    }

    fn article(published_at: DateTime<Utc>) -> Article {
        Article {
            route: Some("/request-ids".into()),
            slug: "request-ids".into(),
            title: "Tracking Request IDs".into(),
            published_at,
            last_modified_at: Some(boot()),
            source: ArticleSource::Local,
            signature: false,
            hook: None,
            location: None,
            body: None,
        }
    }

    fn published() -> Article {
        article(Utc.with_ymd_and_hms(2013, 5, 25, 0, 0, 0).unwrap())
    }

    fn production() -> ResponseBuilder {
        ResponseBuilder::new(VisibilityPolicy::Gated, true)
    }

    #[test]
    fn test_entity_tag_is_stable_and_quoted() {
        let a = entity_tag("<p>hello</p>");
        let b = entity_tag("<p>hello</p>");
        assert_eq!(a, b);
        assert!(a.starts_with('"') && a.ends_with('"'));
        assert_eq!(a.len(), 64 + 2);
        assert_ne!(a, entity_tag("<p>hello!</p>"));
    }

    #[test]
    fn test_production_sets_headers() {
        let response = production().build_response(&published(), now(), "<p>x</p>".into());

        assert_eq!(response.status, ResponseStatus::Ok);
        assert_eq!(response.etag, Some(entity_tag("<p>x</p>")));
        assert_eq!(response.last_modified, Some(boot()));
        assert_eq!(response.title.as_deref(), Some("Tracking Request IDs"));
        assert_eq!(
            response.last_modified_header().as_deref(),
            Some("Tue, 31 Dec 2013 12:00:00 GMT")
        );
    }

    #[test]
    fn test_development_omits_headers() {
        let builder = ResponseBuilder::new(VisibilityPolicy::Gated, false);
        let response = builder.build_response(&published(), now(), "<p>x</p>".into());

        assert_eq!(response.status, ResponseStatus::Ok);
        assert_eq!(response.body.as_deref(), Some("<p>x</p>"));
        assert!(response.etag.is_none());
        assert!(response.last_modified.is_none());
    }

    #[test_case(0, ResponseStatus::Ok ; "published now")]
    #[test_case(1, ResponseStatus::NotFound ; "one second early")]
    #[test_case(86_400, ResponseStatus::NotFound ; "a day early")]
    fn test_gate(offset: i64, expected: ResponseStatus) {
        let article = article(now() + Duration::seconds(offset));
        let response = production().build_response(&article, now(), "<p>x</p>".into());

        assert_eq!(response.status, expected);
        if expected == ResponseStatus::NotFound {
            assert!(response.body.is_none());
            assert!(response.etag.is_none());
            assert!(response.title.is_none());
        }
    }

    #[test]
    fn test_ungated_serves_future_articles() {
        let builder = ResponseBuilder::new(VisibilityPolicy::Ungated, true);
        let response = builder.build_response(&article(now() + Duration::days(30)), now(), "x".into());
        assert_eq!(response.status, ResponseStatus::Ok);
    }

    #[test]
    fn test_respond_skips_render_when_gated() {
        let article = article(now() + Duration::days(1));
        let response = production()
            .respond(&article, now(), &RequestConditions::default(), |_| {
                panic!("rendered a gated article")
            })
            .unwrap();
        assert_eq!(response.status, ResponseStatus::NotFound);
    }

    #[test]
    fn test_if_none_match_hit() {
        let body = "<p>x</p>";
        let conditions = RequestConditions::from_headers(Some(&entity_tag(body)), None);

        let response = production()
            .respond(&published(), now(), &conditions, |_| Ok(body.to_string()))
            .unwrap();

        assert_eq!(response.status, ResponseStatus::NotModified);
        assert!(response.body.is_none());
        assert_eq!(response.etag, Some(entity_tag(body)));
    }

    #[test]
    fn test_if_none_match_list_and_wildcard() {
        let etag = entity_tag("x");
        let listed = RequestConditions::from_headers(Some(&format!("\"other\", W/{}", etag)), None);
        assert!(listed.matches_etag(&etag));

        let wildcard = RequestConditions::from_headers(Some("*"), None);
        assert!(wildcard.matches_etag(&etag));

        let miss = RequestConditions::from_headers(Some("\"other\""), None);
        assert!(!miss.matches_etag(&etag));
    }

    #[test]
    fn test_if_none_match_miss_renders() {
        let conditions = RequestConditions::from_headers(Some("\"stale\""), None);
        let response = production()
            .respond(&published(), now(), &conditions, |_| Ok("<p>new</p>".into()))
            .unwrap();

        assert_eq!(response.status, ResponseStatus::Ok);
        assert_eq!(response.body.as_deref(), Some("<p>new</p>"));
    }

    #[test]
    fn test_if_modified_since_skips_render() {
        let conditions = RequestConditions::from_headers(None, Some("Tue, 31 Dec 2013 12:00:00 GMT"));
        let response = production()
            .respond(&published(), now(), &conditions, |_| panic!("rendered a fresh page"))
            .unwrap();

        assert_eq!(response.status, ResponseStatus::NotModified);
        assert_eq!(response.last_modified, Some(boot()));
    }

    #[test]
    fn test_if_modified_since_older_renders() {
        let conditions = RequestConditions::from_headers(None, Some("Tue, 31 Dec 2013 11:59:59 GMT"));
        let response = production()
            .respond(&published(), now(), &conditions, |_| Ok("x".into()))
            .unwrap();
        assert_eq!(response.status, ResponseStatus::Ok);
    }

    #[test]
    fn test_if_none_match_takes_precedence() {
        let conditions = RequestConditions::from_headers(
            Some("\"stale\""),
            Some("Tue, 31 Dec 2013 12:00:00 GMT"),
        );
        let response = production()
            .respond(&published(), now(), &conditions, |_| Ok("x".into()))
            .unwrap();
        assert_eq!(response.status, ResponseStatus::Ok);
    }

    #[test]
    fn test_preconditions_ignored_outside_production() {
        let builder = ResponseBuilder::new(VisibilityPolicy::Gated, false);
        let conditions = RequestConditions::from_headers(Some("*"), Some("Tue, 31 Dec 2013 12:00:00 GMT"));

        let response = builder
            .respond(&published(), now(), &conditions, |_| Ok("x".into()))
            .unwrap();
        assert_eq!(response.status, ResponseStatus::Ok);
    }

    #[test]
    fn test_render_error_propagates() {
        let result = production().respond(&published(), now(), &RequestConditions::default(), |a| {
            Err(QuillError::NotFound(a.slug.clone()))
        });
        assert!(matches!(result, Err(QuillError::NotFound(_))));
    }

    #[test]
    fn test_http_date_round_trip() {
        let at = Utc.with_ymd_and_hms(1994, 11, 6, 8, 49, 37).unwrap();
        assert_eq!(http_date(at), "Sun, 06 Nov 1994 08:49:37 GMT");
        assert_eq!(parse_http_date("Sun, 06 Nov 1994 08:49:37 GMT"), Some(at));
        assert_eq!(parse_http_date("yesterday"), None);
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(ResponseStatus::Ok.code(), 200);
        assert_eq!(ResponseStatus::NotModified.code(), 304);
        assert_eq!(ResponseStatus::NotFound.code(), 404);
    }
}
