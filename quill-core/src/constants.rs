//! Shared constants for Quill.

// ═══════════════════════════════════════════════════════════════════════════════
// REMOTE SOURCE
// ═══════════════════════════════════════════════════════════════════════════════

/// Cache key under which the remote article list is memoized.
pub const REMOTE_ARTICLES_CACHE_KEY: &str = "remote_articles";

/// How long a fetched remote article list stays fresh, in seconds.
pub const REMOTE_ARTICLES_TTL_SECONDS: i64 = 60;

/// Longest accepted remote TTL, in seconds (one year).
pub const MAX_REMOTE_ARTICLES_TTL_SECONDS: i64 = 86_400 * 365;

/// Default HTTP timeout for the events service, in seconds.
pub const REMOTE_TIMEOUT_SECONDS: u64 = 10;

/// Path of the events resource, relative to the configured base URL.
pub const EVENTS_PATH: &str = "events";

/// Event type the remote query filters on.
pub const EVENTS_TYPE_FILTER: &str = "blog";

/// Display label for articles that came from the events service.
pub const REMOTE_SOURCE_LABEL: &str = "Remote";

// ═══════════════════════════════════════════════════════════════════════════════
// HTTP
// ═══════════════════════════════════════════════════════════════════════════════

/// Request header carrying the per-request ID.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Request header set by PJAX clients.
pub const PJAX_HEADER: &str = "x-pjax";

/// CGI-style spelling of the PJAX header, forwarded by some proxies.
pub const PJAX_CGI_HEADER: &str = "http_x_pjax";

/// `strftime` format of an HTTP `Last-Modified` / `If-Modified-Since` date.
pub const HTTP_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

// ═══════════════════════════════════════════════════════════════════════════════
// SITE
// ═══════════════════════════════════════════════════════════════════════════════

/// Default site title for the layout and the Atom feed.
pub const DEFAULT_SITE_TITLE: &str = "brandur.org";

/// Page title of the article listing.
pub const ARTICLES_PAGE_TITLE: &str = "Articles";
