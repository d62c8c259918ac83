//! Built-in article catalog.
//!
//! The ordered list of registrations performed at startup. Order matters:
//! a later entry for the same route replaces an earlier one.

use chrono::{DateTime, Utc};
use tracing::info;

use quill_core::error::{QuillError, Result};
use quill_core::types::ArticleMetadata;

use crate::ArticleRegistry;

const LOCATION: &str = "San Francisco";

// Bodies are Markdown, rendered at request time.

const REQUEST_IDS_BODY: &str = r#"Every request entering the platform is tagged with a request ID. The ID
travels with each log line the request produces, so one search reconstructs
its whole path through the system.

## Injecting the ID

A small middleware reads `Request-Id` or generates a UUID, then adds it to
the logging context:

```ruby
def call(env)
  env["REQUEST_ID"] = env["HTTP_REQUEST_ID"] || SecureRandom.uuid
  log(request_id: env["REQUEST_ID"]) { @app.call(env) }
end
```

## Propagation

Services pass the ID along on outgoing calls so the trail continues across
process boundaries.
"#;

const SERVICE_STUBS_BODY: &str = r#"A service stub answers the same endpoints as the real service with
canned responses. Developers run it locally instead of the full dependency
graph.

## What a stub needs

- The same routes and status codes as production
- Fixture bodies that satisfy the client's parser
- Nothing else: no database, no queue
"#;

const ANTIPATTERNS_BODY: &str = r#"Some patterns that look wrong on paper earn their keep in practice.

## Examples

| Pattern | Why it pays off |
|---------|-----------------|
| Copy over abstraction | Two callers rarely stay alike |
| Fat models | One place to look |
"#;

const WAREHOUSE_BODY: &str = r#"A plain Postgres database fed by a few loaders answers most of the
questions a small company asks of its data.

```sql
SELECT date_trunc('day', created_at), count(*) FROM signups GROUP BY 1;
```
"#;

/// Parses a catalog date written as RFC 3339 with the author's local offset.
fn published(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| QuillError::InvalidMetadata(format!("bad publication date '{}': {}", raw, e)))
}

/// Returns the catalog as `(route, metadata)` pairs in registration order.
pub fn entries() -> Result<Vec<(&'static str, ArticleMetadata)>> {
    Ok(vec![
        (
            "/request-ids",
            ArticleMetadata::new("Tracking Request IDs", published("2013-05-25T20:49:02-07:00")?)
                .hook(
                    "We use a simple pattern to track any given request by injecting a \
                     particular key into all the logging events that it produces.",
                )
                .location(LOCATION)
                .body(REQUEST_IDS_BODY),
        ),
        (
            "/service-stubs",
            ArticleMetadata::new("SOA and Service Stubs", published("2013-05-25T20:49:02-07:00")?)
                .hook(
                    "How we build minimal, platform deployable, Rack service stubs to take \
                     the pain out of developing applications that depend on an extensive \
                     service-oriented architecture.",
                )
                .location(LOCATION)
                .body(SERVICE_STUBS_BODY),
        ),
        (
            "/antipatterns",
            ArticleMetadata::new("Healthy Anti-patterns", published("2014-02-03T09:45:04-08:00")?)
                .hook("When the use of an anti-pattern is considered beneficial.")
                .location(LOCATION)
                .signature()
                .body(ANTIPATTERNS_BODY),
        ),
        (
            "/warehouse",
            ArticleMetadata::new("The Humble Data Warehouse", published("2014-02-12T22:25:57-08:00")?)
                .location(LOCATION)
                .signature()
                .body(WAREHOUSE_BODY),
        ),
    ])
}

/// Registers the built-in catalog into `registry`.
///
/// Any failure is a startup defect and should abort the process.
pub fn register_catalog(registry: &ArticleRegistry) -> Result<usize> {
    let entries = entries()?;
    let count = entries.len();

    for (route, metadata) in entries {
        registry.register(route, metadata)?;
    }

    info!(count, "Registered catalog");
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_catalog_registers_every_entry() {
        let registry = ArticleRegistry::new();
        let count = register_catalog(&registry).unwrap();

        assert_eq!(count, 4);
        assert_eq!(registry.len(), 4);
        assert_eq!(
            registry.routes(),
            vec!["/request-ids", "/service-stubs", "/antipatterns", "/warehouse"]
        );
    }

    #[test]
    fn test_catalog_dates_are_normalized_to_utc() {
        let registry = ArticleRegistry::new();
        register_catalog(&registry).unwrap();

        let article = registry.lookup("/request-ids").unwrap();
        assert_eq!(
            article.published_at,
            Utc.with_ymd_and_hms(2013, 5, 26, 3, 49, 2).unwrap()
        );

        let article = registry.lookup("/antipatterns").unwrap();
        assert_eq!(
            article.published_at,
            Utc.with_ymd_and_hms(2014, 2, 3, 17, 45, 4).unwrap()
        );
        assert!(article.signature);
    }

    #[test]
    fn test_warehouse_has_no_hook() {
        let registry = ArticleRegistry::new();
        register_catalog(&registry).unwrap();

        let article = registry.lookup("/warehouse").unwrap();
        assert!(article.hook.is_none());
        assert!(article.body.is_some());
    }

    #[test]
    fn test_bodies_are_markdown() {
        for (route, metadata) in entries().unwrap() {
            let body = metadata.body.unwrap_or_default();
            assert!(!body.trim_start().starts_with('<'), "{} body is HTML", route);
            assert!(!body.is_empty(), "{} has no body", route);
        }
        assert!(REQUEST_IDS_BODY.contains("```ruby"));
    }

    #[test]
    fn test_bad_date_is_rejected() {
        assert!(matches!(published("yesterday"), Err(QuillError::InvalidMetadata(_))));
    }
}
