//! In-memory article registry.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use tracing::{debug, instrument};

use quill_core::error::{QuillError, Result};
use quill_core::types::{slug_from_route, Article, ArticleMetadata, ArticleSource};

#[derive(Debug, Default)]
struct Inner {
    /// Primary storage: route → Article
    articles: HashMap<String, Article>,
    /// Routes in first-registration order
    order: Vec<String>,
}

/// Registry of catalog articles, keyed by route.
///
/// # Thread Safety
///
/// Writes only happen during startup. After that every access takes a read
/// guard, so concurrent request handlers never contend.
#[derive(Debug, Default)]
pub struct ArticleRegistry {
    inner: RwLock<Inner>,
}

impl ArticleRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an article under `route`, stamped with the current time.
    ///
    /// See [`register_at`](Self::register_at).
    pub fn register(&self, route: &str, metadata: ArticleMetadata) -> Result<()> {
        self.register_at(route, metadata, Utc::now())
    }

    /// Registers an article under `route` with `last_modified_at = now`.
    ///
    /// A route registered earlier keeps its position in
    /// [`all_articles`](Self::all_articles) but takes the new metadata.
    ///
    /// # Errors
    ///
    /// - `InvalidRoute` if `route` does not start with `/` or has no slug
    /// - `MissingMetadata` if `published_at` is absent
    /// - `InvalidMetadata` if the title is blank
    #[instrument(skip(self, metadata))]
    pub fn register_at(&self, route: &str, metadata: ArticleMetadata, now: DateTime<Utc>) -> Result<()> {
        let article = Self::build(route, metadata, now)?;

        let mut inner = self.inner.write();
        if inner.articles.insert(route.to_string(), article).is_none() {
            inner.order.push(route.to_string());
        } else {
            debug!(route, "Route re-registered, last registration wins");
        }

        debug!(route, total = inner.order.len(), "Registered article");
        Ok(())
    }

    fn build(route: &str, metadata: ArticleMetadata, now: DateTime<Utc>) -> Result<Article> {
        if !route.starts_with('/') {
            return Err(QuillError::InvalidRoute(format!(
                "'{}' must start with '/'",
                route
            )));
        }

        let slug = slug_from_route(route);
        if slug.is_empty() {
            return Err(QuillError::InvalidRoute(format!("'{}' has no slug", route)));
        }

        let published_at = metadata.published_at.ok_or_else(|| QuillError::MissingMetadata {
            route: route.to_string(),
            field: "published_at",
        })?;

        if metadata.title.trim().is_empty() {
            return Err(QuillError::InvalidMetadata(format!(
                "article '{}' has an empty title",
                route
            )));
        }

        Ok(Article {
            route: Some(route.to_string()),
            slug: slug.to_string(),
            title: metadata.title,
            published_at,
            last_modified_at: Some(now),
            source: ArticleSource::Local,
            signature: metadata.signature,
            hook: metadata.hook,
            location: metadata.location,
            body: metadata.body,
        })
    }

    /// Looks up an article by route.
    pub fn lookup(&self, route: &str) -> Option<Article> {
        self.inner.read().articles.get(route).cloned()
    }

    /// Looks up an article by slug.
    pub fn lookup_slug(&self, slug: &str) -> Option<Article> {
        let inner = self.inner.read();
        inner
            .order
            .iter()
            .filter_map(|route| inner.articles.get(route))
            .find(|a| a.slug == slug)
            .cloned()
    }

    /// Returns every registered article in registration order.
    ///
    /// Callers sort.
    pub fn all_articles(&self) -> Vec<Article> {
        let inner = self.inner.read();
        inner
            .order
            .iter()
            .filter_map(|route| inner.articles.get(route).cloned())
            .collect()
    }

    /// Returns every registered route in registration order.
    pub fn routes(&self) -> Vec<String> {
        self.inner.read().order.clone()
    }

    /// Returns the number of registered articles.
    pub fn len(&self) -> usize {
        self.inner.read().order.len()
    }

    /// Returns true if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.inner.read().order.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    fn boot() -> DateTime<Utc> {
        at(2014, 1, 1)
    }

    #[test]
    fn test_register_and_lookup() {
        let registry = ArticleRegistry::new();
        registry
            .register_at(
                "/request-ids",
                ArticleMetadata::new("Tracking Request IDs", at(2013, 5, 25)).hook("Trace it."),
                boot(),
            )
            .unwrap();

        let article = registry.lookup("/request-ids").unwrap();
        assert_eq!(article.route.as_deref(), Some("/request-ids"));
        assert_eq!(article.slug, "request-ids");
        assert_eq!(article.title, "Tracking Request IDs");
        assert_eq!(article.published_at, at(2013, 5, 25));
        assert_eq!(article.last_modified_at, Some(boot()));
        assert_eq!(article.source, ArticleSource::Local);
        assert_eq!(article.hook.as_deref(), Some("Trace it."));
    }

    #[test]
    fn test_lookup_unknown_route() {
        let registry = ArticleRegistry::new();
        assert!(registry.lookup("/nope").is_none());
        assert!(registry.lookup_slug("nope").is_none());
    }

    #[test]
    fn test_last_registration_wins() {
        let registry = ArticleRegistry::new();
        registry
            .register_at("/first", ArticleMetadata::new("First", at(2013, 1, 1)), boot())
            .unwrap();
        registry
            .register_at("/second", ArticleMetadata::new("Second", at(2013, 2, 1)), boot())
            .unwrap();
        registry
            .register_at(
                "/first",
                ArticleMetadata::new("First, revised", at(2013, 3, 1)),
                boot() + Duration::seconds(1),
            )
            .unwrap();

        assert_eq!(registry.len(), 2);
        let first = registry.lookup("/first").unwrap();
        assert_eq!(first.title, "First, revised");
        assert_eq!(first.published_at, at(2013, 3, 1));

        let titles: Vec<_> = registry.all_articles().into_iter().map(|a| a.title).collect();
        assert_eq!(titles, vec!["First, revised", "Second"]);
    }

    #[test]
    fn test_all_articles_keeps_registration_order() {
        let registry = ArticleRegistry::new();
        for (route, year) in [("/c", 2015), ("/a", 2013), ("/b", 2014)] {
            registry
                .register_at(route, ArticleMetadata::new(route, at(year, 1, 1)), boot())
                .unwrap();
        }

        assert_eq!(registry.routes(), vec!["/c", "/a", "/b"]);
    }

    #[test]
    fn test_missing_published_at_fails_fast() {
        let registry = ArticleRegistry::new();
        let metadata = ArticleMetadata {
            title: "Undated".into(),
            ..Default::default()
        };

        let err = registry.register_at("/undated", metadata, boot()).unwrap_err();
        assert!(matches!(
            err,
            QuillError::MissingMetadata { field: "published_at", .. }
        ));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_invalid_routes_rejected() {
        let registry = ArticleRegistry::new();
        let meta = ArticleMetadata::new("Title", at(2013, 1, 1));

        assert!(matches!(
            registry.register_at("relative", meta.clone(), boot()),
            Err(QuillError::InvalidRoute(_))
        ));
        assert!(matches!(
            registry.register_at("//", meta, boot()),
            Err(QuillError::InvalidRoute(_))
        ));
    }

    #[test]
    fn test_blank_title_rejected() {
        let registry = ArticleRegistry::new();
        let result = registry.register_at("/blank", ArticleMetadata::new("  ", at(2013, 1, 1)), boot());
        assert!(matches!(result, Err(QuillError::InvalidMetadata(_))));
    }

    #[test]
    fn test_lookup_slug() {
        let registry = ArticleRegistry::new();
        registry
            .register_at("//service-stubs", ArticleMetadata::new("Stubs", at(2013, 5, 25)), boot())
            .unwrap();

        let article = registry.lookup_slug("service-stubs").unwrap();
        assert_eq!(article.route.as_deref(), Some("//service-stubs"));
    }

    #[tokio::test]
    async fn test_concurrent_reads() {
        use std::sync::Arc;
        use tokio::task::JoinSet;

        let registry = Arc::new(ArticleRegistry::new());
        registry
            .register_at("/a", ArticleMetadata::new("A", at(2013, 1, 1)), boot())
            .unwrap();

        let mut tasks = JoinSet::new();
        for _ in 0..32 {
            let reg = registry.clone();
            tasks.spawn(async move { reg.all_articles().len() });
        }

        while let Some(result) = tasks.join_next().await {
            assert_eq!(result.unwrap(), 1);
        }
    }
}
