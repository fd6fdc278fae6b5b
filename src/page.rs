//! Personalized page flow
//!
//! Resolves what a page should display for the current preferences: the
//! untouched markdown when the reader has no wishes, the cached rewrite
//! when one exists for the derived key, or a fresh generation otherwise.

use std::sync::Arc;

use crate::cache::{page_cache_key, PageCache};
use crate::client::ServiceClient;
use crate::preferences::PreferenceSet;

/// What a page should render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageContent {
    pub body: String,
    /// False when the body is the original markdown.
    pub personalized: bool,
    /// Epoch milliseconds of the generation, when personalized.
    pub generated_at: Option<i64>,
}

impl PageContent {
    fn original(markdown: &str) -> Self {
        PageContent {
            body: markdown.to_string(),
            personalized: false,
            generated_at: None,
        }
    }
}

pub struct PageFlow {
    client: ServiceClient,
    cache: Arc<PageCache>,
}

impl PageFlow {
    pub fn new(client: ServiceClient, cache: Arc<PageCache>) -> Self {
        PageFlow { client, cache }
    }

    /// Resolve the content for a page, generating and caching when needed.
    pub async fn content(
        &self,
        slug: &str,
        markdown: &str,
        preferences: &PreferenceSet,
    ) -> PageContent {
        if !preferences.has_wishes() {
            return PageContent::original(markdown);
        }

        let key = page_cache_key(slug, preferences);
        if let Some(entry) = self.cache.get(&key) {
            return PageContent {
                body: entry.content,
                personalized: true,
                generated_at: Some(entry.timestamp),
            };
        }

        self.generate(&key, markdown, preferences).await
    }

    /// Regenerate a page, bypassing the cache lookup and overwriting the
    /// entry (the refresh affordance).
    pub async fn regenerate(
        &self,
        slug: &str,
        markdown: &str,
        preferences: &PreferenceSet,
    ) -> PageContent {
        if !preferences.has_wishes() {
            return PageContent::original(markdown);
        }

        let key = page_cache_key(slug, preferences);
        self.generate(&key, markdown, preferences).await
    }

    async fn generate(&self, key: &str, markdown: &str, preferences: &PreferenceSet) -> PageContent {
        let outcome = self.client.fetch_modified_markdown(markdown, preferences).await;

        if let Some(error) = outcome.error {
            // Failed generations are not cached; the original is shown instead
            tracing::warn!(error = %error, "personalized generation failed");
            return PageContent::original(markdown);
        }

        let entry = self.cache.put(key, outcome.text);
        PageContent {
            body: entry.content,
            personalized: true,
            generated_at: Some(entry.timestamp),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dead_client() -> ServiceClient {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        ServiceClient::new(format!("http://{}", addr))
    }

    #[tokio::test]
    async fn test_no_wishes_passes_markdown_through() {
        let dir = tempfile::tempdir().unwrap();
        let cache = Arc::new(PageCache::open(dir.path().join("pages.json")));
        let flow = PageFlow::new(dead_client(), Arc::clone(&cache));

        let content = flow.content("post", "# hello", &PreferenceSet::default()).await;
        assert_eq!(content.body, "# hello");
        assert!(!content.personalized);
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_cache_hit_short_circuits_generation() {
        let dir = tempfile::tempdir().unwrap();
        let cache = Arc::new(PageCache::open(dir.path().join("pages.json")));
        let prefs = PreferenceSet::from_wishes(vec![], "tone: dry");
        let entry = cache.put(page_cache_key("post", &prefs), "cached rewrite");

        // Client is unreachable: only a cache hit can satisfy this
        let flow = PageFlow::new(dead_client(), cache);
        let content = flow.content("post", "# original", &prefs).await;

        assert_eq!(content.body, "cached rewrite");
        assert!(content.personalized);
        assert_eq!(content.generated_at, Some(entry.timestamp));
    }

    #[tokio::test]
    async fn test_failed_generation_shows_original_and_does_not_cache() {
        let dir = tempfile::tempdir().unwrap();
        let cache = Arc::new(PageCache::open(dir.path().join("pages.json")));
        let prefs = PreferenceSet::from_wishes(vec![], "tone: dry");

        let flow = PageFlow::new(dead_client(), Arc::clone(&cache));
        let content = flow.content("post", "# original", &prefs).await;

        assert_eq!(content.body, "# original");
        assert!(!content.personalized);
        assert!(cache.is_empty());
    }
}
