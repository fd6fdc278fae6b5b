//! End-to-end pipeline tests against stub servers
//!
//! Stub provider and service servers run on ephemeral local ports, which
//! lets these tests exercise the success paths: gateway fallback, the full
//! describe/personalize flows through the store, and the cached page flow.

use std::collections::BTreeSet;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::routing::post;
use axum::{Json, Router};
use serde_json::json;

use tailor::cache::PageCache;
use tailor::client::ServiceClient;
use tailor::config::Config;
use tailor::page::PageFlow;
use tailor::preferences::PreferenceSet;
use tailor::provider::{
    AnthropicClient, GeminiClient, ProviderGateway, ProviderId, TextGenerator,
};
use tailor::server::{router, AppState};
use tailor::store::{PreferenceStore, StoreOutcome, ERROR_DESCRIPTION};

async fn spawn(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

/// A port that was valid a moment ago but has nothing listening.
fn dead_addr() -> SocketAddr {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

/// Stub Anthropic endpoint answering every call with the given text.
async fn spawn_anthropic_stub(text: &str, hits: Arc<AtomicUsize>) -> SocketAddr {
    let text = text.to_string();
    let app = Router::new().route(
        "/v1/messages",
        post(move || {
            let text = text.clone();
            let hits = Arc::clone(&hits);
            async move {
                hits.fetch_add(1, Ordering::SeqCst);
                Json(json!({"content": [{"type": "text", "text": text}]}))
            }
        }),
    );
    spawn(app).await
}

/// Stub Gemini endpoint answering every model call with the given text.
async fn spawn_gemini_stub(text: &str, hits: Arc<AtomicUsize>) -> SocketAddr {
    let text = text.to_string();
    let app = Router::new().route(
        "/{call}",
        post(move || {
            let text = text.clone();
            let hits = Arc::clone(&hits);
            async move {
                hits.fetch_add(1, Ordering::SeqCst);
                Json(json!({
                    "candidates": [{"content": {"parts": [{"text": text}]}}]
                }))
            }
        }),
    );
    spawn(app).await
}

fn anthropic_at(addr: SocketAddr) -> TextGenerator {
    TextGenerator::Anthropic(AnthropicClient::new(
        "a-key".to_string(),
        "model-a".to_string(),
        Some(format!("http://{}/v1/messages", addr)),
    ))
}

fn gemini_at(addr: SocketAddr) -> TextGenerator {
    TextGenerator::Gemini(GeminiClient::new(
        "g-key".to_string(),
        "model-g".to_string(),
        Some(format!("http://{}", addr)),
    ))
}

async fn spawn_service(gateway: ProviderGateway) -> SocketAddr {
    spawn(router(AppState::with_gateway(Config::default(), gateway))).await
}

fn tags(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

// =========================================================================
// Gateway fallback
// =========================================================================

#[tokio::test]
async fn test_primary_failure_falls_back_to_secondary_exactly_once() {
    let hits = Arc::new(AtomicUsize::new(0));
    let gemini_addr = spawn_gemini_stub("secondary says hi", Arc::clone(&hits)).await;

    let gateway = ProviderGateway::new(vec![
        anthropic_at(dead_addr()),
        gemini_at(gemini_addr),
    ]);

    let response = gateway.generate("hello", 40).await;
    assert_eq!(response.provider, ProviderId::Gemini);
    assert_eq!(response.text, "secondary says hi");
    assert!(response.error.is_none());
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_primary_success_skips_secondary() {
    let primary_hits = Arc::new(AtomicUsize::new(0));
    let secondary_hits = Arc::new(AtomicUsize::new(0));
    let anthropic_addr = spawn_anthropic_stub("primary wins", Arc::clone(&primary_hits)).await;
    let gemini_addr = spawn_gemini_stub("unused", Arc::clone(&secondary_hits)).await;

    let gateway = ProviderGateway::new(vec![
        anthropic_at(anthropic_addr),
        gemini_at(gemini_addr),
    ]);

    let response = gateway.generate("hello", 40).await;
    assert_eq!(response.provider, ProviderId::Anthropic);
    assert_eq!(response.text, "primary wins");
    assert_eq!(primary_hits.load(Ordering::SeqCst), 1);
    assert_eq!(secondary_hits.load(Ordering::SeqCst), 0);
}

// =========================================================================
// Store against a live service
// =========================================================================

#[tokio::test]
async fn test_update_applies_description_from_service() {
    let hits = Arc::new(AtomicUsize::new(0));
    let provider_addr = spawn_anthropic_stub("curious reader", hits).await;
    let service_addr = spawn_service(ProviderGateway::new(vec![anthropic_at(provider_addr)])).await;

    let dir = tempfile::tempdir().unwrap();
    let cache = Arc::new(PageCache::open(dir.path().join("pages.json")));
    let store = PreferenceStore::new(
        ServiceClient::new(format!("http://{}", service_addr)),
        cache,
        Some(dir.path().join("preferences.json")),
    );

    let outcome = store
        .update(tags(&["Explain Like I'm 5"]), String::new())
        .await;

    assert_eq!(outcome, StoreOutcome::Applied);
    let snapshot = store.snapshot();
    assert_eq!(snapshot.description, "curious reader");
    assert!(snapshot.error.is_none());
    assert!(!snapshot.busy);
}

#[tokio::test]
async fn test_mutations_are_single_flight() {
    // A service that answers slowly enough for a second call to overlap
    let app = Router::new().route(
        "/describe",
        post(|| async {
            tokio::time::sleep(Duration::from_millis(300)).await;
            Json(json!({"text": "slow description"}))
        }),
    );
    let service_addr = spawn(app).await;

    let dir = tempfile::tempdir().unwrap();
    let cache = Arc::new(PageCache::open(dir.path().join("pages.json")));
    let store = Arc::new(PreferenceStore::new(
        ServiceClient::new(format!("http://{}", service_addr)),
        cache,
        None,
    ));

    let first = {
        let store = Arc::clone(&store);
        tokio::spawn(async move {
            store
                .update(tags(&["Interface design"]), String::new())
                .await
        })
    };

    // Let the first update reach its in-flight window
    tokio::time::sleep(Duration::from_millis(100)).await;

    assert_eq!(
        store
            .update(tags(&["Explain Like I'm 5"]), String::new())
            .await,
        StoreOutcome::Busy
    );
    assert_eq!(store.fetch_recommendation().await, StoreOutcome::Busy);
    assert_eq!(store.reset(), StoreOutcome::Busy);

    assert_eq!(first.await.unwrap(), StoreOutcome::Applied);
    let snapshot = store.snapshot();
    // The overlapping update changed nothing
    assert!(snapshot.preferences.selected_tags.contains("Interface design"));
    assert!(!snapshot.preferences.selected_tags.contains("Explain Like I'm 5"));
    assert_eq!(snapshot.description, "slow description");
}

#[tokio::test]
async fn test_fetch_recommendation_merges_structured_blocks() {
    let recommendation = json!({
        "status": "success",
        "service_type": "blog",
        "recommendations": {
            "selectedOptions": ["Interface design"],
            "customPrompt": "tone: playful",
            "userDescription": "playful designer",
            "visual_preferences": {"emoji_usage": "frequent"}
        },
        "reasoning": {"main_points": ["enjoys visual polish"]},
        "metadata": {
            "request_type": "customize",
            "processed_at": "2024-01-01T00:00:00Z",
            "version": "1.0.0"
        }
    })
    .to_string();

    let hits = Arc::new(AtomicUsize::new(0));
    let provider_addr = spawn_anthropic_stub(&recommendation, hits).await;
    let service_addr = spawn_service(ProviderGateway::new(vec![anthropic_at(provider_addr)])).await;

    let dir = tempfile::tempdir().unwrap();
    let cache = Arc::new(PageCache::open(dir.path().join("pages.json")));
    let store = PreferenceStore::new(
        ServiceClient::new(format!("http://{}", service_addr)),
        cache,
        Some(dir.path().join("preferences.json")),
    );

    let outcome = store.fetch_recommendation().await;

    assert_eq!(outcome, StoreOutcome::Applied);
    let snapshot = store.snapshot();
    assert!(snapshot.preferences.selected_tags.contains("Interface design"));
    assert_eq!(snapshot.preferences.free_text, "tone: playful");
    assert_eq!(
        snapshot.preferences.visual.emoji_usage.as_deref(),
        Some("frequent")
    );
    assert_eq!(snapshot.description, "playful designer");
}

#[tokio::test]
async fn test_error_status_recommendation_leaves_state_intact() {
    // Provider answers with a parseable error-status body; the service
    // passes it through with 200 and the client rejects it
    let recommendation = json!({
        "status": "error",
        "service_type": "blog",
        "recommendations": {"selectedOptions": [], "customPrompt": "", "userDescription": ""}
    })
    .to_string();

    let hits = Arc::new(AtomicUsize::new(0));
    let provider_addr = spawn_anthropic_stub(&recommendation, hits).await;
    let service_addr = spawn_service(ProviderGateway::new(vec![anthropic_at(provider_addr)])).await;

    let dir = tempfile::tempdir().unwrap();
    let cache = Arc::new(PageCache::open(dir.path().join("pages.json")));
    let store = PreferenceStore::new(
        ServiceClient::new(format!("http://{}", service_addr)),
        cache,
        None,
    );

    assert_eq!(store.fetch_recommendation().await, StoreOutcome::Failed);
    let snapshot = store.snapshot();
    assert_eq!(snapshot.description, ERROR_DESCRIPTION);
    assert!(snapshot.error.is_some());
    assert!(snapshot.preferences.selected_tags.is_empty());
}

// =========================================================================
// Page flow against a live service
// =========================================================================

#[tokio::test]
async fn test_page_flow_generates_then_serves_from_cache() {
    let hits = Arc::new(AtomicUsize::new(0));
    let hits_handler = Arc::clone(&hits);
    let app = Router::new().route(
        "/generate",
        post(move || {
            let hits = Arc::clone(&hits_handler);
            async move {
                hits.fetch_add(1, Ordering::SeqCst);
                Json(json!({"text": "# personalized"}))
            }
        }),
    );
    let service_addr = spawn(app).await;

    let dir = tempfile::tempdir().unwrap();
    let cache = Arc::new(PageCache::open(dir.path().join("pages.json")));
    let flow = PageFlow::new(
        ServiceClient::new(format!("http://{}", service_addr)),
        Arc::clone(&cache),
    );

    let prefs = PreferenceSet::from_wishes(vec![], "tone: playful");

    let first = flow.content("post", "# original", &prefs).await;
    assert_eq!(first.body, "# personalized");
    assert!(first.personalized);
    assert_eq!(hits.load(Ordering::SeqCst), 1);

    // Same slug + preferences: served from cache, no second call
    let second = flow.content("post", "# original", &prefs).await;
    assert_eq!(second.body, "# personalized");
    assert_eq!(hits.load(Ordering::SeqCst), 1);

    // Explicit regeneration bypasses the cache lookup
    let third = flow.regenerate("post", "# original", &prefs).await;
    assert_eq!(third.body, "# personalized");
    assert_eq!(hits.load(Ordering::SeqCst), 2);

    // Different preferences miss the cache and generate again
    let other_prefs = PreferenceSet::from_wishes(vec![], "tone: dry");
    flow.content("post", "# original", &other_prefs).await;
    assert_eq!(hits.load(Ordering::SeqCst), 3);
}
