mod common;

use axum::{Router, routing::get};
use axum_test::TestServer;
use common::{MemoryCacheLayer, MemoryUrlRepository, create_test_state, relaxed_policy};
use linkpulse::api::handlers::redirect_handler;
use std::sync::Arc;
use std::sync::atomic::Ordering;

fn redirect_app(
    repository: &Arc<MemoryUrlRepository>,
    cache: &Arc<MemoryCacheLayer>,
) -> TestServer {
    let state = create_test_state(repository.clone(), cache.clone(), relaxed_policy());
    let app = Router::new()
        .route("/{code}", get(redirect_handler))
        .with_state(state);
    TestServer::new(app).unwrap()
}

#[tokio::test]
async fn test_redirect_success_from_store() {
    let repository = Arc::new(MemoryUrlRepository::new());
    let cache = Arc::new(MemoryCacheLayer::new());
    repository.seed("target01", "https://example.com/target", "owner-a");

    let server = redirect_app(&repository, &cache);

    let response = server.get("/target01").await;

    assert_eq!(response.status_code(), 302);
    assert_eq!(response.header("location"), "https://example.com/target");
    assert!(!response.header("x-response-time").is_empty());

    // Write-through population on the miss path.
    assert_eq!(
        cache.cached_url("target01").as_deref(),
        Some("https://example.com/target")
    );
}

#[tokio::test]
async fn test_redirect_cache_hit() {
    let repository = Arc::new(MemoryUrlRepository::new());
    let cache = Arc::new(MemoryCacheLayer::new());
    // Present in cache only: a hit must not need the durable store.
    cache.seed_url("cached01", "https://example.com/cached");

    let server = redirect_app(&repository, &cache);

    let response = server.get("/cached01").await;

    assert_eq!(response.status_code(), 302);
    assert_eq!(response.header("location"), "https://example.com/cached");
}

#[tokio::test]
async fn test_redirect_not_found() {
    let repository = Arc::new(MemoryUrlRepository::new());
    let cache = Arc::new(MemoryCacheLayer::new());

    let server = redirect_app(&repository, &cache);

    let response = server.get("/missing0").await;

    response.assert_status_not_found();
}

#[tokio::test]
async fn test_redirect_rejects_malformed_codes() {
    let repository = Arc::new(MemoryUrlRepository::new());
    let cache = Arc::new(MemoryCacheLayer::new());
    repository.seed("abcd1234", "https://example.com", "owner-a");

    let server = redirect_app(&repository, &cache);

    for path in ["/short", "/waytoolongcode1", "/abc$1234", "/abc%201234"] {
        let response = server.get(path).await;
        response.assert_status_not_found();
    }
}

#[tokio::test]
async fn test_redirect_records_click_before_response() {
    let repository = Arc::new(MemoryUrlRepository::new());
    let cache = Arc::new(MemoryCacheLayer::new());
    repository.seed("clickme1", "https://example.com", "owner-a");

    let server = redirect_app(&repository, &cache);

    let response = server.get("/clickme1").await;

    assert_eq!(response.status_code(), 302);
    assert_eq!(cache.score("clickme1"), 1);
    assert_eq!(cache.buffered("clickme1"), 1);
}

#[tokio::test]
async fn test_redirect_survives_click_recording_failure() {
    let repository = Arc::new(MemoryUrlRepository::new());
    let cache = Arc::new(MemoryCacheLayer::new());
    repository.seed("fragile1", "https://example.com", "owner-a");
    cache.fail_clicks.store(true, Ordering::SeqCst);

    let server = redirect_app(&repository, &cache);

    let response = server.get("/fragile1").await;

    // Availability over click accounting.
    assert_eq!(response.status_code(), 302);
    assert_eq!(cache.score("fragile1"), 0);
}

#[tokio::test]
async fn test_redirect_same_url_after_cache_purge() {
    let repository = Arc::new(MemoryUrlRepository::new());
    let cache = Arc::new(MemoryCacheLayer::new());
    repository.seed("stable01", "https://example.com/stable", "owner-a");

    let server = redirect_app(&repository, &cache);

    let first = server.get("/stable01").await;
    assert_eq!(first.status_code(), 302);
    let first_location = first.header("location");

    // Cache entry is disposable: purge it and resolve again.
    cache.purge_url("stable01");

    let second = server.get("/stable01").await;
    assert_eq!(second.status_code(), 302);
    assert_eq!(second.header("location"), first_location);
}

#[tokio::test]
async fn test_concurrent_clicks_are_all_counted() {
    let repository = Arc::new(MemoryUrlRepository::new());
    let cache = Arc::new(MemoryCacheLayer::new());
    repository.seed("hotlink1", "https://example.com", "owner-a");

    let state = create_test_state(repository.clone(), cache.clone(), relaxed_policy());

    let mut handles = Vec::new();
    for _ in 0..50 {
        let service = state.redirect_service.clone();
        handles.push(tokio::spawn(async move {
            service.record_click("hotlink1").await;
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    // No lost updates: score grew by exactly the number of clicks.
    assert_eq!(cache.score("hotlink1"), 50);
    assert_eq!(cache.buffered("hotlink1"), 50);
}
