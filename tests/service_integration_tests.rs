//! Integration Tests for the Read-Through Layer
//!
//! Serves a mock backend with axum on a local port and drives it through the
//! reqwest fetcher, counting how often each endpoint is actually hit.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use feed_cache::api::{keys, HttpFetcher, VideoService};
use feed_cache::error::ApiError;
use feed_cache::store::{KeyValueStore, MemoryStore};
use feed_cache::TimedCache;
use serde_json::{json, Value};
use tokio::sync::Mutex;

// == Mock Backend ==

#[derive(Clone, Default)]
struct Backend {
    hits: Arc<Mutex<HashMap<String, usize>>>,
    likes: Arc<Mutex<u64>>,
}

impl Backend {
    async fn record(&self, route: &str) {
        *self.hits.lock().await.entry(route.to_string()).or_default() += 1;
    }

    async fn hits(&self, route: &str) -> usize {
        self.hits.lock().await.get(route).copied().unwrap_or(0)
    }
}

fn video(id: &str, likes: u64) -> Value {
    json!({"id": id, "title": "clip", "video_url": "https://cdn/v.mp4", "user_id": "u1", "likes": likes})
}

async fn feed_handler(State(backend): State<Backend>) -> Json<Value> {
    backend.record("feed").await;
    let likes = *backend.likes.lock().await;
    Json(json!([video("1", likes)]))
}

async fn video_handler(State(backend): State<Backend>, Path(id): Path<String>) -> Json<Value> {
    backend.record("video").await;
    let likes = *backend.likes.lock().await;
    Json(video(&id, likes))
}

async fn like_handler(State(backend): State<Backend>, Path(id): Path<String>) -> Json<Value> {
    backend.record("like").await;
    let mut likes = backend.likes.lock().await;
    *likes += 1;
    Json(video(&id, *likes))
}

async fn broken_handler() -> StatusCode {
    StatusCode::INTERNAL_SERVER_ERROR
}

/// Starts the mock backend and returns its address.
async fn spawn_backend(backend: Backend) -> SocketAddr {
    let app = Router::new()
        .route("/videos", get(feed_handler))
        .route("/videos/trending", get(broken_handler))
        .route("/videos/:id", get(video_handler))
        .route("/videos/:id/like", post(like_handler))
        .with_state(backend);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

async fn create_test_service() -> (VideoService, Backend, MemoryStore) {
    let backend = Backend::default();
    let addr = spawn_backend(backend.clone()).await;
    let fetcher = HttpFetcher::new(format!("http://{}", addr), Duration::from_secs(5)).unwrap();
    let store = MemoryStore::new();
    let cache = TimedCache::new(Arc::new(store.clone()));
    (VideoService::new(cache, Arc::new(fetcher)), backend, store)
}

// == Read-Through Tests ==

#[tokio::test]
async fn test_feed_fetched_once_then_cached() {
    let (service, backend, store) = create_test_service().await;

    let first = service.video_feed().await.unwrap();
    let second = service.video_feed().await.unwrap();

    assert_eq!(first, second);
    assert_eq!(backend.hits("feed").await, 1);
    assert!(store.contains(keys::VIDEO_FEED).await);
}

#[tokio::test]
async fn test_like_forces_refetch_with_new_state() {
    let (service, backend, _store) = create_test_service().await;

    let before = service.video("1").await.unwrap();
    assert_eq!(before.likes, 0);

    let liked = service.like_video("1").await.unwrap();
    assert_eq!(liked.likes, 1);

    let after = service.video("1").await.unwrap();
    assert_eq!(after.likes, 1);
    assert_eq!(backend.hits("video").await, 2);
    assert_eq!(backend.hits("like").await, 1);
}

#[tokio::test]
async fn test_server_error_surfaces_to_caller() {
    let (service, _backend, store) = create_test_service().await;

    let result = service.trending_videos().await;

    assert!(matches!(result, Err(ApiError::Status { status: 500, .. })));
    assert!(!store.contains(keys::TRENDING_VIDEOS).await);
}

#[tokio::test]
async fn test_unreachable_backend_is_an_http_error() {
    let fetcher = HttpFetcher::new("http://127.0.0.1:1", Duration::from_millis(500)).unwrap();
    let cache = TimedCache::new(Arc::new(MemoryStore::new()));
    let service = VideoService::new(cache, Arc::new(fetcher));

    let result = service.video_feed().await;
    assert!(matches!(result, Err(ApiError::Http(_))));
}

#[tokio::test]
async fn test_warm_up_against_backend() {
    let (service, backend, store) = create_test_service().await;

    // Feed succeeds; trending returns 500; audios and filters are not routed (404).
    let fetched = service.warm_up().await;

    assert_eq!(fetched, 1);
    assert_eq!(backend.hits("feed").await, 1);
    assert!(store.contains(keys::VIDEO_FEED).await);

    service.video_feed().await.unwrap();
    assert_eq!(backend.hits("feed").await, 1, "Warmed feed is served from cache");
}

#[tokio::test]
async fn test_logout_then_refetch() {
    let (service, backend, store) = create_test_service().await;

    service.video_feed().await.unwrap();
    service.logout().await;
    assert!(store.keys().await.unwrap().is_empty());

    service.video_feed().await.unwrap();
    assert_eq!(backend.hits("feed").await, 2);
}
