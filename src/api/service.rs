//! Read-through video service
//!
//! Reads check the cache first and only touch the network on a miss, writing
//! the fetched payload back afterwards. Mutations drop every cache key whose
//! contents they make outdated before issuing the request, so the next read
//! refetches.

use std::sync::Arc;

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::api::fetch::Fetcher;
use crate::api::keys;
use crate::cache::TimedCache;
use crate::error::{ApiError, ApiResult};
use crate::models::{Audio, Comment, Filter, NewComment, NewVideo, UserProfile, Video};

/// Checks a raw body against the payload type its endpoint serves and
/// returns it in the shape the typed readers cache.
type Decoder = fn(Value) -> serde_json::Result<Value>;

/// Shared endpoints warmed by [`VideoService::warm_up`], as (cache key, path, decoder).
const WARM_UP_ENDPOINTS: [(&str, &str, Decoder); 4] = [
    (keys::VIDEO_FEED, "/videos", decode_as::<Vec<Video>>),
    (keys::TRENDING_VIDEOS, "/videos/trending", decode_as::<Vec<Video>>),
    (keys::AUDIOS_DATA, "/audios", decode_as::<Vec<Audio>>),
    (keys::FILTERS_DATA, "/filters", decode_as::<Vec<Filter>>),
];

fn decode_as<T>(body: Value) -> serde_json::Result<Value>
where
    T: Serialize + DeserializeOwned,
{
    serde_json::to_value(serde_json::from_value::<T>(body)?)
}

// == Video Service ==
/// Data access for the app's screens, fronted by a [`TimedCache`].
#[derive(Debug, Clone)]
pub struct VideoService {
    cache: TimedCache,
    fetcher: Arc<dyn Fetcher>,
}

impl VideoService {
    // == Constructor ==
    /// Creates a service reading through `cache` and fetching with `fetcher`.
    pub fn new(cache: TimedCache, fetcher: Arc<dyn Fetcher>) -> Self {
        Self { cache, fetcher }
    }

    // == Cache ==
    /// The cache fronting every read.
    pub fn cache(&self) -> &TimedCache {
        &self.cache
    }

    // == Cached Or Fetch ==
    /// Returns the cached payload for `key`, or fetches `path`, caches and
    /// returns it.
    ///
    /// Network and decode errors are returned; a payload that fails to decode
    /// is never cached.
    pub async fn cached_or_fetch<T>(&self, key: &str, path: &str) -> ApiResult<T>
    where
        T: Serialize + DeserializeOwned,
    {
        if let Some(hit) = self.cache.get::<T>(key).await {
            debug!("Cache hit for {}", key);
            return Ok(hit);
        }

        debug!("Cache miss for {}, fetching {}", key, path);
        let body = self.fetcher.get_json(path).await?;
        let data: T = serde_json::from_value(body)?;
        self.cache.set(key, &data).await;
        Ok(data)
    }

    // == Reads ==
    /// Home feed (GET /videos).
    pub async fn video_feed(&self) -> ApiResult<Vec<Video>> {
        self.cached_or_fetch(keys::VIDEO_FEED, "/videos").await
    }

    /// Trending list (GET /videos/trending).
    pub async fn trending_videos(&self) -> ApiResult<Vec<Video>> {
        self.cached_or_fetch(keys::TRENDING_VIDEOS, "/videos/trending").await
    }

    /// A single video's details.
    pub async fn video(&self, id: &str) -> ApiResult<Video> {
        self.cached_or_fetch(&keys::video(id), &format!("/videos/{}", id))
            .await
    }

    /// The signed-in user's profile.
    pub async fn user_profile(&self) -> ApiResult<UserProfile> {
        self.cached_or_fetch(keys::USER_PROFILE, "/users/me").await
    }

    /// Videos uploaded by the signed-in user.
    pub async fn video_list(&self) -> ApiResult<Vec<Video>> {
        self.cached_or_fetch(keys::VIDEO_LIST, "/users/me/videos").await
    }

    /// Comment thread of one video, cached per video.
    pub async fn comments(&self, video_id: &str) -> ApiResult<Vec<Comment>> {
        self.cached_or_fetch(
            &keys::comments(video_id),
            &format!("/videos/{}/comments", video_id),
        )
        .await
    }

    /// Soundtracks offered when recording.
    pub async fn audios(&self) -> ApiResult<Vec<Audio>> {
        self.cached_or_fetch(keys::AUDIOS_DATA, "/audios").await
    }

    /// Camera filters offered when recording.
    pub async fn filters(&self) -> ApiResult<Vec<Filter>> {
        self.cached_or_fetch(keys::FILTERS_DATA, "/filters").await
    }

    // == Mutations ==
    /// Likes a video and returns its updated state.
    pub async fn like_video(&self, id: &str) -> ApiResult<Video> {
        let video_key = keys::video(id);
        self.invalidate(&[keys::VIDEO_FEED, keys::TRENDING_VIDEOS, video_key.as_str()])
            .await;
        let body = self
            .fetcher
            .send_json(Method::POST, &format!("/videos/{}/like", id), None)
            .await?;
        Ok(serde_json::from_value(body)?)
    }

    /// Publishes a new video and returns it as stored by the backend.
    pub async fn upload_video(&self, video: &NewVideo) -> ApiResult<Video> {
        self.invalidate(&[keys::VIDEO_FEED, keys::VIDEO_LIST]).await;
        let request = serde_json::to_value(video).map_err(ApiError::Encode)?;
        let body = self
            .fetcher
            .send_json(Method::POST, "/videos", Some(request))
            .await?;
        Ok(serde_json::from_value(body)?)
    }

    /// Follows another user.
    pub async fn follow_user(&self, user_id: &str) -> ApiResult<()> {
        self.invalidate(&[keys::USER_PROFILE]).await;
        self.fetcher
            .send_json(Method::POST, &format!("/users/{}/follow", user_id), None)
            .await?;
        Ok(())
    }

    /// Posts a comment and returns it as stored by the backend.
    pub async fn add_comment(&self, video_id: &str, text: &str) -> ApiResult<Comment> {
        let thread_key = keys::comments(video_id);
        self.invalidate(&[thread_key.as_str()]).await;
        let body = NewComment {
            text: text.to_string(),
        };
        let response = self
            .fetcher
            .send_json(
                Method::POST,
                &format!("/videos/{}/comments", video_id),
                Some(serde_json::to_value(&body).map_err(ApiError::Encode)?),
            )
            .await?;
        Ok(serde_json::from_value(response)?)
    }

    // == Session ==
    /// Drops all cached data at the end of a session.
    pub async fn logout(&self) {
        self.cache.clear_all().await;
        info!("Session cache cleared on logout");
    }

    // == Warm Up ==
    /// Prefetches the shared endpoints that are not already cached.
    ///
    /// Cached keys are found with one batch read and fetched payloads are
    /// committed with one batch write. A cached entry only counts if it still
    /// decodes as its endpoint's payload type, and a fetched body that does
    /// not decode is never cached. Individual failures are logged and
    /// skipped. Returns how many endpoints were fetched and cached.
    pub async fn warm_up(&self) -> usize {
        let wanted: Vec<&str> = WARM_UP_ENDPOINTS.iter().map(|(key, _, _)| *key).collect();
        let mut cached = self.cache.get_multiple::<_, Value>(&wanted).await;

        let mut fetched: Vec<(&str, Value)> = Vec::new();
        for (key, path, decode) in WARM_UP_ENDPOINTS {
            if let Some(Some(existing)) = cached.remove(key) {
                if decode(existing).is_ok() {
                    debug!("Warm up: {} already cached", key);
                    continue;
                }
                debug!("Warm up: cached {} no longer decodes, refetching", key);
            }

            let body = match self.fetcher.get_json(path).await {
                Ok(body) => body,
                Err(e) => {
                    warn!("Warm up: fetching {} failed: {}", path, e);
                    continue;
                }
            };
            match decode(body) {
                Ok(data) => fetched.push((key, data)),
                Err(e) => warn!("Warm up: {} returned an unexpected payload: {}", path, e),
            }
        }

        self.cache.set_multiple(&fetched).await;
        info!("Warm up: fetched {} of {} endpoints", fetched.len(), wanted.len());
        fetched.len()
    }

    async fn invalidate(&self, stale: &[&str]) {
        for key in stale {
            self.cache.remove(key).await;
        }
    }
}
