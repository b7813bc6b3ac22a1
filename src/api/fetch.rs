//! Network fetch seam and its reqwest implementation.

use std::fmt::Debug;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method};
use serde_json::Value;
use tracing::debug;

use crate::error::{ApiError, ApiResult};

// == Fetcher ==
/// JSON request capability against the backend.
///
/// Paths are relative to whatever base the implementation was built with.
/// An empty response body decodes to `Value::Null`.
#[async_trait]
pub trait Fetcher: Debug + Send + Sync {
    /// Performs a GET and returns the decoded body.
    async fn get_json(&self, path: &str) -> ApiResult<Value>;

    /// Performs `method` with an optional JSON body and returns the decoded response.
    async fn send_json(&self, method: Method, path: &str, body: Option<Value>) -> ApiResult<Value>;
}

// == HTTP Fetcher ==
/// [`Fetcher`] over HTTP using a shared reqwest client.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    base_url: String,
}

impl HttpFetcher {
    /// Creates a fetcher rooted at `base_url` with a per-request `timeout`.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> ApiResult<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn execute(&self, request: reqwest::RequestBuilder, path: &str) -> ApiResult<Value> {
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                path: path.to_string(),
            });
        }

        let body = response.text().await?;
        debug!("Fetched {} ({} bytes)", path, body.len());
        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn get_json(&self, path: &str) -> ApiResult<Value> {
        let request = self.client.get(self.url(path));
        self.execute(request, path).await
    }

    async fn send_json(&self, method: Method, path: &str, body: Option<Value>) -> ApiResult<Value> {
        let mut request = self.client.request(method, self.url(path));
        if let Some(body) = body {
            request = request.json(&body);
        }
        self.execute(request, path).await
    }
}
