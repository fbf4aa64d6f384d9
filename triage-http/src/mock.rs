//! Offline client answering from canned responses

use crate::client::HttpClient;
use crate::errors::HttpError;
use crate::types::{HttpMethod, HttpRequest, HttpResponse};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use tracing::debug;

/// A canned answer for one `METHOD:path` key
#[derive(Debug, Clone)]
pub enum MockResponse {
    Reply { status: u16, body: String },
    /// Fail without a response, like a refused connection
    Error(String),
}

impl MockResponse {
    pub fn ok(body: impl Into<String>) -> Self {
        Self::status(200, body)
    }

    pub fn status(status: u16, body: impl Into<String>) -> Self {
        MockResponse::Reply {
            status,
            body: body.into(),
        }
    }

    pub fn error(reason: impl Into<String>) -> Self {
        MockResponse::Error(reason.into())
    }
}

/// Offline [`HttpClient`] keyed by `"METHOD:path"`
///
/// Every request is remembered so tests can inspect what virtual users sent.
/// An optional latency is applied with `tokio::time::sleep`, which makes the
/// client usable under paused test time.
#[derive(Debug, Default)]
pub struct MockHttpClient {
    mocks: HashMap<String, MockResponse>,
    fallback: Option<MockResponse>,
    latency: Duration,
    sent: Mutex<Vec<HttpRequest>>,
}

impl MockHttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a single HTTP mock
    pub fn with_mock(mut self, method: HttpMethod, path: &str, response: MockResponse) -> Self {
        let key = Self::key(method, path);
        debug!("Added HTTP mock for {}", key);
        self.mocks.insert(key, response);
        self
    }

    /// Answer unmatched requests with `response`
    pub fn with_fallback(mut self, response: MockResponse) -> Self {
        self.fallback = Some(response);
        self
    }

    /// Delay every answer by `latency`
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Requests received so far, in arrival order
    pub fn sent(&self) -> Vec<HttpRequest> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().map(|s| s.len()).unwrap_or_default()
    }

    fn key(method: HttpMethod, path: &str) -> String {
        format!("{}:{}", method.as_str(), path)
    }
}

#[async_trait::async_trait]
impl HttpClient for MockHttpClient {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
        let key = Self::key(request.method, &request.path);
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(request);
        }

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        match self.mocks.get(&key).or(self.fallback.as_ref()) {
            Some(MockResponse::Reply { status, body }) => {
                Ok(HttpResponse::new(*status, body.clone()))
            }
            Some(MockResponse::Error(reason)) => Err(HttpError::Transport(reason.clone())),
            None => Err(HttpError::NoMock(key)),
        }
    }
}
