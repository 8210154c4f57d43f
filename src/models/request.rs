//! Request options
//!
//! Describes one logical call before it enters the pipeline

use super::progress::ProgressSender;
use crate::utils::error::ApiResult;
use serde_json::Value;
use std::time::Duration;

pub use reqwest::Method;

/// Rewrites a request body into the shape an endpoint expects
pub type BodyNormalizer = fn(Value) -> ApiResult<Value>;

/// Options for a single logical call
#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub method: Method,
    /// Path relative to the backend; the MCP prefix selects the compute backend
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
    /// Applied to `body` once, before the first attempt
    pub normalizer: Option<BodyNormalizer>,
    /// Per-call overrides of the client defaults
    pub timeout: Option<Duration>,
    pub max_attempts: Option<u32>,
    pub retry_delay: Option<Duration>,
    pub progress: Option<ProgressSender>,
}

impl RequestOptions {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: Vec::new(),
            query: Vec::new(),
            body: None,
            normalizer: None,
            timeout: None,
            max_attempts: None,
            retry_delay: None,
            progress: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::POST, path).with_body(body)
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    pub fn with_normalizer(mut self, normalizer: BodyNormalizer) -> Self {
        self.normalizer = Some(normalizer);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = Some(max_attempts);
        self
    }

    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = Some(delay);
        self
    }

    pub fn with_progress(mut self, progress: ProgressSender) -> Self {
        self.progress = Some(progress);
        self
    }
}
