//! Request executor
//!
//! Performs a single attempt: endpoint selection, headers, body
//! serialization, and the timeout that aborts the in-flight request.

use crate::config::ApiClientConfig;
use crate::models::request::RequestOptions;
use crate::transport::{PreparedRequest, RawResponse, Transport};
use crate::utils::error::{ApiError, ApiResult};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

pub const JSON_CONTENT_TYPE: &str = "application/json";
pub const REQUEST_ID_HEADER: &str = "X-Request-Id";

/// Which deployment a path is routed to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// General API
    Primary,
    /// Compute-heavy trip-generation service
    Mcp,
}

/// Single-attempt request executor
#[derive(Clone)]
pub struct RequestExecutor {
    transport: Arc<dyn Transport>,
    api_base_url: String,
    mcp_base_url: String,
    mcp_prefix: String,
}

impl std::fmt::Debug for RequestExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestExecutor")
            .field("transport", &self.transport.name())
            .field("api_base_url", &self.api_base_url)
            .field("mcp_base_url", &self.mcp_base_url)
            .field("mcp_prefix", &self.mcp_prefix)
            .finish()
    }
}

impl RequestExecutor {
    pub fn new(config: &ApiClientConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
            mcp_base_url: config.mcp_base_url.trim_end_matches('/').to_string(),
            mcp_prefix: config.mcp_path_prefix.trim_end_matches('/').to_string(),
        }
    }

    /// Pick the backend for a path and return the path to use on it
    ///
    /// `/mcp/trips/generate` goes to the MCP backend as `/trips/generate`;
    /// `/mcpx` is not a prefix match.
    pub fn route<'a>(&self, path: &'a str) -> (Backend, &'a str) {
        match path.strip_prefix(self.mcp_prefix.as_str()) {
            Some(rest) if rest.is_empty() || rest.starts_with('/') || rest.starts_with('?') => (Backend::Mcp, rest),
            _ => (Backend::Primary, path),
        }
    }

    /// Absolute URL for a request path
    pub fn resolve_url(&self, path: &str) -> String {
        let (backend, rest) = self.route(path);
        let base = match backend {
            Backend::Primary => &self.api_base_url,
            Backend::Mcp => &self.mcp_base_url,
        };
        if rest.is_empty() || rest.starts_with('/') {
            format!("{}{}", base, rest)
        } else {
            format!("{}/{}", base, rest)
        }
    }

    /// Build the wire request for one attempt
    pub fn prepare(&self, options: &RequestOptions, body: Option<&Value>, request_id: &str) -> ApiResult<PreparedRequest> {
        let mut headers = vec![
            ("Accept".to_string(), JSON_CONTENT_TYPE.to_string()),
            (REQUEST_ID_HEADER.to_string(), request_id.to_string()),
        ];

        let body = match body {
            Some(value) => {
                headers.push(("Content-Type".to_string(), JSON_CONTENT_TYPE.to_string()));
                Some(
                    serde_json::to_string(value)
                        .map_err(|e| ApiError::invalid_field("body", format!("cannot serialize: {}", e)))?,
                )
            }
            None => None,
        };

        // Caller headers replace defaults of the same name
        for (name, value) in &options.headers {
            headers.retain(|(existing, _)| !existing.eq_ignore_ascii_case(name));
            headers.push((name.clone(), value.clone()));
        }

        Ok(PreparedRequest {
            method: options.method.clone(),
            url: self.resolve_url(&options.path),
            headers,
            query: options.query.clone(),
            body,
        })
    }

    /// Run one attempt, aborting it when `timeout` elapses
    pub async fn execute(&self, request: PreparedRequest, timeout: Duration) -> ApiResult<RawResponse> {
        debug!("Executing {} {} (timeout {:?})", request.method, request.url, timeout);

        // Dropping the send future on expiry cancels the in-flight request
        match tokio::time::timeout(timeout, self.transport.send(request)).await {
            Ok(result) => result,
            Err(_) => {
                warn!("Attempt aborted after {:?}", timeout);
                Err(ApiError::Timeout(timeout))
            }
        }
    }
}
