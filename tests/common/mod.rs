//! Shared test helpers
//!
//! A scripted transport that replays canned responses and records every
//! request it was asked to send.

#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use trip_api_client::config::ApiClientConfig;
use trip_api_client::transport::{PreparedRequest, RawResponse, Transport};
use trip_api_client::utils::error::{ApiError, ApiResult};

pub struct ScriptedTransport {
    script: Mutex<VecDeque<ApiResult<RawResponse>>>,
    sent: Mutex<Vec<PreparedRequest>>,
}

impl ScriptedTransport {
    pub fn new(script: Vec<ApiResult<RawResponse>>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            sent: Mutex::new(Vec::new()),
        })
    }

    /// Transport that must never be reached
    pub fn spy() -> Arc<Self> {
        Self::new(Vec::new())
    }

    pub fn calls(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    pub fn sent(&self) -> Vec<PreparedRequest> {
        self.sent.lock().unwrap().clone()
    }

    /// Parsed body of the n-th request
    pub fn sent_body(&self, index: usize) -> Option<Value> {
        let sent = self.sent.lock().unwrap();
        sent.get(index)
            .and_then(|r| r.body.as_deref())
            .and_then(|b| serde_json::from_str(b).ok())
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn send(&self, request: PreparedRequest) -> ApiResult<RawResponse> {
        self.sent.lock().unwrap().push(request);
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ApiError::Network("no scripted response left".to_string())))
    }
}

/// Config with millisecond retry delays
pub fn fast_config() -> ApiClientConfig {
    ApiClientConfig {
        retry_delay_ms: 1,
        max_retry_delay_ms: 20,
        ..ApiClientConfig::with_base_urls("http://api.test/api", "http://mcp.test")
    }
}

pub fn success(data: Value) -> ApiResult<RawResponse> {
    Ok(RawResponse::json(200, &serde_json::json!({"status": "success", "data": data})))
}

pub fn failure(status: u16, body: Value) -> ApiResult<RawResponse> {
    Ok(RawResponse::json(status, &body))
}
