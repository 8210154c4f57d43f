//! Response envelope
//!
//! Every backend response is wrapped in `{status: "success", data}` or
//! `{status: "error", code, message, ...}`.

use crate::utils::error::ErrorDetails;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

/// Parsed response envelope
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ResponseEnvelope {
    Success {
        data: Value,
        #[serde(skip_serializing_if = "Option::is_none")]
        metadata: Option<Value>,
    },
    Error(ErrorEnvelope),
}

/// Error side of the envelope
///
/// The backend is not consistent about where it puts the error fields: some
/// routes use top-level `code`/`message`, others nest them under `error`, and
/// some send `error` as a plain string.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorEnvelope {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recovery_steps: Option<Vec<String>>,
    /// Seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_after: Option<f64>,
}

impl ResponseEnvelope {
    /// Interpret a parsed JSON body as an envelope
    ///
    /// Returns a description of the problem when the body is not an envelope.
    pub fn from_value(body: Value) -> Result<Self, String> {
        let Value::Object(mut map) = body else {
            return Err("response body is not a JSON object".to_string());
        };

        let status = match map.get("status") {
            Some(Value::String(s)) => s.to_ascii_lowercase(),
            Some(_) => return Err("envelope status is not a string".to_string()),
            None => return Err("envelope is missing the status field".to_string()),
        };

        match status.as_str() {
            "success" => {
                let data = map
                    .remove("data")
                    .ok_or_else(|| "success envelope is missing data".to_string())?;
                let metadata = map.remove("metadata");
                Ok(ResponseEnvelope::Success { data, metadata })
            }
            "error" => serde_json::from_value::<ErrorEnvelope>(Value::Object(map))
                .map(ResponseEnvelope::Error)
                .map_err(|e| format!("error envelope has unexpected shape: {}", e)),
            other => Err(format!("unknown envelope status: {}", other)),
        }
    }
}

impl ErrorEnvelope {
    fn nested(&self, field: &str) -> Option<&Value> {
        self.error.as_ref().and_then(|e| e.get(field))
    }

    /// Convert into error details, falling back to a generic message
    pub fn into_details(self, http_status: u16) -> ErrorDetails {
        let message = self
            .message
            .clone()
            .or_else(|| self.error.as_ref().and_then(|e| e.as_str()).map(str::to_string))
            .or_else(|| self.nested("message").and_then(Value::as_str).map(str::to_string))
            .unwrap_or_else(|| generic_message(http_status));

        let code = self
            .code
            .clone()
            .or_else(|| self.nested("code").and_then(Value::as_str).map(str::to_string));

        let details = self.details.clone().or_else(|| self.nested("details").cloned());

        let recovery_steps = self
            .recovery_steps
            .clone()
            .or_else(|| {
                self.nested("recoverySteps")
                    .and_then(|v| serde_json::from_value(v.clone()).ok())
            })
            .unwrap_or_default();

        let retry_after = self
            .retry_after
            .or_else(|| self.nested("retryAfter").and_then(Value::as_f64))
            .and_then(seconds_to_duration);

        ErrorDetails {
            message,
            status: Some(http_status),
            code,
            details,
            recovery_steps,
            retry_after,
        }
    }
}

/// Message used when the backend did not provide one
pub fn generic_message(http_status: u16) -> String {
    format!("Request failed with status {}", http_status)
}

/// Convert a seconds value to a duration, rejecting negative, non-finite and oversized input
pub fn seconds_to_duration(secs: f64) -> Option<Duration> {
    Duration::try_from_secs_f64(secs).ok()
}
