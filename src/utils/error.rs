//! Error handling module
//!
//! Defines the error taxonomy shared by every call made through the client

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Machine codes the backend uses for transient, cold-start style failures
pub const TRANSIENT_ERROR_CODES: &[&str] = &[
    "SERVER_STARTING",
    "SERVICE_UNAVAILABLE",
    "COLD_START",
    "UPSTREAM_UNAVAILABLE",
    "GATEWAY_TIMEOUT",
    "TIMEOUT",
];

/// Machine codes the backend uses for rate limiting
pub const RATE_LIMIT_ERROR_CODES: &[&str] = &["RATE_LIMITED", "RATE_LIMIT_EXCEEDED", "TOO_MANY_REQUESTS"];

/// Code attached to client-side validation failures (normalization)
pub const MISSING_FIELD_CODE: &str = "MISSING_REQUIRED_FIELD";

/// Code attached to client-side validation failures with a bad value
pub const INVALID_FIELD_CODE: &str = "INVALID_FIELD";

/// Details reported by the backend (or synthesized locally) for a failed call
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorDetails {
    /// Human readable message
    pub message: String,
    /// HTTP status, when a response was received
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    /// Machine-readable error code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Structured details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    /// Recovery hints for the user
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub recovery_steps: Vec<String>,
    /// Server supplied retry hint
    #[serde(skip)]
    pub retry_after: Option<Duration>,
}

impl ErrorDetails {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Default::default()
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

impl fmt::Display for ErrorDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.code, self.status) {
            (Some(code), Some(status)) => write!(f, "{} ({}, HTTP {})", self.message, code, status),
            (Some(code), None) => write!(f, "{} ({})", self.message, code),
            (None, Some(status)) => write!(f, "{} (HTTP {})", self.message, status),
            (None, None) => write!(f, "{}", self.message),
        }
    }
}

/// API error types
///
/// Every variant is produced once, at the point of failure, and travels up
/// the call stack unchanged.
#[derive(Error, Debug, Clone)]
pub enum ApiError {
    /// Caller-fixable request problem (HTTP 4xx except 429, or local normalization)
    #[error("Request validation failed: {0}")]
    Validation(ErrorDetails),

    /// Rate limit exceeded (HTTP 429 or rate-limit code)
    #[error("Rate limit exceeded: {0}")]
    RateLimit(ErrorDetails),

    /// Server-side failure (HTTP 5xx or transient code)
    #[error("Server error: {0}")]
    Server(ErrorDetails),

    /// No HTTP status was reached
    #[error("Network error: {0}")]
    Network(String),

    /// Local timeout fired before a response arrived
    #[error("Request timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    /// Wrong content type or unparsable body
    #[error("Malformed response: {reason}")]
    MalformedResponse {
        status: Option<u16>,
        reason: String,
    },
}

/// Error kind, a fieldless view of [`ApiError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    RateLimit,
    Server,
    Network,
    Timeout,
    MalformedResponse,
}

impl ApiError {
    /// Classify a failed response by HTTP status and machine code
    ///
    /// A 4xx status other than 429 is terminal whatever code it carries;
    /// codes only refine responses without a status or with 2xx/5xx.
    pub fn from_response(details: ErrorDetails) -> Self {
        match details.status {
            Some(429) => return ApiError::RateLimit(details),
            Some(400..=499) => return ApiError::Validation(details),
            _ => {}
        }

        let code = details.code.as_deref().map(str::to_ascii_uppercase);
        let code = code.as_deref();

        if code.is_some_and(|c| RATE_LIMIT_ERROR_CODES.contains(&c)) {
            return ApiError::RateLimit(details);
        }
        if code.is_some_and(|c| TRANSIENT_ERROR_CODES.contains(&c)) {
            return ApiError::Server(details);
        }
        match details.status {
            Some(status) if status >= 500 => ApiError::Server(details),
            _ => ApiError::Validation(details),
        }
    }

    /// Validation error for a missing required field
    pub fn missing_field(field: &str) -> Self {
        ApiError::Validation(
            ErrorDetails::new(format!("Missing required field: {}", field))
                .with_code(MISSING_FIELD_CODE)
                .with_details(serde_json::json!({ "field": field })),
        )
    }

    /// Validation error for a field with an unusable value
    pub fn invalid_field(field: &str, reason: impl Into<String>) -> Self {
        let reason = reason.into();
        ApiError::Validation(
            ErrorDetails::new(format!("Invalid value for field {}: {}", field, reason))
                .with_code(INVALID_FIELD_CODE)
                .with_details(serde_json::json!({ "field": field, "reason": reason })),
        )
    }

    pub fn malformed(status: Option<u16>, reason: impl Into<String>) -> Self {
        ApiError::MalformedResponse {
            status,
            reason: reason.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Validation(_) => ErrorKind::Validation,
            ApiError::RateLimit(_) => ErrorKind::RateLimit,
            ApiError::Server(_) => ErrorKind::Server,
            ApiError::Network(_) => ErrorKind::Network,
            ApiError::Timeout(_) => ErrorKind::Timeout,
            ApiError::MalformedResponse { .. } => ErrorKind::MalformedResponse,
        }
    }

    /// Get error type string
    pub fn error_type(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "validation_error",
            ApiError::RateLimit(_) => "rate_limit_error",
            ApiError::Server(_) => "server_error",
            ApiError::Network(_) => "network_error",
            ApiError::Timeout(_) => "timeout_error",
            ApiError::MalformedResponse { .. } => "malformed_response_error",
        }
    }

    fn details(&self) -> Option<&ErrorDetails> {
        match self {
            ApiError::Validation(d) | ApiError::RateLimit(d) | ApiError::Server(d) => Some(d),
            _ => None,
        }
    }

    /// HTTP status, if a response was received
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::MalformedResponse { status, .. } => *status,
            other => other.details().and_then(|d| d.status),
        }
    }

    /// Machine-readable code reported by the backend
    pub fn code(&self) -> Option<&str> {
        self.details().and_then(|d| d.code.as_deref())
    }

    /// Message without the classification prefix
    pub fn message(&self) -> String {
        match self {
            ApiError::Network(msg) => msg.clone(),
            ApiError::MalformedResponse { reason, .. } => reason.clone(),
            ApiError::Timeout(_) => self.to_string(),
            other => other.details().map(|d| d.message.clone()).unwrap_or_default(),
        }
    }

    pub fn recovery_steps(&self) -> &[String] {
        self.details().map(|d| d.recovery_steps.as_slice()).unwrap_or(&[])
    }

    pub fn retry_after(&self) -> Option<Duration> {
        self.details().and_then(|d| d.retry_after)
    }

    /// Whether sending the same request again can succeed
    pub fn is_retryable(&self) -> bool {
        !matches!(self, ApiError::Validation(_))
    }

    /// Whether the failure looks like a network hiccup or a cold backend
    ///
    /// Drives the user-visible retry prompt. Rate limits are not transient.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ApiError::Server(_) | ApiError::Network(_) | ApiError::Timeout(_) | ApiError::MalformedResponse { .. }
        )
    }

    /// Whether detailed error information should be logged
    pub fn should_log_details(&self) -> bool {
        !matches!(self, ApiError::Validation(_))
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        // The attempt timeout is enforced by the executor; a reqwest timeout
        // here is the connect limit, i.e. the host was never reached
        if err.is_timeout() {
            return ApiError::Network(format!("connection timed out: {}", err));
        }
        if let Some(status) = err.status() {
            return ApiError::from_response(ErrorDetails::new(err.to_string()).with_status(status.as_u16()));
        }
        ApiError::Network(err.to_string())
    }
}

/// Result type alias
pub type ApiResult<T> = Result<T, ApiError>;
