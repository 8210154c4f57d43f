//! Response validator
//!
//! Classifies a raw response as data or as an [`ApiError`]. Business data is
//! passed through untouched.

use crate::models::envelope::{generic_message, ErrorEnvelope, ResponseEnvelope};
use crate::transport::RawResponse;
use crate::utils::error::{ApiError, ApiResult, ErrorDetails};
use serde_json::Value;
use tracing::{debug, warn};

/// Response validator
#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseValidator;

impl ResponseValidator {
    pub fn new() -> Self {
        Self
    }

    /// Validate a response and return the envelope's `data`
    pub fn validate(&self, response: &RawResponse) -> ApiResult<Value> {
        let status = response.status;

        if !is_json_content_type(response.content_type()) {
            warn!(
                "Unexpected content type {:?} with HTTP {}",
                response.content_type(),
                status
            );
            return Err(ApiError::malformed(
                Some(status),
                format!(
                    "expected a JSON response, got content type {}",
                    response.content_type().unwrap_or("<none>")
                ),
            ));
        }

        let body: Value = serde_json::from_str(&response.body)
            .map_err(|e| ApiError::malformed(Some(status), format!("invalid JSON body: {}", e)))?;

        let envelope = ResponseEnvelope::from_value(body);

        // A non-2xx status always fails, whatever the body claims
        if !response.is_success() {
            return Err(match envelope {
                Ok(ResponseEnvelope::Error(envelope)) => error_from_envelope(envelope, response),
                _ => ApiError::from_response(generic_details(response)),
            });
        }

        match envelope {
            Ok(ResponseEnvelope::Success { data, .. }) => {
                debug!("Response envelope validated (HTTP {})", status);
                Ok(data)
            }
            Ok(ResponseEnvelope::Error(envelope)) => Err(error_from_envelope(envelope, response)),
            Err(reason) => Err(ApiError::malformed(Some(status), reason)),
        }
    }
}

fn error_from_envelope(envelope: ErrorEnvelope, response: &RawResponse) -> ApiError {
    let mut details = envelope.into_details(response.status);
    if details.retry_after.is_none() {
        details.retry_after = response.retry_after();
    }
    ApiError::from_response(details)
}

fn generic_details(response: &RawResponse) -> ErrorDetails {
    let mut details = ErrorDetails::new(generic_message(response.status)).with_status(response.status);
    details.retry_after = response.retry_after();
    details
}

/// `application/json` or any `+json` media type
pub fn is_json_content_type(content_type: Option<&str>) -> bool {
    let Some(content_type) = content_type else {
        return false;
    };
    let media_type = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    media_type == "application/json" || media_type.ends_with("+json")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::ErrorKind;
    use serde_json::json;
    use std::time::Duration;

    #[test]
    fn test_json_content_types() {
        assert!(is_json_content_type(Some("application/json")));
        assert!(is_json_content_type(Some("Application/JSON; charset=utf-8")));
        assert!(is_json_content_type(Some("application/problem+json")));
        assert!(!is_json_content_type(Some("text/html")));
        assert!(!is_json_content_type(None));
    }

    #[test]
    fn test_retry_after_header_fallback() {
        let resp = RawResponse::json(429, &json!({"status": "error", "message": "Slow down"}))
            .with_header("Retry-After", "4");

        let err = ResponseValidator.validate(&resp).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RateLimit);
        assert_eq!(err.retry_after(), Some(Duration::from_secs(4)));
    }

    #[test]
    fn test_error_status_with_success_body() {
        let resp = RawResponse::json(500, &json!({"status": "success", "data": {}}));
        let err = ResponseValidator.validate(&resp).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Server);
        assert_eq!(err.message(), "Request failed with status 500");
    }

    #[test]
    fn test_success_status_without_envelope() {
        let resp = RawResponse::json(200, &json!({"trips": []}));
        let err = ResponseValidator.validate(&resp).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedResponse);
    }
}
