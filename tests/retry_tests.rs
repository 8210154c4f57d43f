//! Retry policy tests

use std::time::Duration;
use trip_api_client::config::ApiClientConfig;
use trip_api_client::services::retry::{RetryPolicy, MAX_RETRY_DELAY};
use trip_api_client::utils::error::{ApiError, ErrorDetails};

fn transient_errors() -> Vec<ApiError> {
    vec![
        ApiError::from_response(ErrorDetails::new("busy").with_status(429)),
        ApiError::from_response(ErrorDetails::new("down").with_status(503)),
        ApiError::from_response(ErrorDetails::new("warming").with_status(200).with_code("SERVER_STARTING")),
        ApiError::Network("connection reset".to_string()),
        ApiError::Timeout(Duration::from_secs(130)),
        ApiError::malformed(Some(200), "not JSON"),
    ]
}

#[test]
fn test_validation_errors_never_retried() {
    let policy = RetryPolicy {
        max_attempts: 10,
        ..Default::default()
    };
    let errors = [
        ApiError::missing_field("days"),
        ApiError::from_response(ErrorDetails::new("bad").with_status(400).with_code("INVALID_DESTINATION")),
        ApiError::from_response(ErrorDetails::new("gone").with_status(404)),
        ApiError::from_response(ErrorDetails::new("warming").with_status(400).with_code("SERVER_STARTING")),
        ApiError::from_response(ErrorDetails::new("busy").with_status(403).with_code("RATE_LIMITED")),
    ];

    for err in &errors {
        for attempt in 1..10 {
            assert!(!policy.should_retry(err, attempt), "{} on attempt {}", err, attempt);
        }
    }
}

#[test]
fn test_transient_errors_retried_until_max_attempts() {
    let policy = RetryPolicy::default();

    for err in transient_errors() {
        assert!(policy.should_retry(&err, 1), "{}", err);
        assert!(policy.should_retry(&err, 2), "{}", err);
        assert!(!policy.should_retry(&err, 3), "{}", err);
        assert!(!policy.should_retry(&err, 4), "{}", err);
    }
}

#[test]
fn test_delay_is_non_decreasing_and_capped() {
    let policy = RetryPolicy::default();
    let mut previous = Duration::ZERO;

    for attempt in 0..64 {
        let delay = policy.next_delay(attempt, None);
        assert!(delay >= previous, "attempt {}", attempt);
        assert!(delay <= MAX_RETRY_DELAY, "attempt {}", attempt);
        previous = delay;
    }
    assert_eq!(previous, MAX_RETRY_DELAY);
}

#[test]
fn test_retry_after_hint_is_exact() {
    let policy = RetryPolicy {
        jitter: true,
        ..Default::default()
    };

    for hint in [Duration::ZERO, Duration::from_millis(250), Duration::from_secs(45)] {
        assert_eq!(policy.next_delay(2, Some(hint)), hint);
    }
}

#[test]
fn test_policy_from_config() {
    let config = ApiClientConfig {
        max_attempts: 5,
        retry_delay_ms: 200,
        max_retry_delay_ms: 120_000,
        ..Default::default()
    };

    let policy = RetryPolicy::from_config(&config);
    assert_eq!(policy.max_attempts, 5);
    assert_eq!(policy.base_delay, Duration::from_millis(200));
    assert_eq!(policy.max_delay, MAX_RETRY_DELAY);
    assert_eq!(policy.next_delay(1, None), Duration::from_millis(400));
}
