//! API client tests
//!
//! End-to-end behavior of the request pipeline against a mock HTTP server
//! and a scripted transport

mod common;

use common::{failure, fast_config, success, ScriptedTransport};
use httpmock::prelude::*;
use serde_json::json;
use std::time::Duration;
use trip_api_client::config::ApiClientConfig;
use trip_api_client::models::progress::{progress_channel, ProgressEvent};
use trip_api_client::models::request::RequestOptions;
use trip_api_client::{ApiClient, ChatRequest, ErrorKind, InfoTopic, TripDraft, TripListQuery};

fn config_for(server: &MockServer) -> ApiClientConfig {
    ApiClientConfig {
        retry_delay_ms: 1,
        max_retry_delay_ms: 20,
        ..ApiClientConfig::with_base_urls(server.url("/api"), server.url("/compute"))
    }
}

fn scenario_a_draft() -> TripDraft {
    TripDraft::new()
        .with("destination", "Paris")
        .with("duration", 5)
        .with("budgetLevel", "Moderate")
        .with("interests", json!(["food"]))
}

#[test_log::test(tokio::test)]
async fn test_validation_error_is_not_retried() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/api/trips/42");
            then.status(400)
                .header("content-type", "application/json")
                .json_body(json!({
                    "status": "error",
                    "code": "INVALID_DESTINATION",
                    "message": "Unknown destination",
                    "recoverySteps": ["Pick a city from the list"]
                }));
        })
        .await;

    let client = ApiClient::new(config_for(&server)).unwrap();
    let err = client.get_trip("42").await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(err.code(), Some("INVALID_DESTINATION"));
    assert_eq!(err.message(), "Unknown destination");
    assert_eq!(err.recovery_steps(), ["Pick a city from the list".to_string()]);
    mock.assert_hits_async(1).await;
}

#[test_log::test(tokio::test)]
async fn test_server_error_exhausts_attempts() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/api/trips");
            then.status(503)
                .header("content-type", "application/json")
                .json_body(json!({"status": "error", "code": "SERVER_STARTING", "message": "Warming up"}));
        })
        .await;

    let client = ApiClient::new(config_for(&server)).unwrap();
    let err = client.list_trips(&TripListQuery::default()).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Server);
    assert_eq!(err.status(), Some(503));
    mock.assert_hits_async(3).await;
}

#[tokio::test]
async fn test_non_json_content_type_is_malformed() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/api/info/culture");
            then.status(200)
                .header("content-type", "text/html")
                .body(r#"{"status": "success", "data": {}}"#);
        })
        .await;

    let mut config = config_for(&server);
    config.max_attempts = 1;
    let client = ApiClient::new(config).unwrap();
    let err = client.culture_info("Japan").await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::MalformedResponse);
    assert_eq!(err.status(), Some(200));
    mock.assert_hits_async(1).await;
}

#[tokio::test]
async fn test_slow_response_times_out() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/slow");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({"status": "success", "data": {}}))
                .delay(Duration::from_millis(500));
        })
        .await;

    let client = ApiClient::new(config_for(&server)).unwrap();
    let options = RequestOptions::get("/slow")
        .with_timeout(Duration::from_millis(50))
        .with_max_attempts(1);
    let err = client.execute(options).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Timeout);
    assert!(err.is_transient());
}

#[tokio::test]
async fn test_list_trips_sends_query_and_json_headers() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/trips")
                .query_param("page", "2")
                .query_param("limit", "5")
                .header("accept", "application/json")
                .header_exists("x-request-id");
            then.status(200).header("content-type", "application/json").json_body(json!({
                "status": "success",
                "data": {
                    "trips": [{"_id": "t1", "destination": "Rome", "days": 3}],
                    "pagination": {"page": 2, "limit": 5, "total": 6, "totalPages": 2}
                }
            }));
        })
        .await;

    let client = ApiClient::new(config_for(&server)).unwrap();
    let page = client.list_trips(&TripListQuery::page(2, 5)).await.unwrap();

    assert_eq!(page.trips.len(), 1);
    assert_eq!(page.trips[0].id, "t1");
    assert_eq!(page.pagination.map(|p| p.total_pages), Some(2));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_trip_generation_routes_to_compute_backend() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/compute/trips/generate")
                .header("content-type", "application/json")
                .json_body(json!({
                    "destination": "Paris",
                    "days": 5,
                    "budget": "Moderate",
                    "interests": ["food"]
                }));
            then.status(201).header("content-type", "application/json").json_body(json!({
                "status": "success",
                "data": {"id": "trip-1", "itinerary": [{"day": 1}]}
            }));
        })
        .await;

    let client = ApiClient::new(config_for(&server)).unwrap();
    let trip = client.generate_trip(&scenario_a_draft()).await.unwrap();

    assert_eq!(trip.trip_id(), Some("trip-1"));
    assert!(!trip.is_partial());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_visa_info_query() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/info/visa")
                .query_param("destination", "Japan")
                .query_param("nationality", "DE");
            then.status(200)
                .header("content-type", "application/json; charset=utf-8")
                .json_body(json!({"status": "success", "data": {"required": false}}));
        })
        .await;

    let client = ApiClient::new(config_for(&server)).unwrap();
    let data = client.visa_info("Japan", "DE").await.unwrap();

    assert_eq!(data, json!({"required": false}));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_normalized_body_reaches_transport() {
    let transport = ScriptedTransport::new(vec![success(json!({"id": "trip-1"}))]);
    let client = ApiClient::with_transport(fast_config(), transport.clone());

    client.generate_trip(&scenario_a_draft()).await.unwrap();

    let body = transport.sent_body(0).unwrap();
    assert_eq!(body["days"], 5);
    assert_eq!(body["budget"], "Moderate");
    assert!(body.get("duration").is_none());
    assert!(body.get("budgetLevel").is_none());
    assert_eq!(transport.sent()[0].url, "http://mcp.test/trips/generate");
}

#[tokio::test]
async fn test_transient_failures_then_success() {
    let transport = ScriptedTransport::new(vec![
        failure(503, json!({"status": "error", "message": "Unavailable"})),
        failure(503, json!({"status": "error", "message": "Unavailable"})),
        success(json!({"trips": []})),
    ]);
    let client = ApiClient::with_transport(fast_config(), transport.clone());
    let (tx, mut rx) = progress_channel();

    let mut options = RequestOptions::get("/trips").with_progress(tx);
    options.query = TripListQuery::page(1, 10).to_query_pairs();
    let data = client.execute(options).await.unwrap();

    assert_eq!(data, json!({"trips": []}));
    assert_eq!(transport.calls(), 3);

    let mut retries = Vec::new();
    while let Ok(event) = rx.try_recv() {
        if let ProgressEvent::Retrying { attempt, delay, .. } = event {
            retries.push((attempt, delay));
        }
    }
    assert_eq!(retries.len(), 2);
    assert_eq!(retries[0].0, 1);
    assert_eq!(retries[1].0, 2);
    assert!(retries[0].1 <= retries[1].1);
}

#[tokio::test]
async fn test_retry_after_hint_is_used() {
    let transport = ScriptedTransport::new(vec![
        failure(429, json!({"status": "error", "message": "Slow down", "retryAfter": 0.125})),
        success(json!("ok")),
    ]);
    let client = ApiClient::with_transport(fast_config(), transport.clone());
    let (tx, mut rx) = progress_channel();

    let data = client
        .execute(RequestOptions::get("/trips").with_progress(tx))
        .await
        .unwrap();
    assert_eq!(data, json!("ok"));

    match rx.try_recv() {
        Ok(ProgressEvent::Retrying { delay, error_type, .. }) => {
            assert_eq!(delay, Duration::from_millis(125));
            assert_eq!(error_type, "rate_limit_error");
        }
        other => panic!("expected a retry event, got {:?}", other),
    }
}

#[tokio::test]
async fn test_network_errors_are_retried() {
    let transport = ScriptedTransport::new(vec![
        Err(trip_api_client::ApiError::Network("connection refused".to_string())),
        success(json!({"reply": "Hello"})),
    ]);
    let client = ApiClient::with_transport(fast_config(), transport.clone());

    let data = client.send_chat_message(&ChatRequest::new("Hi")).await.unwrap();

    assert_eq!(data["reply"], "Hello");
    assert_eq!(transport.calls(), 2);
    assert_eq!(transport.sent_body(1), Some(json!({"message": "Hi"})));
}

#[tokio::test]
async fn test_client_errors_with_transient_codes_are_terminal() {
    let scripts = [
        json!({"status": "error", "code": "SERVER_STARTING", "message": "Warming up"}),
        json!({"status": "error", "code": "RATE_LIMITED", "message": "Slow down"}),
    ];

    for (status, body) in [400u16, 403].into_iter().zip(scripts) {
        let transport = ScriptedTransport::new(vec![failure(status, body), success(json!(1))]);
        let client = ApiClient::with_transport(fast_config(), transport.clone());

        let err = client.execute(RequestOptions::get("/trips")).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Validation, "HTTP {}", status);
        assert_eq!(err.status(), Some(status));
        assert_eq!(transport.calls(), 1, "HTTP {}", status);
    }
}

#[tokio::test]
async fn test_normalization_failure_never_reaches_transport() {
    let transport = ScriptedTransport::spy();
    let client = ApiClient::with_transport(fast_config(), transport.clone());

    let draft = TripDraft::new().with("destination", "Paris");
    let err = client.generate_trip(&draft).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(err.message().contains("days"));
    assert_eq!(transport.calls(), 0);
}

#[tokio::test]
async fn test_error_envelope_on_success_status() {
    let transport = ScriptedTransport::new(vec![failure(
        200,
        json!({"status": "error", "error": {"code": "INVALID_DESTINATION", "message": "Nope"}}),
    )]);
    let client = ApiClient::with_transport(fast_config(), transport.clone());

    let err = client.info(InfoTopic::Health, "Atlantis", None).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(err.code(), Some("INVALID_DESTINATION"));
    assert_eq!(transport.calls(), 1);
}

#[tokio::test]
async fn test_concurrent_calls_share_client() {
    let transport = ScriptedTransport::new(vec![success(json!(1)), success(json!(2))]);
    let client = ApiClient::with_transport(fast_config(), transport.clone());

    let other = client.clone();
    let (a, b) = tokio::join!(
        client.execute(RequestOptions::get("/a")),
        other.execute(RequestOptions::get("/b")),
    );

    assert!(a.is_ok() && b.is_ok());
    assert_eq!(transport.calls(), 2);
}
