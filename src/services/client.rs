//! API client service
//!
//! Runs every logical call through normalization, execution, validation and
//! retry, and exposes the typed trip-planning endpoints on top of that loop.

use super::executor::RequestExecutor;
use super::normalizer::normalize_trip_body;
use super::retry::RetryPolicy;
use super::validator::ResponseValidator;
use crate::config::ApiClientConfig;
use crate::models::chat::ChatRequest;
use crate::models::info::InfoTopic;
use crate::models::progress::{emit, ProgressEvent, ProgressSender};
use crate::models::request::RequestOptions;
use crate::models::trip::{GeneratedTrip, Trip, TripDraft, TripListQuery, TripPage};
use crate::transport::{HttpTransport, Transport};
use crate::utils::error::{ApiError, ApiResult};
use crate::utils::logging::summarize_body;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

/// Trip generation, served by the compute backend
pub const TRIP_GENERATE_PATH: &str = "/mcp/trips/generate";
pub const TRIPS_PATH: &str = "/trips";
pub const CHAT_PATH: &str = "/chat";

/// Bookkeeping for one logical call
#[derive(Debug)]
struct AttemptState {
    attempt: u32,
    total_delay: Duration,
    started: Instant,
}

impl AttemptState {
    fn new() -> Self {
        Self {
            attempt: 0,
            total_delay: Duration::ZERO,
            started: Instant::now(),
        }
    }
}

struct ClientInner {
    config: ApiClientConfig,
    executor: RequestExecutor,
    validator: ResponseValidator,
    retry: RetryPolicy,
}

/// Trip-planning API client
///
/// Cloning is cheap; clones share the same configuration and transport.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ClientInner>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("executor", &self.inner.executor)
            .field("retry", &self.inner.retry)
            .finish()
    }
}

impl ApiClient {
    /// Create a client that talks HTTP
    pub fn new(config: ApiClientConfig) -> anyhow::Result<Self> {
        config.validate()?;
        let transport = HttpTransport::new(&config.user_agent)?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// Create a client on top of a custom transport
    pub fn with_transport(config: ApiClientConfig, transport: Arc<dyn Transport>) -> Self {
        let executor = RequestExecutor::new(&config, transport);
        let retry = RetryPolicy::from_config(&config);

        Self {
            inner: Arc::new(ClientInner {
                config,
                executor,
                validator: ResponseValidator::new(),
                retry,
            }),
        }
    }

    pub fn config(&self) -> &ApiClientConfig {
        &self.inner.config
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.inner.retry
    }

    /// Run one logical call and return the envelope's `data`
    pub async fn execute(&self, options: RequestOptions) -> ApiResult<Value> {
        let request_id = Uuid::new_v4().to_string();
        let span = info_span!(
            "api_call",
            request_id = %request_id,
            method = %options.method,
            path = %options.path
        );

        self.run(options, request_id).instrument(span).await
    }

    /// Run one logical call and deserialize its `data`
    pub async fn request<T: DeserializeOwned>(&self, options: RequestOptions) -> ApiResult<T> {
        let data = self.execute(options).await?;
        serde_json::from_value(data).map_err(|e| ApiError::malformed(None, format!("unexpected data shape: {}", e)))
    }

    async fn run(&self, options: RequestOptions, request_id: String) -> ApiResult<Value> {
        let body = match (options.body.clone(), options.normalizer) {
            (Some(body), Some(normalize)) => match normalize(body) {
                Ok(body) => {
                    debug!("Normalized request body: {}", summarize_body(&body));
                    Some(body)
                }
                Err(e) => {
                    warn!("Request rejected before sending: {}", e);
                    return Err(e);
                }
            },
            (body, _) => body,
        };

        let policy = self.inner.retry.with_overrides(options.max_attempts, options.retry_delay);
        let timeout = options.timeout.unwrap_or_else(|| self.inner.config.timeout());
        let request = self.inner.executor.prepare(&options, body.as_ref(), &request_id)?;
        let mut state = AttemptState::new();

        loop {
            state.attempt += 1;
            debug!("Attempt {}/{}", state.attempt, policy.max_attempts);

            let outcome = match self.inner.executor.execute(request.clone(), timeout).await {
                Ok(response) => self.inner.validator.validate(&response),
                Err(e) => Err(e),
            };

            let error = match outcome {
                Ok(data) => {
                    info!(
                        "Call completed after {} attempt(s) in {}ms",
                        state.attempt,
                        state.started.elapsed().as_millis()
                    );
                    debug!("Response data: {}", summarize_body(&data));
                    return Ok(data);
                }
                Err(error) => error,
            };

            if let ApiError::Timeout(limit) = &error {
                warn!("Attempt {} timed out after {}ms", state.attempt, limit.as_millis());
            }

            if !policy.should_retry(&error, state.attempt) {
                log_terminal(&error, &state);
                return Err(error);
            }

            let delay = policy.next_delay(state.attempt, error.retry_after());
            if let Some(budget) = self.inner.config.retry_budget() {
                let remaining = budget.saturating_sub(state.started.elapsed());
                if delay > remaining {
                    warn!(
                        "Retry budget exhausted ({}ms left, next delay {}ms)",
                        remaining.as_millis(),
                        delay.as_millis()
                    );
                    log_terminal(&error, &state);
                    return Err(error);
                }
            }

            warn!(
                "{} on attempt {}/{}, retrying in {}ms",
                error,
                state.attempt,
                policy.max_attempts,
                delay.as_millis()
            );
            emit(
                options.progress.as_ref(),
                ProgressEvent::Retrying {
                    attempt: state.attempt,
                    max_attempts: policy.max_attempts,
                    delay,
                    error_type: error.error_type(),
                    message: error.message(),
                },
            );

            tokio::time::sleep(delay).await;
            state.total_delay += delay;
        }
    }

    /// Paginated trip list
    pub async fn list_trips(&self, query: &TripListQuery) -> ApiResult<TripPage> {
        let mut options = RequestOptions::get(TRIPS_PATH);
        options.query = query.to_query_pairs();
        self.request(options).await
    }

    pub async fn get_trip(&self, id: &str) -> ApiResult<Trip> {
        let id = id.trim();
        if id.is_empty() {
            return Err(ApiError::missing_field("id"));
        }
        if id.contains('/') {
            return Err(ApiError::invalid_field("id", "must not contain '/'"));
        }
        self.request(RequestOptions::get(format!("{}/{}", TRIPS_PATH, id))).await
    }

    /// Generate a trip from a UI draft
    pub async fn generate_trip(&self, draft: &TripDraft) -> ApiResult<GeneratedTrip> {
        self.request(generate_options(draft)).await
    }

    /// Generate a trip, reporting retries on `progress`
    pub async fn generate_trip_with_progress(
        &self,
        draft: &TripDraft,
        progress: ProgressSender,
    ) -> ApiResult<GeneratedTrip> {
        self.request(generate_options(draft).with_progress(progress)).await
    }

    /// Destination information lookup
    ///
    /// Visa lookups need the traveller's nationality.
    pub async fn info(&self, topic: InfoTopic, destination: &str, nationality: Option<&str>) -> ApiResult<Value> {
        let destination = destination.trim();
        if destination.is_empty() {
            return Err(ApiError::missing_field("destination"));
        }

        let nationality = nationality.map(str::trim).filter(|n| !n.is_empty());
        if topic.requires_nationality() && nationality.is_none() {
            return Err(ApiError::missing_field("nationality"));
        }

        let mut options = RequestOptions::get(topic.path()).with_query("destination", destination);
        if let Some(nationality) = nationality {
            options = options.with_query("nationality", nationality);
        }
        self.execute(options).await
    }

    pub async fn visa_info(&self, destination: &str, nationality: &str) -> ApiResult<Value> {
        self.info(InfoTopic::Visa, destination, Some(nationality)).await
    }

    pub async fn culture_info(&self, destination: &str) -> ApiResult<Value> {
        self.info(InfoTopic::Culture, destination, None).await
    }

    pub async fn currency_info(&self, destination: &str) -> ApiResult<Value> {
        self.info(InfoTopic::Currency, destination, None).await
    }

    pub async fn health_info(&self, destination: &str) -> ApiResult<Value> {
        self.info(InfoTopic::Health, destination, None).await
    }

    pub async fn transportation_info(&self, destination: &str) -> ApiResult<Value> {
        self.info(InfoTopic::Transportation, destination, None).await
    }

    pub async fn language_info(&self, destination: &str) -> ApiResult<Value> {
        self.info(InfoTopic::Language, destination, None).await
    }

    /// Send a message to the travel assistant
    pub async fn send_chat_message(&self, request: &ChatRequest) -> ApiResult<Value> {
        if request.message.trim().is_empty() {
            return Err(ApiError::missing_field("message"));
        }
        let body = serde_json::to_value(request).map_err(|e| ApiError::invalid_field("message", e.to_string()))?;
        self.execute(RequestOptions::post(CHAT_PATH, body)).await
    }
}

fn generate_options(draft: &TripDraft) -> RequestOptions {
    RequestOptions::post(TRIP_GENERATE_PATH, Value::Object(draft.as_map().clone())).with_normalizer(normalize_trip_body)
}

fn log_terminal(error: &ApiError, state: &AttemptState) {
    if error.should_log_details() {
        error!(
            "Call failed after {} attempt(s), {}ms spent waiting: {}",
            state.attempt,
            state.total_delay.as_millis(),
            error
        );
    } else {
        warn!("Call rejected: {}", error);
    }
}
