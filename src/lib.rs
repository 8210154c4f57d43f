//! Trip API Client Library
//!
//! Resilient request orchestration for the trip-planning backend: field
//! normalization, per-attempt timeouts, retries and a uniform error taxonomy

pub mod config;
pub mod models;
pub mod services;
pub mod transport;
pub mod utils;

// Re-export common types
pub use config::{ApiClientConfig, Settings};
pub use models::{
    progress_channel, ChatRequest, GeneratedTrip, InfoTopic, ProgressEvent, RequestOptions, TripDraft, TripListQuery,
};
pub use services::{ApiClient, FieldNormalizer, RetryPolicy, TripFailure, TripOrchestrationFlow, TripOutcome};
pub use transport::{HttpTransport, Transport};
pub use utils::error::{ApiError, ApiResult, ErrorKind};

/// Library version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Library description
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Get version information
pub fn version_info() -> String {
    format!("{} v{} - {}", NAME, VERSION, DESCRIPTION)
}
