//! Service layer module
//!
//! Contains the normalizer, executor, validator and retry policy, the API
//! client that ties them together, and the trip creation flow

pub mod client;
pub mod executor;
pub mod flow;
pub mod normalizer;
pub mod retry;
pub mod validator;

pub use client::ApiClient;
pub use executor::RequestExecutor;
pub use flow::{TripFailure, TripOrchestrationFlow, TripOutcome};
pub use normalizer::FieldNormalizer;
pub use retry::RetryPolicy;
pub use validator::ResponseValidator;
