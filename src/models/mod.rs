//! Data models module
//!
//! Defines request options, the response envelope and the trip-planning payloads

pub mod chat;
pub mod envelope;
pub mod info;
pub mod progress;
pub mod request;
pub mod trip;

pub use chat::ChatRequest;
pub use envelope::{ErrorEnvelope, ResponseEnvelope};
pub use info::InfoTopic;
pub use progress::{progress_channel, ProgressEvent, ProgressReceiver, ProgressSender};
pub use request::{BodyNormalizer, Method, RequestOptions};
pub use trip::{GeneratedTrip, NormalizedTripRequest, Pagination, Trip, TripDraft, TripListQuery, TripPage};
