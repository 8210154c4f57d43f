//! Trip creation flow
//!
//! Wraps trip generation for the UI: loading state over the progress channel,
//! and a three-way outcome that keeps partial success apart from failure.

use super::client::ApiClient;
use crate::models::progress::{emit, ProgressEvent, ProgressSender};
use crate::models::trip::{GeneratedTrip, TripDraft};
use crate::utils::error::ApiError;
use tracing::{info, warn};

pub const PREPARING_MESSAGE: &str = "Preparing your trip request...";
pub const GENERATING_MESSAGE: &str = "Generating your itinerary...";
pub const RETRYING_MESSAGE: &str = "Trying again...";

/// Terminal failure of a trip creation
#[derive(Debug, Clone)]
pub struct TripFailure {
    pub error: ApiError,
    /// Whether offering the user a manual retry makes sense
    pub can_retry: bool,
}

impl From<ApiError> for TripFailure {
    fn from(error: ApiError) -> Self {
        let can_retry = error.is_transient();
        Self { error, can_retry }
    }
}

/// How a trip creation ended
#[derive(Debug, Clone)]
pub enum TripOutcome {
    /// Trip stored with its itinerary
    Success(GeneratedTrip),
    /// Trip stored but the AI recommendations are missing
    PartialSuccess(GeneratedTrip),
    Failure(TripFailure),
}

impl TripOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, TripOutcome::Success(_))
    }

    pub fn is_partial(&self) -> bool {
        matches!(self, TripOutcome::PartialSuccess(_))
    }

    /// The stored trip, partial or not
    pub fn trip(&self) -> Option<&GeneratedTrip> {
        match self {
            TripOutcome::Success(trip) | TripOutcome::PartialSuccess(trip) => Some(trip),
            TripOutcome::Failure(_) => None,
        }
    }

    pub fn failure(&self) -> Option<&TripFailure> {
        match self {
            TripOutcome::Failure(failure) => Some(failure),
            _ => None,
        }
    }
}

/// Trip creation use case
#[derive(Debug, Clone)]
pub struct TripOrchestrationFlow {
    client: ApiClient,
    progress: Option<ProgressSender>,
}

impl TripOrchestrationFlow {
    pub fn new(client: ApiClient) -> Self {
        Self { client, progress: None }
    }

    /// Report loading state and retries on `progress`
    pub fn with_progress(mut self, progress: ProgressSender) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Create a trip from a UI draft
    ///
    /// Never returns an error: failures are reported as [`TripOutcome::Failure`].
    pub async fn create_trip(&self, draft: &TripDraft) -> TripOutcome {
        self.run(draft, PREPARING_MESSAGE).await
    }

    /// User-initiated retry after a failure
    pub async fn retry(&self, draft: &TripDraft) -> TripOutcome {
        info!("Retrying trip creation on user request");
        self.run(draft, RETRYING_MESSAGE).await
    }

    async fn run(&self, draft: &TripDraft, first_message: &str) -> TripOutcome {
        let progress = self.progress.as_ref();
        emit(progress, ProgressEvent::LoadingChanged(true));
        emit(progress, ProgressEvent::LoadingMessage(first_message.to_string()));
        emit(progress, ProgressEvent::LoadingMessage(GENERATING_MESSAGE.to_string()));

        let result = match &self.progress {
            Some(tx) => self.client.generate_trip_with_progress(draft, tx.clone()).await,
            None => self.client.generate_trip(draft).await,
        };

        let outcome = match result {
            Ok(trip) if trip.is_partial() => {
                warn!(
                    "Trip {} created without AI recommendations",
                    trip.trip_id().unwrap_or("<unknown>")
                );
                emit(progress, ProgressEvent::Completed { partial: true });
                TripOutcome::PartialSuccess(trip)
            }
            Ok(trip) => {
                info!("Trip {} created", trip.trip_id().unwrap_or("<unknown>"));
                emit(progress, ProgressEvent::Completed { partial: false });
                TripOutcome::Success(trip)
            }
            Err(error) => {
                let failure = TripFailure::from(error);
                emit(
                    progress,
                    ProgressEvent::Failed {
                        error_type: failure.error.error_type(),
                        message: failure.error.message(),
                        can_retry: failure.can_retry,
                    },
                );
                TripOutcome::Failure(failure)
            }
        };

        emit(progress, ProgressEvent::LoadingChanged(false));
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::ErrorDetails;
    use std::time::Duration;

    #[test]
    fn test_failure_retry_hint() {
        let failure = TripFailure::from(ApiError::Timeout(Duration::from_secs(130)));
        assert!(failure.can_retry);

        let failure = TripFailure::from(ApiError::missing_field("days"));
        assert!(!failure.can_retry);

        let failure = TripFailure::from(ApiError::Server(ErrorDetails::new("down").with_status(503)));
        assert!(failure.can_retry);
    }
}
