//! Progress events
//!
//! Side-channel notifications for the UI, kept apart from the call result.

use std::time::Duration;
use tokio::sync::mpsc;

/// A progress notification emitted while a call or flow is running
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    /// Loading indicator on/off
    LoadingChanged(bool),
    /// Status text for the loading indicator
    LoadingMessage(String),
    /// An attempt failed and another one is scheduled
    Retrying {
        /// Attempt that just failed (1-based)
        attempt: u32,
        max_attempts: u32,
        delay: Duration,
        error_type: &'static str,
        message: String,
    },
    /// The flow finished with usable data
    Completed { partial: bool },
    /// The flow finished with an error
    Failed {
        error_type: &'static str,
        message: String,
        can_retry: bool,
    },
}

pub type ProgressSender = mpsc::UnboundedSender<ProgressEvent>;
pub type ProgressReceiver = mpsc::UnboundedReceiver<ProgressEvent>;

/// Create a progress channel
pub fn progress_channel() -> (ProgressSender, ProgressReceiver) {
    mpsc::unbounded_channel()
}

/// Send an event if anyone is listening
///
/// A dropped receiver only means the UI stopped caring.
pub fn emit(sender: Option<&ProgressSender>, event: ProgressEvent) {
    if let Some(tx) = sender {
        let _ = tx.send(event);
    }
}
