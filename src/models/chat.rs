//! Chat payloads

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Message sent to the travel assistant
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub message: String,
    /// Prior conversation or screen context
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<Value>,
    /// Trip the conversation is about
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trip_data: Option<Value>,
}

impl ChatRequest {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Default::default()
        }
    }

    pub fn with_context(mut self, context: Value) -> Self {
        self.context = Some(context);
        self
    }

    pub fn with_trip_data(mut self, trip_data: Value) -> Self {
        self.trip_data = Some(trip_data);
        self
    }
}
