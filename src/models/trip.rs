//! Trip data models
//!
//! UI-facing trip drafts, their canonical backend form, and trip read models

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Loosely-typed trip-creation payload as produced by the UI
///
/// May use alias field names (`duration`, `budgetLevel`, ...) and carry
/// display-only fields the backend rejects.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TripDraft(Map<String, Value>);

impl TripDraft {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(field.into(), value.into());
        self
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(field.into(), value.into());
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for TripDraft {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl TryFrom<Value> for TripDraft {
    type Error = String;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(format!("trip draft must be a JSON object, got {}", type_name(&other))),
        }
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Trip-creation payload in canonical backend form
///
/// Only produced by the field normalizer; always contains a positive `days`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct NormalizedTripRequest(Map<String, Value>);

impl NormalizedTripRequest {
    pub(crate) fn from_map(map: Map<String, Value>) -> Self {
        Self(map)
    }

    pub fn days(&self) -> u64 {
        self.0.get("days").and_then(Value::as_u64).unwrap_or_default()
    }

    pub fn destination(&self) -> Option<&str> {
        self.0.get("destination").and_then(Value::as_str)
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

/// Query parameters for the trip list endpoint
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TripListQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub filter: Option<String>,
    pub sort: Option<String>,
    pub search: Option<String>,
    pub user_id: Option<String>,
}

impl TripListQuery {
    pub fn page(page: u32, limit: u32) -> Self {
        Self {
            page: Some(page),
            limit: Some(limit),
            ..Default::default()
        }
    }

    /// Query pairs in wire naming; unset parameters are omitted
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        if let Some(page) = self.page {
            pairs.push(("page".to_string(), page.to_string()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit".to_string(), limit.to_string()));
        }
        let text_params = [
            ("filter", &self.filter),
            ("sort", &self.sort),
            ("search", &self.search),
            ("user_id", &self.user_id),
        ];
        for (name, value) in text_params {
            if let Some(value) = value.as_deref().filter(|v| !v.is_empty()) {
                pairs.push((name.to_string(), value.to_string()));
            }
        }
        pairs
    }
}

/// A stored trip
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trip {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days: Option<u32>,
    /// Remaining backend fields, untouched
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Pagination block of the trip list
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub limit: u32,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub total_pages: u32,
}

/// One page of trips
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "TripPageRepr")]
pub struct TripPage {
    pub trips: Vec<Trip>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
}

/// The list endpoint returns either a bare array or a paged object
#[derive(Deserialize)]
#[serde(untagged)]
enum TripPageRepr {
    Paged {
        trips: Vec<Trip>,
        #[serde(default)]
        pagination: Option<Pagination>,
    },
    Bare(Vec<Trip>),
}

impl From<TripPageRepr> for TripPage {
    fn from(repr: TripPageRepr) -> Self {
        match repr {
            TripPageRepr::Paged { trips, pagination } => Self { trips, pagination },
            TripPageRepr::Bare(trips) => Self { trips, pagination: None },
        }
    }
}

/// Result of trip generation
///
/// `ai_generation_failed` marks a partial success: the trip was stored but
/// the itinerary recommendations could not be produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedTrip {
    #[serde(rename = "aiGenerationFailed", default)]
    pub ai_generation_failed: bool,
    #[serde(flatten)]
    pub trip: Map<String, Value>,
}

impl GeneratedTrip {
    pub fn is_partial(&self) -> bool {
        self.ai_generation_failed
    }

    pub fn trip_id(&self) -> Option<&str> {
        ["id", "_id", "tripId"]
            .iter()
            .find_map(|key| self.trip.get(*key).and_then(Value::as_str))
    }

    pub fn itinerary(&self) -> Option<&Value> {
        self.trip.get("itinerary").filter(|v| !v.is_null())
    }
}
