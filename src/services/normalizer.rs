//! Field normalizer
//!
//! Rewrites a UI trip draft into the canonical field set accepted by the
//! trip-generation endpoint. Pure and deterministic: no I/O, and normalizing
//! an already-canonical payload returns it unchanged.

use crate::models::trip::{NormalizedTripRequest, TripDraft};
use crate::utils::error::{ApiError, ApiResult};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use serde_json::{Map, Value};
use std::collections::HashSet;
use tracing::debug;

/// Alias field -> canonical field
pub const FIELD_ALIASES: &[(&str, &str)] = &[
    ("duration", "days"),
    ("budgetLevel", "budget"),
    ("nationality", "userCountry"),
    ("travelerStyle", "travelStyle"),
];

/// Fields the backend requires after derivation
pub const REQUIRED_FIELDS: &[&str] = &["days"];

/// Fields the backend schema accepts; everything else is dropped
static CANONICAL_FIELDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "destination",
        "days",
        "budget",
        "interests",
        "userCountry",
        "travelDates",
        "travelStyle",
        "dietaryRestrictions",
        "specialRequirements",
        "accessibilityNeeds",
        "userId",
    ]
    .into_iter()
    .collect()
});

/// Trip draft normalizer
#[derive(Debug, Clone, Copy, Default)]
pub struct FieldNormalizer;

impl FieldNormalizer {
    pub fn new() -> Self {
        Self
    }

    /// Normalize a draft into its canonical backend form
    ///
    /// Fails with a validation error naming the field when `days` cannot be
    /// derived or is not a positive whole number.
    pub fn normalize(&self, draft: &TripDraft) -> ApiResult<NormalizedTripRequest> {
        self.normalize_map(draft.as_map().clone())
    }

    fn normalize_map(&self, mut fields: Map<String, Value>) -> ApiResult<NormalizedTripRequest> {
        for (alias, canonical) in FIELD_ALIASES {
            if let Some(value) = fields.remove(*alias) {
                if is_absent(fields.get(*canonical)) && !value.is_null() {
                    debug!("Deriving {} from {}", canonical, alias);
                    fields.insert((*canonical).to_string(), value);
                }
            }
        }

        if is_absent(fields.get("days")) {
            if let Some(days) = fields.get("travelDates").and_then(days_from_travel_dates) {
                debug!("Deriving days from travelDates: {}", days);
                fields.insert("days".to_string(), Value::from(days));
            }
        }

        // Null optional fields are treated as not sent
        fields.retain(|_, v| !v.is_null());

        fields.retain(|name, _| {
            let keep = CANONICAL_FIELDS.contains(name.as_str());
            if !keep {
                debug!("Dropping field not accepted by the backend: {}", name);
            }
            keep
        });

        for field in REQUIRED_FIELDS {
            if !fields.contains_key(*field) {
                return Err(ApiError::missing_field(field));
            }
        }

        let days = coerce_days(fields.get("days").unwrap_or(&Value::Null))?;
        fields.insert("days".to_string(), Value::from(days));

        if let Some(name) = fields
            .get("destination")
            .and_then(|d| d.get("name"))
            .and_then(Value::as_str)
            .map(str::to_string)
        {
            fields.insert("destination".to_string(), Value::String(name));
        }

        if let Some(Value::String(single)) = fields.get("interests") {
            let interests = vec![Value::String(single.clone())];
            fields.insert("interests".to_string(), Value::Array(interests));
        }

        Ok(NormalizedTripRequest::from_map(fields))
    }
}

/// Body normalizer for the trip-generation endpoint
pub fn normalize_trip_body(body: Value) -> ApiResult<Value> {
    let draft = TripDraft::try_from(body).map_err(|e| ApiError::invalid_field("body", e))?;
    FieldNormalizer.normalize(&draft).map(NormalizedTripRequest::into_value)
}

fn is_absent(value: Option<&Value>) -> bool {
    value.map_or(true, Value::is_null)
}

/// Accepts 5, 5.0, "5" and "5 days"
fn coerce_days(value: &Value) -> ApiResult<u64> {
    let parsed = match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0 && *f > 0.0).map(|f| f as u64)),
        Value::String(s) => s.split_whitespace().next().and_then(|t| t.parse::<u64>().ok()),
        _ => None,
    };

    match parsed {
        Some(days) if days > 0 => Ok(days),
        _ => Err(ApiError::invalid_field("days", format!("expected a positive whole number, got {}", value))),
    }
}

/// Inclusive day span of `{startDate, endDate}`
fn days_from_travel_dates(dates: &Value) -> Option<u64> {
    let start = parse_date(dates.get("startDate")?)?;
    let end = parse_date(dates.get("endDate")?)?;
    let span = (end - start).num_days();
    (span >= 0).then(|| span as u64 + 1)
}

fn parse_date(value: &Value) -> Option<NaiveDate> {
    let s = value.as_str()?;
    // Accept full timestamps by taking the date part
    let date_part = s.get(..10).unwrap_or(s);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}
