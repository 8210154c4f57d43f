//! Logging utilities
//!
//! Subscriber setup and body summaries for debug logs

use crate::config::settings::LoggingConfig;
use serde_json::Value;

/// Set to true to log full request/response bodies at debug level
/// Default is false to keep traveler data out of logs
pub const VERBOSE_BODY_LOGGING: bool = false;

/// Strings longer than this are truncated in summaries
const MAX_STRING_LEN: usize = 80;

/// Arrays longer than this are collapsed in summaries
const MAX_ARRAY_ITEMS: usize = 5;

/// Truncate a string with a note about original length
fn truncate_content(s: &str, max_len: usize) -> String {
    let total = s.chars().count();
    if total > max_len {
        let head: String = s.chars().take(max_len).collect();
        format!("{}... ({} chars truncated)", head, total - max_len)
    } else {
        s.to_string()
    }
}

/// Create a filtered summary of a JSON body for logging
/// Keeps the original structure but truncates verbose content
pub fn summarize_body(body: &Value) -> Value {
    if VERBOSE_BODY_LOGGING {
        return body.clone();
    }

    match body {
        Value::String(s) => Value::String(truncate_content(s, MAX_STRING_LEN)),
        Value::Array(items) if items.len() > MAX_ARRAY_ITEMS => {
            let mut preview: Vec<Value> = items.iter().take(MAX_ARRAY_ITEMS).map(summarize_body).collect();
            preview.push(Value::String(format!("...and {} more items", items.len() - MAX_ARRAY_ITEMS)));
            Value::Array(preview)
        }
        Value::Array(items) => Value::Array(items.iter().map(summarize_body).collect()),
        Value::Object(map) => Value::Object(map.iter().map(|(k, v)| (k.clone(), summarize_body(v))).collect()),
        other => other.clone(),
    }
}

/// Initialize the global tracing subscriber
///
/// JSON output for production, human readable text otherwise.
pub fn init_logging(config: &LoggingConfig) -> anyhow::Result<()> {
    let subscriber: Box<dyn tracing::Subscriber + Send + Sync> = if config.format == "json" {
        Box::new(
            tracing_subscriber::fmt()
                .with_env_filter(config.level.as_str())
                .json()
                .with_current_span(true)
                .with_span_list(false)
                .finish(),
        )
    } else {
        Box::new(
            tracing_subscriber::fmt()
                .with_env_filter(config.level.as_str())
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .finish(),
        )
    };

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to set tracing subscriber: {}", e))?;

    tracing::info!("Logging system initialized");
    Ok(())
}
