//! Response interpretation shared by every data source.

use super::LoadFailure;
use crate::models::{Dataset, Row};
use reqwest::StatusCode;
use serde_json::Value;
use tracing::{debug, warn};

/// Reject non-success statuses, naming the reason phrase.
pub fn check_status(status: StatusCode) -> Result<(), LoadFailure> {
    if status.is_success() {
        return Ok(());
    }

    let text = status
        .canonical_reason()
        .map(String::from)
        .unwrap_or_else(|| status.as_str().to_string());

    Err(LoadFailure::Status(text))
}

/// Interpret a response body as a dataset.
///
/// Accepts an array of row objects. An object with a truthy `error` field is
/// a server-side failure; its `details` are preferred for the message.
pub fn parse_payload(body: &str) -> Result<Dataset, LoadFailure> {
    let value: Value =
        serde_json::from_str(body).map_err(|e| LoadFailure::InvalidBody(e.to_string()))?;

    match value {
        Value::Array(items) => {
            let mut rows = Vec::with_capacity(items.len());

            for (index, item) in items.into_iter().enumerate() {
                if !item.is_object() {
                    warn!("Row {} is not an object", index);
                    return Err(LoadFailure::UnexpectedShape);
                }
                let row: Row = serde_json::from_value(item)
                    .map_err(|e| LoadFailure::InvalidBody(format!("row {}: {}", index, e)))?;
                rows.push(row);
            }

            debug!("Parsed {} rows", rows.len());
            Ok(Dataset::new(rows))
        }
        Value::Object(map) => match map.get("error").filter(|e| is_truthy(e)) {
            Some(error) => {
                let message = map
                    .get("details")
                    .filter(|d| is_truthy(d))
                    .unwrap_or(error);
                Err(LoadFailure::Server(display_value(message)))
            }
            None => Err(LoadFailure::UnexpectedShape),
        },
        _ => Err(LoadFailure::UnexpectedShape),
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
