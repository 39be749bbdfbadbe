//! Canonical records for endpoints that report the same logical resource
//! under different field names.
//!
//! The backend grew separate endpoints for "a single numeric rate plus its
//! last-update timestamp" (onramp rate, offramp rate, NGN markup), each
//! naming the fields differently. Every consumer goes through this module,
//! so a new shape variant needs exactly one change here.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

/// Canonical rate value plus its last-update timestamp.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RateRecord {
    pub value: f64,
    pub updated_at: Option<String>,
}

impl RateRecord {
    /// The update timestamp parsed as RFC 3339, when present and valid.
    pub fn updated_at_time(&self) -> Option<DateTime<Utc>> {
        self.updated_at
            .as_deref()
            .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
            .map(|parsed| parsed.with_timezone(&Utc))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RateResponse {
    pub success: bool,
    pub message: Option<String>,
    pub data: RateRecord,
}

/// Canonical global asset-markdown record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkdownRecord {
    pub markdown_percentage: f64,
    pub formatted_percentage: Option<String>,
    pub description: Option<String>,
    pub is_active: bool,
    pub updated_at: Option<String>,
    pub updated_by: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkdownResponse {
    pub success: bool,
    pub message: Option<String>,
    pub data: Option<MarkdownRecord>,
}

/// Map any of the known rate payload shapes into the canonical record.
///
/// Never panics: every field has a fallback (`value` -> 0.0, `updated_at`
/// -> `None`, `success` -> false). Key probing is first-present-wins: a
/// present-but-garbage value falls back rather than falling through to the
/// next key.
pub fn normalize_rate(raw: &Value) -> RateResponse {
    let success = raw.get("success").and_then(Value::as_bool).unwrap_or(false);
    let message = raw
        .get("message")
        .and_then(Value::as_str)
        .map(str::to_string);

    let data = raw.get("data").unwrap_or(&Value::Null);
    let value = probe_number(data, &["rate", "onrampRate", "offrampRate", "markup"]);
    let updated_at = probe_string(data, &["updatedAt", "lastUpdated", "last_updated"]);

    RateResponse {
        success,
        message,
        data: RateRecord { value, updated_at },
    }
}

/// Map the global markdown payload into the canonical record. A missing or
/// non-object `data` field yields `data: None` rather than an error.
pub fn normalize_global_markdown(raw: &Value) -> MarkdownResponse {
    let success = raw.get("success").and_then(Value::as_bool).unwrap_or(false);
    let message = raw
        .get("message")
        .and_then(Value::as_str)
        .map(str::to_string);

    let data = match raw.get("data") {
        Some(data) if data.is_object() => Some(MarkdownRecord {
            markdown_percentage: probe_number(data, &["markdownPercentage", "markdown"]),
            formatted_percentage: data
                .get("formattedPercentage")
                .and_then(Value::as_str)
                .map(str::to_string),
            description: data
                .get("description")
                .and_then(Value::as_str)
                .map(str::to_string),
            is_active: probe_bool(data, &["isActive", "active"]),
            updated_at: probe_string(data, &["updatedAt", "lastUpdated", "last_updated"]),
            updated_by: data
                .get("updatedBy")
                .and_then(Value::as_str)
                .map(str::to_string),
        }),
        _ => None,
    };

    MarkdownResponse {
        success,
        message,
        data,
    }
}

fn probe_number(data: &Value, keys: &[&str]) -> f64 {
    for key in keys {
        if let Some(value) = data.get(key) {
            if !value.is_null() {
                return coerce_number(value);
            }
        }
    }
    0.0
}

fn coerce_number(value: &Value) -> f64 {
    let parsed = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    };
    match parsed {
        Some(number) if number.is_finite() => number,
        _ => 0.0,
    }
}

fn probe_string(data: &Value, keys: &[&str]) -> Option<String> {
    for key in keys {
        if let Some(value) = data.get(key) {
            if !value.is_null() {
                return value.as_str().map(str::to_string);
            }
        }
    }
    None
}

fn probe_bool(data: &Value, keys: &[&str]) -> bool {
    for key in keys {
        if let Some(value) = data.get(key) {
            if !value.is_null() {
                return match value {
                    Value::Bool(flag) => *flag,
                    Value::String(text) => text == "true",
                    Value::Number(number) => number.as_f64().map(|n| n != 0.0).unwrap_or(false),
                    _ => false,
                };
            }
        }
    }
    false
}
