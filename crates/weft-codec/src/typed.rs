//! Decoded parameter values.

use std::time::Duration;

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde_json::Value;
use uuid::Uuid;

use crate::duration::format_duration;

/// A parameter value after decoding.
///
/// This is what a [`Codec`](crate::Codec) produces from external input and
/// consumes again when encoding the value into template text.
#[derive(Debug, Clone, PartialEq)]
pub enum Typed {
    /// Absent optional value. Encodes to empty text.
    Null,
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    /// Arbitrary precision integer, stored as a canonical decimal string.
    BigInt(String),
    Uuid(Uuid),
    /// Canonical (uppercase) 26-character ULID.
    Ulid(String),
    Date(NaiveDate),
    DateTime(DateTime<FixedOffset>),
    Duration(Duration),
    Json(Value),
}

impl Typed {
    /// Short name of the variant, used in encode diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Typed::Null => "null",
            Typed::Text(_) => "text",
            Typed::Int(_) => "int",
            Typed::Float(_) => "number",
            Typed::Bool(_) => "boolean",
            Typed::BigInt(_) => "bigint",
            Typed::Uuid(_) => "uuid",
            Typed::Ulid(_) => "ulid",
            Typed::Date(_) => "date",
            Typed::DateTime(_) => "datetime",
            Typed::Duration(_) => "duration",
            Typed::Json(_) => "json",
        }
    }

    /// The default textual form of the value.
    pub fn to_text(&self) -> String {
        match self {
            Typed::Null => String::new(),
            Typed::Text(s) | Typed::BigInt(s) | Typed::Ulid(s) => s.clone(),
            Typed::Int(n) => n.to_string(),
            Typed::Float(n) => n.to_string(),
            Typed::Bool(b) => b.to_string(),
            Typed::Uuid(u) => u.hyphenated().to_string(),
            Typed::Date(d) => d.format("%Y-%m-%d").to_string(),
            Typed::DateTime(dt) => dt.to_rfc3339(),
            Typed::Duration(d) => format_duration(*d),
            Typed::Json(v) => v.to_string(),
        }
    }

    /// Converts back into JSON, e.g. for echoing normalized parameters.
    pub fn to_json(&self) -> Value {
        match self {
            Typed::Null => Value::Null,
            Typed::Int(n) => Value::from(*n),
            Typed::Float(n) => serde_json::Number::from_f64(*n)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            Typed::Bool(b) => Value::Bool(*b),
            Typed::Json(v) => v.clone(),
            other => Value::String(other.to_text()),
        }
    }
}
