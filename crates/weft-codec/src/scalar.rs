//! The built-in codec catalog.
//!
//! All catalog codecs are [`ScalarCodec`] values, created by the constructor
//! functions in this module and refined with chained constraint methods:
//!
//! ```rust
//! use serde_json::json;
//! use weft_codec::{scalar, Codec, IssueKind};
//!
//! let port = scalar::int().min(1.0).max(65535.0);
//! assert!(port.decode(Some(&json!("8080"))).is_ok());
//!
//! let issues = port.decode(Some(&json!(0))).unwrap_err();
//! assert_eq!(issues[0].kind, IssueKind::Refinement);
//! ```
//!
//! # Coercion
//!
//! | Kind | Accepts |
//! |------|---------|
//! | `text`, `raw` | strings; numbers and booleans are textified |
//! | `int` | integral numbers, numeric strings |
//! | `number` | numbers, numeric strings (finite only) |
//! | `boolean` | booleans, `0`/`1`, `true/false/yes/no/1/0` strings |
//! | `uuid`, `ulid`, `date`, `datetime` | strings in the canonical format |
//! | `duration` | compact strings (`1h30m`), integral milliseconds |
//! | `bigint` | integral numbers, decimal digit strings of any length |
//! | `json` | any value |

use std::time::Duration;

use chrono::{DateTime, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use uuid::Uuid;

use crate::codec::Codec;
use crate::duration::parse_duration;
use crate::error::{CodecError, Result};
use crate::issue::{Issue, IssueKind};
use crate::schema::Schema;
use crate::typed::Typed;

static ULID: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-7][0-9A-HJKMNP-TV-Za-hjkmnp-tv-z]{25}$").expect("valid ulid regex")
});
static BIGINT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[+-]?\d+$").expect("valid bigint regex"));

/// The catalog kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    Text,
    Raw,
    Int,
    Number,
    Boolean,
    Uuid,
    Ulid,
    Date,
    DateTime,
    Duration,
    BigInt,
    Json,
}

impl ScalarKind {
    pub fn name(&self) -> &'static str {
        match self {
            ScalarKind::Text => "text",
            ScalarKind::Raw => "raw",
            ScalarKind::Int => "int",
            ScalarKind::Number => "number",
            ScalarKind::Boolean => "boolean",
            ScalarKind::Uuid => "uuid",
            ScalarKind::Ulid => "ulid",
            ScalarKind::Date => "date",
            ScalarKind::DateTime => "datetime",
            ScalarKind::Duration => "duration",
            ScalarKind::BigInt => "bigint",
            ScalarKind::Json => "json",
        }
    }

    /// Whether a decoded value belongs to this kind.
    fn admits(&self, value: &Typed) -> bool {
        matches!(
            (self, value),
            (_, Typed::Null)
                | (ScalarKind::Text | ScalarKind::Raw, Typed::Text(_))
                | (ScalarKind::Int, Typed::Int(_))
                | (ScalarKind::Number, Typed::Float(_) | Typed::Int(_))
                | (ScalarKind::Boolean, Typed::Bool(_))
                | (ScalarKind::Uuid, Typed::Uuid(_))
                | (ScalarKind::Ulid, Typed::Ulid(_))
                | (ScalarKind::Date, Typed::Date(_))
                | (ScalarKind::DateTime, Typed::DateTime(_))
                | (ScalarKind::Duration, Typed::Duration(_))
                | (ScalarKind::BigInt, Typed::BigInt(_))
                | (ScalarKind::Json, _)
        )
    }
}

/// A catalog codec: one [`ScalarKind`] plus its constraint [`Schema`].
#[derive(Debug, Clone)]
pub struct ScalarCodec {
    kind: ScalarKind,
    schema: Schema,
    pattern: Option<Regex>,
}

impl ScalarCodec {
    pub fn new(kind: ScalarKind) -> Self {
        Self {
            kind,
            schema: Schema::new(kind.name()),
            pattern: None,
        }
    }

    pub fn scalar_kind(&self) -> ScalarKind {
        self.kind
    }

    /// Accepts absent input, decoding it to [`Typed::Null`].
    pub fn optional(mut self) -> Self {
        self.schema.optional = true;
        self
    }

    /// Uses `value` when the input is absent.
    ///
    /// # Errors
    ///
    /// Returns an error if `value` does not itself decode with this codec.
    pub fn default(mut self, value: impl Into<Value>) -> Result<Self> {
        let value = value.into();
        if let Err(issues) = self.decode_present(&value) {
            return Err(CodecError::InvalidDefault {
                kind: self.kind.name(),
                message: join_messages(&issues),
            });
        }
        self.schema.default = Some(value);
        Ok(self)
    }

    /// Lower bound for numeric kinds (durations compare in milliseconds).
    pub fn min(mut self, min: f64) -> Self {
        self.schema.min = Some(min);
        self
    }

    /// Upper bound for numeric kinds (durations compare in milliseconds).
    pub fn max(mut self, max: f64) -> Self {
        self.schema.max = Some(max);
        self
    }

    pub fn min_len(mut self, len: usize) -> Self {
        self.schema.min_len = Some(len);
        self
    }

    pub fn max_len(mut self, len: usize) -> Self {
        self.schema.max_len = Some(len);
        self
    }

    /// Requires the textual form of the value to match `pattern`.
    pub fn pattern(mut self, pattern: &str) -> Result<Self> {
        self.pattern = Some(Regex::new(pattern)?);
        self.schema.pattern = Some(pattern.to_string());
        Ok(self)
    }

    /// Restricts the value to an enumerated set (compared after decoding).
    pub fn one_of<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.schema.one_of = Some(values.into_iter().map(Into::into).collect());
        self
    }

    /// Rejects one specific value (compared after decoding).
    pub fn forbid(mut self, value: impl Into<Value>) -> Self {
        self.schema.forbidden.push(value.into());
        self
    }

    fn decode_present(&self, input: &Value) -> std::result::Result<Typed, Vec<Issue>> {
        let typed = self.coerce(input).map_err(|issue| vec![issue])?;
        let issues = self.refine(&typed);
        if issues.is_empty() {
            Ok(typed)
        } else {
            Err(issues)
        }
    }

    fn coerce(&self, input: &Value) -> std::result::Result<Typed, Issue> {
        match self.kind {
            ScalarKind::Text | ScalarKind::Raw => match input {
                Value::String(s) => Ok(Typed::Text(s.clone())),
                Value::Number(n) => Ok(Typed::Text(n.to_string())),
                Value::Bool(b) => Ok(Typed::Text(b.to_string())),
                other => Err(Issue::type_mismatch("string", other)),
            },
            ScalarKind::Int => match input {
                Value::Number(n) => n
                    .as_i64()
                    .map(Typed::Int)
                    .ok_or_else(|| transform(format!("{} is not a 64-bit integer", n))),
                Value::String(s) => s
                    .trim()
                    .parse::<i64>()
                    .map(Typed::Int)
                    .map_err(|_| transform(format!("'{}' is not an integer", s))),
                other => Err(Issue::type_mismatch("integer", other)),
            },
            ScalarKind::Number => {
                let parsed = match input {
                    Value::Number(n) => n.as_f64(),
                    Value::String(s) => s.trim().parse::<f64>().ok(),
                    other => return Err(Issue::type_mismatch("number", other)),
                };
                match parsed {
                    Some(n) if n.is_finite() => Ok(Typed::Float(n)),
                    _ => Err(transform(format!("{} is not a finite number", input))),
                }
            }
            ScalarKind::Boolean => match input {
                Value::Bool(b) => Ok(Typed::Bool(*b)),
                Value::Number(n) if n.as_u64() == Some(0) => Ok(Typed::Bool(false)),
                Value::Number(n) if n.as_u64() == Some(1) => Ok(Typed::Bool(true)),
                Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                    "true" | "yes" | "1" => Ok(Typed::Bool(true)),
                    "false" | "no" | "0" => Ok(Typed::Bool(false)),
                    _ => Err(transform(format!("'{}' is not a boolean", s))),
                },
                Value::Number(n) => Err(transform(format!("{} is not a boolean", n))),
                other => Err(Issue::type_mismatch("boolean", other)),
            },
            ScalarKind::Uuid => {
                let s = expect_string(input)?;
                Uuid::parse_str(s.trim())
                    .map(Typed::Uuid)
                    .map_err(|e| transform(format!("'{}' is not a UUID: {}", s, e)))
            }
            ScalarKind::Ulid => {
                let s = expect_string(input)?;
                let s = s.trim();
                if ULID.is_match(s) {
                    Ok(Typed::Ulid(s.to_ascii_uppercase()))
                } else {
                    Err(transform(format!("'{}' is not a ULID", s)))
                }
            }
            ScalarKind::Date => {
                let s = expect_string(input)?;
                NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
                    .map(Typed::Date)
                    .map_err(|e| transform(format!("'{}' is not a YYYY-MM-DD date: {}", s, e)))
            }
            ScalarKind::DateTime => {
                let s = expect_string(input)?;
                DateTime::parse_from_rfc3339(s.trim())
                    .map(Typed::DateTime)
                    .map_err(|e| transform(format!("'{}' is not an RFC 3339 datetime: {}", s, e)))
            }
            ScalarKind::Duration => match input {
                Value::String(s) => parse_duration(s)
                    .map(Typed::Duration)
                    .map_err(|e| transform(e.to_string())),
                Value::Number(n) => n
                    .as_u64()
                    .map(|ms| Typed::Duration(Duration::from_millis(ms)))
                    .ok_or_else(|| {
                        transform(format!("{} is not a whole number of milliseconds", n))
                    }),
                other => Err(Issue::type_mismatch("duration string", other)),
            },
            ScalarKind::BigInt => match input {
                Value::Number(n) if n.is_i64() || n.is_u64() => Ok(Typed::BigInt(n.to_string())),
                Value::Number(n) => Err(transform(format!("{} is not an integer", n))),
                Value::String(s) if BIGINT.is_match(s.trim()) => {
                    Ok(Typed::BigInt(canonical_bigint(s.trim())))
                }
                Value::String(s) => Err(transform(format!("'{}' is not an integer", s))),
                other => Err(Issue::type_mismatch("integer", other)),
            },
            ScalarKind::Json => Ok(Typed::Json(input.clone())),
        }
    }

    fn refine(&self, typed: &Typed) -> Vec<Issue> {
        let schema = &self.schema;
        let mut issues = Vec::new();
        let json = typed.to_json();

        if schema.forbidden.iter().any(|v| *v == json) {
            issues.push(Issue::new(
                IssueKind::Forbidden,
                format!("{} is not allowed", json),
            ));
        }
        if let Some(allowed) = &schema.one_of {
            if !allowed.contains(&json) {
                issues.push(Issue::new(
                    IssueKind::Unexpected,
                    format!("{} is not one of {}", json, Value::Array(allowed.clone())),
                ));
            }
        }

        if let Some(n) = numeric(typed) {
            if let Some(min) = schema.min.filter(|min| n < *min) {
                issues.push(refinement(format!("{} is less than the minimum {}", n, min)));
            }
            if let Some(max) = schema.max.filter(|max| n > *max) {
                issues.push(refinement(format!("{} is greater than the maximum {}", n, max)));
            }
        }

        if let Typed::Text(s) = typed {
            let len = s.chars().count();
            if let Some(min) = schema.min_len.filter(|min| len < *min) {
                issues.push(refinement(format!("length {} is shorter than {}", len, min)));
            }
            if let Some(max) = schema.max_len.filter(|max| len > *max) {
                issues.push(refinement(format!("length {} is longer than {}", len, max)));
            }
        }

        if let Some(re) = &self.pattern {
            let text = typed.to_text();
            if !re.is_match(&text) {
                issues.push(refinement(format!(
                    "'{}' does not match pattern {}",
                    text,
                    re.as_str()
                )));
            }
        }

        issues
    }
}

impl Codec for ScalarCodec {
    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn decode(&self, input: Option<&Value>) -> std::result::Result<Typed, Vec<Issue>> {
        match input {
            None | Some(Value::Null) => match &self.schema.default {
                Some(default) => self.decode_present(default),
                None if self.schema.optional => Ok(Typed::Null),
                None => Err(vec![Issue::missing()]),
            },
            Some(value) => self.decode_present(value),
        }
    }

    fn encode(&self, value: &Typed) -> std::result::Result<String, Vec<Issue>> {
        if !self.kind.admits(value) {
            return Err(vec![Issue::new(
                IssueKind::TypeMismatch,
                format!(
                    "cannot encode a {} value with the {} codec",
                    value.type_name(),
                    self.kind.name()
                ),
            )]);
        }
        Ok(value.to_text())
    }

    fn verbatim(&self) -> bool {
        self.kind == ScalarKind::Raw
    }
}

fn transform(message: String) -> Issue {
    Issue::new(IssueKind::Transform, message)
}

fn refinement(message: String) -> Issue {
    Issue::new(IssueKind::Refinement, message)
}

fn expect_string(input: &Value) -> std::result::Result<&str, Issue> {
    input
        .as_str()
        .ok_or_else(|| Issue::type_mismatch("string", input))
}

fn numeric(typed: &Typed) -> Option<f64> {
    match typed {
        Typed::Int(n) => Some(*n as f64),
        Typed::Float(n) => Some(*n),
        Typed::BigInt(s) => s.parse().ok(),
        Typed::Duration(d) => Some(d.as_millis() as f64),
        _ => None,
    }
}

/// Strips a leading `+` and redundant zeros; `-0` becomes `0`.
fn canonical_bigint(s: &str) -> String {
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let digits = digits.trim_start_matches('0');
    if digits.is_empty() {
        "0".to_string()
    } else if negative {
        format!("-{}", digits)
    } else {
        digits.to_string()
    }
}

fn join_messages(issues: &[Issue]) -> String {
    issues
        .iter()
        .map(|i| i.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

pub fn text() -> ScalarCodec {
    ScalarCodec::new(ScalarKind::Text)
}

/// Text that is inserted verbatim, bypassing reindentation.
pub fn raw() -> ScalarCodec {
    ScalarCodec::new(ScalarKind::Raw)
}

pub fn int() -> ScalarCodec {
    ScalarCodec::new(ScalarKind::Int)
}

pub fn number() -> ScalarCodec {
    ScalarCodec::new(ScalarKind::Number)
}

pub fn boolean() -> ScalarCodec {
    ScalarCodec::new(ScalarKind::Boolean)
}

pub fn uuid() -> ScalarCodec {
    ScalarCodec::new(ScalarKind::Uuid)
}

pub fn ulid() -> ScalarCodec {
    ScalarCodec::new(ScalarKind::Ulid)
}

pub fn date() -> ScalarCodec {
    ScalarCodec::new(ScalarKind::Date)
}

pub fn datetime() -> ScalarCodec {
    ScalarCodec::new(ScalarKind::DateTime)
}

pub fn duration() -> ScalarCodec {
    ScalarCodec::new(ScalarKind::Duration)
}

pub fn bigint() -> ScalarCodec {
    ScalarCodec::new(ScalarKind::BigInt)
}

pub fn json() -> ScalarCodec {
    ScalarCodec::new(ScalarKind::Json)
}
