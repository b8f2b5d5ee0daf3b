//! Validation issues reported by codecs.
//!
//! An [`Issue`] is one structured diagnostic: what went wrong ([`IssueKind`]),
//! where (`path`, a list of record keys from the root parameter record), and a
//! human-readable message. Codecs report paths relative to the value they
//! were handed; the renderer prefixes the field path before surfacing them.

use std::fmt;

use serde::Serialize;

/// The closed set of validation failure kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum IssueKind {
    /// A required value is absent.
    #[serde(rename = "position-missing")]
    Missing,
    /// The value has the wrong shape (e.g. an object where a number belongs).
    #[serde(rename = "type-mismatch")]
    TypeMismatch,
    /// A composite value (a nested parameter group) failed as a whole.
    #[serde(rename = "composite-failure")]
    Composite,
    /// The value had the right shape but could not be parsed or converted.
    #[serde(rename = "transform-failure")]
    Transform,
    /// A declared constraint (min, max, length, pattern) was violated.
    #[serde(rename = "refinement-failure")]
    Refinement,
    /// The value is not one of the accepted values, or the key is not declared.
    #[serde(rename = "unexpected-value")]
    Unexpected,
    /// The value is explicitly forbidden.
    #[serde(rename = "forbidden-value")]
    Forbidden,
}

impl IssueKind {
    /// The wire name of this kind, as used in serialized diagnostics.
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueKind::Missing => "position-missing",
            IssueKind::TypeMismatch => "type-mismatch",
            IssueKind::Composite => "composite-failure",
            IssueKind::Transform => "transform-failure",
            IssueKind::Refinement => "refinement-failure",
            IssueKind::Unexpected => "unexpected-value",
            IssueKind::Forbidden => "forbidden-value",
        }
    }
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single validation diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    pub kind: IssueKind,
    pub path: Vec<String>,
    pub message: String,
}

impl Issue {
    /// Creates an issue with an empty (relative root) path.
    pub fn new(kind: IssueKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            path: Vec::new(),
            message: message.into(),
        }
    }

    pub fn missing() -> Self {
        Self::new(IssueKind::Missing, "required value is missing")
    }

    pub fn type_mismatch(expected: &str, found: &serde_json::Value) -> Self {
        Self::new(
            IssueKind::TypeMismatch,
            format!("expected {}, received {}", expected, json_type_name(found)),
        )
    }

    /// Returns this issue with `prefix` prepended to its path.
    pub fn at<I, S>(mut self, prefix: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut path: Vec<String> = prefix.into_iter().map(Into::into).collect();
        path.append(&mut self.path);
        self.path = path;
        self
    }

    /// The path joined with dots, or `<root>` for an empty path.
    pub fn dotted_path(&self) -> String {
        if self.path.is_empty() {
            "<root>".to_string()
        } else {
            self.path.join(".")
        }
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}: {}", self.kind, self.dotted_path(), self.message)
    }
}

/// Describes a JSON value's type for diagnostics.
pub fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
