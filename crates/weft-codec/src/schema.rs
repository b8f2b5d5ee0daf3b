//! Read-only constraint schema attached to every codec.

use serde::Serialize;
use serde_json::Value;

/// Declared constraints of a parameter.
///
/// The schema is data, not behaviour: codecs consult it while decoding, and
/// the template compiler compares schemas to decide whether two slots that
/// declare the same parameter name agree with each other.
///
/// `min`/`max` bound numeric values (and durations, in milliseconds);
/// `min_len`/`max_len` bound the character length of text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Schema {
    pub kind: &'static str,
    pub optional: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_len: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_len: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub one_of: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub forbidden: Vec<Value>,
}

impl Schema {
    pub fn new(kind: &'static str) -> Self {
        Self {
            kind,
            optional: false,
            default: None,
            min: None,
            max: None,
            min_len: None,
            max_len: None,
            pattern: None,
            one_of: None,
            forbidden: Vec::new(),
        }
    }

    /// Whether absent input is acceptable.
    pub fn accepts_absent(&self) -> bool {
        self.optional || self.default.is_some()
    }
}
