//! Decoding a parameter record against a template's field map.
//!
//! Decoding never stops at the first problem: every field of every nested
//! group is visited and all issues are collected with their full paths.

use std::collections::BTreeMap;

use serde_json::{Map, Value};
use tracing::debug;
use weft_codec::{Issue, IssueKind, Typed};

use crate::error::ValidationError;
use crate::template::{Field, FieldMap};

/// A decoded parameter record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Decoded {
    values: BTreeMap<String, DecodedField>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DecodedField {
    Value(Typed),
    Group(Decoded),
}

impl Decoded {
    pub fn value(&self, name: &str) -> Option<&Typed> {
        match self.values.get(name) {
            Some(DecodedField::Value(typed)) => Some(typed),
            _ => None,
        }
    }

    pub fn group(&self, name: &str) -> Option<&Decoded> {
        match self.values.get(name) {
            Some(DecodedField::Group(group)) => Some(group),
            _ => None,
        }
    }

    /// The normalized record as JSON.
    pub fn to_json(&self) -> Value {
        let map: Map<String, Value> = self
            .values
            .iter()
            .map(|(name, field)| {
                let value = match field {
                    DecodedField::Value(typed) => typed.to_json(),
                    DecodedField::Group(group) => group.to_json(),
                };
                (name.clone(), value)
            })
            .collect();
        Value::Object(map)
    }
}

/// Decodes `record` against `fields`.
///
/// A `null` record is treated as an empty object. With `deny_unknown`, keys
/// that no field declares are reported as `unexpected-value` issues.
pub fn decode_params(
    fields: &FieldMap,
    record: &Value,
    deny_unknown: bool,
) -> Result<Decoded, ValidationError> {
    let mut issues = Vec::new();
    let decoded = match record {
        Value::Null => decode_group(fields, None, deny_unknown, &mut Vec::new(), &mut issues),
        Value::Object(map) => {
            decode_group(fields, Some(map), deny_unknown, &mut Vec::new(), &mut issues)
        }
        other => {
            issues.push(Issue::type_mismatch("object", other));
            Decoded::default()
        }
    };

    if issues.is_empty() {
        Ok(decoded)
    } else {
        debug!(issues = issues.len(), "parameter validation failed");
        Err(ValidationError::new(issues))
    }
}

fn decode_group(
    fields: &FieldMap,
    record: Option<&Map<String, Value>>,
    deny_unknown: bool,
    path: &mut Vec<String>,
    issues: &mut Vec<Issue>,
) -> Decoded {
    let mut decoded = Decoded::default();

    for (name, field) in fields.iter() {
        let input = record.and_then(|map| map.get(name));
        path.push(name.clone());
        match field {
            Field::Param(codec) => match codec.decode(input) {
                Ok(typed) => {
                    decoded
                        .values
                        .insert(name.clone(), DecodedField::Value(typed));
                }
                Err(found) => issues.extend(found.into_iter().map(|i| i.at(path.iter().cloned()))),
            },
            Field::Group { template, fields } => {
                let nested_deny = template.options().deny_unknown_params;
                let group = match input {
                    None | Some(Value::Null) => {
                        Some(decode_group(fields, None, nested_deny, path, issues))
                    }
                    Some(Value::Object(map)) => {
                        Some(decode_group(fields, Some(map), nested_deny, path, issues))
                    }
                    Some(other) => {
                        issues.push(
                            Issue::new(
                                IssueKind::Composite,
                                format!(
                                    "parameters of '{}' must be an object, received {}",
                                    template.name(),
                                    weft_codec::json_type_name(other)
                                ),
                            )
                            .at(path.iter().cloned()),
                        );
                        None
                    }
                };
                if let Some(group) = group {
                    decoded
                        .values
                        .insert(name.clone(), DecodedField::Group(group));
                }
            }
        }
        path.pop();
    }

    if deny_unknown {
        if let Some(map) = record {
            for key in map.keys().filter(|key| !fields.contains(key)) {
                issues.push(
                    Issue::new(IssueKind::Unexpected, format!("unknown parameter '{}'", key))
                        .at(path.iter().cloned().chain(std::iter::once(key.clone()))),
                );
            }
        }
    }

    decoded
}
