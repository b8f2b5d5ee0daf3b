//! Per-template rendering options.
//!
//! Options are usually set on the [`TemplateBuilder`](crate::TemplateBuilder),
//! but they are plain serde data so applications can keep them in
//! configuration files:
//!
//! ```rust
//! use weft_render::TemplateOptions;
//!
//! let options = TemplateOptions::from_yaml("dedent: true\n").unwrap();
//! assert!(options.dedent);
//! assert!(!options.deny_unknown_params);
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How a template treats its literal text and its parameter record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TemplateOptions {
    /// Strip the common indentation of the literal text and reindent
    /// multiline values to their insertion line.
    pub dedent: bool,
    /// Report record keys that no slot declares as `unexpected-value` issues.
    pub deny_unknown_params: bool,
}

/// Failure to load [`TemplateOptions`].
#[derive(Debug, Error)]
pub enum OptionsError {
    #[error("invalid YAML options: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid JSON options: {0}")]
    Json(#[from] serde_json::Error),
}

impl TemplateOptions {
    pub fn dedent() -> Self {
        Self {
            dedent: true,
            ..Self::default()
        }
    }

    pub fn from_yaml(source: &str) -> Result<Self, OptionsError> {
        if source.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(source)?)
    }

    pub fn from_json(source: &str) -> Result<Self, OptionsError> {
        Ok(serde_json::from_str(source)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = TemplateOptions::default();
        assert!(!options.dedent);
        assert!(!options.deny_unknown_params);
        assert_eq!(TemplateOptions::from_yaml("").unwrap(), options);
    }

    #[test]
    fn test_from_yaml() {
        let options =
            TemplateOptions::from_yaml("dedent: true\ndeny_unknown_params: true").unwrap();
        assert_eq!(
            options,
            TemplateOptions {
                dedent: true,
                deny_unknown_params: true
            }
        );
    }

    #[test]
    fn test_unknown_keys_rejected() {
        let err = TemplateOptions::from_yaml("dedentt: true").unwrap_err();
        assert!(matches!(err, OptionsError::Yaml(_)));
        assert!(err.to_string().contains("dedentt"));
    }

    #[test]
    fn test_from_json() {
        let options = TemplateOptions::from_json(r#"{"dedent": true}"#).unwrap();
        assert_eq!(options, TemplateOptions::dedent());
    }
}
