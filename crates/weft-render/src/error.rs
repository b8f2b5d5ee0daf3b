//! Error types for template compilation and rendering.
//!
//! Three failure families are kept apart:
//!
//! - [`CompileError`]: the template itself is malformed. Raised when the
//!   template is compiled and never deferred to an invocation.
//! - [`ValidationError`]: the parameter record does not satisfy the
//!   template's codecs. Every issue across every field is reported at once.
//! - Evaluation failures: an effect slot's own computation failed. The
//!   underlying error is carried as-is in [`RenderError::Evaluation`].

use std::fmt;

use thiserror::Error;
use weft_codec::Issue;

/// A malformed template definition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    /// Segment and slot counts do not interleave (`segments == slots + 1`).
    #[error(
        "template '{template}' has {segments} text segments for {slots} slots (expected {expected})",
        expected = .slots + 1
    )]
    Shape {
        template: String,
        segments: usize,
        slots: usize,
    },

    /// A slot value that cannot be interpolated (arrays, objects).
    #[error("template '{template}' slot {index}: invalid template value ({found})")]
    InvalidValue {
        template: String,
        index: usize,
        found: &'static str,
    },

    /// Two slots declare the same field name with different contracts.
    #[error("template '{template}': field '{field}' is declared as {first} and as {second}")]
    ConflictingField {
        template: String,
        field: String,
        first: String,
        second: String,
    },

    /// A nested template failed to compile.
    #[error("template '{template}' nests '{nested}': {source}")]
    Nested {
        template: String,
        nested: String,
        #[source]
        source: Box<CompileError>,
    },
}

/// Every issue found in one parameter record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub issues: Vec<Issue>,
}

impl ValidationError {
    pub fn new(issues: Vec<Issue>) -> Self {
        Self { issues }
    }

    /// Whether any issue points at exactly `path`.
    pub fn has_path(&self, path: &[&str]) -> bool {
        self.issues
            .iter()
            .any(|issue| issue.path.iter().map(String::as_str).eq(path.iter().copied()))
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} invalid parameter", self.issues.len())?;
        if self.issues.len() != 1 {
            f.write_str("s")?;
        }
        for issue in &self.issues {
            write!(f, "\n  - {}", issue)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// Error type for rendering operations.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// An effect slot failed. The error is the effect's own.
    #[error("slot evaluation failed: {0}")]
    Evaluation(#[source] anyhow::Error),

    /// No template registered under the name.
    #[error("template not found: {0}")]
    NotFound(String),

    /// Streaming was requested outside a tokio runtime.
    #[error("streaming requires a tokio runtime: {0}")]
    Runtime(String),
}

impl RenderError {
    /// The validation issues, if this is a validation failure.
    pub fn issues(&self) -> Option<&[Issue]> {
        match self {
            RenderError::Validation(err) => Some(&err.issues),
            _ => None,
        }
    }
}
