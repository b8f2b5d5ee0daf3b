//! Named template lookup.
//!
//! [`Registry`] maps names to built [`Template`] handles so that callers can
//! render by name. Templates are compiled when they are added, and names are
//! unique: adding a second template under a taken name is an error rather
//! than a silent replacement.
//!
//! ```rust
//! use serde_json::json;
//! use weft_render::{param, scalar, Registry, Template};
//!
//! let mut registry = Registry::new();
//! registry
//!     .add(
//!         Template::builder("greeting")
//!             .text("Hello, ")
//!             .slot(param("name", scalar::text()))
//!             .build_lazy()
//!             .unwrap(),
//!     )
//!     .unwrap();
//!
//! let result = futures::executor::block_on(registry.render("greeting", json!({"name": "Ada"})));
//! assert_eq!(result.unwrap().output, "Hello, Ada");
//! ```

use std::collections::HashMap;

use serde_json::Value;
use thiserror::Error;

use super::definition::Template;
use crate::error::{CompileError, RenderError};
use crate::render::{RenderResult, RenderStream};

/// Error type for registry operations.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// A template with the same name is already registered.
    #[error("template '{name}' is already registered")]
    Duplicate { name: String },

    #[error(transparent)]
    Compile(#[from] CompileError),
}

/// Templates addressable by name.
#[derive(Debug, Default, Clone)]
pub struct Registry {
    templates: HashMap<String, Template>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compiles and registers `template` under its own name.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Duplicate`] if the name is taken, or the
    /// template's compile error.
    pub fn add(&mut self, template: Template) -> Result<(), RegistryError> {
        if self.templates.contains_key(template.name()) {
            return Err(RegistryError::Duplicate {
                name: template.name().to_string(),
            });
        }
        template.compile()?;
        self.templates.insert(template.name().to_string(), template);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Template> {
        self.templates.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.templates.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.templates.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    fn lookup(&self, name: &str) -> Result<&Template, RenderError> {
        self.get(name)
            .ok_or_else(|| RenderError::NotFound(name.to_string()))
    }

    /// Renders the template registered as `name`.
    pub async fn render(&self, name: &str, params: Value) -> Result<RenderResult, RenderError> {
        self.lookup(name)?.render(params).await
    }

    /// Streams the template registered as `name`.
    pub fn stream(&self, name: &str, params: Value) -> Result<RenderStream, RenderError> {
        self.lookup(name)?.stream(params)
    }
}
