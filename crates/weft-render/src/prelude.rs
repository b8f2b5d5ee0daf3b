//! Commonly used types in one import.
//!
//! ```rust
//! use weft_render::prelude::*;
//!
//! let greeting = Template::builder("greeting")
//!     .text("Hello, ")
//!     .slot(param("name", scalar::text()))
//!     .build()
//!     .unwrap();
//! assert_eq!(greeting.compile().unwrap().slot_kinds(), vec![SlotKind::Dynamic]);
//! ```

pub use crate::{
    effect, param, scalar, verbatim, Codec, RenderError, RenderResult, RenderStream, SlotKind,
    Template, TemplateOptions,
};
