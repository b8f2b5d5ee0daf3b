//! # Weft - Typed Text Templates
//!
//! Weft renders literal templates whose slots are typed parameters, nested
//! templates or asynchronous effects. Parameters are validated up front and
//! every problem in a record is reported at once; slots are evaluated
//! concurrently; output is either one string or a stream of chunks in
//! declaration order.
//!
//! This crate re-exports [`weft_render`] (templates, renderers, registry)
//! and [`weft_codec`] (the parameter codec catalog).
//!
//! ## Quick Start
//!
//! ```rust
//! use serde_json::json;
//! use weft::prelude::*;
//!
//! let link = Template::builder("link")
//!     .text("<a href=\"")
//!     .slot(param("href", scalar::text().pattern("^https://").unwrap()))
//!     .text("\">")
//!     .slot(param("label", scalar::text().max_len(40)))
//!     .text("</a>")
//!     .build()
//!     .unwrap();
//!
//! let params = json!({"href": "https://example.com", "label": "home"});
//! let result = futures::executor::block_on(link.render(params)).unwrap();
//! assert_eq!(result.output, "<a href=\"https://example.com\">home</a>");
//!
//! let err = futures::executor::block_on(link.render(json!({"href": "ftp://x"}))).unwrap_err();
//! assert_eq!(err.issues().unwrap().len(), 2);
//! ```
//!
//! ## Crates
//!
//! | Crate | Contents |
//! |-------|----------|
//! | `weft-codec` | [`Codec`], [`Typed`], [`Schema`], [`Issue`], the [`scalar`] catalog |
//! | `weft-render` | [`Template`], [`Registry`], [`render()`], [`stream()`], [`OrderedBuffer`] |

pub use weft_codec::{
    duration, format_duration, json_type_name, parse_duration, same_contract, scalar, Codec,
    CodecError, DurationError, Issue, IssueKind, ScalarCodec, ScalarKind, Schema, SharedCodec,
    Typed,
};
pub use weft_render::{
    compile, decode_params, effect, indent, param, render, stream, verbatim, CompileError,
    CompiledSlot, CompiledTemplate, Decoded, DecodedField, Effect, EffectFuture, Field, FieldMap,
    IndentTracker, OptionsError, OrderedBuffer, Param, Registry, RegistryError, RenderError,
    RenderResult, RenderStream, SlotKind, SlotValue, Template, TemplateBuilder, TemplateId,
    TemplateOptions, ValidationError,
};

pub mod prelude {
    //! Everything needed to declare and render templates.
    pub use weft_render::prelude::*;
    pub use weft_render::{Registry, ValidationError};
    pub use weft_codec::{Issue, IssueKind, Typed};
}
