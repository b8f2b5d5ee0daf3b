//! # Weft Render - Compiled Templates with Ordered Streaming
//!
//! `weft-render` turns a literal template (text segments interleaved with
//! typed slots) into a reusable renderer. Parameters are validated through
//! [`weft_codec`] codecs, every slot is evaluated concurrently, and the
//! output is produced either as one string or as a stream of chunks that
//! always arrives in declaration order.
//!
//! ## Core Concepts
//!
//! - [`Template`]: an immutable definition, built with [`Template::builder`]
//! - [`SlotValue`]: literals, [`param`]s, nested templates, [`effect`]s and
//!   [`verbatim`] values
//! - [`CompiledTemplate`]: slot classification, the flattened parameter
//!   [`FieldMap`] and pre-dedented segments, computed once per template
//! - [`Template::render`] and [`Template::stream`]: the two ways to run it
//! - [`Registry`]: templates by name
//!
//! ## Quick Start
//!
//! ```rust
//! use serde_json::json;
//! use weft_render::{param, scalar, Template};
//!
//! let card = Template::builder("card")
//!     .dedent(true)
//!     .text("\n    <div>\n      ")
//!     .slot(param("body", scalar::text()))
//!     .text("\n    </div>")
//!     .build()
//!     .unwrap();
//!
//! let result = futures::executor::block_on(
//!     card.render(json!({"body": "line one\nline two"})),
//! )
//! .unwrap();
//! assert_eq!(result.output, "\n<div>\n  line one\n  line two\n</div>");
//! ```
//!
//! ## Streaming
//!
//! Streams run each dynamic slot as a tokio task and need a runtime:
//!
//! ```rust
//! use futures::StreamExt;
//! use serde_json::Value;
//! use weft_render::{effect, Template};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let page = Template::builder("page")
//!     .text("<h1>")
//!     .slot(effect(|| async { Ok("title".to_string()) }))
//!     .text("</h1>")
//!     .build()
//!     .unwrap();
//!
//! let chunks: Vec<String> = page
//!     .stream(Value::Null)
//!     .unwrap()
//!     .map(|chunk| chunk.unwrap())
//!     .collect()
//!     .await;
//! assert_eq!(chunks, vec!["<h1>", "title", "</h1>"]);
//! # }
//! ```
//!
//! ## Indentation
//!
//! See [`indent`] for the dedent rules shared by both renderers.

mod error;
pub mod indent;
mod options;
pub mod prelude;
pub mod render;
pub mod template;

pub use error::{CompileError, RenderError, ValidationError};
pub use indent::IndentTracker;
pub use options::{OptionsError, TemplateOptions};
pub use render::{
    decode_params, render, stream, Decoded, DecodedField, OrderedBuffer, RenderResult,
    RenderStream,
};
pub use template::{
    compile, effect, param, verbatim, CompiledSlot, CompiledTemplate, Effect, EffectFuture,
    Field, FieldMap, Param, Registry, RegistryError, SlotKind, SlotValue, Template,
    TemplateBuilder, TemplateId,
};

// Codec catalog, so templates can be declared with one import
pub use weft_codec::{scalar, Codec, Issue, IssueKind, SharedCodec, Typed};
