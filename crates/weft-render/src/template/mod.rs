//! Template definition, compilation and lookup.
//!
//! - [`slot`]: the values a template can interpolate
//! - [`Template`] / [`TemplateBuilder`]: immutable definitions
//! - [`CompiledTemplate`]: the classified, shareable compile artifact
//! - [`Registry`]: templates by name

mod compiler;
mod definition;
mod registry;
pub mod slot;

pub use compiler::{compile, CompiledSlot, CompiledTemplate, Field, FieldMap, SlotKind};
pub use definition::{Template, TemplateBuilder, TemplateId};
pub use registry::{Registry, RegistryError};
pub use slot::{effect, param, verbatim, Effect, EffectFuture, Param, SlotValue};
