//! Rendering compiled templates.
//!
//! Two entry points share one evaluation path:
//!
//! - [`render`] waits for every slot and returns the whole output
//! - [`stream`] yields chunks in declaration order as soon as each slot and
//!   all slots before it are done
//!
//! For the same template and parameters, the concatenated chunks of a stream
//! equal the output of a render.

mod ordered;
mod params;
mod renderer;
mod stream;

pub use ordered::OrderedBuffer;
pub use params::{decode_params, Decoded, DecodedField};
pub use renderer::{render, RenderResult};
pub use stream::{stream, RenderStream};
