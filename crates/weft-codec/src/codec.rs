//! The codec contract.
//!
//! Every declared template parameter carries a codec. The template engine
//! treats codecs as opaque capabilities and relies on exactly this contract:
//!
//! | Operation | Meaning |
//! |-----------|---------|
//! | [`Codec::decode`] | external input (or its absence) to a [`Typed`] value, or issues |
//! | [`Codec::encode`] | a [`Typed`] value to template text, or issues |
//! | [`Codec::empty_safe`] | whether absent input is acceptable |
//! | [`Codec::schema`] | read-only constraint description |
//!
//! The concrete catalog lives in [`crate::scalar`]; applications can
//! implement [`Codec`] for their own types.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::issue::Issue;
use crate::schema::Schema;
use crate::typed::Typed;

/// Decode/encode contract for one parameter kind.
///
/// # Example
///
/// ```rust
/// use serde_json::{json, Value};
/// use weft_codec::{Codec, Issue, Schema, Typed};
///
/// #[derive(Debug)]
/// struct Upper(Schema);
///
/// impl Codec for Upper {
///     fn schema(&self) -> &Schema {
///         &self.0
///     }
///
///     fn decode(&self, input: Option<&Value>) -> Result<Typed, Vec<Issue>> {
///         match input {
///             Some(Value::String(s)) => Ok(Typed::Text(s.to_uppercase())),
///             Some(other) => Err(vec![Issue::type_mismatch("string", other)]),
///             None => Err(vec![Issue::missing()]),
///         }
///     }
/// }
///
/// let codec = Upper(Schema::new("upper"));
/// let typed = codec.decode(Some(&json!("hi"))).unwrap();
/// assert_eq!(codec.encode(&typed).unwrap(), "HI");
/// ```
pub trait Codec: fmt::Debug + Send + Sync {
    /// Kind name, e.g. `"int"` or `"duration"`.
    fn kind(&self) -> &'static str {
        self.schema().kind
    }

    fn schema(&self) -> &Schema;

    /// Decodes external input. `None` means the value is absent from the
    /// parameter record (a JSON `null` is treated the same way).
    ///
    /// Issue paths are relative to the value being decoded.
    fn decode(&self, input: Option<&Value>) -> Result<Typed, Vec<Issue>>;

    /// Encodes a decoded value into template text.
    fn encode(&self, value: &Typed) -> Result<String, Vec<Issue>> {
        Ok(value.to_text())
    }

    /// Whether absent input decodes successfully.
    fn empty_safe(&self) -> bool {
        self.schema().accepts_absent()
    }

    /// Whether encoded text must be inserted without reindentation.
    fn verbatim(&self) -> bool {
        false
    }
}

/// A codec shared between templates and invocations.
pub type SharedCodec = Arc<dyn Codec>;

/// Whether two codecs declare the same parameter contract.
///
/// Identical handles always agree; otherwise the kinds, schemas and
/// verbatim flags must match.
pub fn same_contract(a: &SharedCodec, b: &SharedCodec) -> bool {
    Arc::ptr_eq(a, b)
        || (a.kind() == b.kind() && a.schema() == b.schema() && a.verbatim() == b.verbatim())
}
