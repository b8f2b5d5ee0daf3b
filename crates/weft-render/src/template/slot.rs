//! Slot values: what can be interpolated between two literal segments.
//!
//! | Value | Classification |
//! |-------|----------------|
//! | `()`, `None`, JSON `null` | static, empty text |
//! | strings, numbers, booleans, `i128`/`u128` | static, textified once |
//! | [`Param`] | dynamic, declares a named parameter |
//! | [`Template`] | dynamic, declares a parameter group under its name |
//! | [`Effect`] | dynamic, evaluated per invocation, no parameter |
//! | [`verbatim`]`(value)` | any of the above, inserted without reindentation |
//!
//! JSON arrays and objects are not valid slot values and fail compilation.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};
use serde_json::Value;
use weft_codec::{Codec, SharedCodec};

use super::definition::Template;

/// The future an [`Effect`] produces for one invocation.
pub type EffectFuture = BoxFuture<'static, anyhow::Result<String>>;

/// A per-invocation asynchronous computation producing text directly.
///
/// Effects declare no parameter. Their failures are not validation issues:
/// they surface as [`RenderError::Evaluation`](crate::RenderError::Evaluation)
/// carrying the effect's own error.
#[derive(Clone)]
pub struct Effect {
    run: Arc<dyn Fn() -> EffectFuture + Send + Sync>,
}

impl Effect {
    pub fn new<F, Fut>(f: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<String>> + Send + 'static,
    {
        Self {
            run: Arc::new(move || f().boxed()),
        }
    }

    /// Starts one evaluation.
    pub fn evaluate(&self) -> EffectFuture {
        (self.run)()
    }
}

impl fmt::Debug for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Effect(..)")
    }
}

/// A named parameter and the codec that decodes and encodes it.
#[derive(Debug, Clone)]
pub struct Param {
    name: String,
    codec: SharedCodec,
}

impl Param {
    pub fn new(name: impl Into<String>, codec: SharedCodec) -> Self {
        Self {
            name: name.into(),
            codec,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn codec(&self) -> &SharedCodec {
        &self.codec
    }
}

/// One interpolation value, before classification.
#[derive(Debug, Clone)]
pub enum SlotValue {
    Literal(Value),
    Param(Param),
    Nested(Template),
    Effect(Effect),
    /// The wrapped value bypasses multiline reindentation.
    Unsafe(Box<SlotValue>),
}

/// Declares a parameter slot.
///
/// ```rust
/// use weft_render::{param, scalar};
///
/// let title = param("title", scalar::text().max_len(80));
/// assert_eq!(title.name(), "title");
/// ```
pub fn param(name: impl Into<String>, codec: impl Codec + 'static) -> Param {
    Param::new(name, Arc::new(codec))
}

/// Declares an effect slot from an async closure.
pub fn effect<F, Fut>(f: F) -> Effect
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<String>> + Send + 'static,
{
    Effect::new(f)
}

/// Marks a value to be inserted exactly as produced.
pub fn verbatim(value: impl Into<SlotValue>) -> SlotValue {
    SlotValue::Unsafe(Box::new(value.into()))
}

impl From<Param> for SlotValue {
    fn from(param: Param) -> Self {
        SlotValue::Param(param)
    }
}

impl From<Template> for SlotValue {
    fn from(template: Template) -> Self {
        SlotValue::Nested(template)
    }
}

impl From<&Template> for SlotValue {
    fn from(template: &Template) -> Self {
        SlotValue::Nested(template.clone())
    }
}

impl From<Effect> for SlotValue {
    fn from(effect: Effect) -> Self {
        SlotValue::Effect(effect)
    }
}

impl From<Value> for SlotValue {
    fn from(value: Value) -> Self {
        SlotValue::Literal(value)
    }
}

impl From<&str> for SlotValue {
    fn from(text: &str) -> Self {
        SlotValue::Literal(Value::String(text.to_string()))
    }
}

impl From<String> for SlotValue {
    fn from(text: String) -> Self {
        SlotValue::Literal(Value::String(text))
    }
}

impl From<()> for SlotValue {
    fn from(_: ()) -> Self {
        SlotValue::Literal(Value::Null)
    }
}

impl From<bool> for SlotValue {
    fn from(b: bool) -> Self {
        SlotValue::Literal(Value::Bool(b))
    }
}

impl<T: Into<SlotValue>> From<Option<T>> for SlotValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(SlotValue::Literal(Value::Null), Into::into)
    }
}

macro_rules! integer_literals {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for SlotValue {
                fn from(n: $ty) -> Self {
                    SlotValue::Literal(Value::from(n))
                }
            }
        )*
    };
}

integer_literals!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

// Floats and 128-bit integers are textified up front: JSON numbers cannot hold
// the latter, and the former would otherwise print as `1.0`.
macro_rules! textified_literals {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for SlotValue {
                fn from(n: $ty) -> Self {
                    SlotValue::Literal(Value::String(n.to_string()))
                }
            }
        )*
    };
}

textified_literals!(f32, f64, i128, u128);
