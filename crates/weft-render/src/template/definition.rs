//! Template definitions and the shared [`Template`] handle.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use once_cell::sync::OnceCell;

use super::compiler::{compile, CompiledTemplate};
use super::slot::SlotValue;
use crate::error::CompileError;
use crate::options::TemplateOptions;

static NEXT_TEMPLATE_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a template definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TemplateId(u64);

impl TemplateId {
    fn next() -> Self {
        TemplateId(NEXT_TEMPLATE_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

struct TemplateInner {
    id: TemplateId,
    name: String,
    segments: Vec<String>,
    slots: Vec<SlotValue>,
    options: TemplateOptions,
    compiled: OnceCell<Arc<CompiledTemplate>>,
}

/// An immutable template definition: `N + 1` literal segments interleaved
/// with `N` slots, plus its lazily compiled form.
///
/// `Template` is a cheap handle; clones share the definition and the
/// compiled artifact, and the handle is the template's identity. A template
/// can only nest templates that already exist, so nesting is always acyclic.
///
/// # Example
///
/// ```rust
/// use serde_json::json;
/// use weft_render::{param, scalar, Template};
///
/// let link = Template::builder("link")
///     .text("<a>")
///     .slot(param("x", scalar::text()))
///     .text("</a>")
///     .build()
///     .unwrap();
///
/// let result = futures::executor::block_on(link.render(json!({"x": "hi"}))).unwrap();
/// assert_eq!(result.output, "<a>hi</a>");
/// ```
#[derive(Clone)]
pub struct Template {
    inner: Arc<TemplateInner>,
}

impl Template {
    pub fn builder(name: impl Into<String>) -> TemplateBuilder {
        TemplateBuilder::new(name)
    }

    /// Creates an uncompiled template from raw parts.
    ///
    /// # Errors
    ///
    /// Returns [`CompileError::Shape`] unless `segments.len() == slots.len() + 1`.
    pub fn from_parts(
        name: impl Into<String>,
        segments: Vec<String>,
        slots: Vec<SlotValue>,
        options: TemplateOptions,
    ) -> Result<Self, CompileError> {
        let name = name.into();
        if segments.len() != slots.len() + 1 {
            return Err(CompileError::Shape {
                template: name,
                segments: segments.len(),
                slots: slots.len(),
            });
        }
        Ok(Self {
            inner: Arc::new(TemplateInner {
                id: TemplateId::next(),
                name,
                segments,
                slots,
                options,
                compiled: OnceCell::new(),
            }),
        })
    }

    pub fn id(&self) -> TemplateId {
        self.inner.id
    }

    /// The template's name, which is also the parameter-group key when nested.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn segments(&self) -> &[String] {
        &self.inner.segments
    }

    pub fn slots(&self) -> &[SlotValue] {
        &self.inner.slots
    }

    pub fn options(&self) -> TemplateOptions {
        self.inner.options
    }

    /// Compiles on first call and returns the cached artifact afterwards.
    ///
    /// Concurrent first calls are serialized: exactly one compiles, the others
    /// wait and share its result. Failures are not cached.
    pub fn compile(&self) -> Result<Arc<CompiledTemplate>, CompileError> {
        self.inner
            .compiled
            .get_or_try_init(|| compile(self).map(Arc::new))
            .cloned()
    }

    pub fn is_compiled(&self) -> bool {
        self.inner.compiled.get().is_some()
    }

    /// Whether two handles refer to the same definition.
    pub fn same_as(&self, other: &Template) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Template")
            .field("id", &self.inner.id)
            .field("name", &self.inner.name)
            .field("slots", &self.inner.slots.len())
            .field("compiled", &self.is_compiled())
            .finish()
    }
}

/// Builds a [`Template`] by appending literal text and slots in order.
///
/// Consecutive [`text`](Self::text) calls extend the same segment; every
/// [`slot`](Self::slot) call closes the current segment.
#[derive(Debug)]
pub struct TemplateBuilder {
    name: String,
    segments: Vec<String>,
    slots: Vec<SlotValue>,
    options: TemplateOptions,
}

impl TemplateBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            segments: vec![String::new()],
            slots: Vec::new(),
            options: TemplateOptions::default(),
        }
    }

    pub fn text(mut self, text: &str) -> Self {
        if let Some(last) = self.segments.last_mut() {
            last.push_str(text);
        }
        self
    }

    pub fn slot(mut self, value: impl Into<SlotValue>) -> Self {
        self.slots.push(value.into());
        self.segments.push(String::new());
        self
    }

    pub fn dedent(mut self, dedent: bool) -> Self {
        self.options.dedent = dedent;
        self
    }

    pub fn deny_unknown_params(mut self, deny: bool) -> Self {
        self.options.deny_unknown_params = deny;
        self
    }

    pub fn options(mut self, options: TemplateOptions) -> Self {
        self.options = options;
        self
    }

    /// Builds and compiles the template, reporting compile errors now.
    pub fn build(self) -> Result<Template, CompileError> {
        let template = self.build_lazy()?;
        template.compile()?;
        Ok(template)
    }

    /// Builds the template and defers compilation to its first use.
    pub fn build_lazy(self) -> Result<Template, CompileError> {
        Template::from_parts(self.name, self.segments, self.slots, self.options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::slot::param;
    use weft_codec::scalar;

    #[test]
    fn test_builder_shapes_segments() {
        let template = Template::builder("t")
            .text("a")
            .text("b")
            .slot(param("x", scalar::text()))
            .slot(1)
            .text("c")
            .build_lazy()
            .unwrap();
        assert_eq!(template.segments(), &["ab", "", "c"]);
        assert_eq!(template.slots().len(), 2);
        assert!(!template.is_compiled());
    }

    #[test]
    fn test_from_parts_checks_shape() {
        let err = Template::from_parts(
            "bad",
            vec!["a".into(), "b".into()],
            vec![],
            TemplateOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, CompileError::Shape { segments: 2, slots: 0, .. }));
    }

    #[test]
    fn test_compile_is_cached() {
        let template = Template::builder("t").text("x").build_lazy().unwrap();
        let first = template.compile().unwrap();
        let second = template.clone().compile().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert!(template.is_compiled());
    }

    #[test]
    fn test_concurrent_first_compile_shares_artifact() {
        let template = Template::builder("t")
            .text("a")
            .slot(param("x", scalar::int()))
            .build_lazy()
            .unwrap();
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let t = template.clone();
                std::thread::spawn(move || t.compile().unwrap())
            })
            .collect();
        let artifacts: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        for artifact in &artifacts[1..] {
            assert!(Arc::ptr_eq(&artifacts[0], artifact));
        }
    }

    #[test]
    fn test_build_reports_compile_errors() {
        let err = Template::builder("t")
            .slot(serde_json::json!([1, 2]))
            .build()
            .unwrap_err();
        assert!(matches!(err, CompileError::InvalidValue { index: 0, .. }));
    }

    #[test]
    fn test_identity() {
        let a = Template::builder("same").build().unwrap();
        let b = Template::builder("same").build().unwrap();
        assert!(a.same_as(&a.clone()));
        assert!(!a.same_as(&b));
        assert_ne!(a.id(), b.id());
    }
}
