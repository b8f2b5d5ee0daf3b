//! Template compilation.
//!
//! Compiling a [`Template`] classifies every slot as static (text known now)
//! or dynamic (evaluated per invocation), flattens the parameter field map
//! (recursing into nested templates) and, for dedenting templates, computes
//! the minimum indentation once and pre-dedents the literal segments.
//!
//! The result, [`CompiledTemplate`], is immutable and shared read-only by
//! every invocation.

use std::collections::btree_map::{self, BTreeMap};

use serde_json::Value;
use tracing::debug;
use weft_codec::{json_type_name, same_contract, SharedCodec};

use super::definition::Template;
use super::slot::{Effect, SlotValue};
use crate::error::CompileError;
use crate::indent::{dedent_segment, min_indent};
use crate::options::TemplateOptions;

/// Whether a slot's text is known at compile time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotKind {
    Static,
    Dynamic,
}

/// A classified slot.
#[derive(Debug, Clone)]
pub enum CompiledSlot {
    Static(String),
    Param { name: String, codec: SharedCodec },
    Nested { template: Template },
    Effect(Effect),
}

impl CompiledSlot {
    pub fn kind(&self) -> SlotKind {
        match self {
            CompiledSlot::Static(_) => SlotKind::Static,
            _ => SlotKind::Dynamic,
        }
    }
}

/// One entry of a [`FieldMap`].
#[derive(Debug, Clone)]
pub enum Field {
    Param(SharedCodec),
    /// A nested template's parameters, addressed by the template's name.
    Group { template: Template, fields: FieldMap },
}

impl Field {
    fn describe(&self) -> String {
        match self {
            Field::Param(codec) => format!("a {} parameter", codec.kind()),
            Field::Group { template, .. } => format!("nested template {}", template.id()),
        }
    }

    fn agrees_with(&self, other: &Field) -> bool {
        match (self, other) {
            (Field::Param(a), Field::Param(b)) => same_contract(a, b),
            (Field::Group { template: a, .. }, Field::Group { template: b, .. }) => a.same_as(b),
            _ => false,
        }
    }
}

/// The flattened parameter schema of a template, ordered by name.
#[derive(Debug, Clone, Default)]
pub struct FieldMap {
    fields: BTreeMap<String, Field>,
}

impl FieldMap {
    pub fn get(&self, name: &str) -> Option<&Field> {
        self.fields.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, Field> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Dotted paths of every declared parameter, depth first.
    pub fn paths(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.collect_paths("", &mut out);
        out
    }

    fn collect_paths(&self, prefix: &str, out: &mut Vec<String>) {
        for (name, field) in &self.fields {
            let path = if prefix.is_empty() {
                name.clone()
            } else {
                format!("{}.{}", prefix, name)
            };
            match field {
                Field::Param(_) => out.push(path),
                Field::Group { fields, .. } => fields.collect_paths(&path, out),
            }
        }
    }

    fn register(&mut self, template: &str, name: &str, field: Field) -> Result<(), CompileError> {
        match self.fields.entry(name.to_string()) {
            btree_map::Entry::Vacant(entry) => {
                entry.insert(field);
                Ok(())
            }
            btree_map::Entry::Occupied(entry) if entry.get().agrees_with(&field) => Ok(()),
            btree_map::Entry::Occupied(entry) => Err(CompileError::ConflictingField {
                template: template.to_string(),
                field: name.to_string(),
                first: entry.get().describe(),
                second: field.describe(),
            }),
        }
    }
}

/// The compiled, shareable form of a [`Template`].
#[derive(Debug)]
pub struct CompiledTemplate {
    name: String,
    segments: Vec<String>,
    slots: Vec<CompiledSlot>,
    verbatim: Vec<bool>,
    fields: FieldMap,
    min_indent: Option<usize>,
    options: TemplateOptions,
}

impl CompiledTemplate {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Literal segments, already dedented for dedenting templates.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn slots(&self) -> &[CompiledSlot] {
        &self.slots
    }

    pub fn slot_kinds(&self) -> Vec<SlotKind> {
        self.slots.iter().map(CompiledSlot::kind).collect()
    }

    pub fn fields(&self) -> &FieldMap {
        &self.fields
    }

    /// The memoized minimum indentation, for dedenting templates.
    pub fn min_indent(&self) -> Option<usize> {
        self.min_indent
    }

    pub fn options(&self) -> TemplateOptions {
        self.options
    }

    /// Whether the value of slot `index` is reindented to its insertion line.
    pub fn reindents(&self, index: usize) -> bool {
        self.options.dedent && !self.verbatim.get(index).copied().unwrap_or(false)
    }
}

/// Classifies a template's slots and builds its field map.
///
/// Nested templates are compiled (or fetched from their cache) first.
pub fn compile(template: &Template) -> Result<CompiledTemplate, CompileError> {
    let name = template.name();
    let options = template.options();

    // A template without slots is plain text and is never dedented.
    let dedents = options.dedent && !template.slots().is_empty();
    let indent = dedents.then(|| min_indent(template.segments()));
    let segments = match indent {
        Some(width) => template
            .segments()
            .iter()
            .map(|segment| dedent_segment(segment, width))
            .collect(),
        None => template.segments().to_vec(),
    };

    let mut fields = FieldMap::default();
    let mut slots = Vec::with_capacity(template.slots().len());
    let mut verbatim = Vec::with_capacity(template.slots().len());
    for (index, value) in template.slots().iter().enumerate() {
        let (slot, raw) = classify(name, index, value, false, &mut fields)?;
        slots.push(slot);
        verbatim.push(raw);
    }

    let dynamic = slots
        .iter()
        .filter(|slot| slot.kind() == SlotKind::Dynamic)
        .count();
    debug!(
        template = %name,
        id = %template.id(),
        slots = slots.len(),
        dynamic,
        fields = fields.len(),
        min_indent = ?indent,
        "compiled template"
    );

    Ok(CompiledTemplate {
        name: name.to_string(),
        segments,
        slots,
        verbatim,
        fields,
        min_indent: indent,
        options,
    })
}

fn classify(
    template: &str,
    index: usize,
    value: &SlotValue,
    verbatim: bool,
    fields: &mut FieldMap,
) -> Result<(CompiledSlot, bool), CompileError> {
    match value {
        SlotValue::Literal(literal) => {
            let text = literal_text(literal).ok_or_else(|| CompileError::InvalidValue {
                template: template.to_string(),
                index,
                found: json_type_name(literal),
            })?;
            Ok((CompiledSlot::Static(text), verbatim))
        }
        SlotValue::Param(param) => {
            fields.register(template, param.name(), Field::Param(param.codec().clone()))?;
            let slot = CompiledSlot::Param {
                name: param.name().to_string(),
                codec: param.codec().clone(),
            };
            Ok((slot, verbatim || param.codec().verbatim()))
        }
        SlotValue::Nested(nested) => {
            let compiled = nested.compile().map_err(|source| CompileError::Nested {
                template: template.to_string(),
                nested: nested.name().to_string(),
                source: Box::new(source),
            })?;
            if !compiled.fields().is_empty() {
                let group = Field::Group {
                    template: nested.clone(),
                    fields: compiled.fields().clone(),
                };
                fields.register(template, nested.name(), group)?;
            }
            let slot = CompiledSlot::Nested {
                template: nested.clone(),
            };
            Ok((slot, verbatim))
        }
        SlotValue::Effect(effect) => Ok((CompiledSlot::Effect(effect.clone()), verbatim)),
        SlotValue::Unsafe(inner) => classify(template, index, inner, true, fields),
    }
}

/// Text of a literal slot value, or `None` for arrays and objects.
fn literal_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => Some(String::new()),
        Value::Bool(b) => Some(b.to_string()),
        Value::String(s) => Some(s.clone()),
        Value::Number(n) if n.is_f64() => n.as_f64().map(|f| f.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(_) | Value::Object(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::slot::{effect, param, verbatim};
    use serde_json::json;
    use weft_codec::scalar;

    #[test]
    fn test_classification() {
        let template = Template::builder("t")
            .slot("static")
            .slot(param("x", scalar::text()))
            .slot(())
            .slot(effect(|| async { Ok("e".to_string()) }))
            .slot(json!(2.5))
            .build_lazy()
            .unwrap();
        let compiled = template.compile().unwrap();
        assert_eq!(
            compiled.slot_kinds(),
            vec![
                SlotKind::Static,
                SlotKind::Dynamic,
                SlotKind::Static,
                SlotKind::Dynamic,
                SlotKind::Static
            ]
        );
        assert!(matches!(&compiled.slots()[2], CompiledSlot::Static(s) if s.is_empty()));
        assert!(matches!(&compiled.slots()[4], CompiledSlot::Static(s) if s == "2.5"));
        assert_eq!(compiled.fields().paths(), vec!["x".to_string()]);
    }

    #[test]
    fn test_invalid_literal() {
        let template = Template::builder("t")
            .slot("ok")
            .slot(json!({"a": 1}))
            .build_lazy()
            .unwrap();
        let err = template.compile().unwrap_err();
        assert_eq!(
            err,
            CompileError::InvalidValue {
                template: "t".into(),
                index: 1,
                found: "object"
            }
        );
    }

    #[test]
    fn test_nested_fields_are_grouped() {
        let inner = Template::builder("card")
            .slot(param("title", scalar::text()))
            .slot(param("count", scalar::int()))
            .build()
            .unwrap();
        let outer = Template::builder("page")
            .slot(param("lang", scalar::text()))
            .slot(&inner)
            .build()
            .unwrap();
        let compiled = outer.compile().unwrap();
        assert_eq!(
            compiled.fields().paths(),
            vec!["card.count", "card.title", "lang"]
        );
        assert!(matches!(compiled.fields().get("card"), Some(Field::Group { .. })));
    }

    #[test]
    fn test_nested_without_params_declares_no_group() {
        let inner = Template::builder("footer").text("(c)").build().unwrap();
        let outer = Template::builder("page").slot(inner).build().unwrap();
        assert!(outer.compile().unwrap().fields().is_empty());
    }

    #[test]
    fn test_repeated_param_with_same_contract() {
        let template = Template::builder("t")
            .slot(param("x", scalar::text()))
            .slot(param("x", scalar::text()))
            .build();
        assert!(template.is_ok());
    }

    #[test]
    fn test_conflicting_param() {
        let err = Template::builder("t")
            .slot(param("x", scalar::text()))
            .slot(param("x", scalar::int()))
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            CompileError::ConflictingField { ref field, .. } if field == "x"
        ));
        assert!(err.to_string().contains("a text parameter"));
    }

    #[test]
    fn test_param_conflicts_with_group() {
        let inner = Template::builder("x")
            .slot(param("y", scalar::text()))
            .build()
            .unwrap();
        let err = Template::builder("t")
            .slot(param("x", scalar::text()))
            .slot(inner)
            .build()
            .unwrap_err();
        assert!(matches!(err, CompileError::ConflictingField { .. }));
    }

    #[test]
    fn test_nested_compile_error_propagates() {
        let inner = Template::builder("bad")
            .slot(json!([1]))
            .build_lazy()
            .unwrap();
        let err = Template::builder("outer").slot(inner).build().unwrap_err();
        assert!(matches!(err, CompileError::Nested { ref nested, .. } if nested == "bad"));
    }

    #[test]
    fn test_dedent_memoized_and_applied() {
        let template = Template::builder("t")
            .dedent(true)
            .text("\n    <p>\n      ")
            .slot(param("t", scalar::text()))
            .text("\n    </p>")
            .build()
            .unwrap();
        let compiled = template.compile().unwrap();
        assert_eq!(compiled.min_indent(), Some(4));
        assert_eq!(compiled.segments(), &["\n<p>\n  ", "\n</p>"]);
    }

    #[test]
    fn test_dedent_skips_templates_without_slots() {
        let template = Template::builder("t")
            .dedent(true)
            .text("  plain\n    text\n")
            .build()
            .unwrap();
        let compiled = template.compile().unwrap();
        assert_eq!(compiled.min_indent(), None);
        assert_eq!(compiled.segments(), &["  plain\n    text\n"]);
    }

    #[test]
    fn test_verbatim_flags() {
        let template = Template::builder("t")
            .dedent(true)
            .slot(verbatim(param("a", scalar::text())))
            .slot(param("b", scalar::raw()))
            .slot(param("c", scalar::text()))
            .build()
            .unwrap();
        let compiled = template.compile().unwrap();
        assert!(!compiled.reindents(0));
        assert!(!compiled.reindents(1));
        assert!(compiled.reindents(2));
    }
}
