//! Whole-output rendering.
//!
//! All slots of an invocation are evaluated concurrently; the renderer waits
//! for every one of them, so encode issues from different slots are reported
//! together, then assembles segments and values in declaration order.

use std::borrow::Cow;

use futures::future::{self, BoxFuture, FutureExt};
use serde::Serialize;
use serde_json::Value;
use tracing::warn;
use weft_codec::{Issue, SharedCodec};

use super::params::{decode_params, Decoded};
use crate::error::{CompileError, RenderError, ValidationError};
use crate::indent::IndentTracker;
use crate::template::{CompiledSlot, CompiledTemplate, Template};

/// The outcome of a successful invocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderResult {
    /// Name of the rendered template.
    pub name: String,
    /// The parameter record the template was invoked with.
    pub params: Value,
    pub output: String,
}

impl std::fmt::Display for RenderResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.output)
    }
}

/// Why one slot produced no text.
#[derive(Debug)]
pub(crate) enum SlotFailure {
    Issues(Vec<Issue>),
    Evaluation(anyhow::Error),
    Compile(CompileError),
}

impl From<SlotFailure> for RenderError {
    fn from(failure: SlotFailure) -> Self {
        match failure {
            SlotFailure::Issues(issues) => RenderError::Validation(ValidationError::new(issues)),
            SlotFailure::Evaluation(err) => RenderError::Evaluation(err),
            SlotFailure::Compile(err) => RenderError::Compile(err),
        }
    }
}

pub(crate) type SlotResult = Result<String, SlotFailure>;

/// Encodes a parameter slot's decoded value. Encoding never suspends.
pub(crate) fn encode_param(name: &str, codec: &SharedCodec, decoded: &Decoded) -> SlotResult {
    match decoded.value(name) {
        Some(typed) => codec
            .encode(typed)
            .map_err(|issues| prefix_issues(issues, name)),
        None => Err(SlotFailure::Issues(vec![Issue::missing().at([name])])),
    }
}

/// Starts evaluating one slot. The future owns everything it needs.
pub(crate) fn evaluate_slot(
    slot: &CompiledSlot,
    decoded: &Decoded,
) -> BoxFuture<'static, SlotResult> {
    match slot {
        CompiledSlot::Static(text) => future::ready(Ok(text.clone())).boxed(),
        CompiledSlot::Param { name, codec } => {
            future::ready(encode_param(name, codec, decoded)).boxed()
        }
        CompiledSlot::Nested { template } => {
            let template = template.clone();
            let group = decoded.group(template.name()).cloned().unwrap_or_default();
            async move {
                let compiled = template.compile().map_err(SlotFailure::Compile)?;
                render_decoded(&compiled, &group).await.map_err(|failure| match failure {
                    SlotFailure::Issues(issues) => prefix_issues(issues, template.name()),
                    other => other,
                })
            }
            .boxed()
        }
        CompiledSlot::Effect(effect) => effect
            .evaluate()
            .map(|result| result.map_err(SlotFailure::Evaluation))
            .boxed(),
    }
}

fn prefix_issues(issues: Vec<Issue>, name: &str) -> SlotFailure {
    SlotFailure::Issues(issues.into_iter().map(|i| i.at([name])).collect())
}

/// Renders an already-validated record.
///
/// An effect failure wins over encode issues; the first one in declaration
/// order is returned.
pub(crate) fn render_decoded<'a>(
    compiled: &'a CompiledTemplate,
    decoded: &'a Decoded,
) -> BoxFuture<'a, SlotResult> {
    async move {
        let pending = compiled
            .slots()
            .iter()
            .map(|slot| evaluate_slot(slot, decoded));
        let results = future::join_all(pending).await;

        let mut values = Vec::with_capacity(results.len());
        let mut issues = Vec::new();
        let mut failure = None;
        for result in results {
            match result {
                Ok(value) => values.push(value),
                Err(SlotFailure::Issues(mut found)) => issues.append(&mut found),
                Err(other) => {
                    failure.get_or_insert(other);
                }
            }
        }

        if let Some(failure) = failure {
            return Err(failure);
        }
        if !issues.is_empty() {
            return Err(SlotFailure::Issues(issues));
        }
        Ok(assemble(compiled, &values))
    }
    .boxed()
}

/// Joins segments and slot values in order, reindenting values as needed.
pub(crate) fn assemble(compiled: &CompiledTemplate, values: &[String]) -> String {
    let segments = compiled.segments();
    let capacity = segments.iter().map(String::len).sum::<usize>()
        + values.iter().map(String::len).sum::<usize>();
    let mut out = String::with_capacity(capacity);
    let mut tracker = IndentTracker::new();

    tracker.feed(&segments[0]);
    out.push_str(&segments[0]);
    for (index, value) in values.iter().enumerate() {
        let placed = if compiled.reindents(index) {
            tracker.place(value, false)
        } else {
            Cow::Borrowed(value.as_str())
        };
        tracker.feed(&placed);
        out.push_str(&placed);

        let segment = &segments[index + 1];
        tracker.feed(segment);
        out.push_str(segment);
    }
    out
}

/// Validates `params` and renders `template` into one string.
#[tracing::instrument(skip_all, fields(template = %template.name()))]
pub async fn render(template: &Template, params: Value) -> Result<RenderResult, RenderError> {
    let compiled = template.compile()?;
    let decoded = decode_params(
        compiled.fields(),
        &params,
        compiled.options().deny_unknown_params,
    )?;

    let output = render_decoded(&compiled, &decoded).await.map_err(|failure| {
        if let SlotFailure::Evaluation(err) = &failure {
            warn!(error = %err, "slot evaluation failed");
        }
        RenderError::from(failure)
    })?;

    Ok(RenderResult {
        name: compiled.name().to_string(),
        params,
        output,
    })
}

impl Template {
    /// Renders the template with `params` (`Value::Null` for no record).
    ///
    /// Slots are evaluated concurrently on the calling task; no runtime
    /// beyond an executor for the returned future is needed.
    pub async fn render(&self, params: Value) -> Result<RenderResult, RenderError> {
        render(self, params).await
    }
}
