//! Streaming rendering.
//!
//! Every dynamic slot runs as its own task on the current tokio runtime the
//! moment the stream is created. Results come back in completion order and
//! pass through an [`OrderedBuffer`], so chunks leave the stream strictly in
//! declaration order: a slow slot holds back its own output and everything
//! after it, never the evaluation of later slots.

use std::collections::{HashMap, VecDeque};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::stream::{FusedStream, Stream, StreamExt};
use futures::FutureExt;
use serde_json::Value;
use tokio::runtime::Handle;
use tokio::task::{Id, JoinSet};
use tracing::{trace, warn};

use super::ordered::OrderedBuffer;
use super::params::decode_params;
use super::renderer::{encode_param, evaluate_slot, SlotFailure, SlotResult};
use crate::error::{RenderError, ValidationError};
use crate::indent::IndentTracker;
use crate::template::{CompiledSlot, CompiledTemplate, Template};

/// An in-progress streaming render.
///
/// Yields non-empty text chunks in declaration order. The first error ends
/// the stream. Dropping the stream aborts slot tasks that are still running
/// and discards anything buffered.
pub struct RenderStream {
    compiled: Arc<CompiledTemplate>,
    tasks: JoinSet<(usize, SlotResult)>,
    task_slots: HashMap<Id, usize>,
    gates: OrderedBuffer<SlotResult>,
    ready: VecDeque<Result<String, RenderError>>,
    tracker: IndentTracker,
    done: bool,
}

impl RenderStream {
    fn start(compiled: Arc<CompiledTemplate>, params: &Value) -> Result<Self, RenderError> {
        let handle = Handle::try_current().map_err(|err| RenderError::Runtime(err.to_string()))?;
        let decoded = decode_params(
            compiled.fields(),
            params,
            compiled.options().deny_unknown_params,
        )?;

        // Encoding is synchronous, so every parameter is encoded up front and
        // all encode issues are reported together before any task starts.
        let mut prepared = Vec::with_capacity(compiled.slots().len());
        let mut issues = Vec::new();
        for slot in compiled.slots() {
            let text = match slot {
                CompiledSlot::Static(text) => Some(text.clone()),
                CompiledSlot::Param { name, codec } => match encode_param(name, codec, &decoded) {
                    Ok(text) => Some(text),
                    Err(SlotFailure::Issues(mut found)) => {
                        issues.append(&mut found);
                        None
                    }
                    Err(failure) => return Err(failure.into()),
                },
                _ => None,
            };
            prepared.push(text);
        }
        if !issues.is_empty() {
            return Err(ValidationError::new(issues).into());
        }

        let mut stream = Self {
            gates: OrderedBuffer::new(prepared.len()),
            tasks: JoinSet::new(),
            task_slots: HashMap::new(),
            ready: VecDeque::new(),
            tracker: IndentTracker::new(),
            done: false,
            compiled: compiled.clone(),
        };

        stream.emit(&compiled.segments()[0]);
        for (index, (slot, text)) in compiled.slots().iter().zip(prepared).enumerate() {
            match text {
                Some(text) => stream.complete(index, Ok(text)),
                None => {
                    let pending = evaluate_slot(slot, &decoded)
                        .map(move |result| (index, result));
                    let task = stream.tasks.spawn_on(pending, &handle);
                    stream.task_slots.insert(task.id(), index);
                }
            }
        }
        trace!(tasks = stream.tasks.len(), "slot tasks spawned");
        Ok(stream)
    }

    /// Name of the template being rendered.
    pub fn name(&self) -> &str {
        self.compiled.name()
    }

    /// Concatenates every chunk, stopping at the first error.
    pub async fn collect_string(mut self) -> Result<String, RenderError> {
        let mut out = String::new();
        while let Some(chunk) = self.next().await {
            out.push_str(&chunk?);
        }
        Ok(out)
    }

    fn complete(&mut self, index: usize, result: SlotResult) {
        if self.done {
            return;
        }
        // Each slot reports exactly once, so its gate is never closed here.
        let released = self.gates.complete(index, result).unwrap_or_default();
        for (index, result) in released {
            match result {
                Ok(value) => self.emit_value(index, &value),
                Err(failure) => {
                    self.fail(failure.into());
                    return;
                }
            }
        }
    }

    fn emit_value(&mut self, index: usize, value: &str) {
        let placed = self.tracker.place(value, !self.compiled.reindents(index));
        self.emit(&placed);
        let compiled = self.compiled.clone();
        self.emit(&compiled.segments()[index + 1]);
    }

    fn emit(&mut self, chunk: &str) {
        if chunk.is_empty() {
            return;
        }
        self.tracker.feed(chunk);
        self.ready.push_back(Ok(chunk.to_string()));
    }

    fn fail(&mut self, err: RenderError) {
        if let RenderError::Evaluation(source) = &err {
            warn!(template = self.compiled.name(), error = %source, "slot evaluation failed");
        }
        self.ready.push_back(Err(err));
        self.done = true;
        self.tasks.abort_all();
        self.task_slots.clear();
        self.gates = OrderedBuffer::new(0);
    }
}

impl Stream for RenderStream {
    type Item = Result<String, RenderError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        loop {
            if let Some(item) = this.ready.pop_front() {
                return Poll::Ready(Some(item));
            }
            if this.done || this.gates.is_finished() {
                this.done = true;
                return Poll::Ready(None);
            }
            match this.tasks.poll_join_next(cx) {
                Poll::Ready(Some(Ok((index, result)))) => this.complete(index, result),
                // A panicked task still holds its gate, so earlier slots are
                // released before the failure is reported.
                Poll::Ready(Some(Err(err))) => match this.task_slots.get(&err.id()).copied() {
                    Some(index) => {
                        let failure = SlotFailure::Evaluation(anyhow::Error::new(err));
                        this.complete(index, Err(failure));
                    }
                    None => this.fail(RenderError::Evaluation(anyhow::Error::new(err))),
                },
                // Every gate reports once, so running out of tasks with gates
                // still open cannot happen; end the stream rather than hang.
                Poll::Ready(None) => this.done = true,
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}

impl FusedStream for RenderStream {
    fn is_terminated(&self) -> bool {
        self.done && self.ready.is_empty()
    }
}

impl std::fmt::Debug for RenderStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderStream")
            .field("template", &self.compiled.name())
            .field("next_gate", &self.gates.next_gate())
            .field("running", &self.tasks.len())
            .field("done", &self.done)
            .finish()
    }
}

/// Validates `params` and starts streaming `template`.
///
/// # Errors
///
/// Compile and validation failures are returned here, before any slot runs.
/// Outside a tokio runtime this returns [`RenderError::Runtime`].
#[tracing::instrument(skip_all, fields(template = %template.name()))]
pub fn stream(template: &Template, params: Value) -> Result<RenderStream, RenderError> {
    let compiled = template.compile()?;
    RenderStream::start(compiled, &params)
}

impl Template {
    /// Streams the template's output as ordered chunks.
    pub fn stream(&self, params: Value) -> Result<RenderStream, RenderError> {
        stream(self, params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::{effect, param, verbatim};
    use serde_json::json;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;
    use weft_codec::{scalar, Codec, Issue, IssueKind, Schema, Typed};

    async fn chunks(template: &Template, params: Value) -> Vec<String> {
        template
            .stream(params)
            .unwrap()
            .map(|chunk| chunk.unwrap())
            .collect()
            .await
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_first_slot_still_emits_first() {
        let finished = Arc::new(Mutex::new(Vec::new()));
        let (slow_log, fast_log) = (finished.clone(), finished.clone());
        let slow = effect(move || {
            let log = slow_log.clone();
            async move {
                tokio::time::sleep(Duration::from_millis(50)).await;
                log.lock().unwrap().push("slow");
                Ok("slow".to_string())
            }
        });
        let fast = effect(move || {
            let log = fast_log.clone();
            async move {
                log.lock().unwrap().push("fast");
                Ok("fast".to_string())
            }
        });
        let template = Template::builder("race")
            .text("[")
            .slot(slow)
            .text("|")
            .slot(fast)
            .text("]")
            .build()
            .unwrap();

        assert_eq!(
            chunks(&template, Value::Null).await,
            vec!["[", "slow", "|", "fast", "]"]
        );
        assert_eq!(*finished.lock().unwrap(), vec!["fast", "slow"]);
    }

    #[tokio::test]
    async fn test_static_template_streams_segments() {
        let template = Template::builder("static")
            .text("a")
            .slot(1)
            .slot("")
            .text("b")
            .build()
            .unwrap();
        assert_eq!(chunks(&template, Value::Null).await, vec!["a", "1", "b"]);
    }

    #[tokio::test]
    async fn test_matches_render_with_reindent() {
        let template = Template::builder("list")
            .dedent(true)
            .text("\n    <ul>\n      ")
            .slot(param("items", scalar::text()))
            .text("\n    </ul>\n      ")
            .slot(verbatim(param("raw", scalar::text())))
            .build()
            .unwrap();
        let params = json!({"items": "<li>a</li>\n<li>b</li>", "raw": "x\ny"});

        let streamed = template.stream(params.clone()).unwrap().collect_string().await.unwrap();
        let rendered = template.render(params).await.unwrap().output;
        assert_eq!(streamed, rendered);
        assert_eq!(streamed, "\n<ul>\n  <li>a</li>\n  <li>b</li>\n</ul>\n  x\ny");
    }

    #[tokio::test]
    async fn test_validation_fails_before_streaming() {
        let template = Template::builder("t")
            .slot(param("n", scalar::int()))
            .build()
            .unwrap();
        let err = template.stream(json!({"n": "abc"})).unwrap_err();
        assert!(err.issues().is_some());
    }

    #[tokio::test]
    async fn test_effect_failure_ends_stream_at_its_gate() {
        let template = Template::builder("t")
            .text("a")
            .slot(effect(|| async { Err(anyhow::anyhow!("boom")) }))
            .text("b")
            .slot(2)
            .build()
            .unwrap();
        let items: Vec<_> = template.stream(Value::Null).unwrap().collect().await;
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].as_ref().unwrap(), "a");
        match &items[1] {
            Err(RenderError::Evaluation(err)) => assert_eq!(err.to_string(), "boom"),
            other => panic!("unexpected item: {:?}", other),
        }
    }

    #[derive(Debug)]
    struct Unprintable(Schema);

    impl Codec for Unprintable {
        fn schema(&self) -> &Schema {
            &self.0
        }

        fn decode(&self, input: Option<&Value>) -> Result<Typed, Vec<Issue>> {
            Ok(input.cloned().map_or(Typed::Null, Typed::Json))
        }

        fn encode(&self, _value: &Typed) -> Result<String, Vec<Issue>> {
            Err(vec![Issue::new(IssueKind::Refinement, "cannot be printed")])
        }
    }

    #[tokio::test]
    async fn test_encode_issues_reported_together() {
        let ran = Arc::new(AtomicBool::new(false));
        let flag = ran.clone();
        let template = Template::builder("t")
            .slot(param("a", Unprintable(Schema::new("unprintable"))))
            .text(" ")
            .slot(effect(move || {
                let flag = flag.clone();
                async move {
                    flag.store(true, Ordering::SeqCst);
                    Ok("x".to_string())
                }
            }))
            .text(" ")
            .slot(param("b", Unprintable(Schema::new("unprintable"))))
            .build()
            .unwrap();

        let err = template.stream(json!({"a": 1, "b": 2})).unwrap_err();
        match err {
            RenderError::Validation(err) => {
                assert_eq!(err.issues.len(), 2);
                assert!(err.has_path(&["a"]));
                assert!(err.has_path(&["b"]));
            }
            other => panic!("unexpected error: {:?}", other),
        }
        tokio::task::yield_now().await;
        assert!(!ran.load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn test_panicking_slot_fails_at_its_gate() {
        let slow = effect(|| async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            Ok("slow".to_string())
        });
        let panicking = effect(|| async {
            if true {
                panic!("slot blew up");
            }
            Ok(String::new())
        });
        let template = Template::builder("t")
            .text("<")
            .slot(slow)
            .slot(panicking)
            .text(">")
            .build()
            .unwrap();

        let items: Vec<_> = template.stream(Value::Null).unwrap().collect().await;
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].as_ref().unwrap(), "<");
        assert_eq!(items[1].as_ref().unwrap(), "slow");
        assert!(matches!(items[2], Err(RenderError::Evaluation(_))));
    }

    #[tokio::test]
    async fn test_dropping_stream_aborts_running_slots() {
        struct SetOnDrop(Arc<AtomicBool>);
        impl Drop for SetOnDrop {
            fn drop(&mut self) {
                self.0.store(true, Ordering::SeqCst);
            }
        }

        let dropped = Arc::new(AtomicBool::new(false));
        let flag = dropped.clone();
        let template = Template::builder("hang")
            .slot(effect(move || {
                let guard = SetOnDrop(flag.clone());
                async move {
                    let _guard = guard;
                    std::future::pending::<()>().await;
                    Ok(String::new())
                }
            }))
            .build()
            .unwrap();

        let stream = template.stream(Value::Null).unwrap();
        tokio::task::yield_now().await;
        drop(stream);
        for _ in 0..10 {
            if dropped.load(Ordering::SeqCst) {
                break;
            }
            tokio::task::yield_now().await;
        }
        assert!(dropped.load(Ordering::SeqCst));
    }

    #[test]
    fn test_requires_runtime() {
        let template = Template::builder("t").text("x").build().unwrap();
        assert!(matches!(
            template.stream(Value::Null),
            Err(RenderError::Runtime(_))
        ));
    }
}
