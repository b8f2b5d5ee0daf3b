//! Indentation normalization.
//!
//! Templates written inside indented source code carry the indentation of
//! their surroundings. Dedenting templates remove the common leading
//! whitespace of their literal text, and multiline interpolated values are
//! reindented so that every line lines up with the line they were inserted
//! into.
//!
//! ## Rules
//!
//! - [`min_indent`] measures the smallest leading run of spaces/tabs over all
//!   non-blank lines of all segments, except the very first line of the
//!   template. A line without leading whitespace short-circuits to `0`.
//! - [`dedent_segment`] removes that many whitespace characters from every
//!   line of a segment except its first (which continues the line of the
//!   preceding slot). Lines with less indentation lose all of it.
//! - [`reindent_value`] prefixes every line of a multiline value except the
//!   first with the indentation of the current output line.
//!
//! Values marked verbatim skip reindentation entirely.
//!
//! ```text
//! "\n  <p>\n    {t}\n  </p>"   min_indent = 2
//! "\n<p>\n  {t}\n</p>"         after dedent
//! "\n<p>\n  a\n  b\n</p>"      with t = "a\nb"
//! ```

use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use once_cell::sync::Lazy;

/// Upper bound on distinct lines remembered by the line-indent cache.
const LINE_CACHE_CAPACITY: usize = 4096;

/// Leading-whitespace widths keyed by exact line content.
///
/// Templates defined across a process tend to share boilerplate lines; the
/// cache stops growing once it holds [`LINE_CACHE_CAPACITY`] lines.
static LINE_INDENT_CACHE: Lazy<Mutex<HashMap<String, usize>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

/// Length in bytes of the leading run of spaces and tabs.
pub fn leading_whitespace(line: &str) -> usize {
    line.bytes().take_while(|b| *b == b' ' || *b == b'\t').count()
}

fn cached_leading_whitespace(line: &str) -> usize {
    let mut cache = LINE_INDENT_CACHE
        .lock()
        .unwrap_or_else(PoisonError::into_inner);
    if let Some(width) = cache.get(line) {
        return *width;
    }
    let width = leading_whitespace(line);
    if cache.len() < LINE_CACHE_CAPACITY {
        cache.insert(line.to_string(), width);
    }
    width
}

fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

/// Computes the indentation common to all qualifying template lines.
pub fn min_indent<S: AsRef<str>>(segments: &[S]) -> usize {
    let mut min: Option<usize> = None;
    for (index, segment) in segments.iter().enumerate() {
        let skip = usize::from(index == 0);
        for line in segment.as_ref().split('\n').skip(skip) {
            if is_blank(line) {
                continue;
            }
            let width = cached_leading_whitespace(line);
            if width == 0 {
                return 0;
            }
            min = Some(min.map_or(width, |m| m.min(width)));
        }
    }
    min.unwrap_or(0)
}

/// Removes `indent` leading whitespace characters from every line but the first.
pub fn dedent_segment(text: &str, indent: usize) -> String {
    if indent == 0 || !text.contains('\n') {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len());
    for (index, line) in text.split('\n').enumerate() {
        if index == 0 {
            out.push_str(line);
            continue;
        }
        out.push('\n');
        let width = leading_whitespace(line);
        out.push_str(&line[width.min(indent)..]);
    }
    out
}

/// Prefixes every line of `value` after the first with `context`.
pub fn reindent_value<'a>(value: &'a str, context: &str) -> Cow<'a, str> {
    if context.is_empty() || !value.contains('\n') {
        return Cow::Borrowed(value);
    }
    let extra = value.matches('\n').count() * context.len();
    let mut out = String::with_capacity(value.len() + extra);
    for (index, line) in value.split('\n').enumerate() {
        if index > 0 {
            out.push('\n');
            out.push_str(context);
        }
        out.push_str(line);
    }
    Cow::Owned(out)
}

/// Tracks the indentation of the line currently being written.
///
/// Feed it every chunk in output order. Its [`current`](Self::current)
/// value is the leading whitespace of the last line of everything emitted so
/// far, which is the context a multiline value inserted next is reindented
/// to. Before any newline has been emitted that is the indentation of the
/// first output line.
#[derive(Debug, Clone, Default)]
pub struct IndentTracker {
    indent: String,
    line_has_content: bool,
}

impl IndentTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn feed(&mut self, chunk: &str) {
        let tail = match chunk.rfind('\n') {
            Some(pos) => {
                self.indent.clear();
                self.line_has_content = false;
                &chunk[pos + 1..]
            }
            None => chunk,
        };
        if self.line_has_content {
            return;
        }
        let width = leading_whitespace(tail);
        self.indent.push_str(&tail[..width]);
        if width < tail.len() {
            self.line_has_content = true;
        }
    }

    pub fn current(&self) -> &str {
        &self.indent
    }

    /// Places a value at the current position, reindenting unless `verbatim`.
    pub fn place<'a>(&self, value: &'a str, verbatim: bool) -> Cow<'a, str> {
        if verbatim {
            Cow::Borrowed(value)
        } else {
            reindent_value(value, &self.indent)
        }
    }
}
