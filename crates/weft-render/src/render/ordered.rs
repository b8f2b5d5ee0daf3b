//! Ordered release of out-of-order results.
//!
//! [`OrderedBuffer`] keeps one gate per slot index. Gate 0 starts open; the
//! gate after it opens once the open gate is closed and its items released.
//! Items pushed to a gate that is not yet open are held in that gate's queue
//! and released, in push order, when the gate opens.

use std::collections::VecDeque;
use std::mem;

use tracing::trace;

#[derive(Debug)]
enum Gate<T> {
    /// Nothing held. The open gate sits here while it waits for items.
    Pending,
    /// Items arrived before the gate opened.
    Buffered { queue: VecDeque<T>, complete: bool },
    /// Released and closed.
    Flushed,
}

/// A per-invocation gate state machine.
///
/// ```rust
/// use weft_render::OrderedBuffer;
///
/// let mut gates = OrderedBuffer::new(3);
/// assert!(gates.complete(2, "c").unwrap().is_empty());
/// assert!(gates.complete(1, "b").unwrap().is_empty());
/// let released = gates.complete(0, "a").unwrap();
/// assert_eq!(released, vec![(0, "a"), (1, "b"), (2, "c")]);
/// assert!(gates.is_finished());
/// ```
#[derive(Debug)]
pub struct OrderedBuffer<T> {
    gates: Vec<Gate<T>>,
    next: usize,
}

impl<T> OrderedBuffer<T> {
    pub fn new(len: usize) -> Self {
        let mut gates = Vec::with_capacity(len);
        gates.resize_with(len, || Gate::Pending);
        Self { gates, next: 0 }
    }

    pub fn len(&self) -> usize {
        self.gates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gates.is_empty()
    }

    /// Index of the open gate, or `len()` once every gate is flushed.
    pub fn next_gate(&self) -> usize {
        self.next
    }

    pub fn is_finished(&self) -> bool {
        self.next == self.gates.len()
    }

    /// Number of items held behind closed gates.
    pub fn buffered_len(&self) -> usize {
        self.gates
            .iter()
            .map(|gate| match gate {
                Gate::Buffered { queue, .. } => queue.len(),
                _ => 0,
            })
            .sum()
    }

    /// Adds an item for gate `index` and returns whatever became releasable.
    ///
    /// # Errors
    ///
    /// Hands the item back if the gate does not exist or is already closed.
    pub fn push(&mut self, index: usize, item: T) -> Result<Vec<(usize, T)>, T> {
        if index < self.next || index >= self.gates.len() {
            return Err(item);
        }
        if index == self.next {
            return Ok(vec![(index, item)]);
        }
        match &mut self.gates[index] {
            Gate::Pending => {
                let mut queue = VecDeque::new();
                queue.push_back(item);
                self.gates[index] = Gate::Buffered {
                    queue,
                    complete: false,
                };
            }
            Gate::Buffered { queue, complete } => {
                if *complete {
                    return Err(item);
                }
                queue.push_back(item);
            }
            Gate::Flushed => return Err(item),
        }
        Ok(Vec::new())
    }

    /// Marks gate `index` as having received all of its items.
    ///
    /// Closing the open gate opens the next one and releases everything that
    /// was waiting behind it, cascading through every gate that already
    /// completed. Closing a gate twice, or one out of range, releases nothing.
    pub fn close(&mut self, index: usize) -> Vec<(usize, T)> {
        if index < self.next || index >= self.gates.len() {
            return Vec::new();
        }
        if index > self.next {
            match &mut self.gates[index] {
                Gate::Pending => {
                    self.gates[index] = Gate::Buffered {
                        queue: VecDeque::new(),
                        complete: true,
                    }
                }
                Gate::Buffered { complete, .. } => *complete = true,
                Gate::Flushed => {}
            }
            return Vec::new();
        }

        self.gates[index] = Gate::Flushed;
        self.advance();
        self.cascade()
    }

    /// Pushes the only item of gate `index` and closes it.
    pub fn complete(&mut self, index: usize, item: T) -> Result<Vec<(usize, T)>, T> {
        let mut released = self.push(index, item)?;
        released.extend(self.close(index));
        Ok(released)
    }

    fn advance(&mut self) {
        self.next += 1;
        if self.next < self.gates.len() {
            trace!(gate = self.next, "gate opened");
        }
    }

    fn cascade(&mut self) -> Vec<(usize, T)> {
        let mut released = Vec::new();
        while self.next < self.gates.len() {
            let index = self.next;
            match mem::replace(&mut self.gates[index], Gate::Pending) {
                Gate::Buffered { queue, complete } => {
                    released.extend(queue.into_iter().map(|item| (index, item)));
                    if !complete {
                        break;
                    }
                    self.gates[index] = Gate::Flushed;
                    self.advance();
                }
                Gate::Pending => break,
                Gate::Flushed => {
                    self.gates[index] = Gate::Flushed;
                    self.advance();
                }
            }
        }
        released
    }
}
