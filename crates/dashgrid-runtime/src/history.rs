#![forbid(unsafe_code)]

//! Linear undo/redo history over whole values.
//!
//! ```text
//! record(s2)
//!   past:    [s0, s1]      present: s2     future: []
//! undo() x2
//!   past:    []            present: s0     future: [s2, s1]
//! record(s3) (new branch, clears future)
//!   past:    [s0]          present: s3     future: []
//! ```
//!
//! # Invariants
//!
//! 1. `past.len() <= max_depth` after every operation; the oldest entries are
//!    evicted first.
//! 2. `record` clears `future`.
//! 3. `replace` touches neither `past` nor `future`.
//! 4. `undo` followed by `redo` restores the same `present`.

use std::collections::VecDeque;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryState<T> {
    past: VecDeque<T>,
    present: T,
    future: Vec<T>,
    max_depth: usize,
}

impl<T> HistoryState<T> {
    /// Start a history at `present` keeping at most `max_depth` undo steps.
    #[must_use]
    pub fn new(present: T, max_depth: usize) -> Self {
        Self {
            past: VecDeque::new(),
            present,
            future: Vec::new(),
            max_depth,
        }
    }

    #[must_use]
    pub fn present(&self) -> &T {
        &self.present
    }

    /// Undo entries, oldest first.
    pub fn past(&self) -> impl Iterator<Item = &T> {
        self.past.iter()
    }

    /// Redo entries, next redo last.
    pub fn future(&self) -> impl Iterator<Item = &T> {
        self.future.iter()
    }

    #[must_use]
    pub fn undo_depth(&self) -> usize {
        self.past.len()
    }

    #[must_use]
    pub fn redo_depth(&self) -> usize {
        self.future.len()
    }

    #[must_use]
    pub const fn max_depth(&self) -> usize {
        self.max_depth
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    /// Make `next` the present and remember the old one for undo.
    pub fn record(&mut self, next: T) {
        let previous = std::mem::replace(&mut self.present, next);
        self.past.push_back(previous);
        self.future.clear();
        self.enforce_depth();
    }

    /// Make `next` the present without creating an undo step.
    pub fn replace(&mut self, next: T) {
        self.present = next;
    }

    /// Step back. Returns `false` when there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        let Some(previous) = self.past.pop_back() else {
            return false;
        };
        let current = std::mem::replace(&mut self.present, previous);
        self.future.push(current);
        true
    }

    /// Step forward. Returns `false` when there is nothing to redo.
    pub fn redo(&mut self) -> bool {
        let Some(next) = self.future.pop() else {
            return false;
        };
        let current = std::mem::replace(&mut self.present, next);
        self.past.push_back(current);
        self.enforce_depth();
        true
    }

    /// Drop all history and start over at `present`.
    pub fn reset(&mut self, present: T) {
        self.past.clear();
        self.future.clear();
        self.present = present;
    }

    /// Change the depth limit, evicting old entries if needed.
    pub fn set_max_depth(&mut self, max_depth: usize) {
        self.max_depth = max_depth;
        self.enforce_depth();
    }

    fn enforce_depth(&mut self) {
        while self.past.len() > self.max_depth {
            self.past.pop_front();
        }
    }
}
