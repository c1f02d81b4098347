//! Bounded undo history.
//!
//! A linear stack of parameter snapshots. Pixels are never stored; undo
//! restores parameters and the editor recomputes.

use std::collections::VecDeque;

use lura_core::{Error, Result};
use tracing::trace;

use crate::state::{AdjustmentParameters, FilterSelection};

/// Upper bound on history length.
pub const MAX_HISTORY: usize = 20;

/// Immutable parameter snapshot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistoryEntry {
    /// Continuous adjustments.
    pub params: AdjustmentParameters,
    /// Preset selection.
    pub selection: FilterSelection,
}

impl HistoryEntry {
    /// Identity parameters with no preset.
    pub fn baseline() -> Self {
        Self {
            params: AdjustmentParameters::IDENTITY,
            selection: FilterSelection::default(),
        }
    }
}

/// FIFO-evicting stack of [`HistoryEntry`].
#[derive(Debug, Clone)]
pub struct HistoryStack {
    entries: VecDeque<HistoryEntry>,
    capacity: usize,
}

impl HistoryStack {
    /// Creates an empty stack holding at most `capacity` entries.
    ///
    /// `capacity` is clamped to `1..=MAX_HISTORY`.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.clamp(1, MAX_HISTORY);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends `entry`, evicting the oldest if full.
    pub fn push(&mut self, entry: HistoryEntry) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
            trace!(capacity = self.capacity, "history evicted oldest entry");
        }
        self.entries.push_back(entry);
    }

    /// Removes and returns the newest entry.
    ///
    /// # Errors
    ///
    /// [`Error::EmptyHistory`] if there is nothing to undo.
    pub fn pop(&mut self) -> Result<HistoryEntry> {
        self.entries.pop_back().ok_or(Error::EmptyHistory)
    }

    /// Newest entry without removing it.
    pub fn peek(&self) -> Option<&HistoryEntry> {
        self.entries.back()
    }

    /// Drops every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns `true` if [`pop`](Self::pop) would succeed.
    pub fn can_undo(&self) -> bool {
        !self.is_empty()
    }

    /// Maximum number of entries.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Entries, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &HistoryEntry> + '_ {
        self.entries.iter()
    }
}

impl Default for HistoryStack {
    fn default() -> Self {
        Self::new(MAX_HISTORY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(brightness: f32) -> HistoryEntry {
        HistoryEntry {
            params: AdjustmentParameters {
                brightness,
                ..AdjustmentParameters::IDENTITY
            },
            selection: FilterSelection::default(),
        }
    }

    #[test]
    fn test_push_pop_lifo() {
        let mut h = HistoryStack::default();
        h.push(entry(0.1));
        h.push(entry(0.2));
        assert_eq!(h.pop().unwrap().params.brightness, 0.2);
        assert_eq!(h.pop().unwrap().params.brightness, 0.1);
        assert_eq!(h.pop(), Err(Error::EmptyHistory));
    }

    #[test]
    fn test_bound_evicts_oldest() {
        let mut h = HistoryStack::default();
        for i in 0..25 {
            h.push(entry(i as f32 * 0.01));
        }
        assert_eq!(h.len(), MAX_HISTORY);
        let kept: Vec<f32> = h.iter().map(|e| e.params.brightness).collect();
        let expected: Vec<f32> = (5..25).map(|i| i as f32 * 0.01).collect();
        assert_eq!(kept, expected);
    }

    #[test]
    fn test_capacity_clamped() {
        assert_eq!(HistoryStack::new(0).capacity(), 1);
        assert_eq!(HistoryStack::new(100).capacity(), MAX_HISTORY);

        let mut h = HistoryStack::new(3);
        for i in 0..5 {
            h.push(entry(i as f32));
        }
        assert_eq!(h.len(), 3);
        assert_eq!(h.peek().unwrap().params.brightness, 4.0);
    }

    #[test]
    fn test_clear() {
        let mut h = HistoryStack::default();
        h.push(HistoryEntry::baseline());
        assert!(h.can_undo());
        h.clear();
        assert!(!h.can_undo());
        assert!(h.is_empty());
    }
}
