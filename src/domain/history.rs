//! Bounded linear undo/redo log of whole-tree snapshots.
//!
//! Each entry is a deep copy of the tree as it stood after a completed edit.
//! The cursor marks the entry matching the current tree; entries past it are
//! redo-able and are dropped as soon as a new checkpoint is taken.

use std::collections::VecDeque;
use std::fmt;

use tracing::{debug, instrument};

use crate::domain::arena::MindMap;

/// Default maximum number of retained snapshots.
pub const DEFAULT_HISTORY_CAPACITY: usize = 50;

pub struct HistoryLog {
    entries: VecDeque<MindMap>,
    cursor: Option<usize>,
    capacity: usize,
    /// Entry index of the last saved state; `None` if never saved or the
    /// entry has been evicted or truncated away.
    saved: Option<usize>,
}

impl Default for HistoryLog {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

impl HistoryLog {
    /// Creates an empty log holding at most `capacity` snapshots (at least one).
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            cursor: None,
            capacity: capacity.max(1),
            saved: None,
        }
    }

    /// Records a deep copy of `tree` as the new current entry.
    ///
    /// Any redo-able entries are discarded first. When the log is full the
    /// oldest entry is evicted and the cursor shifts with it.
    #[instrument(level = "debug", skip(self, tree))]
    pub fn checkpoint(&mut self, tree: &MindMap) {
        if let Some(cursor) = self.cursor {
            if cursor + 1 < self.entries.len() {
                self.entries.truncate(cursor + 1);
                if self.saved.is_some_and(|s| s > cursor) {
                    self.saved = None;
                }
            }
        }

        self.entries.push_back(tree.clone_deep());
        let mut cursor = self.entries.len() - 1;

        if self.entries.len() > self.capacity {
            self.entries.pop_front();
            cursor -= 1;
            self.saved = match self.saved {
                Some(0) | None => None,
                Some(s) => Some(s - 1),
            };
        }
        self.cursor = Some(cursor);
        debug!("checkpoint: {} entries, cursor {}", self.entries.len(), cursor);
    }

    /// Steps back one entry and returns a copy of it, or `None` at the oldest entry.
    pub fn undo(&mut self) -> Option<MindMap> {
        let cursor = self.cursor.filter(|&c| c > 0)? - 1;
        self.cursor = Some(cursor);
        debug!("undo: cursor {}", cursor);
        self.entries.get(cursor).map(MindMap::clone_deep)
    }

    /// Steps forward one entry and returns a copy of it, or `None` at the newest entry.
    pub fn redo(&mut self) -> Option<MindMap> {
        let cursor = self.cursor.filter(|&c| c + 1 < self.entries.len())? + 1;
        self.cursor = Some(cursor);
        debug!("redo: cursor {}", cursor);
        self.entries.get(cursor).map(MindMap::clone_deep)
    }

    pub fn can_undo(&self) -> bool {
        self.cursor.is_some_and(|c| c > 0)
    }

    pub fn can_redo(&self) -> bool {
        self.cursor.is_some_and(|c| c + 1 < self.entries.len())
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Records the current entry as the saved state.
    pub fn mark_saved(&mut self) {
        self.saved = self.cursor;
    }

    /// `true` unless the cursor sits on the entry last marked as saved.
    pub fn has_unsaved_changes(&self) -> bool {
        self.saved.is_none() || self.saved != self.cursor
    }
}

impl fmt::Debug for HistoryLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HistoryLog")
            .field("len", &self.entries.len())
            .field("cursor", &self.cursor)
            .field("capacity", &self.capacity)
            .field("saved", &self.saved)
            .finish()
    }
}
