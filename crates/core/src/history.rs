//! Bounded, linear undo/redo history.
//!
//! The history is a list of immutable snapshots plus a cursor. Entries
//! before the cursor are undoable, entries after it are redoable. Pushing a
//! new snapshot while entries sit after the cursor discards them: there is
//! no branching.

/// Default maximum number of retained snapshots.
pub const DEFAULT_HISTORY_LIMIT: usize = 50;

/// Snapshot history with a cursor.
///
/// Snapshots are owned values; callers hand in a fresh copy on every push and
/// get clones back, so later edits to the live state never reach a stored
/// entry.
#[derive(Debug, Clone)]
pub struct History<T> {
    entries: Vec<T>,
    cursor: usize,
    limit: usize,
}

// Never empty: there is always a current snapshot.
#[allow(clippy::len_without_is_empty)]
impl<T: Clone> History<T> {
    /// Start a history whose only entry is `initial`. `limit` is floored at 1.
    pub fn new(initial: T, limit: usize) -> Self {
        Self {
            entries: vec![initial],
            cursor: 0,
            limit: limit.max(1),
        }
    }

    /// Record a new snapshot after the cursor, dropping any redoable entries
    /// and evicting the oldest entries beyond the limit.
    pub fn push(&mut self, snapshot: T) {
        self.entries.truncate(self.cursor + 1);
        self.entries.push(snapshot);
        self.cursor = self.entries.len() - 1;

        if self.entries.len() > self.limit {
            let evicted = self.entries.len() - self.limit;
            self.entries.drain(..evicted);
            self.cursor = self
                .cursor
                .saturating_sub(evicted)
                .min(self.entries.len() - 1);
        }
    }

    /// Step back one entry. Returns `None` when already at the oldest entry.
    pub fn undo(&mut self) -> Option<T> {
        if !self.can_undo() {
            return None;
        }
        self.cursor -= 1;
        Some(self.entries[self.cursor].clone())
    }

    /// Step forward one entry. Returns `None` when already at the newest entry.
    pub fn redo(&mut self) -> Option<T> {
        if !self.can_redo() {
            return None;
        }
        self.cursor += 1;
        Some(self.entries[self.cursor].clone())
    }

    /// Discard every entry and restart from `snapshot`.
    pub fn reset(&mut self, snapshot: T) {
        self.entries.clear();
        self.entries.push(snapshot);
        self.cursor = 0;
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    /// The snapshot under the cursor.
    pub fn current(&self) -> &T {
        &self.entries[self.cursor]
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
