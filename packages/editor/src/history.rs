//! # Undo/Redo History
//!
//! Bounded window of slide-array snapshots plus a cursor.
//!
//! ## Design
//!
//! - Each committed state is stored as a full deep copy of the slides
//! - Commits are deduplicated by structural content hash
//! - Committing after an undo discards the redo tail
//! - The window holds at most `capacity` snapshots; the oldest is evicted
//! - Undo/redo hand back a fresh copy and raise a replay flag so the
//!   restored state is not captured again as a new entry
//!
//! ## Example
//!
//! ```rust,ignore
//! let mut history = History::with_capacity(20);
//! history.seed(doc.slides().to_vec());
//!
//! // After a committed mutation
//! history.commit(doc.slides());
//!
//! // Undo
//! if let Some(slides) = history.undo() {
//!     restore(slides);
//!     history.finish_replay();
//! }
//! ```

use std::collections::VecDeque;

use crate::config::DEFAULT_HISTORY_CAPACITY;
use crate::hash::digest;
use crate::model::Slide;

/// Immutable committed state
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    slides: Vec<Slide>,
    hash: u32,
}

impl Snapshot {
    pub fn new(slides: Vec<Slide>) -> Self {
        let hash = digest(&slides);
        Self { slides, hash }
    }

    pub fn slides(&self) -> &[Slide] {
        &self.slides
    }

    pub fn hash(&self) -> u32 {
        self.hash
    }
}

/// Result of a commit attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    /// A new snapshot was stored
    Committed,
    /// Content matches the current entry; nothing stored
    Duplicate,
    /// An undo/redo restore is in progress; nothing stored
    Suppressed,
}

/// Snapshot history for undo/redo
#[derive(Debug)]
pub struct History {
    entries: VecDeque<Snapshot>,
    cursor: usize,
    capacity: usize,
    replaying: bool,
}

impl History {
    /// Create a history with the default capacity (20)
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_CAPACITY)
    }

    /// Create a history holding at most `capacity` snapshots
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            cursor: 0,
            capacity: capacity.max(1),
            replaying: false,
        }
    }

    /// Reset to a single entry holding `slides`
    pub fn seed(&mut self, slides: Vec<Slide>) {
        self.entries.clear();
        self.entries.push_back(Snapshot::new(slides));
        self.cursor = 0;
        self.replaying = false;
    }

    /// Replace the window wholesale (loading persisted history).
    /// `cursor` is clamped into range; excess entries keep the newest.
    pub fn restore(&mut self, entries: Vec<Vec<Slide>>, cursor: usize) {
        let total = entries.len();
        let skip = total.saturating_sub(self.capacity);

        self.entries = entries.into_iter().skip(skip).map(Snapshot::new).collect();
        self.cursor = cursor
            .saturating_sub(skip)
            .min(self.entries.len().saturating_sub(1));
        self.replaying = false;
    }

    /// Commit the current slides
    pub fn commit(&mut self, slides: &[Slide]) -> CommitOutcome {
        if self.replaying {
            return CommitOutcome::Suppressed;
        }

        let hash = digest(slides);
        if self.current().map(Snapshot::hash) == Some(hash) {
            return CommitOutcome::Duplicate;
        }

        // New commit invalidates the redo tail
        if !self.entries.is_empty() {
            self.entries.truncate(self.cursor + 1);
        }

        self.entries.push_back(Snapshot {
            slides: slides.to_vec(),
            hash,
        });

        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
        self.cursor = self.entries.len() - 1;

        tracing::debug!(entries = self.entries.len(), cursor = self.cursor, hash, "history commit");
        CommitOutcome::Committed
    }

    /// Step back one entry; returns a fresh copy to restore
    pub fn undo(&mut self) -> Option<Vec<Slide>> {
        if self.cursor == 0 || self.entries.is_empty() {
            return None;
        }
        self.cursor -= 1;
        self.replaying = true;
        Some(self.entries[self.cursor].slides.clone())
    }

    /// Step forward one entry; returns a fresh copy to restore
    pub fn redo(&mut self) -> Option<Vec<Slide>> {
        if self.cursor + 1 >= self.entries.len() {
            return None;
        }
        self.cursor += 1;
        self.replaying = true;
        Some(self.entries[self.cursor].slides.clone())
    }

    /// Clear the replay flag once the restored model has been observed
    pub fn finish_replay(&mut self) {
        self.replaying = false;
    }

    pub fn is_replaying(&self) -> bool {
        self.replaying
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn current(&self) -> Option<&Snapshot> {
        self.entries.get(self.cursor)
    }

    pub fn entries(&self) -> impl Iterator<Item = &Snapshot> {
        self.entries.iter()
    }

    /// Last `k` entries with the cursor remapped into that window
    pub fn window(&self, k: usize) -> (Vec<Vec<Slide>>, usize) {
        let k = k.max(1);
        let start = self.entries.len().saturating_sub(k);
        let slides = self
            .entries
            .iter()
            .skip(start)
            .map(|snapshot| snapshot.slides.clone())
            .collect::<Vec<_>>();
        let cursor = self
            .cursor
            .saturating_sub(start)
            .min(slides.len().saturating_sub(1));
        (slides, cursor)
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}
