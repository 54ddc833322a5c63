//! # Persistence Scheduler
//!
//! Debounced saves of the document plus a bounded history window.
//!
//! Every committed change calls [`PersistenceScheduler::schedule`]; the
//! write happens once the debounce elapses with no further change. Explicit
//! saves go through [`PersistenceScheduler::save`], which always writes;
//! teardown uses [`PersistenceScheduler::flush`], which skips a clean document.
//!
//! ## Stored shape
//!
//! ```text
//! { slides, design, fileName, updatedAt, history: [[Slide]], historyIndex }
//! ```
//!
//! The history is trimmed to the last K entries before it is written and
//! the cursor is remapped into that window.

use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use slidekit_common::{CommonError, RecentItem, Storage};

use crate::config::EditorConfig;
use crate::document::Document;
use crate::history::History;
use crate::layouts::Layout;
use crate::model::{DesignPreset, Presentation, Slide};
use crate::scheduler::ScheduledTask;
use crate::EditorError;

pub const DEFAULT_FILE_NAME: &str = "Untitled presentation";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedDocument {
    pub slides: Vec<Slide>,
    #[serde(default)]
    pub design: DesignPreset,
    pub file_name: String,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub history: Vec<Vec<Slide>>,
    #[serde(default)]
    pub history_index: usize,
}

impl PersistedDocument {
    /// Capture the document with the last `capacity` history entries
    pub fn capture(doc: &Document, history: &History, capacity: usize) -> Self {
        let presentation = doc.presentation();
        let (history, history_index) = history.window(capacity);
        Self {
            slides: presentation.slides.clone(),
            design: presentation.design.clone(),
            file_name: presentation.file_name.clone(),
            updated_at: presentation.updated_at,
            history,
            history_index,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SaveOutcome {
    Saved,
    /// Nothing changed since the last save
    Clean,
    Failed(String),
}

#[derive(Debug)]
pub struct PersistenceScheduler {
    task: ScheduledTask,
    dirty: bool,
    capacity: usize,
}

impl PersistenceScheduler {
    pub fn new(delay: Duration, capacity: usize) -> Self {
        Self {
            task: ScheduledTask::new(delay),
            dirty: false,
            capacity: capacity.max(1),
        }
    }

    pub fn from_config(config: &EditorConfig) -> Self {
        Self::new(config.save_debounce(), config.history_capacity)
    }

    /// Mark the document dirty and restart the debounce
    pub fn schedule(&mut self, now: Instant) {
        self.dirty = true;
        self.task.schedule(now);
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn is_pending(&self) -> bool {
        self.task.is_pending()
    }

    pub fn cancel(&mut self) {
        self.task.cancel();
    }

    /// Save if the debounce has elapsed; `None` when nothing was due
    pub fn poll<S: Storage>(
        &mut self,
        now: Instant,
        doc: &Document,
        history: &History,
        storage: &mut S,
    ) -> Option<SaveOutcome> {
        if !self.task.fire_if_due(now) {
            return None;
        }
        Some(self.write(doc, history, storage))
    }

    /// Save immediately, cancelling any pending debounce
    pub fn flush<S: Storage>(&mut self, doc: &Document, history: &History, storage: &mut S) -> SaveOutcome {
        self.task.cancel();
        if !self.dirty {
            return SaveOutcome::Clean;
        }
        self.write(doc, history, storage)
    }

    /// Save now even when clean (explicit save shortcut)
    pub fn save<S: Storage>(&mut self, doc: &Document, history: &History, storage: &mut S) -> SaveOutcome {
        self.task.cancel();
        self.write(doc, history, storage)
    }

    fn write<S: Storage>(&mut self, doc: &Document, history: &History, storage: &mut S) -> SaveOutcome {
        let persisted = PersistedDocument::capture(doc, history, self.capacity);

        if let Err(error) = storage.save(doc.id(), &persisted) {
            tracing::error!(document = %doc.id(), %error, "failed to save presentation");
            return SaveOutcome::Failed(error.to_string());
        }
        self.dirty = false;

        let recent = RecentItem {
            id: doc.id().to_string(),
            name: persisted.file_name.clone(),
            updated_at: persisted.updated_at,
        };
        if let Err(error) = storage.touch_recent(recent) {
            tracing::warn!(document = %doc.id(), %error, "failed to update recent items");
        }

        tracing::debug!(
            document = %doc.id(),
            slides = persisted.slides.len(),
            history = persisted.history.len(),
            "presentation saved"
        );
        SaveOutcome::Saved
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Stored document restored with its history
    Loaded,
    /// Nothing stored; a default presentation was created
    Fresh,
    /// Stored data was unreadable; a default presentation was created
    Recovered,
}

#[derive(Debug)]
pub struct LoadedPresentation {
    pub document: Document,
    pub history: History,
    pub outcome: LoadOutcome,
}

/// Load a presentation, falling back to a fresh default when the stored
/// data is absent or malformed
pub fn load_presentation<S: Storage>(
    storage: &S,
    id: &str,
    config: &EditorConfig,
) -> Result<LoadedPresentation, EditorError> {
    let stored = match storage.load::<PersistedDocument>(id) {
        Ok(stored) => stored,
        Err(CommonError::Json(error)) => {
            tracing::warn!(document = %id, %error, "stored presentation is malformed, starting fresh");
            return Ok(fresh(id, config, LoadOutcome::Recovered));
        }
        Err(error) => return Err(error.into()),
    };

    let Some(stored) = stored else {
        tracing::info!(document = %id, "no stored presentation, starting fresh");
        return Ok(fresh(id, config, LoadOutcome::Fresh));
    };

    if stored.slides.is_empty() {
        tracing::warn!(document = %id, "stored presentation has no slides, starting fresh");
        return Ok(fresh(id, config, LoadOutcome::Recovered));
    }

    let mut history = History::with_capacity(config.history_capacity);
    if stored.history.is_empty() {
        history.seed(stored.slides.clone());
    } else {
        if stored.history_index >= stored.history.len() {
            tracing::warn!(
                document = %id,
                index = stored.history_index,
                len = stored.history.len(),
                "history index out of range, clamping"
            );
        }
        history.restore(stored.history, stored.history_index);
    }

    let presentation = Presentation::new(id, stored.slides, stored.design, stored.file_name, stored.updated_at);
    let document = Document::new(presentation).with_duplicate_offset(config.duplicate_offset);

    Ok(LoadedPresentation {
        document,
        history,
        outcome: LoadOutcome::Loaded,
    })
}

fn fresh(id: &str, config: &EditorConfig, outcome: LoadOutcome) -> LoadedPresentation {
    let layout = Layout::from_id(&config.default_layout);
    let document = Document::create_with_id(id.to_string(), DEFAULT_FILE_NAME, layout, Utc::now())
        .with_duplicate_offset(config.duplicate_offset);

    let mut history = History::with_capacity(config.history_capacity);
    history.seed(document.slides().to_vec());

    LoadedPresentation {
        document,
        history,
        outcome,
    }
}
