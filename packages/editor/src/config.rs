use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const DEFAULT_HISTORY_CAPACITY: usize = 20;
pub const DEFAULT_DUPLICATE_OFFSET: f64 = 20.0;

/// Editing engine tunables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorConfig {
    /// Maximum number of history snapshots kept (K)
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,

    /// Quiet period after a drag/resize before its history commit
    #[serde(default = "default_history_settle_ms")]
    pub history_settle_ms: u64,

    /// Debounce before a slide thumbnail is captured
    #[serde(default = "default_thumbnail_debounce_ms")]
    pub thumbnail_debounce_ms: u64,

    /// Debounce before the document is written to storage
    #[serde(default = "default_save_debounce_ms")]
    pub save_debounce_ms: u64,

    /// Canvas-unit offset applied to duplicated elements
    #[serde(default = "default_duplicate_offset")]
    pub duplicate_offset: f64,

    /// Layout used for new presentations
    #[serde(default = "default_layout")]
    pub default_layout: String,
}

fn default_history_capacity() -> usize {
    DEFAULT_HISTORY_CAPACITY
}

fn default_history_settle_ms() -> u64 {
    200
}

fn default_thumbnail_debounce_ms() -> u64 {
    800
}

fn default_save_debounce_ms() -> u64 {
    700
}

fn default_duplicate_offset() -> f64 {
    DEFAULT_DUPLICATE_OFFSET
}

fn default_layout() -> String {
    "title-content".to_string()
}

impl EditorConfig {
    /// Parse a JSON config; missing fields take their defaults
    pub fn from_json(source: &str) -> Result<Self, serde_json::Error> {
        let mut config: EditorConfig = serde_json::from_str(source)?;
        config.sanitize();
        Ok(config)
    }

    /// Clamp values the engine cannot run with
    pub fn sanitize(&mut self) {
        if self.history_capacity == 0 {
            tracing::warn!("historyCapacity must be at least 1, using 1");
            self.history_capacity = 1;
        }
    }

    pub fn history_settle(&self) -> Duration {
        Duration::from_millis(self.history_settle_ms)
    }

    pub fn thumbnail_debounce(&self) -> Duration {
        Duration::from_millis(self.thumbnail_debounce_ms)
    }

    pub fn save_debounce(&self) -> Duration {
        Duration::from_millis(self.save_debounce_ms)
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_capacity: default_history_capacity(),
            history_settle_ms: default_history_settle_ms(),
            thumbnail_debounce_ms: default_thumbnail_debounce_ms(),
            save_debounce_ms: default_save_debounce_ms(),
            duplicate_offset: default_duplicate_offset(),
            default_layout: default_layout(),
        }
    }
}
