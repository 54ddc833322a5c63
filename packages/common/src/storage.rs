//! # Storage collaborators
//!
//! Durable key/value storage for presentations plus the recent-items list.
//!
//! Documents are stored as JSON keyed by presentation id. Backends decide
//! where the bytes live:
//! - **Memory**: ephemeral sessions and tests
//! - **File**: one `<id>.json` per document under a root directory

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::{CommonError, CommonResult};

const RECENT_FILE: &str = "recent.json";

/// Entry in the recent-documents list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentItem {
    pub id: String,
    pub name: String,
    pub updated_at: DateTime<Utc>,
}

/// Storage backend for persisted presentations
pub trait Storage {
    /// Load a document. `Ok(None)` when nothing is stored under `id`,
    /// `Err(CommonError::Json)` when the stored bytes do not decode.
    fn load<T: DeserializeOwned>(&self, id: &str) -> CommonResult<Option<T>>;

    /// Store a document, replacing any previous value
    fn save<T: Serialize>(&mut self, id: &str, value: &T) -> CommonResult<()>;

    /// Remove a document and its recent-items entry
    fn delete(&mut self, id: &str) -> CommonResult<()>;

    /// Recent items, most recently updated first
    fn recent(&self) -> CommonResult<Vec<RecentItem>>;

    /// Insert or refresh a recent-items entry
    fn touch_recent(&mut self, item: RecentItem) -> CommonResult<()>;

    /// Drop a recent-items entry without touching the document
    fn remove_recent(&mut self, id: &str) -> CommonResult<()>;
}

fn sort_recent(items: &mut [RecentItem]) {
    items.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then_with(|| a.id.cmp(&b.id)));
}

fn upsert_recent(items: &mut Vec<RecentItem>, item: RecentItem) {
    items.retain(|existing| existing.id != item.id);
    items.push(item);
    sort_recent(items);
}

/// In-memory storage
#[derive(Debug, Default)]
pub struct MemoryStorage {
    documents: BTreeMap<String, String>,
    recent: Vec<RecentItem>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store raw text under `id` (used to simulate corrupted data)
    pub fn insert_raw(&mut self, id: impl Into<String>, raw: impl Into<String>) {
        self.documents.insert(id.into(), raw.into());
    }

    pub fn raw(&self, id: &str) -> Option<&str> {
        self.documents.get(id).map(String::as_str)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.documents.contains_key(id)
    }
}

impl Storage for MemoryStorage {
    fn load<T: DeserializeOwned>(&self, id: &str) -> CommonResult<Option<T>> {
        match self.documents.get(id) {
            Some(raw) => Ok(Some(serde_json::from_str(raw)?)),
            None => Ok(None),
        }
    }

    fn save<T: Serialize>(&mut self, id: &str, value: &T) -> CommonResult<()> {
        let raw = serde_json::to_string(value)?;
        self.documents.insert(id.to_string(), raw);
        Ok(())
    }

    fn delete(&mut self, id: &str) -> CommonResult<()> {
        self.documents.remove(id);
        self.recent.retain(|item| item.id != id);
        Ok(())
    }

    fn recent(&self) -> CommonResult<Vec<RecentItem>> {
        Ok(self.recent.clone())
    }

    fn touch_recent(&mut self, item: RecentItem) -> CommonResult<()> {
        upsert_recent(&mut self.recent, item);
        Ok(())
    }

    fn remove_recent(&mut self, id: &str) -> CommonResult<()> {
        self.recent.retain(|item| item.id != id);
        Ok(())
    }
}

/// File-backed storage (one JSON file per document)
#[derive(Debug, Clone)]
pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    /// Open a store rooted at `root`, creating the directory if needed
    pub fn open(root: impl Into<PathBuf>) -> CommonResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn document_path(&self, id: &str) -> CommonResult<PathBuf> {
        let valid = !id.is_empty()
            && id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(CommonError::InvalidKey(id.to_string()));
        }
        Ok(self.root.join(format!("{}.json", id)))
    }

    fn write_recent(&self, items: &[RecentItem]) -> CommonResult<()> {
        let raw = serde_json::to_string_pretty(items)?;
        fs::write(self.root.join(RECENT_FILE), raw)?;
        Ok(())
    }
}

impl Storage for FileStorage {
    fn load<T: DeserializeOwned>(&self, id: &str) -> CommonResult<Option<T>> {
        let path = self.document_path(id)?;
        if !path.exists() {
            return Ok(None);
        }
        let raw = fs::read_to_string(&path)?;
        Ok(Some(serde_json::from_str(&raw)?))
    }

    fn save<T: Serialize>(&mut self, id: &str, value: &T) -> CommonResult<()> {
        let path = self.document_path(id)?;
        let raw = serde_json::to_string_pretty(value)?;

        // Write to a sibling temp file, then rename over the target
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, raw)?;
        fs::rename(&tmp, &path)?;
        tracing::debug!(id, path = %path.display(), "document written");
        Ok(())
    }

    fn delete(&mut self, id: &str) -> CommonResult<()> {
        let path = self.document_path(id)?;
        if path.exists() {
            fs::remove_file(&path)?;
        }
        self.remove_recent(id)
    }

    fn recent(&self) -> CommonResult<Vec<RecentItem>> {
        let path = self.root.join(RECENT_FILE);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let raw = fs::read_to_string(&path)?;
        match serde_json::from_str::<Vec<RecentItem>>(&raw) {
            Ok(mut items) => {
                sort_recent(&mut items);
                Ok(items)
            }
            Err(e) => {
                tracing::warn!(error = %e, "recent-items list is malformed, ignoring it");
                Ok(Vec::new())
            }
        }
    }

    fn touch_recent(&mut self, item: RecentItem) -> CommonResult<()> {
        let mut items = self.recent()?;
        upsert_recent(&mut items, item);
        self.write_recent(&items)
    }

    fn remove_recent(&mut self, id: &str) -> CommonResult<()> {
        let mut items = self.recent()?;
        items.retain(|item| item.id != id);
        self.write_recent(&items)
    }
}
