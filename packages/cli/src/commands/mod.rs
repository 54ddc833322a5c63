pub mod export;
pub mod history;
pub mod info;
pub mod new;
pub mod preview;
pub mod slides;

pub use export::{export, ExportArgs};
pub use history::{redo, undo, HistoryArgs};
pub use info::{info, list, InfoArgs};
pub use new::{new, NewArgs};
pub use preview::{preview, PreviewArgs};
pub use slides::{add_chart, add_slide, AddChartArgs, AddSlideArgs};

use crate::config::Config;
use anyhow::{bail, Result};
use colored::Colorize;
use slidekit_common::FileStorage;
use slidekit_editor::{EditSession, LoadOutcome, SaveOutcome};
use std::path::Path;

/// Config plus the store it points at
pub struct Workspace {
    pub config: Config,
    pub storage: FileStorage,
}

impl Workspace {
    pub fn open(cwd: &Path, store_override: Option<&Path>) -> Result<Self> {
        let config = Config::load(cwd)?;
        let storage = FileStorage::open(config.store_path(cwd, store_override))?;
        tracing::debug!(store = %storage.root().display(), "workspace opened");
        Ok(Self { config, storage })
    }

    /// Open a presentation that must already exist in the store
    pub fn open_existing(&self, id: &str) -> Result<EditSession> {
        let (session, outcome) = EditSession::open(&self.storage, id, self.config.editor.clone())?;
        match outcome {
            LoadOutcome::Loaded => Ok(session),
            LoadOutcome::Fresh => bail!("No presentation with id {}", id),
            LoadOutcome::Recovered => {
                println!(
                    "{} stored data for {} was unreadable, continuing with a fresh deck",
                    "⚠️".yellow(),
                    id.bright_white()
                );
                Ok(session)
            }
        }
    }

    /// Force a save and surface failures as errors
    pub fn save(&mut self, session: &mut EditSession) -> Result<()> {
        match session.save_now(&mut self.storage) {
            SaveOutcome::Failed(reason) => bail!("Failed to save {}: {}", session.document().id(), reason),
            SaveOutcome::Saved | SaveOutcome::Clean => Ok(()),
        }
    }
}
