//! # Slidekit Editor
//!
//! Core editing engine for slide decks.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ interaction: pointer/key/text → Effects     │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ session: Document lifecycle + mutations     │
//! │  - Apply mutations with validation          │
//! │  - Bounded snapshot history (undo/redo)     │
//! │  - Debounced thumbnails and autosave        │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ storage: PersistedDocument → JSON           │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Slides are the source of truth**: previews and thumbnails are derived views
//! 2. **Single writer**: one session owns the document; no locks, no sharing
//! 3. **Explicit time**: every debounced operation takes `now`
//! 4. **Canonical geometry**: elements live on a fixed 960×540 canvas
//!
//! ## Usage
//!
//! ```rust,ignore
//! use slidekit_editor::{Document, EditSession, EditorConfig, Layout, Mutation};
//!
//! let doc = Document::create("Quarterly review", Layout::Title, Utc::now());
//! let mut session = EditSession::new(doc, EditorConfig::default());
//!
//! session.apply(&Mutation::AddSlide { layout: "title-content".into(), index: 1 }, Instant::now())?;
//! session.undo(Instant::now());
//!
//! // Drive debounced work from the host loop
//! session.tick(Instant::now(), &mut storage, &mut renderer);
//! ```

pub mod chart;
pub mod config;
mod document;
mod errors;
pub mod export;
pub mod factory;
pub mod hash;
mod history;
pub mod ids;
pub mod interaction;
pub mod layouts;
pub mod model;
mod mutations;
pub mod persistence;
pub mod preview;
pub mod scheduler;
mod session;
pub mod thumbnail;

pub use config::EditorConfig;
pub use document::Document;
pub use errors::EditorError;
pub use export::{ExportEncoder, ExportError, JsonExportEncoder, Notification};
pub use factory::InsertTool;
pub use history::{CommitOutcome, History, Snapshot};
pub use interaction::{Effect, InteractionController, InteractionState};
pub use layouts::Layout;
pub use mutations::{ElementPatch, Mutation, MutationError, MutationOutcome};
pub use persistence::{load_presentation, LoadOutcome, PersistedDocument, PersistenceScheduler, SaveOutcome};
pub use session::{CommitPolicy, EditSession, TickReport};
pub use thumbnail::{SnapshotRenderer, ThumbnailPipeline};

// Re-export common types for convenience
pub use slidekit_common::{MemoryStorage, FileStorage, Storage};
