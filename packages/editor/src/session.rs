//! # Edit Session
//!
//! Owns everything one editing session needs and routes work between the
//! pieces:
//!
//! ```text
//! events → InteractionController → Effects ─┐
//!                                           ↓
//!                 Mutation → Document → History (immediate or settled)
//!                                    ↘ ThumbnailPipeline (debounced)
//!                                    ↘ PersistenceScheduler (debounced)
//! ```
//!
//! There is exactly one writer. Time is passed in explicitly, and debounced
//! work only runs from [`EditSession::tick`] or an explicit flush.

use std::time::Instant;

use chrono::Utc;
use slidekit_common::Storage;

use crate::config::EditorConfig;
use crate::document::Document;
use crate::export::{ExportEncoder, Notification};
use crate::factory::InsertTool;
use crate::history::{CommitOutcome, History};
use crate::interaction::{
    CanvasViewport, ChosenImage, Effect, InteractionController, InteractionState, Key, Modifiers,
    PlacementSlot, ToolbarAnchor,
};
use crate::model::{Point, Rect, Slide};
use crate::mutations::{Mutation, MutationOutcome};
use crate::persistence::{load_presentation, LoadOutcome, PersistenceScheduler, SaveOutcome};
use crate::scheduler::ScheduledTask;
use crate::thumbnail::{CaptureOutcome, SnapshotRenderer, ThumbnailPipeline};
use crate::EditorError;

/// When a mutation's history snapshot is taken
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitPolicy {
    /// Commit right after the mutation
    Immediate,
    /// Commit once activity has been quiet for the settle delay
    Settle,
}

/// What one [`EditSession::tick`] did
#[derive(Debug, Default, PartialEq)]
pub struct TickReport {
    pub history: Option<CommitOutcome>,
    pub captures: Vec<CaptureOutcome>,
    pub save: Option<SaveOutcome>,
}

#[derive(Debug)]
pub struct EditSession {
    document: Document,
    history: History,
    controller: InteractionController,
    thumbnails: ThumbnailPipeline,
    persistence: PersistenceScheduler,
    history_commit: ScheduledTask,
    config: EditorConfig,

    toolbar: Option<ToolbarAnchor>,
    image_request: Option<PlacementSlot>,
    notifications: Vec<Notification>,
    next_notification: u64,
}

impl EditSession {
    /// Start a session on `document`, seeding history with its current slides
    pub fn new(document: Document, config: EditorConfig) -> Self {
        let mut history = History::with_capacity(config.history_capacity);
        history.seed(document.slides().to_vec());
        Self::from_parts(document, history, config)
    }

    fn from_parts(document: Document, history: History, config: EditorConfig) -> Self {
        Self {
            document: document.with_duplicate_offset(config.duplicate_offset),
            history,
            controller: InteractionController::new(),
            thumbnails: ThumbnailPipeline::new(config.thumbnail_debounce()),
            persistence: PersistenceScheduler::from_config(&config),
            history_commit: ScheduledTask::new(config.history_settle()),
            config,
            toolbar: None,
            image_request: None,
            notifications: Vec::new(),
            next_notification: 1,
        }
    }

    /// Load a stored presentation (or a fresh default) into a new session
    pub fn open<S: Storage>(
        storage: &S,
        id: &str,
        config: EditorConfig,
    ) -> Result<(Self, LoadOutcome), EditorError> {
        let loaded = load_presentation(storage, id, &config)?;
        tracing::info!(document = %id, outcome = ?loaded.outcome, "session opened");
        Ok((Self::from_parts(loaded.document, loaded.history, config), loaded.outcome))
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn controller(&self) -> &InteractionController {
        &self.controller
    }

    pub fn thumbnails(&self) -> &ThumbnailPipeline {
        &self.thumbnails
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn toolbar(&self) -> Option<&ToolbarAnchor> {
        self.toolbar.as_ref()
    }

    pub fn is_dirty(&self) -> bool {
        self.persistence.is_dirty()
    }

    pub fn is_history_pending(&self) -> bool {
        self.history_commit.is_pending()
    }

    /// Pending file-selection request for the host, if any
    pub fn take_image_request(&mut self) -> Option<PlacementSlot> {
        self.image_request.take()
    }

    pub fn set_viewport(&mut self, viewport: CanvasViewport) {
        self.controller.set_viewport(viewport);
    }

    /// Apply a discrete mutation with an immediate history commit
    pub fn apply(&mut self, mutation: &Mutation, now: Instant) -> Result<MutationOutcome, EditorError> {
        self.apply_with(mutation, CommitPolicy::Immediate, now)
    }

    pub fn apply_with(
        &mut self,
        mutation: &Mutation,
        policy: CommitPolicy,
        now: Instant,
    ) -> Result<MutationOutcome, EditorError> {
        // A settled gesture keeps its own entry ahead of the next discrete edit
        if policy == CommitPolicy::Immediate {
            self.settle_history();
        }

        let outcome = self.document.apply(mutation)?;
        if !outcome.is_changed() {
            return Ok(outcome);
        }
        self.document.touch(Utc::now());

        match policy {
            CommitPolicy::Immediate => {
                self.history.commit(self.document.slides());
            }
            CommitPolicy::Settle => self.history_commit.schedule(now),
        }

        self.after_change(mutation.touches_all_slides(), now);
        Ok(outcome)
    }

    fn after_change(&mut self, all_slides: bool, now: Instant) {
        let slides = self.document.slides();
        self.thumbnails.retain_slides(slides);
        if all_slides {
            for slide in slides {
                self.thumbnails.request(&slide.id, now);
            }
        } else {
            self.thumbnails.request(&self.document.active_slide().id, now);
        }

        self.persistence.schedule(now);

        let effects = self.controller.sync(self.document.active_slide());
        self.apply_ui(effects);
    }

    /// Commit a pending settled snapshot right away
    fn settle_history(&mut self) -> Option<CommitOutcome> {
        if !self.history_commit.is_pending() {
            return None;
        }
        self.history_commit.cancel();
        Some(self.history.commit(self.document.slides()))
    }

    /// Carry out controller effects
    pub fn handle(&mut self, effects: Vec<Effect>, now: Instant) -> Result<(), EditorError> {
        let policy = if effects.contains(&Effect::ScheduleHistoryCommit) {
            CommitPolicy::Settle
        } else {
            CommitPolicy::Immediate
        };

        for effect in effects {
            match effect {
                Effect::Mutate(mutation) => {
                    let outcome = self.apply_with(&mutation, policy, now)?;
                    if let (Mutation::AddElement { .. }, Some(id)) = (&mutation, outcome.created_id()) {
                        let follow_up = self.controller.element_created(self.document.active_slide(), id);
                        self.handle(follow_up, now)?;
                    }
                }
                Effect::ScheduleHistoryCommit => {}
                Effect::InvalidateThumbnail(slide_id) => {
                    self.thumbnails.invalidate(&slide_id);
                    self.thumbnails.request(&slide_id, now);
                }
                Effect::RequestImageFile(slot) => self.image_request = Some(slot),
                other => self.apply_ui(vec![other]),
            }
        }
        self.drop_orphaned_image_request();
        Ok(())
    }

    fn apply_ui(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::RepositionToolbar(anchor) => self.toolbar = anchor,
                Effect::ClearSelection => self.toolbar = None,
                other => tracing::debug!(effect = ?other, "non-ui effect ignored"),
            }
        }
        self.drop_orphaned_image_request();
    }

    /// A file request is only valid while its slot is awaited
    fn drop_orphaned_image_request(&mut self) {
        let awaiting = matches!(
            self.controller.state(),
            InteractionState::AwaitingImage { slot, .. }
                if self.image_request.as_ref().map_or(false, |r| r.token == slot.token)
        );
        if !awaiting && self.image_request.take().is_some() {
            tracing::debug!("pending image request dropped");
        }
    }

    pub fn set_active_slide(&mut self, index: usize) {
        self.document.set_active_slide(index);
        self.image_request = None;
        let effects = self.controller.reset();
        self.apply_ui(effects);
    }

    pub fn pointer_down(&mut self, screen: Point, now: Instant) -> Result<(), EditorError> {
        let effects = self.controller.pointer_down(self.document.active_slide(), screen);
        self.handle(effects, now)
    }

    pub fn select_tool(&mut self, tool: InsertTool, keep: bool) {
        let effects = self.controller.select_tool(tool, keep);
        self.apply_ui(effects);
    }

    pub fn image_chosen(&mut self, token: u64, chosen: Option<ChosenImage>, now: Instant) -> Result<(), EditorError> {
        let effects = self.controller.image_chosen(self.document.active_slide(), token, chosen);
        self.handle(effects, now)
    }

    pub fn drag_start(&mut self, id: &str) {
        let effects = self.controller.drag_start(self.document.active_slide(), id);
        self.apply_ui(effects);
    }

    pub fn drag_move(&mut self, position: Point) {
        self.controller.drag_move(position);
    }

    pub fn drag_stop(&mut self, position: Point, now: Instant) -> Result<(), EditorError> {
        let effects = self.controller.drag_stop(self.document.active_slide(), position);
        self.handle(effects, now)
    }

    pub fn resize_start(&mut self, id: &str) {
        let effects = self.controller.resize_start(self.document.active_slide(), id);
        self.apply_ui(effects);
    }

    pub fn resize_move(&mut self, frame: Rect) {
        self.controller.resize_move(frame);
    }

    pub fn resize_stop(&mut self, frame: Rect, now: Instant) -> Result<(), EditorError> {
        let effects = self.controller.resize_stop(self.document.active_slide(), frame);
        self.handle(effects, now)
    }

    pub fn text_focus(&mut self, id: &str) {
        let effects = self.controller.text_focus(self.document.active_slide(), id);
        self.apply_ui(effects);
    }

    pub fn text_blur(&mut self) {
        let effects = self.controller.text_blur();
        self.apply_ui(effects);
    }

    pub fn text_changed(&mut self, html: &str, plain_text: &str, now: Instant) -> Result<(), EditorError> {
        let effects = self.controller.text_changed(self.document.active_slide(), html, plain_text);
        self.handle(effects, now)
    }

    pub fn update_image_source(&mut self, id: &str, src: Option<String>, now: Instant) -> Result<(), EditorError> {
        let effects = self.controller.update_image_source(self.document.active_slide(), id, src);
        self.handle(effects, now)
    }

    pub fn key_down(&mut self, key: &Key, modifiers: Modifiers, now: Instant) -> Result<(), EditorError> {
        let effects = self.controller.key_down(self.document.active_slide(), key, modifiers);
        self.handle(effects, now)
    }

    pub fn undo(&mut self, now: Instant) -> bool {
        self.settle_history();
        match self.history.undo() {
            Some(slides) => {
                self.restore(slides, now);
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self, now: Instant) -> bool {
        self.settle_history();
        match self.history.redo() {
            Some(slides) => {
                self.restore(slides, now);
                true
            }
            None => false,
        }
    }

    fn restore(&mut self, slides: Vec<Slide>, now: Instant) {
        self.document.replace_slides(slides);
        self.document.restore_design();
        self.document.touch(Utc::now());
        self.image_request = None;

        let effects = self.controller.reset();
        self.apply_ui(effects);
        // Any slide may have changed; unchanged ones are skipped by hash
        self.after_change(true, now);

        self.history.finish_replay();
        tracing::debug!(cursor = self.history.cursor(), "history restored");
    }

    /// Run every due task: history commit, then thumbnails, then save
    pub fn tick<S: Storage, R: SnapshotRenderer>(
        &mut self,
        now: Instant,
        storage: &mut S,
        renderer: &mut R,
    ) -> TickReport {
        let history = if self.history_commit.fire_if_due(now) {
            Some(self.history.commit(self.document.slides()))
        } else {
            None
        };

        let captures = self.thumbnails.run(now, self.document.slides(), renderer);
        let save = self.persistence.poll(now, &self.document, &self.history, storage);

        TickReport { history, captures, save }
    }

    /// Explicit save shortcut
    pub fn save_now<S: Storage>(&mut self, storage: &mut S) -> SaveOutcome {
        self.settle_history();
        self.persistence.save(&self.document, &self.history, storage)
    }

    /// Save, then hand the slides to the encoder. Failures stay visible as
    /// a notification until dismissed.
    pub fn export<S: Storage, E: ExportEncoder>(
        &mut self,
        encoder: &mut E,
        storage: &mut S,
    ) -> Result<Vec<u8>, EditorError> {
        if let SaveOutcome::Failed(reason) = self.save_now(storage) {
            tracing::warn!(document = %self.document.id(), %reason, "exporting unsaved changes");
            self.notify(format!("Save failed before export: {}", reason));
        }

        let presentation = self.document.presentation();
        match encoder.encode(&presentation.slides, &presentation.file_name) {
            Ok(bytes) => {
                tracing::info!(document = %self.document.id(), bytes = bytes.len(), "presentation exported");
                Ok(bytes)
            }
            Err(error) => {
                tracing::error!(document = %self.document.id(), %error, "export failed");
                self.notify(format!("Export failed: {}", error));
                Err(error.into())
            }
        }
    }

    pub fn notify(&mut self, message: impl Into<String>) -> u64 {
        let id = self.next_notification;
        self.next_notification += 1;
        self.notifications.push(Notification {
            id,
            message: message.into(),
        });
        id
    }

    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    pub fn dismiss_notification(&mut self, id: u64) -> bool {
        let before = self.notifications.len();
        self.notifications.retain(|n| n.id != id);
        self.notifications.len() != before
    }

    /// Teardown: cancel timers and write any pending change
    pub fn shutdown<S: Storage>(&mut self, storage: &mut S) -> SaveOutcome {
        self.settle_history();
        self.thumbnails.cancel_all();
        self.persistence.flush(&self.document, &self.history, storage)
    }
}
