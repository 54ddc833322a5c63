//! # Document Handle
//!
//! Core document abstraction for slide editing.
//!
//! A Document owns exactly one [`Presentation`] plus the editing state that
//! travels with it: the active-slide pointer, the id generator, and a
//! version counter that increments on every effective change.
//!
//! ## Lifecycle
//!
//! ```text
//! New/Open → Mutate → Snapshot → Save
//!    ↓          ↓         ↓        ↓
//! Presentation  Slides  History  Storage
//! ```

use chrono::{DateTime, Utc};

use crate::config::DEFAULT_DUPLICATE_OFFSET;
use crate::ids::{presentation_id, IdGenerator};
use crate::layouts::{self, Layout};
use crate::model::{DesignPreset, Presentation, Slide};
use crate::{EditorError, Mutation, MutationOutcome};

/// Editable presentation document
#[derive(Debug, Clone)]
pub struct Document {
    /// Current version number (increments on each effective mutation)
    pub version: u64,

    presentation: Presentation,
    active_slide: usize,
    ids: IdGenerator,
    duplicate_offset: f64,
}

impl Document {
    /// Wrap an existing presentation. An empty slide list gets one blank slide.
    pub fn new(mut presentation: Presentation) -> Self {
        let mut ids = IdGenerator::new(presentation.id());
        for slide in &presentation.slides {
            observe_slide(&mut ids, slide);
        }

        if presentation.slides.is_empty() {
            let slide = Layout::Blank.materialize(&mut ids, layouts::auto_title(0), &presentation.design);
            presentation.slides.push(slide);
        }

        Self {
            version: 0,
            presentation,
            active_slide: 0,
            ids,
            duplicate_offset: DEFAULT_DUPLICATE_OFFSET,
        }
    }

    /// Create a fresh single-slide presentation
    pub fn create(file_name: &str, layout: Layout, now: DateTime<Utc>) -> Self {
        Self::create_with_id(presentation_id(file_name, now), file_name, layout, now)
    }

    pub fn create_with_id(id: String, file_name: &str, layout: Layout, now: DateTime<Utc>) -> Self {
        let design = DesignPreset::default();
        let mut ids = IdGenerator::new(&id);
        let slide = layout.materialize(&mut ids, layouts::auto_title(0), &design);
        let presentation = Presentation::new(id, vec![slide], design, file_name, now);

        Self {
            version: 0,
            presentation,
            active_slide: 0,
            ids,
            duplicate_offset: DEFAULT_DUPLICATE_OFFSET,
        }
    }

    pub fn with_duplicate_offset(mut self, offset: f64) -> Self {
        self.duplicate_offset = offset;
        self
    }

    pub fn id(&self) -> &str {
        self.presentation.id()
    }

    pub fn presentation(&self) -> &Presentation {
        &self.presentation
    }

    pub(crate) fn presentation_mut(&mut self) -> &mut Presentation {
        &mut self.presentation
    }

    pub fn slides(&self) -> &[Slide] {
        &self.presentation.slides
    }

    pub fn active_slide_index(&self) -> usize {
        self.active_slide
    }

    pub fn active_slide(&self) -> &Slide {
        &self.presentation.slides[self.active_slide]
    }

    pub(crate) fn active_slide_mut(&mut self) -> &mut Slide {
        &mut self.presentation.slides[self.active_slide]
    }

    /// Navigate to a slide (clamped into range)
    pub fn set_active_slide(&mut self, index: usize) {
        self.active_slide = index.min(self.presentation.slides.len().saturating_sub(1));
    }

    pub fn duplicate_offset(&self) -> f64 {
        self.duplicate_offset
    }

    pub(crate) fn ids_mut(&mut self) -> &mut IdGenerator {
        &mut self.ids
    }

    /// A new id not used by any element on the active slide
    pub(crate) fn fresh_element_id(&mut self) -> String {
        loop {
            let id = self.ids.new_id();
            if !self.active_slide().contains_element(&id) {
                return id;
            }
        }
    }

    /// Apply a mutation
    pub fn apply(&mut self, mutation: &Mutation) -> Result<MutationOutcome, EditorError> {
        let outcome = mutation.apply(self)?;
        if outcome.is_changed() {
            self.version += 1;
        }
        Ok(outcome)
    }

    /// Stamp the modification time
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.presentation.updated_at = now;
    }

    /// Replace the slide array wholesale (history restore)
    pub(crate) fn replace_slides(&mut self, slides: Vec<Slide>) {
        if slides.is_empty() {
            tracing::warn!("ignoring restore of an empty slide array");
            return;
        }
        for slide in &slides {
            observe_slide(&mut self.ids, slide);
        }
        self.presentation.slides = slides;
        self.set_active_slide(self.active_slide);
        self.version += 1;
    }

    /// Re-derive the design from restored slides: when every slide carries
    /// the same preset background, that preset becomes the active design.
    /// Mixed or custom backgrounds leave the design untouched.
    pub(crate) fn restore_design(&mut self) {
        let slides = &self.presentation.slides;
        let Some(first) = slides.first() else {
            return;
        };
        if first.background.image.is_some() || slides.iter().any(|s| s.background != first.background) {
            return;
        }
        if self.presentation.design.background().color == first.background.color {
            return;
        }
        if let Some(preset) = DesignPreset::for_background(&first.background.color) {
            tracing::debug!(design = %preset.id, "design restored from slides");
            self.presentation.design = preset;
        }
    }
}

fn observe_slide(ids: &mut IdGenerator, slide: &Slide) {
    ids.observe(&slide.id);
    for element in &slide.content {
        ids.observe(&element.id);
    }
}
