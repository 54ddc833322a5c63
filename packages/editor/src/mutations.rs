//! # Document Mutations
//!
//! High-level semantic operations on a presentation.
//!
//! ## Design Principles
//!
//! 1. **Intent-preserving**: each mutation names one user-level edit
//! 2. **Validated**: structural constraints are checked before anything changes
//! 3. **Change-aware**: a mutation that would not alter the document reports
//!    `Unchanged` and leaves it untouched, so callers can skip history and
//!    persistence work
//!
//! ## Mutation Semantics
//!
//! ### Slides
//! - Slide indices are clamped, never rejected, when inserting or moving
//! - Auto-generated titles (`Slide {n}`) are renumbered after every
//!   structural change; custom titles are kept
//! - The last remaining slide cannot be deleted (`Unchanged`)
//!
//! ### Elements
//! - Element operations target the active slide
//! - `UpdateElement` patches only the given fields and may not change the
//!   element's type
//! - z-order is array order; the last element is topmost

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::document::Document;
use crate::layouts::{self, Layout};
use crate::model::{Background, DesignPreset, Element, ElementKind};

/// Partial element update. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    /// Replacement payload; must have the same type as the element
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<ElementKind>,
}

impl ElementPatch {
    pub fn position(x: f64, y: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            ..Self::default()
        }
    }

    pub fn frame(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            width: Some(width),
            height: Some(height),
            payload: None,
        }
    }

    pub fn payload(kind: ElementKind) -> Self {
        Self {
            payload: Some(kind),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_none()
            && self.y.is_none()
            && self.width.is_none()
            && self.height.is_none()
            && self.payload.is_none()
    }

    /// True when applying this patch would leave `element` value-identical
    pub fn is_noop_for(&self, element: &Element) -> bool {
        self.x.map_or(true, |x| x == element.x)
            && self.y.map_or(true, |y| y == element.y)
            && self.width.map_or(true, |w| Some(w) == element.width)
            && self.height.map_or(true, |h| Some(h) == element.height)
            && self.payload.as_ref().map_or(true, |p| *p == element.kind)
    }

    fn apply_to(&self, element: &mut Element) {
        if let Some(x) = self.x {
            element.x = x;
        }
        if let Some(y) = self.y {
            element.y = y;
        }
        if let Some(width) = self.width {
            element.width = Some(width);
        }
        if let Some(height) = self.height {
            element.height = Some(height);
        }
        if let Some(payload) = &self.payload {
            element.kind = payload.clone();
        }
    }
}

/// Semantic mutations (intent-preserving operations)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum Mutation {
    /// Insert a slide materialized from a layout at `index` (clamped)
    AddSlide { layout: String, index: usize },

    /// Remove the slide at `index` (no-op when it is the only slide)
    DeleteSlide { index: usize },

    /// Move the slide at `from` to `to` (clamped)
    MoveSlide { from: usize, to: usize },

    /// Rename a slide
    SetSlideTitle { index: usize, title: String },

    /// Replace a slide's background
    SetSlideBackground { index: usize, background: Background },

    /// Add an element to the active slide. An empty id gets a fresh one.
    AddElement { element: Element },

    /// Patch an element on the active slide
    UpdateElement { element_id: String, patch: ElementPatch },

    /// Remove an element from the active slide
    DeleteElement { element_id: String },

    /// Copy an element with a fresh id, offset by the duplicate offset
    DuplicateElement { element_id: String },

    /// Move an element to the top of the z-order
    BringToFront { element_id: String },

    /// Move an element to the bottom of the z-order
    SendToBack { element_id: String },

    /// Apply a design preset to every slide
    SetDesign { design: DesignPreset },

    /// Change the document's file name
    RenameFile { file_name: String },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MutationError {
    #[error("Slide index {index} out of range (len {len})")]
    SlideIndexOutOfRange { index: usize, len: usize },

    #[error("Element not found on active slide: {0}")]
    ElementNotFound(String),

    #[error("Element id already exists on active slide: {0}")]
    DuplicateElementId(String),

    #[error("Cannot change element {id} from {from} to {to}")]
    KindMismatch {
        id: String,
        from: &'static str,
        to: &'static str,
    },

    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("File name cannot be empty")]
    EmptyFileName,
}

/// What a mutation did to the document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationOutcome {
    /// Nothing changed (no history entry, no save)
    Unchanged,
    /// The document changed
    Changed,
    /// A slide or element was created with this id
    Created { id: String },
}

impl MutationOutcome {
    pub fn is_changed(&self) -> bool {
        !matches!(self, MutationOutcome::Unchanged)
    }

    pub fn created_id(&self) -> Option<&str> {
        match self {
            MutationOutcome::Created { id } => Some(id),
            _ => None,
        }
    }
}

impl Mutation {
    /// True for mutations that rewrite every slide rather than the active one
    pub fn touches_all_slides(&self) -> bool {
        matches!(self, Mutation::SetDesign { .. })
    }

    /// Apply mutation to the document with validation
    pub fn apply(&self, doc: &mut Document) -> Result<MutationOutcome, MutationError> {
        self.validate(doc)?;

        match self {
            Mutation::AddSlide { layout, index } => Ok(Self::apply_add_slide(doc, layout, *index)),
            Mutation::DeleteSlide { index } => Ok(Self::apply_delete_slide(doc, *index)),
            Mutation::MoveSlide { from, to } => Ok(Self::apply_move_slide(doc, *from, *to)),

            Mutation::SetSlideTitle { index, title } => {
                let slide = &mut doc.presentation_mut().slides[*index];
                if slide.title == *title {
                    return Ok(MutationOutcome::Unchanged);
                }
                slide.title = title.clone();
                Ok(MutationOutcome::Changed)
            }

            Mutation::SetSlideBackground { index, background } => {
                let slide = &mut doc.presentation_mut().slides[*index];
                if slide.background == *background {
                    return Ok(MutationOutcome::Unchanged);
                }
                slide.background = background.clone();
                Ok(MutationOutcome::Changed)
            }

            Mutation::AddElement { element } => Ok(Self::apply_add_element(doc, element)),

            Mutation::UpdateElement { element_id, patch } => {
                let element = doc
                    .active_slide_mut()
                    .element_mut(element_id)
                    .ok_or_else(|| MutationError::ElementNotFound(element_id.clone()))?;

                if patch.is_noop_for(element) {
                    return Ok(MutationOutcome::Unchanged);
                }
                patch.apply_to(element);
                Ok(MutationOutcome::Changed)
            }

            Mutation::DeleteElement { element_id } => {
                let slide = doc.active_slide_mut();
                let pos = slide
                    .position_of(element_id)
                    .ok_or_else(|| MutationError::ElementNotFound(element_id.clone()))?;
                slide.content.remove(pos);
                Ok(MutationOutcome::Changed)
            }

            Mutation::DuplicateElement { element_id } => Self::apply_duplicate(doc, element_id),

            Mutation::BringToFront { element_id } => {
                let slide = doc.active_slide_mut();
                let pos = slide
                    .position_of(element_id)
                    .ok_or_else(|| MutationError::ElementNotFound(element_id.clone()))?;
                if pos + 1 == slide.content.len() {
                    return Ok(MutationOutcome::Unchanged);
                }
                let element = slide.content.remove(pos);
                slide.content.push(element);
                Ok(MutationOutcome::Changed)
            }

            Mutation::SendToBack { element_id } => {
                let slide = doc.active_slide_mut();
                let pos = slide
                    .position_of(element_id)
                    .ok_or_else(|| MutationError::ElementNotFound(element_id.clone()))?;
                if pos == 0 {
                    return Ok(MutationOutcome::Unchanged);
                }
                let element = slide.content.remove(pos);
                slide.content.insert(0, element);
                Ok(MutationOutcome::Changed)
            }

            Mutation::SetDesign { design } => {
                let presentation = doc.presentation_mut();
                let background = design.background();
                let unchanged = presentation.design == *design
                    && presentation.slides.iter().all(|s| s.background == background);
                if unchanged {
                    return Ok(MutationOutcome::Unchanged);
                }
                presentation.design = design.clone();
                for slide in &mut presentation.slides {
                    slide.background = background.clone();
                }
                Ok(MutationOutcome::Changed)
            }

            Mutation::RenameFile { file_name } => {
                let presentation = doc.presentation_mut();
                if presentation.file_name == *file_name {
                    return Ok(MutationOutcome::Unchanged);
                }
                presentation.file_name = file_name.clone();
                Ok(MutationOutcome::Changed)
            }
        }
    }

    fn apply_add_slide(doc: &mut Document, layout: &str, index: usize) -> MutationOutcome {
        let index = index.min(doc.slides().len());
        let design = doc.presentation().design.clone();
        let slide = Layout::from_id(layout).materialize(doc.ids_mut(), layouts::auto_title(index), &design);
        let id = slide.id.clone();

        let slides = &mut doc.presentation_mut().slides;
        slides.insert(index, slide);
        layouts::renumber_titles(slides);

        doc.set_active_slide(index);
        MutationOutcome::Created { id }
    }

    fn apply_delete_slide(doc: &mut Document, index: usize) -> MutationOutcome {
        if doc.slides().len() <= 1 {
            tracing::debug!("refusing to delete the last remaining slide");
            return MutationOutcome::Unchanged;
        }

        let active = doc.active_slide_index();
        let slides = &mut doc.presentation_mut().slides;
        slides.remove(index);
        layouts::renumber_titles(slides);
        let len = slides.len();

        let active = if index < active { active - 1 } else { active };
        doc.set_active_slide(active.min(len - 1));
        MutationOutcome::Changed
    }

    fn apply_move_slide(doc: &mut Document, from: usize, to: usize) -> MutationOutcome {
        let active_id = doc.active_slide().id.clone();
        let slides = &mut doc.presentation_mut().slides;

        let to = to.min(slides.len() - 1);
        if from == to {
            return MutationOutcome::Unchanged;
        }

        let slide = slides.remove(from);
        slides.insert(to, slide);
        layouts::renumber_titles(slides);

        let active = slides.iter().position(|s| s.id == active_id).unwrap_or(0);
        doc.set_active_slide(active);
        MutationOutcome::Changed
    }

    fn apply_add_element(doc: &mut Document, element: &Element) -> MutationOutcome {
        let mut element = element.clone();
        if element.id.is_empty() {
            element.id = doc.fresh_element_id();
        } else {
            doc.ids_mut().observe(&element.id);
        }
        let id = element.id.clone();
        doc.active_slide_mut().content.push(element);
        MutationOutcome::Created { id }
    }

    fn apply_duplicate(doc: &mut Document, element_id: &str) -> Result<MutationOutcome, MutationError> {
        let offset = doc.duplicate_offset();
        let mut copy = doc
            .active_slide()
            .element(element_id)
            .cloned()
            .ok_or_else(|| MutationError::ElementNotFound(element_id.to_string()))?;

        copy.id = doc.fresh_element_id();
        copy.x += offset;
        copy.y += offset;

        let id = copy.id.clone();
        doc.active_slide_mut().content.push(copy);
        Ok(MutationOutcome::Created { id })
    }

    /// Validate without applying
    pub fn validate(&self, doc: &Document) -> Result<(), MutationError> {
        let len = doc.slides().len();
        let check_index = |index: usize| {
            if index < len {
                Ok(())
            } else {
                Err(MutationError::SlideIndexOutOfRange { index, len })
            }
        };
        let check_element = |id: &str| {
            if doc.active_slide().contains_element(id) {
                Ok(())
            } else {
                Err(MutationError::ElementNotFound(id.to_string()))
            }
        };

        match self {
            Mutation::AddSlide { .. } | Mutation::SetDesign { .. } => Ok(()),

            // Deleting the only slide is a no-op, not an error
            Mutation::DeleteSlide { .. } if len <= 1 => Ok(()),
            Mutation::DeleteSlide { index } => check_index(*index),
            Mutation::MoveSlide { from, .. } => check_index(*from),
            Mutation::SetSlideTitle { index, .. } => check_index(*index),
            Mutation::SetSlideBackground { index, .. } => check_index(*index),

            Mutation::AddElement { element } => {
                validate_geometry(element)?;
                if !element.id.is_empty() && doc.active_slide().contains_element(&element.id) {
                    return Err(MutationError::DuplicateElementId(element.id.clone()));
                }
                Ok(())
            }

            Mutation::UpdateElement { element_id, patch } => {
                let element = doc
                    .active_slide()
                    .element(element_id)
                    .ok_or_else(|| MutationError::ElementNotFound(element_id.clone()))?;

                if let Some(payload) = &patch.payload {
                    if !payload.same_type(&element.kind) {
                        return Err(MutationError::KindMismatch {
                            id: element_id.clone(),
                            from: element.type_name(),
                            to: payload.type_name(),
                        });
                    }
                }

                let finite = [patch.x, patch.y, patch.width, patch.height]
                    .iter()
                    .flatten()
                    .all(|v| v.is_finite());
                let positive = [patch.width, patch.height]
                    .iter()
                    .flatten()
                    .all(|v| *v >= 0.0);
                if !finite || !positive {
                    return Err(MutationError::InvalidGeometry(format!("{:?}", patch)));
                }
                Ok(())
            }

            Mutation::DeleteElement { element_id }
            | Mutation::DuplicateElement { element_id }
            | Mutation::BringToFront { element_id }
            | Mutation::SendToBack { element_id } => check_element(element_id),

            Mutation::RenameFile { file_name } => {
                if file_name.trim().is_empty() {
                    Err(MutationError::EmptyFileName)
                } else {
                    Ok(())
                }
            }
        }
    }
}

fn validate_geometry(element: &Element) -> Result<(), MutationError> {
    let finite = [Some(element.x), Some(element.y), element.width, element.height]
        .iter()
        .flatten()
        .all(|v| v.is_finite());
    let positive = [element.width, element.height]
        .iter()
        .flatten()
        .all(|v| *v >= 0.0);

    if finite && positive {
        Ok(())
    } else {
        Err(MutationError::InvalidGeometry(format!(
            "element {} at ({}, {}) size {:?}x{:?}",
            element.id, element.x, element.y, element.width, element.height
        )))
    }
}
