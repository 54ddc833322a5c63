//! # Interaction Controller
//!
//! State machine over selection, drag, resize, text editing and
//! click-to-place insertion.
//!
//! The controller never touches the document. Each handler reads the active
//! slide, updates its own state and returns [`Effect`]s for the session to
//! carry out:
//!
//! ```text
//! pointer/key/text event → InteractionController → Vec<Effect> → EditSession
//!                                                      ↓
//!                                    Mutate / ScheduleHistoryCommit / toolbar
//! ```
//!
//! Drag and resize keep their intermediate positions in transient state only;
//! the stop event is the single authoritative write, rounded to integers and
//! followed by a settle-delayed history commit.

use crate::factory::{self, InsertTool};
use crate::model::{Element, ElementKind, ImageData, Point, Rect, Slide, CANVAS_HEIGHT, CANVAS_WIDTH};
use crate::mutations::{ElementPatch, Mutation};

/// Gap between an element and its floating toolbar, in screen pixels
pub const TOOLBAR_GAP: f64 = 8.0;

/// Height reserved for the floating toolbar, in screen pixels
pub const TOOLBAR_HEIGHT: f64 = 44.0;

const NUDGE: f64 = 1.0;
const NUDGE_LARGE: f64 = 10.0;
const MIN_RESIZE: f64 = 1.0;

/// On-screen rectangle the slide canvas is displayed in
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasViewport {
    pub origin: Point,
    pub width: f64,
    pub height: f64,
}

impl CanvasViewport {
    pub fn new(origin: Point, width: f64, height: f64) -> Self {
        Self { origin, width, height }
    }

    pub fn scale_x(&self) -> f64 {
        self.width / CANVAS_WIDTH
    }

    pub fn scale_y(&self) -> f64 {
        self.height / CANVAS_HEIGHT
    }

    /// Screen point to canvas units
    pub fn to_canvas(&self, screen: Point) -> Point {
        let sx = self.scale_x();
        let sy = self.scale_y();
        Point::new(
            if sx > 0.0 { (screen.x - self.origin.x) / sx } else { 0.0 },
            if sy > 0.0 { (screen.y - self.origin.y) / sy } else { 0.0 },
        )
    }

    /// Canvas rectangle to screen pixels, relative to the canvas origin
    pub fn to_screen(&self, rect: Rect) -> Rect {
        Rect::new(
            rect.x * self.scale_x(),
            rect.y * self.scale_y(),
            rect.width * self.scale_x(),
            rect.height * self.scale_y(),
        )
    }
}

impl Default for CanvasViewport {
    fn default() -> Self {
        Self::new(Point::default(), CANVAS_WIDTH, CANVAS_HEIGHT)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolbarPlacement {
    Above,
    Below,
}

/// Where the floating toolbar sits, relative to the canvas rectangle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToolbarAnchor {
    /// Horizontal centre of the toolbar
    pub x: f64,
    /// Edge of the toolbar closest to the element
    pub y: f64,
    pub placement: ToolbarPlacement,
}

impl ToolbarAnchor {
    /// Centred above the element, or below it when there is no room above
    pub fn for_element(element: &Element, viewport: &CanvasViewport) -> Self {
        let rect = viewport.to_screen(element.bounds());
        let x = rect.x + rect.width / 2.0;
        let above = rect.y - TOOLBAR_GAP;

        if above - TOOLBAR_HEIGHT >= 0.0 {
            Self {
                x,
                y: above,
                placement: ToolbarPlacement::Above,
            }
        } else {
            Self {
                x,
                y: rect.y + rect.height + TOOLBAR_GAP,
                placement: ToolbarPlacement::Below,
            }
        }
    }
}

/// Reserved spot for an image whose file has not been picked yet
#[derive(Debug, Clone, PartialEq)]
pub struct PlacementSlot {
    pub token: u64,
    pub slide_id: String,
    pub at: Point,
}

/// Result of the external file-selection step
#[derive(Debug, Clone, PartialEq)]
pub struct ChosenImage {
    pub src: String,
    pub data: Option<ImageData>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    Escape,
    Delete,
    Backspace,
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
    Other(String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InteractionState {
    Idle,
    Selected(String),
    EditingText(String),
    Dragging { id: String, origin: Point, current: Point },
    Resizing { id: String, origin: Rect, current: Rect },
    PendingInsert { tool: InsertTool, keep: bool },
    AwaitingImage { slot: PlacementSlot, keep: bool },
}

/// Work the host must carry out after an event
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Mutate(Mutation),
    /// Commit history once activity settles instead of immediately
    ScheduleHistoryCommit,
    RepositionToolbar(Option<ToolbarAnchor>),
    InvalidateThumbnail(String),
    RequestImageFile(PlacementSlot),
    ClearSelection,
}

#[derive(Debug)]
pub struct InteractionController {
    state: InteractionState,
    viewport: CanvasViewport,
    next_token: u64,
    /// Select the next created element (non-sticky insert)
    select_created: bool,
}

impl InteractionController {
    pub fn new() -> Self {
        Self {
            state: InteractionState::Idle,
            viewport: CanvasViewport::default(),
            next_token: 1,
            select_created: false,
        }
    }

    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    pub fn viewport(&self) -> &CanvasViewport {
        &self.viewport
    }

    pub fn set_viewport(&mut self, viewport: CanvasViewport) {
        self.viewport = viewport;
    }

    /// Element the user is currently working on, if any
    pub fn selected_id(&self) -> Option<&str> {
        match &self.state {
            InteractionState::Selected(id)
            | InteractionState::EditingText(id)
            | InteractionState::Dragging { id, .. }
            | InteractionState::Resizing { id, .. } => Some(id),
            _ => None,
        }
    }

    fn anchor(&self, slide: &Slide, id: &str) -> Option<ToolbarAnchor> {
        slide
            .element(id)
            .map(|element| ToolbarAnchor::for_element(element, &self.viewport))
    }

    fn deselect(&mut self) -> Vec<Effect> {
        self.state = InteractionState::Idle;
        vec![Effect::ClearSelection, Effect::RepositionToolbar(None)]
    }

    /// Drop all selection and toolbar state (after undo/redo or slide change)
    pub fn reset(&mut self) -> Vec<Effect> {
        self.select_created = false;
        self.deselect()
    }

    /// Fall back to idle when the selected element no longer exists
    pub fn sync(&mut self, slide: &Slide) -> Vec<Effect> {
        let missing = self
            .selected_id()
            .filter(|id| !slide.contains_element(id))
            .map(str::to_string);

        match missing {
            Some(id) => {
                tracing::debug!(element = %id, "selected element disappeared");
                self.deselect()
            }
            None => Vec::new(),
        }
    }

    /// Select an element directly
    pub fn select(&mut self, slide: &Slide, id: &str) -> Vec<Effect> {
        if !slide.contains_element(id) {
            return Vec::new();
        }
        self.state = InteractionState::Selected(id.to_string());
        vec![Effect::RepositionToolbar(self.anchor(slide, id))]
    }

    pub fn pointer_down(&mut self, slide: &Slide, screen: Point) -> Vec<Effect> {
        if matches!(self.state, InteractionState::PendingInsert { .. }) {
            return self.canvas_click(slide, screen);
        }
        if matches!(
            self.state,
            InteractionState::AwaitingImage { .. }
                | InteractionState::Dragging { .. }
                | InteractionState::Resizing { .. }
        ) {
            return Vec::new();
        }

        let point = self.viewport.to_canvas(screen);
        let Some(hit) = slide.hit_test(point) else {
            return self.deselect();
        };

        if let InteractionState::EditingText(editing) = &self.state {
            if *editing == hit.id {
                return Vec::new();
            }
        }

        let id = hit.id.clone();
        let anchor = ToolbarAnchor::for_element(hit, &self.viewport);
        self.state = InteractionState::Selected(id);
        vec![Effect::RepositionToolbar(Some(anchor))]
    }

    /// Arm click-to-place insertion; `keep` leaves the tool armed after each insert
    pub fn select_tool(&mut self, tool: InsertTool, keep: bool) -> Vec<Effect> {
        self.select_created = false;
        self.state = InteractionState::PendingInsert { tool, keep };
        vec![Effect::ClearSelection, Effect::RepositionToolbar(None)]
    }

    pub fn canvas_click(&mut self, slide: &Slide, screen: Point) -> Vec<Effect> {
        let InteractionState::PendingInsert { tool, keep } = self.state else {
            return Vec::new();
        };
        let at = self.viewport.to_canvas(screen);

        if tool == InsertTool::Image {
            let slot = PlacementSlot {
                token: self.next_token,
                slide_id: slide.id.clone(),
                at,
            };
            self.next_token += 1;
            self.state = InteractionState::AwaitingImage {
                slot: slot.clone(),
                keep,
            };
            return vec![Effect::RequestImageFile(slot)];
        }

        self.finish_insert(tool, keep);
        vec![Effect::Mutate(Mutation::AddElement {
            element: factory::materialize(tool, at),
        })]
    }

    fn finish_insert(&mut self, tool: InsertTool, keep: bool) {
        self.select_created = !keep;
        self.state = if keep {
            InteractionState::PendingInsert { tool, keep }
        } else {
            InteractionState::Idle
        };
    }

    /// Second phase of image insertion
    pub fn image_chosen(&mut self, slide: &Slide, token: u64, chosen: Option<ChosenImage>) -> Vec<Effect> {
        let (slot, keep) = match &self.state {
            InteractionState::AwaitingImage { slot, keep } if slot.token == token => (slot.clone(), *keep),
            _ => {
                tracing::warn!(token, "image chosen without a matching placement slot");
                return Vec::new();
            }
        };

        let cancel = |this: &mut Self| {
            this.state = if keep {
                InteractionState::PendingInsert {
                    tool: InsertTool::Image,
                    keep,
                }
            } else {
                InteractionState::Idle
            };
        };

        let Some(chosen) = chosen else {
            tracing::debug!(token, "image selection cancelled");
            cancel(self);
            return Vec::new();
        };

        if slot.slide_id != slide.id {
            tracing::warn!(
                token,
                slot_slide = %slot.slide_id,
                active_slide = %slide.id,
                "active slide changed while choosing an image"
            );
            cancel(self);
            return Vec::new();
        }

        let mut element = factory::materialize(InsertTool::Image, slot.at);
        if let ElementKind::Image(image) = &mut element.kind {
            image.src = Some(chosen.src);
            image.image_data = chosen.data;
        }

        self.finish_insert(InsertTool::Image, keep);
        vec![Effect::Mutate(Mutation::AddElement { element })]
    }

    /// Called by the host after an insert produced element `id`
    pub fn element_created(&mut self, slide: &Slide, id: &str) -> Vec<Effect> {
        if !std::mem::take(&mut self.select_created) {
            return Vec::new();
        }
        self.select(slide, id)
    }

    pub fn drag_start(&mut self, slide: &Slide, id: &str) -> Vec<Effect> {
        let Some(element) = slide.element(id) else {
            return Vec::new();
        };
        let origin = Point::new(element.x, element.y);
        self.state = InteractionState::Dragging {
            id: id.to_string(),
            origin,
            current: origin,
        };
        vec![Effect::RepositionToolbar(None)]
    }

    /// Intermediate drag position; never written to the document
    pub fn drag_move(&mut self, position: Point) {
        if let InteractionState::Dragging { current, .. } = &mut self.state {
            *current = position;
        }
    }

    pub fn drag_stop(&mut self, slide: &Slide, position: Point) -> Vec<Effect> {
        let id = match std::mem::replace(&mut self.state, InteractionState::Idle) {
            InteractionState::Dragging { id, .. } => id,
            other => {
                self.state = other;
                return Vec::new();
            }
        };

        let (x, y) = (position.x.round(), position.y.round());
        let anchor = slide.element(&id).map(|element| {
            let mut moved = element.clone();
            moved.x = x;
            moved.y = y;
            ToolbarAnchor::for_element(&moved, &self.viewport)
        });

        let effects = vec![
            Effect::Mutate(Mutation::UpdateElement {
                element_id: id.clone(),
                patch: ElementPatch::position(x, y),
            }),
            Effect::ScheduleHistoryCommit,
            Effect::RepositionToolbar(anchor),
        ];
        self.state = InteractionState::Selected(id);
        effects
    }

    pub fn resize_start(&mut self, slide: &Slide, id: &str) -> Vec<Effect> {
        let Some(element) = slide.element(id) else {
            return Vec::new();
        };
        let origin = element.bounds();
        self.state = InteractionState::Resizing {
            id: id.to_string(),
            origin,
            current: origin,
        };
        vec![Effect::RepositionToolbar(None)]
    }

    pub fn resize_move(&mut self, frame: Rect) {
        if let InteractionState::Resizing { current, .. } = &mut self.state {
            *current = frame;
        }
    }

    pub fn resize_stop(&mut self, slide: &Slide, frame: Rect) -> Vec<Effect> {
        let id = match std::mem::replace(&mut self.state, InteractionState::Idle) {
            InteractionState::Resizing { id, .. } => id,
            other => {
                self.state = other;
                return Vec::new();
            }
        };

        let frame = Rect::new(
            frame.x.round(),
            frame.y.round(),
            frame.width.round().max(MIN_RESIZE),
            frame.height.round().max(MIN_RESIZE),
        );
        let anchor = slide.element(&id).map(|element| {
            let mut resized = element.clone();
            resized.x = frame.x;
            resized.y = frame.y;
            resized.width = Some(frame.width);
            resized.height = Some(frame.height);
            ToolbarAnchor::for_element(&resized, &self.viewport)
        });

        let effects = vec![
            Effect::Mutate(Mutation::UpdateElement {
                element_id: id.clone(),
                patch: ElementPatch::frame(frame.x, frame.y, frame.width, frame.height),
            }),
            Effect::ScheduleHistoryCommit,
            Effect::RepositionToolbar(anchor),
        ];
        self.state = InteractionState::Selected(id);
        effects
    }

    /// Rich-text surface gained focus
    pub fn text_focus(&mut self, slide: &Slide, id: &str) -> Vec<Effect> {
        match &self.state {
            InteractionState::Dragging { .. } | InteractionState::Resizing { .. } => {
                tracing::debug!(element = %id, "ignoring text focus during pointer gesture");
                return Vec::new();
            }
            InteractionState::EditingText(current) if current == id => return Vec::new(),
            _ => {}
        }

        match slide.element(id) {
            Some(element) if element.as_text().is_some() => {
                self.state = InteractionState::EditingText(id.to_string());
                vec![Effect::RepositionToolbar(self.anchor(slide, id))]
            }
            _ => Vec::new(),
        }
    }

    pub fn text_blur(&mut self) -> Vec<Effect> {
        if let InteractionState::EditingText(id) = &self.state {
            self.state = InteractionState::Selected(id.clone());
        }
        Vec::new()
    }

    /// Content of the rich-text surface changed
    pub fn text_changed(&mut self, slide: &Slide, html: &str, plain_text: &str) -> Vec<Effect> {
        let Some(id) = self.selected_id() else {
            return Vec::new();
        };
        let Some(text) = slide.element(id).and_then(Element::as_text) else {
            return Vec::new();
        };
        if text.html == html && text.plain_text == plain_text {
            return Vec::new();
        }

        let mut updated = text.clone();
        updated.html = html.to_string();
        updated.plain_text = plain_text.to_string();

        vec![
            Effect::Mutate(Mutation::UpdateElement {
                element_id: id.to_string(),
                patch: ElementPatch::payload(ElementKind::Text(updated)),
            }),
            Effect::ScheduleHistoryCommit,
        ]
    }

    /// Replace an image element's source
    pub fn update_image_source(&mut self, slide: &Slide, id: &str, src: Option<String>) -> Vec<Effect> {
        let Some(image) = slide.element(id).and_then(Element::as_image) else {
            return Vec::new();
        };
        if image.src == src {
            return Vec::new();
        }

        let mut updated = image.clone();
        updated.src = src;
        vec![
            Effect::Mutate(Mutation::UpdateElement {
                element_id: id.to_string(),
                patch: ElementPatch::payload(ElementKind::Image(updated)),
            }),
            Effect::InvalidateThumbnail(slide.id.clone()),
        ]
    }

    pub fn key_down(&mut self, slide: &Slide, key: &Key, modifiers: Modifiers) -> Vec<Effect> {
        match key {
            Key::Escape => {
                self.select_created = false;
                self.deselect()
            }
            Key::Delete | Key::Backspace => {
                let InteractionState::Selected(id) = &self.state else {
                    return Vec::new();
                };
                let id = id.clone();
                let mut effects = vec![Effect::Mutate(Mutation::DeleteElement { element_id: id })];
                effects.extend(self.deselect());
                effects
            }
            Key::ArrowLeft | Key::ArrowRight | Key::ArrowUp | Key::ArrowDown => {
                let InteractionState::Selected(id) = &self.state else {
                    return Vec::new();
                };
                let Some(element) = slide.element(id) else {
                    return Vec::new();
                };

                let step = if modifiers.shift { NUDGE_LARGE } else { NUDGE };
                let (dx, dy) = match key {
                    Key::ArrowLeft => (-step, 0.0),
                    Key::ArrowRight => (step, 0.0),
                    Key::ArrowUp => (0.0, -step),
                    _ => (0.0, step),
                };

                let mut moved = element.clone();
                moved.x += dx;
                moved.y += dy;
                vec![
                    Effect::Mutate(Mutation::UpdateElement {
                        element_id: id.clone(),
                        patch: ElementPatch::position(moved.x, moved.y),
                    }),
                    Effect::ScheduleHistoryCommit,
                    Effect::RepositionToolbar(Some(ToolbarAnchor::for_element(&moved, &self.viewport))),
                ]
            }
            Key::Other(_) => Vec::new(),
        }
    }
}

impl Default for InteractionController {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Background, ChartType, ShapeElement, ShapeKind, TextElement};

    fn slide() -> Slide {
        let mut slide = Slide::new("s1", "Slide 1", Background::default());
        slide.content.push(Element::new(
            "box",
            Rect::new(100.0, 200.0, 100.0, 50.0),
            ElementKind::Shape(ShapeElement::new(ShapeKind::Rectangle)),
        ));
        slide.content.push(Element::new(
            "text",
            Rect::new(400.0, 10.0, 200.0, 40.0),
            ElementKind::Text(TextElement::plain("Title", 32.0)),
        ));
        slide
    }

    fn mutations(effects: &[Effect]) -> Vec<&Mutation> {
        effects
            .iter()
            .filter_map(|e| match e {
                Effect::Mutate(m) => Some(m),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_pointer_down_selects_and_anchors_toolbar() {
        let slide = slide();
        let mut controller = InteractionController::new();

        let effects = controller.pointer_down(&slide, Point::new(150.0, 220.0));
        assert_eq!(controller.state(), &InteractionState::Selected("box".to_string()));
        assert_eq!(
            effects,
            vec![Effect::RepositionToolbar(Some(ToolbarAnchor {
                x: 150.0,
                y: 192.0,
                placement: ToolbarPlacement::Above,
            }))]
        );
    }

    #[test]
    fn test_toolbar_flips_below_near_top() {
        let slide = slide();
        let anchor = ToolbarAnchor::for_element(slide.element("text").unwrap(), &CanvasViewport::default());
        assert_eq!(anchor.placement, ToolbarPlacement::Below);
        assert_eq!(anchor.y, 58.0);
    }

    #[test]
    fn test_viewport_scales_axes_independently() {
        let viewport = CanvasViewport::new(Point::new(10.0, 20.0), 480.0, 540.0);
        let point = viewport.to_canvas(Point::new(250.0, 290.0));
        assert_eq!(point, Point::new(480.0, 270.0));
    }

    #[test]
    fn test_empty_click_clears_selection() {
        let slide = slide();
        let mut controller = InteractionController::new();
        controller.pointer_down(&slide, Point::new(150.0, 220.0));

        let effects = controller.pointer_down(&slide, Point::new(900.0, 500.0));
        assert_eq!(controller.state(), &InteractionState::Idle);
        assert!(effects.contains(&Effect::ClearSelection));
    }

    #[test]
    fn test_drag_commits_only_rounded_final_position() {
        let slide = slide();
        let mut controller = InteractionController::new();
        controller.pointer_down(&slide, Point::new(150.0, 220.0));
        controller.drag_start(&slide, "box");

        for i in 0..50 {
            controller.drag_move(Point::new(100.0 + i as f64, 200.0));
        }
        let effects = controller.drag_stop(&slide, Point::new(149.6, 210.2));

        assert_eq!(
            mutations(&effects),
            vec![&Mutation::UpdateElement {
                element_id: "box".to_string(),
                patch: ElementPatch::position(150.0, 210.0),
            }]
        );
        assert!(effects.contains(&Effect::ScheduleHistoryCommit));
        assert_eq!(controller.state(), &InteractionState::Selected("box".to_string()));
    }

    #[test]
    fn test_resize_rounds_frame() {
        let slide = slide();
        let mut controller = InteractionController::new();
        controller.resize_start(&slide, "box");

        let effects = controller.resize_stop(&slide, Rect::new(99.5, 200.4, 120.7, 0.2));
        assert_eq!(
            mutations(&effects),
            vec![&Mutation::UpdateElement {
                element_id: "box".to_string(),
                patch: ElementPatch::frame(100.0, 200.0, 121.0, 1.0),
            }]
        );
    }

    #[test]
    fn test_text_focus_ignored_while_dragging() {
        let slide = slide();
        let mut controller = InteractionController::new();
        controller.drag_start(&slide, "box");

        assert!(controller.text_focus(&slide, "text").is_empty());
        assert!(matches!(controller.state(), InteractionState::Dragging { .. }));
    }

    #[test]
    fn test_text_editing_round_trip() {
        let slide = slide();
        let mut controller = InteractionController::new();

        controller.text_focus(&slide, "text");
        assert_eq!(controller.state(), &InteractionState::EditingText("text".to_string()));

        let effects = controller.text_changed(&slide, "<p>New</p>", "New");
        assert_eq!(mutations(&effects).len(), 1);

        assert!(controller.key_down(&slide, &Key::Delete, Modifiers::default()).is_empty());

        controller.text_blur();
        assert_eq!(controller.state(), &InteractionState::Selected("text".to_string()));
    }

    #[test]
    fn test_insert_then_select_created() {
        let slide = slide();
        let mut controller = InteractionController::new();
        controller.select_tool(InsertTool::Chart(ChartType::Pie), false);

        let effects = controller.pointer_down(&slide, Point::new(480.0, 270.0));
        assert!(matches!(mutations(&effects)[0], Mutation::AddElement { .. }));
        assert_eq!(controller.state(), &InteractionState::Idle);

        controller.element_created(&slide, "box");
        assert_eq!(controller.state(), &InteractionState::Selected("box".to_string()));
    }

    #[test]
    fn test_sticky_insert_keeps_tool() {
        let slide = slide();
        let mut controller = InteractionController::new();
        controller.select_tool(InsertTool::Text, true);

        controller.pointer_down(&slide, Point::new(480.0, 270.0));
        controller.pointer_down(&slide, Point::new(300.0, 300.0));
        assert_eq!(
            controller.state(),
            &InteractionState::PendingInsert {
                tool: InsertTool::Text,
                keep: true,
            }
        );
        assert!(controller.element_created(&slide, "box").is_empty());
    }

    #[test]
    fn test_image_insert_is_two_phase() {
        let slide = slide();
        let mut controller = InteractionController::new();
        controller.select_tool(InsertTool::Image, false);

        let effects = controller.pointer_down(&slide, Point::new(480.0, 270.0));
        let slot = match &effects[0] {
            Effect::RequestImageFile(slot) => slot.clone(),
            other => panic!("expected file request, got {:?}", other),
        };
        assert!(matches!(controller.state(), InteractionState::AwaitingImage { .. }));

        let chosen = ChosenImage {
            src: "data:image/png;base64,AAAA".to_string(),
            data: None,
        };
        let effects = controller.image_chosen(&slide, slot.token, Some(chosen));
        match mutations(&effects)[0] {
            Mutation::AddElement { element } => {
                assert_eq!(element.as_image().unwrap().src.as_deref(), Some("data:image/png;base64,AAAA"));
            }
            other => panic!("expected add, got {:?}", other),
        }
    }

    #[test]
    fn test_image_cancel_returns_to_idle() {
        let slide = slide();
        let mut controller = InteractionController::new();
        controller.select_tool(InsertTool::Image, false);
        controller.pointer_down(&slide, Point::new(480.0, 270.0));

        let token = match controller.state() {
            InteractionState::AwaitingImage { slot, .. } => slot.token,
            other => panic!("unexpected state {:?}", other),
        };
        assert!(controller.image_chosen(&slide, token, None).is_empty());
        assert_eq!(controller.state(), &InteractionState::Idle);
    }

    #[test]
    fn test_image_for_other_slide_is_dropped() {
        let slide = slide();
        let other = Slide::new("s2", "Slide 2", Background::default());
        let mut controller = InteractionController::new();
        controller.select_tool(InsertTool::Image, true);
        controller.pointer_down(&slide, Point::new(480.0, 270.0));

        let chosen = ChosenImage {
            src: "x.png".to_string(),
            data: None,
        };
        assert!(controller.image_chosen(&other, 1, Some(chosen)).is_empty());
        assert!(matches!(controller.state(), InteractionState::PendingInsert { keep: true, .. }));
    }

    #[test]
    fn test_image_source_change_invalidates_thumbnail() {
        let mut slide = slide();
        slide.content.push(Element::new(
            "img",
            Rect::new(0.0, 300.0, 100.0, 100.0),
            ElementKind::Image(Default::default()),
        ));
        let mut controller = InteractionController::new();

        let effects = controller.update_image_source(&slide, "img", Some("b.png".to_string()));
        assert!(effects.contains(&Effect::InvalidateThumbnail("s1".to_string())));
    }

    #[test]
    fn test_arrow_nudge_and_delete() {
        let slide = slide();
        let mut controller = InteractionController::new();
        controller.select(&slide, "box");

        let effects = controller.key_down(&slide, &Key::ArrowRight, Modifiers { shift: true });
        assert_eq!(
            mutations(&effects),
            vec![&Mutation::UpdateElement {
                element_id: "box".to_string(),
                patch: ElementPatch::position(110.0, 200.0),
            }]
        );

        let effects = controller.key_down(&slide, &Key::Backspace, Modifiers::default());
        assert_eq!(
            mutations(&effects),
            vec![&Mutation::DeleteElement {
                element_id: "box".to_string()
            }]
        );
        assert_eq!(controller.state(), &InteractionState::Idle);
    }

    #[test]
    fn test_sync_drops_missing_selection() {
        let mut slide = slide();
        let mut controller = InteractionController::new();
        controller.select(&slide, "box");

        slide.content.retain(|e| e.id != "box");
        assert!(controller.sync(&slide).contains(&Effect::ClearSelection));
        assert!(controller.selected_id().is_none());
    }
}
