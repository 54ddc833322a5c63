//! Element factory for click-to-place insertion.
//!
//! Builds a default element of the chosen kind centred on the click point.
//! The returned element has an empty id; the document assigns one on insert.

use crate::chart;
use crate::model::{
    ChartElement, ChartType, Element, ElementKind, ImageElement, Point, Rect, ShapeElement,
    ShapeKind, TextElement, CANVAS_HEIGHT, CANVAS_WIDTH,
};

/// What the next canvas click will insert
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertTool {
    Text,
    Shape(ShapeKind),
    Chart(ChartType),
    Image,
}

impl InsertTool {
    /// Default (width, height) in canvas units
    pub fn default_size(&self) -> (f64, f64) {
        match self {
            InsertTool::Text => (300.0, 60.0),
            InsertTool::Shape(ShapeKind::Line) => (200.0, 4.0),
            InsertTool::Shape(ShapeKind::Arrow) => (200.0, 80.0),
            InsertTool::Shape(_) => (150.0, 150.0),
            InsertTool::Chart(_) => (480.0, 300.0),
            InsertTool::Image => (320.0, 240.0),
        }
    }
}

/// Frame of `size` centred on `at`, kept inside the canvas
pub fn placement(at: Point, (width, height): (f64, f64)) -> Rect {
    let x = (at.x - width / 2.0).clamp(0.0, (CANVAS_WIDTH - width).max(0.0));
    let y = (at.y - height / 2.0).clamp(0.0, (CANVAS_HEIGHT - height).max(0.0));
    Rect::new(x.round(), y.round(), width, height)
}

pub fn materialize(tool: InsertTool, at: Point) -> Element {
    let frame = placement(at, tool.default_size());

    let kind = match tool {
        InsertTool::Text => ElementKind::Text(TextElement::plain("Click to edit text", 24.0)),
        InsertTool::Shape(shape) => ElementKind::Shape(ShapeElement::new(shape)),
        InsertTool::Chart(chart_type) => ElementKind::Chart(ChartElement {
            chart_type,
            chart_data: chart::normalize(chart_type, None),
        }),
        InsertTool::Image => ElementKind::Image(ImageElement {
            lock_aspect: true,
            ..ImageElement::default()
        }),
    };

    Element::new(String::new(), frame, kind)
}
