//! # Document Model
//!
//! Canonical presentation data structures.
//!
//! All element geometry is stored in canonical canvas units: a fixed
//! 960×540 space with the origin at the top-left corner. Element order in
//! a slide's `content` is the z-order (last = topmost).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::chart::ChartData;

/// Canonical canvas width in canvas units
pub const CANVAS_WIDTH: f64 = 960.0;

/// Canonical canvas height in canvas units
pub const CANVAS_HEIGHT: f64 = 540.0;

/// A point in canvas (or screen) units
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x
            && point.x <= self.x + self.width
            && point.y >= self.y
            && point.y <= self.y + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// The whole document: ordered slides, active design, file name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Presentation {
    id: String,
    pub slides: Vec<Slide>,
    pub design: DesignPreset,
    pub file_name: String,
    pub updated_at: DateTime<Utc>,
}

impl Presentation {
    pub fn new(
        id: impl Into<String>,
        slides: Vec<Slide>,
        design: DesignPreset,
        file_name: impl Into<String>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            slides,
            design,
            file_name: file_name.into(),
            updated_at,
        }
    }

    /// Immutable once created
    pub fn id(&self) -> &str {
        &self.id
    }
}

/// One page of the presentation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Slide {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub content: Vec<Element>,
    #[serde(default)]
    pub background: Background,
}

impl Slide {
    pub fn new(id: impl Into<String>, title: impl Into<String>, background: Background) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            content: Vec::new(),
            background,
        }
    }

    pub fn element(&self, id: &str) -> Option<&Element> {
        self.content.iter().find(|e| e.id == id)
    }

    pub fn element_mut(&mut self, id: &str) -> Option<&mut Element> {
        self.content.iter_mut().find(|e| e.id == id)
    }

    pub fn position_of(&self, id: &str) -> Option<usize> {
        self.content.iter().position(|e| e.id == id)
    }

    pub fn contains_element(&self, id: &str) -> bool {
        self.content.iter().any(|e| e.id == id)
    }

    /// Topmost element under `point`
    pub fn hit_test(&self, point: Point) -> Option<&Element> {
        self.content.iter().rev().find(|e| e.bounds().contains(point))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Background {
    pub color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl Background {
    pub fn solid(color: impl Into<String>) -> Self {
        Self {
            color: color.into(),
            image: None,
        }
    }
}

impl Default for Background {
    fn default() -> Self {
        Self::solid("#ffffff")
    }
}

/// A positioned unit on a slide
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub id: String,
    pub x: f64,
    pub y: f64,
    /// `None` only for text awaiting auto-size
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(flatten)]
    pub kind: ElementKind,
}

impl Element {
    pub fn new(id: impl Into<String>, frame: Rect, kind: ElementKind) -> Self {
        Self {
            id: id.into(),
            x: frame.x,
            y: frame.y,
            width: Some(frame.width),
            height: Some(frame.height),
            kind,
        }
    }

    /// Effective bounds, estimating a size for auto-sized text
    pub fn bounds(&self) -> Rect {
        let (est_w, est_h) = match &self.kind {
            ElementKind::Text(text) => {
                let chars = text.plain_text.lines().map(|l| l.chars().count()).max().unwrap_or(0);
                let lines = text.plain_text.lines().count().max(1);
                (
                    (chars as f64 * text.font_size * 0.6).max(text.font_size),
                    lines as f64 * text.font_size * 1.4,
                )
            }
            _ => (0.0, 0.0),
        };

        Rect::new(
            self.x,
            self.y,
            self.width.unwrap_or(est_w),
            self.height.unwrap_or(est_h),
        )
    }

    pub fn type_name(&self) -> &'static str {
        self.kind.type_name()
    }

    pub fn as_text(&self) -> Option<&TextElement> {
        match &self.kind {
            ElementKind::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_image(&self) -> Option<&ImageElement> {
        match &self.kind {
            ElementKind::Image(image) => Some(image),
            _ => None,
        }
    }
}

/// Type-specific element payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ElementKind {
    Text(TextElement),
    Shape(ShapeElement),
    Chart(ChartElement),
    Image(ImageElement),
}

impl ElementKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            ElementKind::Text(_) => "text",
            ElementKind::Shape(_) => "shape",
            ElementKind::Chart(_) => "chart",
            ElementKind::Image(_) => "image",
        }
    }

    pub fn same_type(&self, other: &ElementKind) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
    Justify,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TextElement {
    /// Serialized rich-text markup
    pub html: String,
    /// Plain-text cache derived from `html`
    pub plain_text: String,
    pub font_family: String,
    pub font_size: f64,
    pub color: String,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub align: TextAlign,
    pub flip_h: bool,
    pub flip_v: bool,
}

impl TextElement {
    pub fn plain(text: impl Into<String>, font_size: f64) -> Self {
        let text = text.into();
        Self {
            html: format!("<p>{}</p>", escape_markup(&text)),
            plain_text: text,
            font_size,
            ..Self::default()
        }
    }
}

impl Default for TextElement {
    fn default() -> Self {
        Self {
            html: String::new(),
            plain_text: String::new(),
            font_family: "Inter".to_string(),
            font_size: 24.0,
            color: "#1f2937".to_string(),
            bold: false,
            italic: false,
            underline: false,
            align: TextAlign::Left,
            flip_h: false,
            flip_v: false,
        }
    }
}

fn escape_markup(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Rectangle,
    Circle,
    Triangle,
    Star,
    Arrow,
    Line,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapeElement {
    pub shape: ShapeKind,
    pub fill: String,
    pub border: String,
    #[serde(default)]
    pub border_width: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl ShapeElement {
    pub fn new(shape: ShapeKind) -> Self {
        Self {
            shape,
            fill: "#3b82f6".to_string(),
            border: "#1e40af".to_string(),
            border_width: 2.0,
            text: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartType {
    Bar,
    Area,
    Pie,
    /// Combined column + line
    Combo,
    Line,
}

impl ChartType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChartType::Bar => "bar",
            ChartType::Area => "area",
            ChartType::Pie => "pie",
            ChartType::Combo => "combo",
            ChartType::Line => "line",
        }
    }
}

impl std::str::FromStr for ChartType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bar" | "column" => Ok(ChartType::Bar),
            "area" => Ok(ChartType::Area),
            "pie" => Ok(ChartType::Pie),
            "combo" | "combined" => Ok(ChartType::Combo),
            "line" => Ok(ChartType::Line),
            other => Err(format!("unknown chart type: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartElement {
    pub chart_type: ChartType,
    pub chart_data: ChartData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageData {
    pub name: String,
    pub size: u64,
    pub mime: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ImageElement {
    pub src: Option<String>,
    pub image_data: Option<ImageData>,
    pub lock_aspect: bool,
    pub flip_h: bool,
    pub flip_v: bool,
}

/// Named background/text/accent color set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignPreset {
    pub id: String,
    pub name: String,
    pub background: String,
    pub text: String,
    pub accent: String,
}

const DESIGN_CATALOGUE: &[(&str, &str, &str, &str, &str)] = &[
    ("classic", "Classic", "#ffffff", "#1f2937", "#2563eb"),
    ("midnight", "Midnight", "#0f172a", "#f8fafc", "#38bdf8"),
    ("sunrise", "Sunrise", "#fff7ed", "#431407", "#ea580c"),
    ("forest", "Forest", "#f0fdf4", "#14532d", "#16a34a"),
    ("slate", "Slate", "#f1f5f9", "#0f172a", "#6366f1"),
];

impl DesignPreset {
    /// All built-in presets
    pub fn catalogue() -> Vec<DesignPreset> {
        DESIGN_CATALOGUE
            .iter()
            .map(|(id, name, background, text, accent)| DesignPreset {
                id: id.to_string(),
                name: name.to_string(),
                background: background.to_string(),
                text: text.to_string(),
                accent: accent.to_string(),
            })
            .collect()
    }

    pub fn find(id: &str) -> Option<DesignPreset> {
        Self::catalogue().into_iter().find(|preset| preset.id == id)
    }

    /// The catalogue preset whose background is `color`
    pub fn for_background(color: &str) -> Option<DesignPreset> {
        Self::catalogue()
            .into_iter()
            .find(|preset| preset.background.eq_ignore_ascii_case(color))
    }

    pub fn background(&self) -> Background {
        Background::solid(self.background.clone())
    }
}

impl Default for DesignPreset {
    fn default() -> Self {
        let (id, name, background, text, accent) = DESIGN_CATALOGUE[0];
        DesignPreset {
            id: id.to_string(),
            name: name.to_string(),
            background: background.to_string(),
            text: text.to_string(),
            accent: accent.to_string(),
        }
    }
}
