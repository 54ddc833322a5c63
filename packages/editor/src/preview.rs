//! # Coordinate Pipeline
//!
//! Projects canonical slide geometry into scaled preview space.
//!
//! The canonical canvas is 960×540. A preview width is picked from a small
//! set of viewport breakpoints and its height follows the canvas aspect
//! ratio. X and Y are scaled independently everywhere; nothing here assumes
//! the two scale factors are equal.

use crate::chart::{palette_color, ChartData};
use crate::model::{
    Background, ChartType, Element, ElementKind, Rect, ShapeKind, Slide, TextAlign, CANVAS_HEIGHT,
    CANVAS_WIDTH,
};

/// Labels shown in a chart sketch
pub const SKETCH_MAX_LABELS: usize = 5;

const ELLIPSIS: char = '…';

/// Thumbnail width for a viewport width
pub fn preview_width(viewport_width: f64) -> f64 {
    if viewport_width <= 600.0 {
        140.0
    } else if viewport_width <= 900.0 {
        160.0
    } else if viewport_width <= 1200.0 {
        180.0
    } else {
        200.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PreviewScale {
    pub width: f64,
    pub height: f64,
    pub scale_x: f64,
    pub scale_y: f64,
}

impl PreviewScale {
    /// Scale for a preview of `width`, height derived from the canvas ratio
    pub fn for_width(width: f64) -> Self {
        let height = width * CANVAS_HEIGHT / CANVAS_WIDTH;
        Self::for_size(width, height)
    }

    /// Scale for an arbitrary preview box (axes scale independently)
    pub fn for_size(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            scale_x: width / CANVAS_WIDTH,
            scale_y: height / CANVAS_HEIGHT,
        }
    }

    pub fn for_viewport(viewport_width: f64) -> Self {
        Self::for_width(preview_width(viewport_width))
    }

    /// Scale factor for lengths that are not tied to one axis
    fn scale_uniform(&self) -> f64 {
        self.scale_x.min(self.scale_y)
    }

    pub fn project_rect(&self, rect: Rect) -> Rect {
        Rect::new(
            rect.x * self.scale_x,
            rect.y * self.scale_y,
            rect.width * self.scale_x,
            rect.height * self.scale_y,
        )
    }

    pub fn project(&self, element: &Element) -> PreviewElement {
        let frame = self.project_rect(element.bounds());

        let body = match &element.kind {
            ElementKind::Text(text) => {
                let font_size = text.font_size * self.scale_y;
                PreviewBody::Text {
                    line: ellipsize(&text.plain_text, frame.width, font_size),
                    font_size,
                    color: text.color.clone(),
                    align: text.align,
                    bold: text.bold,
                }
            }
            ElementKind::Shape(shape) => PreviewBody::Shape {
                silhouette: shape.shape,
                fill: shape.fill.clone(),
                border: shape.border.clone(),
                border_width: shape.border_width * self.scale_uniform(),
            },
            ElementKind::Chart(chart) => {
                PreviewBody::Chart(ChartSketch::from_data(chart.chart_type, &chart.chart_data))
            }
            ElementKind::Image(image) => match image.src.as_deref() {
                Some(src) if !src.is_empty() => PreviewBody::Image(ImagePreview::Source(src.to_string())),
                _ => PreviewBody::Image(ImagePreview::Placeholder),
            },
        };

        PreviewElement {
            id: element.id.clone(),
            frame,
            body,
        }
    }

    pub fn project_slide(&self, slide: &Slide) -> SlidePreview {
        SlidePreview {
            slide_id: slide.id.clone(),
            width: self.width,
            height: self.height,
            background: slide.background.clone(),
            elements: slide.content.iter().map(|e| self.project(e)).collect(),
        }
    }
}

/// Truncate to one line that fits `width` at `font_size`
fn ellipsize(text: &str, width: f64, font_size: f64) -> String {
    let first_line = text.lines().next().unwrap_or("");
    let char_width = (font_size * 0.6).max(f64::EPSILON);
    let fits = (width / char_width).floor().max(1.0) as usize;
    let truncated = text.lines().nth(1).is_some();

    let count = first_line.chars().count();
    if count <= fits && !truncated {
        return first_line.to_string();
    }

    let keep = fits.saturating_sub(1).min(count);
    let mut line: String = first_line.chars().take(keep).collect();
    line.push(ELLIPSIS);
    line
}

#[derive(Debug, Clone, PartialEq)]
pub struct SlidePreview {
    pub slide_id: String,
    pub width: f64,
    pub height: f64,
    pub background: Background,
    pub elements: Vec<PreviewElement>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PreviewElement {
    pub id: String,
    pub frame: Rect,
    pub body: PreviewBody,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PreviewBody {
    Text {
        line: String,
        font_size: f64,
        color: String,
        align: TextAlign,
        bold: bool,
    },
    Shape {
        silhouette: ShapeKind,
        fill: String,
        border: String,
        border_width: f64,
    },
    Chart(ChartSketch),
    Image(ImagePreview),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ImagePreview {
    Source(String),
    Placeholder,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SketchKind {
    Bars,
    Lines,
    Pie,
}

/// One series in a chart sketch, values normalized to `[0, 1]`
#[derive(Debug, Clone, PartialEq)]
pub struct SketchSeries {
    pub color: String,
    pub values: Vec<f64>,
}

/// Minimal chart rendering for thumbnails
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSketch {
    pub kind: SketchKind,
    pub labels: Vec<String>,
    pub series: Vec<SketchSeries>,
}

impl ChartSketch {
    pub fn from_data(chart_type: ChartType, data: &ChartData) -> Self {
        let labels: Vec<String> = data.labels.iter().take(SKETCH_MAX_LABELS).cloned().collect();
        let n = labels.len();

        match chart_type {
            ChartType::Pie => {
                // One series per segment of the first dataset, values are shares
                let series = data
                    .datasets
                    .first()
                    .map(|ds| {
                        let values: Vec<f64> = ds.data.iter().take(n).map(|v| v.max(0.0)).collect();
                        let total: f64 = values.iter().sum();
                        values
                            .iter()
                            .enumerate()
                            .map(|(i, v)| SketchSeries {
                                color: ds
                                    .segment_colors
                                    .as_ref()
                                    .and_then(|colors| colors.get(i))
                                    .filter(|c| !c.is_empty())
                                    .cloned()
                                    .unwrap_or_else(|| palette_color(i).to_string()),
                                values: vec![if total > 0.0 { v / total } else { 0.0 }],
                            })
                            .collect()
                    })
                    .unwrap_or_default();

                ChartSketch {
                    kind: SketchKind::Pie,
                    labels,
                    series,
                }
            }
            ChartType::Bar | ChartType::Combo | ChartType::Line | ChartType::Area => {
                let max = data
                    .datasets
                    .iter()
                    .flat_map(|ds| ds.data.iter().take(n))
                    .fold(0.0_f64, |acc, v| acc.max(v.abs()));

                let series = data
                    .datasets
                    .iter()
                    .enumerate()
                    .map(|(i, ds)| SketchSeries {
                        color: if ds.color.is_empty() {
                            palette_color(i).to_string()
                        } else {
                            ds.color.clone()
                        },
                        values: ds
                            .data
                            .iter()
                            .take(n)
                            .map(|v| if max > 0.0 { v.abs() / max } else { 0.0 })
                            .collect(),
                    })
                    .collect();

                let kind = match chart_type {
                    ChartType::Line | ChartType::Area => SketchKind::Lines,
                    _ => SketchKind::Bars,
                };

                ChartSketch { kind, labels, series }
            }
        }
    }
}
