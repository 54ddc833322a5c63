//! Stable structural content hashing.
//!
//! Every model type feeds its fields into the hasher in a fixed canonical
//! order, so two value-identical slide arrays always hash the same no
//! matter how they were built or deserialized. Floats are hashed by bit
//! pattern (with `-0.0` folded into `0.0`).

use std::hash::Hasher;

use crate::chart::{ChartData, Dataset, SeriesVariant};
use crate::model::{
    Background, ChartElement, ChartType, Element, ElementKind, ImageData, ImageElement,
    ShapeElement, ShapeKind, Slide, TextAlign, TextElement,
};

pub trait ContentHash {
    fn content_hash<H: Hasher>(&self, state: &mut H);
}

/// CRC32 digest of a value's structural hash
pub fn digest<T: ContentHash + ?Sized>(value: &T) -> u32 {
    let mut hasher = crc32fast::Hasher::new();
    value.content_hash(&mut hasher);
    hasher.finalize()
}

fn write_str<H: Hasher>(state: &mut H, value: &str) {
    state.write_u64(value.len() as u64);
    state.write(value.as_bytes());
}

fn write_f64<H: Hasher>(state: &mut H, value: f64) {
    let value = if value == 0.0 { 0.0 } else { value };
    state.write_u64(value.to_bits());
}

fn write_bool<H: Hasher>(state: &mut H, value: bool) {
    state.write_u8(value as u8);
}

fn write_opt_f64<H: Hasher>(state: &mut H, value: Option<f64>) {
    match value {
        Some(v) => {
            state.write_u8(1);
            write_f64(state, v);
        }
        None => state.write_u8(0),
    }
}

fn write_opt_str<H: Hasher>(state: &mut H, value: Option<&str>) {
    match value {
        Some(v) => {
            state.write_u8(1);
            write_str(state, v);
        }
        None => state.write_u8(0),
    }
}

impl<T: ContentHash> ContentHash for [T] {
    fn content_hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.len() as u64);
        for item in self {
            item.content_hash(state);
        }
    }
}

impl<T: ContentHash> ContentHash for Vec<T> {
    fn content_hash<H: Hasher>(&self, state: &mut H) {
        self.as_slice().content_hash(state);
    }
}

impl ContentHash for Slide {
    fn content_hash<H: Hasher>(&self, state: &mut H) {
        write_str(state, &self.id);
        write_str(state, &self.title);
        self.background.content_hash(state);
        self.content.content_hash(state);
    }
}

impl ContentHash for Background {
    fn content_hash<H: Hasher>(&self, state: &mut H) {
        write_str(state, &self.color);
        write_opt_str(state, self.image.as_deref());
    }
}

impl ContentHash for Element {
    fn content_hash<H: Hasher>(&self, state: &mut H) {
        write_str(state, &self.id);
        write_f64(state, self.x);
        write_f64(state, self.y);
        write_opt_f64(state, self.width);
        write_opt_f64(state, self.height);
        self.kind.content_hash(state);
    }
}

impl ContentHash for ElementKind {
    fn content_hash<H: Hasher>(&self, state: &mut H) {
        write_str(state, self.type_name());
        match self {
            ElementKind::Text(text) => text.content_hash(state),
            ElementKind::Shape(shape) => shape.content_hash(state),
            ElementKind::Chart(chart) => chart.content_hash(state),
            ElementKind::Image(image) => image.content_hash(state),
        }
    }
}

impl ContentHash for TextElement {
    fn content_hash<H: Hasher>(&self, state: &mut H) {
        write_str(state, &self.html);
        write_str(state, &self.plain_text);
        write_str(state, &self.font_family);
        write_f64(state, self.font_size);
        write_str(state, &self.color);
        write_bool(state, self.bold);
        write_bool(state, self.italic);
        write_bool(state, self.underline);
        state.write_u8(match self.align {
            TextAlign::Left => 0,
            TextAlign::Center => 1,
            TextAlign::Right => 2,
            TextAlign::Justify => 3,
        });
        write_bool(state, self.flip_h);
        write_bool(state, self.flip_v);
    }
}

impl ContentHash for ShapeElement {
    fn content_hash<H: Hasher>(&self, state: &mut H) {
        state.write_u8(match self.shape {
            ShapeKind::Rectangle => 0,
            ShapeKind::Circle => 1,
            ShapeKind::Triangle => 2,
            ShapeKind::Star => 3,
            ShapeKind::Arrow => 4,
            ShapeKind::Line => 5,
        });
        write_str(state, &self.fill);
        write_str(state, &self.border);
        write_f64(state, self.border_width);
        write_opt_str(state, self.text.as_deref());
    }
}

impl ContentHash for ChartType {
    fn content_hash<H: Hasher>(&self, state: &mut H) {
        write_str(state, self.as_str());
    }
}

impl ContentHash for ChartElement {
    fn content_hash<H: Hasher>(&self, state: &mut H) {
        self.chart_type.content_hash(state);
        self.chart_data.content_hash(state);
    }
}

impl ContentHash for ChartData {
    fn content_hash<H: Hasher>(&self, state: &mut H) {
        self.chart_type.content_hash(state);
        write_str(state, &self.title);
        state.write_u64(self.labels.len() as u64);
        for label in &self.labels {
            write_str(state, label);
        }
        self.datasets.content_hash(state);
    }
}

impl ContentHash for Dataset {
    fn content_hash<H: Hasher>(&self, state: &mut H) {
        write_str(state, &self.id);
        write_str(state, &self.label);
        state.write_u64(self.data.len() as u64);
        for value in &self.data {
            write_f64(state, *value);
        }
        write_str(state, &self.color);
        state.write_u8(match self.variant {
            SeriesVariant::Column => 0,
            SeriesVariant::Line => 1,
            SeriesVariant::Area => 2,
            SeriesVariant::Segment => 3,
        });
        match &self.segment_colors {
            Some(colors) => {
                state.write_u8(1);
                state.write_u64(colors.len() as u64);
                for color in colors {
                    write_str(state, color);
                }
            }
            None => state.write_u8(0),
        }
    }
}

impl ContentHash for ImageElement {
    fn content_hash<H: Hasher>(&self, state: &mut H) {
        write_opt_str(state, self.src.as_deref());
        match &self.image_data {
            Some(data) => {
                state.write_u8(1);
                data.content_hash(state);
            }
            None => state.write_u8(0),
        }
        write_bool(state, self.lock_aspect);
        write_bool(state, self.flip_h);
        write_bool(state, self.flip_v);
    }
}

impl ContentHash for ImageData {
    fn content_hash<H: Hasher>(&self, state: &mut H) {
        write_str(state, &self.name);
        state.write_u64(self.size);
        write_str(state, &self.mime);
        state.write_i64(self.timestamp.timestamp_millis());
    }
}
