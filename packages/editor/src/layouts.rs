//! Slide layouts: templates a new slide is materialized from.

use crate::ids::IdGenerator;
use crate::model::{
    DesignPreset, Element, ElementKind, Rect, Slide, TextAlign, TextElement, CANVAS_WIDTH,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    Blank,
    Title,
    TitleContent,
    TwoColumn,
    Section,
}

impl Layout {
    pub const ALL: [Layout; 5] = [
        Layout::Blank,
        Layout::Title,
        Layout::TitleContent,
        Layout::TwoColumn,
        Layout::Section,
    ];

    /// Look up a layout by id. Unknown ids materialize as `Blank`.
    pub fn from_id(id: &str) -> Layout {
        match id {
            "blank" => Layout::Blank,
            "title" => Layout::Title,
            "title-content" => Layout::TitleContent,
            "two-column" => Layout::TwoColumn,
            "section" => Layout::Section,
            other => {
                tracing::debug!(layout = other, "unknown layout id, using blank");
                Layout::Blank
            }
        }
    }

    pub fn id(&self) -> &'static str {
        match self {
            Layout::Blank => "blank",
            Layout::Title => "title",
            Layout::TitleContent => "title-content",
            Layout::TwoColumn => "two-column",
            Layout::Section => "section",
        }
    }

    /// Build a slide with fresh ids from this layout
    pub fn materialize(&self, ids: &mut IdGenerator, title: String, design: &DesignPreset) -> Slide {
        let mut slide = Slide::new(ids.new_id(), title, design.background());

        let text = |ids: &mut IdGenerator, frame: Rect, label: &str, size: f64, bold: bool, align: TextAlign| {
            let mut payload = TextElement::plain(label, size);
            payload.color = design.text.clone();
            payload.bold = bold;
            payload.align = align;
            Element::new(ids.new_id(), frame, ElementKind::Text(payload))
        };

        let margin = 60.0;
        let full_width = CANVAS_WIDTH - margin * 2.0;

        match self {
            Layout::Blank => {}
            Layout::Title => {
                slide.content.push(text(ids, Rect::new(margin, 180.0, full_width, 90.0), "Click to add title", 54.0, true, TextAlign::Center));
                slide.content.push(text(ids, Rect::new(margin, 290.0, full_width, 50.0), "Click to add subtitle", 28.0, false, TextAlign::Center));
            }
            Layout::TitleContent => {
                slide.content.push(text(ids, Rect::new(margin, 40.0, full_width, 70.0), "Click to add title", 40.0, true, TextAlign::Left));
                slide.content.push(text(ids, Rect::new(margin, 130.0, full_width, 340.0), "Click to add text", 24.0, false, TextAlign::Left));
            }
            Layout::TwoColumn => {
                let column = (full_width - 40.0) / 2.0;
                slide.content.push(text(ids, Rect::new(margin, 40.0, full_width, 70.0), "Click to add title", 40.0, true, TextAlign::Left));
                slide.content.push(text(ids, Rect::new(margin, 130.0, column, 340.0), "Left column", 22.0, false, TextAlign::Left));
                slide.content.push(text(ids, Rect::new(margin + column + 40.0, 130.0, column, 340.0), "Right column", 22.0, false, TextAlign::Left));
            }
            Layout::Section => {
                slide.content.push(text(ids, Rect::new(margin, 220.0, full_width, 100.0), "Section title", 48.0, true, TextAlign::Left));
            }
        }

        slide
    }
}

/// True for titles of the auto-generated form `Slide {n}`
pub fn is_auto_title(title: &str) -> bool {
    title
        .strip_prefix("Slide ")
        .map(|n| !n.is_empty() && n.chars().all(|c| c.is_ascii_digit()))
        .unwrap_or(false)
}

pub fn auto_title(position: usize) -> String {
    format!("Slide {}", position + 1)
}

/// Renumber auto-generated titles to match slide positions
pub fn renumber_titles(slides: &mut [Slide]) {
    for (i, slide) in slides.iter_mut().enumerate() {
        if is_auto_title(&slide.title) {
            slide.title = auto_title(i);
        }
    }
}
