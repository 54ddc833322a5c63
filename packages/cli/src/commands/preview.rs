use super::Workspace;
use anyhow::{bail, Result};
use clap::Args;
use colored::Colorize;
use slidekit_editor::model::Slide;
use slidekit_editor::preview::{ImagePreview, PreviewBody, PreviewScale, SketchKind};

#[derive(Debug, Args)]
pub struct PreviewArgs {
    /// Presentation id
    pub id: String,

    /// Only this 1-based slide number
    #[arg(short, long)]
    pub slide: Option<usize>,

    /// Viewport width used to pick the preview size
    #[arg(long = "viewport", default_value = "1280")]
    pub viewport_width: f64,
}

pub fn preview(args: PreviewArgs, workspace: &Workspace) -> Result<()> {
    let session = workspace.open_existing(&args.id)?;
    let slides = session.document().slides();

    let selected: &[Slide] = match args.slide {
        Some(n) if n == 0 || n > slides.len() => {
            bail!("Slide {} does not exist (deck has {} slides)", n, slides.len())
        }
        Some(n) => &slides[n - 1..n],
        None => slides,
    };

    let scale = PreviewScale::for_viewport(args.viewport_width);
    for slide in selected {
        print_slide(&scale, slide);
    }
    Ok(())
}

fn print_slide(scale: &PreviewScale, slide: &Slide) {
    let preview = scale.project_slide(slide);

    println!(
        "{} {}x{} {}",
        slide.title.bright_blue().bold(),
        preview.width,
        preview.height,
        preview.background.color.dimmed()
    );

    for element in &preview.elements {
        let frame = element.frame;
        println!(
            "  {:>6.1},{:<6.1} {:>6.1}x{:<6.1} {}",
            frame.x,
            frame.y,
            frame.width,
            frame.height,
            describe(&element.body)
        );
    }
}

fn describe(body: &PreviewBody) -> String {
    match body {
        PreviewBody::Text { line, .. } => format!("\"{}\"", line),
        PreviewBody::Shape { silhouette, fill, .. } => format!("{:?} {}", silhouette, fill),
        PreviewBody::Chart(sketch) => {
            let kind = match sketch.kind {
                SketchKind::Bars => "bars",
                SketchKind::Lines => "lines",
                SketchKind::Pie => "pie",
            };
            format!("{} [{}] ({} series)", kind, sketch.labels.join(", "), sketch.series.len())
        }
        PreviewBody::Image(ImagePreview::Source(src)) => format!("image {}", src),
        PreviewBody::Image(ImagePreview::Placeholder) => "image (placeholder)".to_string(),
    }
}
