use super::Workspace;
use anyhow::{bail, Result};
use clap::Args;
use colored::Colorize;
use slidekit_editor::model::{ChartType, Point, CANVAS_HEIGHT, CANVAS_WIDTH};
use slidekit_editor::{InsertTool, Mutation, MutationOutcome};
use std::time::Instant;

#[derive(Debug, Args)]
pub struct AddSlideArgs {
    /// Presentation id
    pub id: String,

    /// Layout of the new slide
    #[arg(short, long)]
    pub layout: Option<String>,

    /// Insert position, 0-based and clamped (defaults to the end)
    #[arg(short, long)]
    pub index: Option<usize>,
}

#[derive(Debug, Args)]
pub struct AddChartArgs {
    /// Presentation id
    pub id: String,

    /// Chart type (bar, line, area, pie, combo)
    #[arg(default_value = "bar")]
    pub chart_type: ChartType,

    /// 1-based slide number (defaults to the active slide)
    #[arg(short, long)]
    pub slide: Option<usize>,
}

pub fn add_slide(args: AddSlideArgs, workspace: &mut Workspace) -> Result<()> {
    let mut session = workspace.open_existing(&args.id)?;
    let len = session.document().slides().len();
    let index = args.index.unwrap_or(len);
    let layout = args
        .layout
        .unwrap_or_else(|| workspace.config.editor.default_layout.clone());

    let outcome = session.apply(&Mutation::AddSlide { layout, index }, Instant::now())?;
    workspace.save(&mut session)?;

    let MutationOutcome::Created { id } = outcome else {
        return Ok(());
    };
    if let Some((position, slide)) = session
        .document()
        .slides()
        .iter()
        .enumerate()
        .find(|(_, s)| s.id == id)
    {
        println!(
            "{} Added {} at position {}",
            "✓".green(),
            slide.title.bright_white(),
            position + 1
        );
    }
    Ok(())
}

pub fn add_chart(args: AddChartArgs, workspace: &mut Workspace) -> Result<()> {
    let mut session = workspace.open_existing(&args.id)?;

    if let Some(slide) = args.slide {
        let len = session.document().slides().len();
        if slide == 0 || slide > len {
            bail!("Slide {} does not exist (deck has {} slides)", slide, len);
        }
        session.set_active_slide(slide - 1);
    }

    // Tool-then-click, the same path a pointer takes on the canvas
    session.select_tool(InsertTool::Chart(args.chart_type), false);
    let centre = Point::new(CANVAS_WIDTH / 2.0, CANVAS_HEIGHT / 2.0);
    session.pointer_down(centre, Instant::now())?;

    let Some(element_id) = session.controller().selected_id().map(str::to_string) else {
        bail!("Chart was not inserted");
    };
    workspace.save(&mut session)?;

    println!(
        "{} Added {} chart {} to slide {}",
        "✓".green(),
        args.chart_type.as_str(),
        element_id.bright_white(),
        session.document().active_slide_index() + 1
    );
    Ok(())
}
