use super::Workspace;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use slidekit_common::Storage;

#[derive(Debug, Args)]
pub struct InfoArgs {
    /// Presentation id
    pub id: String,
}

pub fn list(workspace: &Workspace) -> Result<()> {
    let recent = workspace.storage.recent()?;
    if recent.is_empty() {
        println!("No presentations yet. Run: slidekit new");
        return Ok(());
    }

    for item in recent {
        println!(
            "  {}  {}  {}",
            item.id.bright_white(),
            item.name,
            item.updated_at.format("%Y-%m-%d %H:%M").to_string().dimmed()
        );
    }
    Ok(())
}

pub fn info(args: InfoArgs, workspace: &Workspace) -> Result<()> {
    let session = workspace.open_existing(&args.id)?;
    let document = session.document();
    let presentation = document.presentation();

    println!("{}", presentation.file_name.bright_blue().bold());
    println!("  design:  {}", presentation.design.name);
    println!("  updated: {}", presentation.updated_at.to_rfc3339());
    println!(
        "  history: {}/{}",
        session.history().cursor() + 1,
        session.history().len()
    );
    println!();

    for (index, slide) in document.slides().iter().enumerate() {
        let marker = if index == document.active_slide_index() { "▸" } else { " " };
        println!(
            "{} {:>2}. {} {}",
            marker,
            index + 1,
            slide.title,
            format!("({} elements)", slide.content.len()).dimmed()
        );
        for element in &slide.content {
            println!("        {} {}", element.type_name(), element.id.dimmed());
        }
    }
    Ok(())
}
