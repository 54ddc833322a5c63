use super::Workspace;
use anyhow::Result;
use chrono::Utc;
use clap::Args;
use colored::Colorize;
use slidekit_editor::persistence::DEFAULT_FILE_NAME;
use slidekit_editor::{Document, EditSession, Layout};

#[derive(Debug, Args)]
pub struct NewArgs {
    /// File name of the presentation
    #[arg(default_value = DEFAULT_FILE_NAME)]
    pub name: String,

    /// Layout of the first slide (blank, title, title-content, two-column, section)
    #[arg(short, long)]
    pub layout: Option<String>,
}

pub fn new(args: NewArgs, workspace: &mut Workspace) -> Result<()> {
    let layout_id = args
        .layout
        .unwrap_or_else(|| workspace.config.editor.default_layout.clone());
    let layout = Layout::from_id(&layout_id);

    let document = Document::create(&args.name, layout, Utc::now());
    let mut session = EditSession::new(document, workspace.config.editor.clone());
    workspace.save(&mut session)?;

    println!(
        "{} Created {} ({})",
        "✓".green(),
        args.name.bright_white(),
        session.document().id()
    );
    Ok(())
}
