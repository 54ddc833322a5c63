use super::Workspace;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use slidekit_editor::EditSession;
use std::time::Instant;

#[derive(Debug, Args)]
pub struct HistoryArgs {
    /// Presentation id
    pub id: String,

    /// Number of steps
    #[arg(short = 'n', long, default_value = "1")]
    pub steps: usize,
}

pub fn undo(args: HistoryArgs, workspace: &mut Workspace) -> Result<()> {
    step(args, workspace, ("undo", "Undid"), EditSession::undo)
}

pub fn redo(args: HistoryArgs, workspace: &mut Workspace) -> Result<()> {
    step(args, workspace, ("redo", "Redid"), EditSession::redo)
}

fn step(
    args: HistoryArgs,
    workspace: &mut Workspace,
    (action, done): (&str, &str),
    replay: fn(&mut EditSession, Instant) -> bool,
) -> Result<()> {
    let mut session = workspace.open_existing(&args.id)?;

    let mut taken = 0;
    while taken < args.steps && replay(&mut session, Instant::now()) {
        taken += 1;
    }

    if taken == 0 {
        println!("{} Nothing to {}", "⚠️".yellow(), action);
        return Ok(());
    }

    workspace.save(&mut session)?;
    println!(
        "{} {} {} step(s), now at {}/{}",
        "✓".green(),
        done,
        taken,
        session.history().cursor() + 1,
        session.history().len()
    );
    Ok(())
}
