mod commands;
mod config;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{
    add_chart, add_slide, export, info, list, new, preview, redo, undo, AddChartArgs, AddSlideArgs,
    ExportArgs, HistoryArgs, InfoArgs, NewArgs, PreviewArgs, Workspace,
};
use std::path::PathBuf;

/// Slidekit CLI - edit slide decks from the terminal
#[derive(Parser, Debug)]
#[command(name = "slidekit")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Store directory (overrides storeDir from slidekit.config.json)
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a new presentation
    New(NewArgs),

    /// List recently edited presentations
    List,

    /// Show slides and history of a presentation
    Info(InfoArgs),

    /// Insert a slide from a layout
    AddSlide(AddSlideArgs),

    /// Insert a chart with default data at the centre of a slide
    AddChart(AddChartArgs),

    /// Print the scaled preview of a slide
    Preview(PreviewArgs),

    /// Step back through history
    Undo(HistoryArgs),

    /// Step forward through history
    Redo(HistoryArgs),

    /// Export a presentation
    Export(ExportArgs),
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = std::env::current_dir()
        .map_err(anyhow::Error::from)
        .and_then(|cwd| Workspace::open(&cwd, cli.store.as_deref()))
        .and_then(|mut workspace| match cli.command {
            Command::New(args) => new(args, &mut workspace),
            Command::List => list(&workspace),
            Command::Info(args) => info(args, &workspace),
            Command::AddSlide(args) => add_slide(args, &mut workspace),
            Command::AddChart(args) => add_chart(args, &mut workspace),
            Command::Preview(args) => preview(args, &workspace),
            Command::Undo(args) => undo(args, &mut workspace),
            Command::Redo(args) => redo(args, &mut workspace),
            Command::Export(args) => export(args, &mut workspace),
        });

    if let Err(err) = result {
        eprintln!();
        eprintln!("{} {}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
