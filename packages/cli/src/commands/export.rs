use super::Workspace;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use slidekit_editor::JsonExportEncoder;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct ExportArgs {
    /// Presentation id
    pub id: String,

    /// Output file
    #[arg(short, long)]
    pub out: PathBuf,
}

pub fn export(args: ExportArgs, workspace: &mut Workspace) -> Result<()> {
    let mut session = workspace.open_existing(&args.id)?;
    let bytes = session.export(&mut JsonExportEncoder, &mut workspace.storage)?;

    if let Some(parent) = args.out.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&args.out, &bytes)?;

    println!(
        "{} Exported {} slide(s) to {}",
        "✓".green(),
        session.document().slides().len(),
        args.out.display().to_string().bright_white()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{new, NewArgs};
    use slidekit_common::Storage;

    #[test]
    fn test_export_writes_json_deck() {
        let dir = tempfile::tempdir().unwrap();
        let mut workspace = Workspace::open(dir.path(), None).unwrap();
        new(
            NewArgs {
                name: "Review".to_string(),
                layout: Some("title".to_string()),
            },
            &mut workspace,
        )
        .unwrap();
        let id = workspace.storage.recent().unwrap()[0].id.clone();

        let out = dir.path().join("out").join("review.json");
        export(ExportArgs { id, out: out.clone() }, &mut workspace).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&std::fs::read(&out).unwrap()).unwrap();
        assert_eq!(value["fileName"], "Review");
        assert_eq!(value["slides"].as_array().unwrap().len(), 1);
    }
}
