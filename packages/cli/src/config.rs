use serde::{Deserialize, Serialize};
use slidekit_editor::EditorConfig;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_NAME: &str = "slidekit.config.json";

/// Slidekit configuration file format
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Directory presentations are stored in
    #[serde(default = "default_store_dir")]
    pub store_dir: String,

    /// Editing engine tunables
    #[serde(flatten)]
    pub editor: EditorConfig,
}

fn default_store_dir() -> String {
    ".slidekit".to_string()
}

impl Config {
    /// Load config from a directory
    pub fn load(cwd: &Path) -> anyhow::Result<Self> {
        let config_path = cwd.join(DEFAULT_CONFIG_NAME);

        if !config_path.exists() {
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(&config_path)?;
        let mut config: Config = serde_json::from_str(&content)?;
        config.editor.sanitize();
        Ok(config)
    }

    /// Absolute path to the store directory, `override_dir` taking precedence
    pub fn store_path(&self, cwd: &Path, override_dir: Option<&Path>) -> PathBuf {
        match override_dir {
            Some(dir) => cwd.join(dir),
            None => cwd.join(&self.store_dir),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_dir: default_store_dir(),
            editor: EditorConfig::default(),
        }
    }
}
