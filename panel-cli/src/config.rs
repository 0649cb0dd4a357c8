use confy::ConfyError;
use panel_core::file_storage::FileStorage;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const PANEL_CLI: &str = "panel";

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct PanelCliConfig {
    /// Directory holding the prompt data file.
    pub base_path: String,
}

impl Default for PanelCliConfig {
    fn default() -> Self {
        let base_path = dirs::data_dir()
            .map(|p| p.join("panel"))
            .unwrap_or_else(|| PathBuf::from("panel"));

        Self {
            base_path: base_path.display().to_string(),
        }
    }
}

/// A path given on the command line wins over the configured one.
pub fn resolve_base_path(storage_path: Option<String>, config: &PanelCliConfig) -> PathBuf {
    storage_path
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(&config.base_path))
}

pub fn get_storage(storage_path: Option<String>) -> FileStorage {
    let config: Result<PanelCliConfig, ConfyError> = confy::load(PANEL_CLI, None);
    match config {
        Ok(config) => {
            let base_path = resolve_base_path(storage_path, &config);
            tracing::debug!(base_path = %base_path.display(), "using prompt storage");
            FileStorage::new(base_path)
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to load configuration");
            eprintln!("Error: Problem loading config. Exiting...");
            std::process::exit(exitcode::CONFIG);
        }
    }
}
