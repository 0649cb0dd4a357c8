use crate::prompt::Prompt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// File name exports are saved under.
pub const EXPORT_FILE_NAME: &str = "prompts_export.json";

/// Media type of exported documents.
pub const EXPORT_MEDIA_TYPE: &str = "application/json";

/// A downloadable document holding the pretty-printed prompt collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Export {
    pub file_name: String,
    pub media_type: String,
    pub contents: String,
}

impl Export {
    pub fn new(prompts: &[Prompt]) -> Result<Export, serde_json::Error> {
        Ok(Export {
            file_name: EXPORT_FILE_NAME.to_string(),
            media_type: EXPORT_MEDIA_TYPE.to_string(),
            contents: serde_json::to_string_pretty(prompts)?,
        })
    }

    /// Writes the document into `dir`, replacing an earlier export.
    pub fn write_to(&self, dir: &Path) -> io::Result<PathBuf> {
        let path = dir.join(&self.file_name);
        fs::write(&path, &self.contents)?;
        Ok(path)
    }
}
