//! # Import
//!
//! Bulk import of a previously exported prompt collection.
//!
//! Imports merge into the stored collection by id: an imported prompt replaces the
//! stored prompt with the same id where it stands, prompts only present in storage
//! are kept, and new prompts are appended in file order. Malformed records are
//! skipped with a warning. An import either lands completely or leaves storage as
//! it was.

use crate::prompt::Prompt;
use crate::storage::KeyValueStore;
use crate::store::{PromptStore, StoreError};
use serde_json::Value;
use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Media type an import file has to declare.
pub const JSON_MEDIA_TYPE: &str = "application/json";

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("No file selected")]
    NotAFile,

    #[error("Please select a valid JSON file (got '{0}')")]
    WrongMimeOrFormat(String),

    #[error("Failed to parse JSON file: {0}")]
    ParseError(#[source] serde_json::Error),

    #[error("The JSON file does not contain an array of prompts")]
    NotASequence,

    #[error("Failed to read file: {0}")]
    ReadError(#[source] io::Error),

    #[error(transparent)]
    Storage(#[from] StoreError),
}

/// Something the user picked to import from.
pub trait FileLike {
    /// Whether this refers to an existing regular file.
    fn is_file(&self) -> bool;

    fn media_type(&self) -> &str;

    /// Reads the whole file as UTF-8 text.
    fn read_as_text(&self) -> impl Future<Output = io::Result<String>> + Send;
}

/// A file on the local filesystem.
#[derive(Debug, Clone)]
pub struct ImportFile {
    pub path: PathBuf,
    pub media_type: String,
}

impl ImportFile {
    /// Uses the file extension to decide the media type.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let media_type = media_type_for(&path).to_string();
        Self { path, media_type }
    }

    pub fn with_media_type(path: impl Into<PathBuf>, media_type: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            media_type: media_type.into(),
        }
    }
}

impl FileLike for ImportFile {
    fn is_file(&self) -> bool {
        self.path.is_file()
    }

    fn media_type(&self) -> &str {
        &self.media_type
    }

    async fn read_as_text(&self) -> io::Result<String> {
        tokio::fs::read_to_string(&self.path).await
    }
}

fn media_type_for(path: &Path) -> &'static str {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("json") => JSON_MEDIA_TYPE,
        Some(ext) if ext.eq_ignore_ascii_case("txt") || ext.eq_ignore_ascii_case("md") => "text/plain",
        _ => "application/octet-stream",
    }
}

/// Accepts `application/json`, ignoring case and parameters such as a charset.
fn is_json_media_type(media_type: &str) -> bool {
    media_type
        .split(';')
        .next()
        .map(str::trim)
        .is_some_and(|essence| essence.eq_ignore_ascii_case(JSON_MEDIA_TYPE))
}

/// Result of a successful import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Imported {
    /// The collection as persisted after the merge.
    pub prompts: Vec<Prompt>,
    /// Records appended to the collection.
    pub added: usize,
    /// Records that overwrote one already present.
    pub replaced: usize,
    /// Malformed records that were left out.
    pub skipped: usize,
}

/// Parses an exported document, leaving out malformed records.
///
/// Returns the valid records and how many were skipped.
pub fn parse_import(contents: &str) -> Result<(Vec<Prompt>, usize), ImportError> {
    let value: Value = serde_json::from_str(contents).map_err(ImportError::ParseError)?;
    let Value::Array(records) = value else {
        return Err(ImportError::NotASequence);
    };

    let mut prompts = Vec::with_capacity(records.len());
    let mut skipped = 0;
    for (index, record) in records.into_iter().enumerate() {
        match serde_json::from_value::<Prompt>(record) {
            Ok(prompt) => prompts.push(prompt),
            Err(e) => {
                tracing::warn!(index, error = %e, "skipping malformed prompt record");
                skipped += 1;
            }
        }
    }

    Ok((prompts, skipped))
}

/// Merges `imported` into `existing` by id.
///
/// Returns the merged collection with the number of added and replaced records.
pub fn merge_prompts(existing: Vec<Prompt>, imported: Vec<Prompt>) -> (Vec<Prompt>, usize, usize) {
    let mut merged = existing;
    let (mut added, mut replaced) = (0, 0);

    for prompt in imported {
        match merged.iter().position(|p| p.id == prompt.id) {
            Some(index) => {
                merged[index] = prompt;
                replaced += 1;
            }
            None => {
                merged.push(prompt);
                added += 1;
            }
        }
    }

    (merged, added, replaced)
}

impl<S: KeyValueStore> PromptStore<S> {
    /// Imports the contents of an exported document.
    pub fn import_json(&mut self, contents: &str) -> Result<Imported, ImportError> {
        let (imported, skipped) = parse_import(contents)?;
        let (prompts, added, replaced) = merge_prompts(self.load(), imported);

        self.save(&prompts)?;
        tracing::info!(added, replaced, skipped, "imported prompts");

        Ok(Imported {
            prompts,
            added,
            replaced,
            skipped,
        })
    }

    /// Checks and reads `file`, then imports its contents.
    pub async fn import_file<F: FileLike>(&mut self, file: Option<&F>) -> Result<Imported, ImportError> {
        let file = file.ok_or(ImportError::NotAFile)?;
        if !file.is_file() {
            return Err(ImportError::NotAFile);
        }
        if !is_json_media_type(file.media_type()) {
            return Err(ImportError::WrongMimeOrFormat(file.media_type().to_string()));
        }

        let contents = file.read_as_text().await.map_err(ImportError::ReadError)?;
        self.import_json(&contents)
    }
}
