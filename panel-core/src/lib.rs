//! # panel Core
//!
//! This crate provides the core functionality for the prompt panel.
//!
//! The prompt panel is a personal prompt manager: it keeps an ordered collection of
//! titled, tagged text snippets in local storage, and lets you edit, search, reorder,
//! export and import them.
//!
//! # Modules
//!
//! - [`prompt`] - The prompt record, tag normalization and search
//! - [`parser`] - Parsing of comma-separated tag input
//! - [`storage`] - Key-value persistence trait and an in-memory backend
//! - [`file_storage`] - File-based key-value backend
//! - [`store`] - The prompt store: CRUD, reorder and export over the collection
//! - [`import`] - Merging exported documents back into the collection
//! - [`export`] - Export documents
//!
//! # Examples
//!
//! ```rust
//! use panel_core::file_storage::FileStorage;
//! use panel_core::prompt::Prompt;
//! use panel_core::store::PromptStore;
//! use tempfile::TempDir;
//!
//! // Create a temporary directory for our tests
//! let temp_dir = TempDir::new().unwrap();
//!
//! let mut store = PromptStore::new(FileStorage::new(temp_dir.path()));
//!
//! // Create a prompt
//! let prompt = Prompt::new("Greeting".to_string(), "Hello, world!".to_string(), vec!["#example".to_string()]);
//! let prompts = store.create(prompt).expect("Failed to save prompt");
//!
//! assert_eq!(vec!["example"], prompts[0].tags);
//! assert_eq!(prompts, store.load());
//! ```

pub mod export;
pub mod file_storage;
pub mod import;
pub mod parser;
pub mod prompt;
pub mod storage;
pub mod store;
