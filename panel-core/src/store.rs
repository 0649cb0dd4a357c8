//! # Prompt Store
//!
//! CRUD, ordering and export over the prompt collection.
//!
//! The whole collection is persisted as one JSON array under a single key of a
//! [`KeyValueStore`]. [`PromptStore`] keeps no copy of it between calls: every
//! operation loads the collection, applies its change and writes everything back,
//! then hands the fresh collection to the caller so it can redraw without another load.

use crate::export::Export;
use crate::prompt::{filter_prompts, Prompt};
use crate::storage::{KeyValueStore, StorageError};
use std::collections::HashSet;
use thiserror::Error;

/// The key the collection is stored under.
pub const STORAGE_KEY: &str = "prompt_panel_data";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to serialize prompts: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Could not save prompts, storage may be full or inaccessible: {0}")]
    Storage(#[from] StorageError),

    #[error("A prompt with id '{0}' already exists")]
    DuplicateId(String),
}

pub struct PromptStore<S: KeyValueStore> {
    backend: S,
    key: String,
}

impl<S: KeyValueStore> PromptStore<S> {
    pub fn new(backend: S) -> Self {
        Self::with_key(backend, STORAGE_KEY)
    }

    pub fn with_key(backend: S, key: impl Into<String>) -> Self {
        Self {
            backend,
            key: key.into(),
        }
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    pub fn into_backend(self) -> S {
        self.backend
    }

    /// Loads the persisted collection.
    ///
    /// Never fails: a missing key gives an empty collection, and so does a value
    /// that is not a JSON array of prompts, in which case the value is also removed
    /// so later loads start clean. Tags are normalized on the way in and records
    /// repeating an earlier id are dropped.
    pub fn load(&mut self) -> Vec<Prompt> {
        let data = match self.backend.get(&self.key) {
            Ok(Some(data)) => data,
            Ok(None) => return Vec::new(),
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "failed to read prompts");
                return Vec::new();
            }
        };

        match serde_json::from_str::<Vec<Prompt>>(&data) {
            Ok(prompts) => dedup_by_id(prompts),
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "discarding corrupted prompt data");
                if let Err(e) = self.backend.remove(&self.key) {
                    tracing::warn!(key = %self.key, error = %e, "failed to clear corrupted prompt data");
                }
                Vec::new()
            }
        }
    }

    /// Overwrites the persisted collection with `prompts`.
    ///
    /// On failure the previously stored collection is left untouched.
    pub fn save(&mut self, prompts: &[Prompt]) -> Result<(), StoreError> {
        let data = serde_json::to_string(prompts)?;
        self.backend.set(&self.key, &data)?;
        tracing::debug!(key = %self.key, count = prompts.len(), "saved prompts");
        Ok(())
    }

    /// Appends a new prompt.
    ///
    /// The caller builds the full record, usually with [`Prompt::new`] so it gets a
    /// fresh id. A record reusing an id already in the collection is rejected.
    pub fn create(&mut self, prompt: Prompt) -> Result<Vec<Prompt>, StoreError> {
        let mut prompts = self.load();
        if prompts.iter().any(|p| p.id == prompt.id) {
            return Err(StoreError::DuplicateId(prompt.id));
        }

        prompts.push(prompt.normalized());
        self.save(&prompts)?;
        Ok(prompts)
    }

    /// Replaces the prompt with the same id, keeping its position.
    ///
    /// If no prompt has that id the collection is returned unchanged and nothing is written.
    pub fn update(&mut self, prompt: Prompt) -> Result<Vec<Prompt>, StoreError> {
        let mut prompts = self.load();
        let Some(index) = prompts.iter().position(|p| p.id == prompt.id) else {
            tracing::debug!(id = %prompt.id, "update of unknown prompt ignored");
            return Ok(prompts);
        };

        prompts[index] = prompt.normalized();
        self.save(&prompts)?;
        Ok(prompts)
    }

    /// Removes the prompt with the given id, if there is one.
    pub fn delete(&mut self, id: &str) -> Result<Vec<Prompt>, StoreError> {
        let mut prompts = self.load();
        let before = prompts.len();
        prompts.retain(|p| p.id != id);
        if prompts.len() == before {
            tracing::debug!(id, "delete of unknown prompt ignored");
            return Ok(prompts);
        }

        self.save(&prompts)?;
        Ok(prompts)
    }

    /// Rebuilds the collection in the order of `ordered_ids`.
    ///
    /// Only prompts whose id is listed are kept: unknown ids are skipped and prompts
    /// missing from the list are dropped, so callers pass the complete id list.
    /// A repeated id only counts the first time.
    pub fn reorder<I: AsRef<str>>(&mut self, ordered_ids: &[I]) -> Result<Vec<Prompt>, StoreError> {
        let prompts = self.load();
        let mut seen = HashSet::new();

        let reordered: Vec<Prompt> = ordered_ids
            .iter()
            .map(|id| id.as_ref())
            .filter(|id| seen.insert(*id))
            .filter_map(|id| prompts.iter().find(|p| p.id == id).cloned())
            .collect();

        if reordered.len() < prompts.len() {
            tracing::debug!(
                dropped = prompts.len() - reordered.len(),
                "reorder dropped prompts missing from the id list"
            );
        }

        self.save(&reordered)?;
        Ok(reordered)
    }

    /// Moves one prompt to `position`, shifting the others; positions past the end
    /// move it last. Unknown ids leave the collection unchanged.
    pub fn move_prompt(&mut self, id: &str, position: usize) -> Result<Vec<Prompt>, StoreError> {
        let prompts = self.load();
        let mut ids: Vec<&str> = prompts.iter().map(|p| p.id.as_str()).collect();
        let Some(index) = ids.iter().position(|current| *current == id) else {
            return Ok(prompts);
        };

        let moved = ids.remove(index);
        ids.insert(position.min(ids.len()), moved);

        let ids: Vec<String> = ids.into_iter().map(String::from).collect();
        self.reorder(&ids)
    }

    pub fn get(&mut self, id: &str) -> Option<Prompt> {
        self.load().into_iter().find(|p| p.id == id)
    }

    /// Returns the prompts matching `term` in collection order.
    pub fn search(&mut self, term: &str) -> Vec<Prompt> {
        let prompts = self.load();
        filter_prompts(&prompts, term).into_iter().cloned().collect()
    }

    /// Serializes the persisted collection for download.
    ///
    /// Returns `Ok(None)` when there is nothing to export.
    pub fn export(&mut self) -> Result<Option<Export>, StoreError> {
        let prompts = self.load();
        if prompts.is_empty() {
            return Ok(None);
        }

        Ok(Some(Export::new(&prompts)?))
    }
}

/// Keeps the first prompt for every id.
pub(crate) fn dedup_by_id(prompts: Vec<Prompt>) -> Vec<Prompt> {
    let mut seen = HashSet::new();
    prompts
        .into_iter()
        .filter(|p| {
            let first = seen.insert(p.id.clone());
            if !first {
                tracing::warn!(id = %p.id, "dropping prompt with duplicate id");
            }
            first
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file_storage::FileStorage;
    use crate::storage::MemoryStorage;
    use tempfile::TempDir;

    fn prompt(id: &str, title: &str) -> Prompt {
        Prompt::with_id(
            id.to_string(),
            title.to_string(),
            format!("content of {}", title),
            vec![],
        )
    }

    fn ids(prompts: &[Prompt]) -> Vec<&str> {
        prompts.iter().map(|p| p.id.as_str()).collect()
    }

    fn store_with(prompts: &[Prompt]) -> PromptStore<MemoryStorage> {
        let mut store = PromptStore::new(MemoryStorage::new());
        store.save(prompts).expect("Failed to save prompts");
        store
    }

    #[test]
    fn test_load_empty_storage() {
        let mut store = PromptStore::new(MemoryStorage::new());
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_save_then_load() {
        let prompts = vec![prompt("1", "one"), prompt("2", "two")];
        let mut store = store_with(&prompts);

        assert_eq!(prompts, store.load());
    }

    #[test]
    fn test_load_normalizes_tags() {
        let mut backend = MemoryStorage::new();
        backend
            .set(
                STORAGE_KEY,
                r##"[{"id":"1","title":"t","content":"c","tags":"a, #b ,c"},
                    {"id":"2","title":"t","content":"c","tags":["  x", "#y", ""]},
                    {"id":"3","title":"t","content":"c"}]"##,
            )
            .unwrap();
        let mut store = PromptStore::new(backend);

        let prompts = store.load();
        assert_eq!(vec!["a", "b", "c"], prompts[0].tags);
        assert_eq!(vec!["x", "y"], prompts[1].tags);
        assert!(prompts[2].tags.is_empty());
    }

    #[test]
    fn test_load_keeps_prompts_with_odd_tags() {
        let mut backend = MemoryStorage::new();
        backend
            .set(
                STORAGE_KEY,
                r#"[{"id":"1","title":"keep","content":"c","tags":["a"]},
                    {"id":"2","title":"number","content":"c","tags":5},
                    {"id":"3","title":"object","content":"c","tags":{}},
                    {"id":"4","title":"mixed","content":"c","tags":[1,"x",null]}]"#,
            )
            .unwrap();
        let mut store = PromptStore::new(backend);

        let prompts = store.load();
        assert_eq!(vec!["1", "2", "3", "4"], ids(&prompts));
        assert_eq!(vec!["a"], prompts[0].tags);
        assert!(prompts[1].tags.is_empty());
        assert!(prompts[2].tags.is_empty());
        assert_eq!(vec!["x"], prompts[3].tags);
        // Nothing was cleared
        assert!(store.backend().get(STORAGE_KEY).unwrap().is_some());
    }

    #[test]
    fn test_load_corrupted_storage() {
        let mut backend = MemoryStorage::new();
        backend.set(STORAGE_KEY, "{not json").unwrap();
        let mut store = PromptStore::new(backend);

        assert!(store.load().is_empty());
        // The corrupted value is cleared
        assert_eq!(None, store.backend().get(STORAGE_KEY).unwrap());
    }

    #[test]
    fn test_load_schema_mismatch() {
        let mut backend = MemoryStorage::new();
        backend
            .set(STORAGE_KEY, r#"{"id":"1","title":"t","content":"c"}"#)
            .unwrap();
        let mut store = PromptStore::new(backend);
        assert!(store.load().is_empty());

        let mut backend = MemoryStorage::new();
        backend
            .set(STORAGE_KEY, r#"[{"id":1,"title":"t","content":"c"}]"#)
            .unwrap();
        let mut store = PromptStore::new(backend);
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_load_drops_duplicate_ids() {
        let mut backend = MemoryStorage::new();
        backend
            .set(
                STORAGE_KEY,
                r#"[{"id":"1","title":"first","content":""},
                    {"id":"1","title":"second","content":""}]"#,
            )
            .unwrap();
        let mut store = PromptStore::new(backend);

        let prompts = store.load();
        assert_eq!(1, prompts.len());
        assert_eq!("first", prompts[0].title);
    }

    #[test]
    fn test_save_failure_keeps_previous_value() {
        let mut store = PromptStore::new(MemoryStorage::with_quota(200));
        let original = vec![prompt("1", "one")];
        store.save(&original).unwrap();

        let large = vec![Prompt::with_id(
            "2".to_string(),
            "big".to_string(),
            "x".repeat(500),
            vec![],
        )];
        let result = store.save(&large);

        assert!(matches!(
            result,
            Err(StoreError::Storage(StorageError::QuotaExceeded { .. }))
        ));
        assert_eq!(original, store.load());
    }

    #[test]
    fn test_create_appends() {
        let mut store = store_with(&[prompt("1", "one")]);

        let prompts = store
            .create(Prompt::new("two".to_string(), "c".to_string(), vec!["#t".to_string()]))
            .expect("Failed to create prompt");

        assert_eq!(2, prompts.len());
        assert_eq!("two", prompts[1].title);
        assert_eq!(vec!["t"], prompts[1].tags);
        assert_eq!(prompts, store.load());
    }

    #[test]
    fn test_create_duplicate_id() {
        let mut store = store_with(&[prompt("1", "one")]);

        let result = store.create(prompt("1", "again"));
        assert!(matches!(result, Err(StoreError::DuplicateId(id)) if id == "1"));
        assert_eq!(vec![prompt("1", "one")], store.load());
    }

    #[test]
    fn test_update_preserves_position() {
        let mut store = store_with(&[prompt("1", "one"), prompt("2", "two"), prompt("3", "three")]);

        let mut edited = prompt("2", "two edited");
        edited.tags = vec![" #new ".to_string()];
        let prompts = store.update(edited).expect("Failed to update prompt");

        assert_eq!(vec!["1", "2", "3"], ids(&prompts));
        assert_eq!("two edited", prompts[1].title);
        assert_eq!(vec!["new"], prompts[1].tags);
        assert_eq!(prompts, store.load());
    }

    #[test]
    fn test_update_unknown_id_is_noop() {
        let original = vec![prompt("1", "one")];
        let mut store = store_with(&original);

        let prompts = store.update(prompt("404", "ghost")).unwrap();
        assert_eq!(original, prompts);
        assert_eq!(original, store.load());
    }

    #[test]
    fn test_delete() {
        let mut store = store_with(&[prompt("1", "one"), prompt("2", "two")]);

        let prompts = store.delete("1").expect("Failed to delete prompt");
        assert_eq!(vec!["2"], ids(&prompts));
        assert!(store.load().iter().all(|p| p.id != "1"));
    }

    #[test]
    fn test_delete_unknown_id_is_noop() {
        let original = vec![prompt("1", "one")];
        let mut store = store_with(&original);

        assert_eq!(original, store.delete("404").unwrap());
        assert_eq!(original, store.load());
    }

    #[test]
    fn test_reorder() {
        let mut store = store_with(&[prompt("1", "one"), prompt("2", "two"), prompt("3", "three")]);

        let prompts = store.reorder(&["3", "1", "2"]).expect("Failed to reorder");
        assert_eq!(vec!["3", "1", "2"], ids(&prompts));
        assert_eq!(vec!["3", "1", "2"], ids(&store.load()));
    }

    #[test]
    fn test_reorder_partial_list_drops_missing() {
        let mut store = store_with(&[prompt("1", "one"), prompt("2", "two"), prompt("3", "three")]);

        let prompts = store.reorder(&["3", "1"]).unwrap();
        assert_eq!(vec!["3", "1"], ids(&prompts));
        assert_eq!(vec!["3", "1"], ids(&store.load()));
    }

    #[test]
    fn test_reorder_skips_unknown_and_repeated_ids() {
        let mut store = store_with(&[prompt("1", "one"), prompt("2", "two")]);

        let prompts = store.reorder(&["2", "404", "2", "1"]).unwrap();
        assert_eq!(vec!["2", "1"], ids(&prompts));
    }

    #[test]
    fn test_reorder_is_idempotent() {
        let mut store = store_with(&[prompt("1", "one"), prompt("2", "two"), prompt("3", "three")]);
        let order = vec!["2".to_string(), "3".to_string(), "1".to_string()];

        let once = store.reorder(&order).unwrap();
        let twice = store.reorder(&order).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_move_prompt() {
        let mut store = store_with(&[prompt("1", "one"), prompt("2", "two"), prompt("3", "three")]);

        assert_eq!(vec!["2", "3", "1"], ids(&store.move_prompt("1", 2).unwrap()));
        assert_eq!(vec!["1", "2", "3"], ids(&store.move_prompt("1", 0).unwrap()));
        assert_eq!(vec!["2", "3", "1"], ids(&store.move_prompt("1", 99).unwrap()));
        assert_eq!(vec!["2", "3", "1"], ids(&store.move_prompt("404", 0).unwrap()));
    }

    #[test]
    fn test_get() {
        let mut store = store_with(&[prompt("1", "one"), prompt("2", "two")]);

        assert_eq!(Some(prompt("2", "two")), store.get("2"));
        assert_eq!(None, store.get("404"));
    }

    #[test]
    fn test_search() {
        let mut store = store_with(&[
            prompt("1", "Rust tips"),
            Prompt::with_id("2".to_string(), "misc".to_string(), "".to_string(), vec!["rust".to_string()]),
            prompt("3", "Poems"),
        ]);

        assert_eq!(vec!["1", "2"], ids(&store.search("RUST")));
        assert_eq!(3, store.search("").len());
        assert!(store.search("nothing here").is_empty());
    }

    #[test]
    fn test_export_empty() {
        let mut store = PromptStore::new(MemoryStorage::new());
        assert!(store.export().unwrap().is_none());
    }

    #[test]
    fn test_export_reflects_persisted_collection() {
        let mut store = store_with(&[prompt("1", "one")]);
        store.create(prompt("2", "two")).unwrap();

        let export = store.export().unwrap().expect("Expected an export");
        let exported: Vec<Prompt> = serde_json::from_str(&export.contents).unwrap();
        assert_eq!(vec!["1", "2"], ids(&exported));
    }

    #[test]
    fn test_ids_stay_unique() {
        let mut store = PromptStore::new(MemoryStorage::new());
        for i in 0..5 {
            store
                .create(Prompt::new(format!("p{}", i), "c".to_string(), vec![]))
                .unwrap();
        }
        let first = store.load()[0].clone();
        let _ = store.create(first.clone());
        store.update(first).unwrap();

        let prompts = store.load();
        let unique: HashSet<&str> = prompts.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(5, prompts.len());
        assert_eq!(5, unique.len());
    }

    #[test]
    fn test_with_file_storage() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = PromptStore::new(FileStorage::new(temp_dir.path()));

        store.create(prompt("1", "one")).unwrap();
        store.create(prompt("2", "two")).unwrap();
        store.delete("1").unwrap();

        // A second store over the same directory sees the same data
        let mut other = PromptStore::new(FileStorage::new(temp_dir.path()));
        assert_eq!(vec![prompt("2", "two")], other.load());
        assert!(temp_dir.path().join(format!("{}.json", STORAGE_KEY)).exists());
    }

    #[test]
    fn test_with_key() {
        let mut store = PromptStore::with_key(MemoryStorage::new(), "custom");
        store.create(prompt("1", "one")).unwrap();

        let backend = store.into_backend();
        assert!(backend.get("custom").unwrap().is_some());
        assert!(backend.get(STORAGE_KEY).unwrap().is_none());
    }
}
