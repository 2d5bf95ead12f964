//! File-backed todo store
//!
//! The whole collection lives in memory and is mirrored to a single JSON file.
//! Every mutation rewrites the entire file (pretty-printed array). The file is
//! loaded lazily on first access and created empty when it does not exist.
//!
//! Mutations hold the store lock across the write, so the on-disk order of
//! writes always matches the in-memory order of mutations.

use anyhow::{Context, Result};
use parking_lot::Mutex;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use super::types::{NewTodo, Page, Todo, TodoStats, UpdateTodoRequest};
use crate::metrics;

#[derive(Debug, Default)]
struct StoreState {
    todos: Vec<Todo>,
    loaded: bool,
}

/// Single source of truth for the todo collection and its JSON file
pub struct TodoStore {
    path: PathBuf,
    state: Mutex<StoreState>,
}

impl TodoStore {
    /// Create an unloaded store; the file is touched on first access
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            state: Mutex::new(StoreState::default()),
        }
    }

    /// Create a store and load (or materialise) the backing file right away
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let store = Self::new(path);
        store.ensure_loaded()?;
        tracing::info!(path = %store.path.display(), count = store.len(), "Todo store opened");
        Ok(store)
    }

    /// Flush the current collection and drop it from memory.
    ///
    /// A later call to any operation reloads from disk.
    pub fn close(&self) -> Result<()> {
        let mut state = self.state.lock();
        if state.loaded {
            self.persist(&state.todos)?;
            state.todos.clear();
            state.loaded = false;
        }
        tracing::info!(path = %self.path.display(), "Todo store closed");
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Idempotent initialisation; only the first call touches the disk
    pub fn ensure_loaded(&self) -> Result<()> {
        let mut state = self.state.lock();
        self.load_locked(&mut state)
    }

    fn load_locked(&self, state: &mut StoreState) -> Result<()> {
        if state.loaded {
            return Ok(());
        }

        let todos = match fs::read_to_string(&self.path) {
            Ok(raw) => match serde_json::from_str::<Vec<Todo>>(&raw) {
                Ok(todos) => Some(todos),
                Err(e) => {
                    tracing::warn!(
                        path = %self.path.display(),
                        error = %e,
                        "Todo file is not a valid todo array, starting empty"
                    );
                    self.quarantine_corrupt_file();
                    None
                }
            },
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Todo file is unreadable, starting empty"
                );
                None
            }
        };

        match todos {
            Some(todos) => state.todos = todos,
            None => {
                state.todos = Vec::new();
                self.persist(&state.todos)?;
            }
        }

        state.loaded = true;
        metrics::TODO_ITEMS_TOTAL.set(state.todos.len() as i64);
        Ok(())
    }

    /// Keep an unparseable file around instead of overwriting it
    fn quarantine_corrupt_file(&self) {
        let stamp = chrono::Utc::now().format("%Y%m%d%H%M%S");
        let mut target = self.path.clone().into_os_string();
        target.push(format!(".corrupt-{stamp}"));
        if let Err(e) = fs::rename(&self.path, &target) {
            tracing::warn!(error = %e, "Failed to move corrupt todo file aside");
        }
    }

    /// Rewrite the whole file: temp file in the same directory, then rename
    fn persist(&self, todos: &[Todo]) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let content =
            serde_json::to_string_pretty(todos).context("Failed to serialize todos")?;

        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let tmp = dir.join(format!(".todo-{}.tmp", Uuid::new_v4()));

        fs::write(&tmp, content).context("Failed to write todo file")?;
        if let Err(e) = fs::rename(&tmp, &self.path) {
            let _ = fs::remove_file(&tmp);
            return Err(e).context("Failed to replace todo file");
        }

        metrics::TODO_ITEMS_TOTAL.set(todos.len() as i64);
        tracing::debug!(path = %self.path.display(), count = todos.len(), "Persisted todos");
        Ok(())
    }

    /// Number of records, zero when not yet loaded
    pub fn len(&self) -> usize {
        self.state.lock().todos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy of the full collection in insertion order
    pub fn find_all(&self) -> Result<Vec<Todo>> {
        let mut state = self.state.lock();
        self.load_locked(&mut state)?;
        Ok(state.todos.clone())
    }

    pub fn find_by_id(&self, id: u64) -> Result<Option<Todo>> {
        let mut state = self.state.lock();
        self.load_locked(&mut state)?;
        Ok(state.todos.iter().find(|t| t.id == id).cloned())
    }

    /// Append a new record with id `max + 1` (or 1) and persist
    pub fn create(&self, fields: NewTodo) -> Result<Todo> {
        let mut state = self.state.lock();
        self.load_locked(&mut state)?;

        let id = next_id(&state.todos);
        let todo = Todo::new(id, fields);
        state.todos.push(todo.clone());

        if let Err(e) = self.persist(&state.todos) {
            metrics::record_store_op("create", false);
            return Err(e);
        }

        metrics::record_store_op("create", true);
        Ok(todo)
    }

    /// Merge the provided fields into the record; `None` when absent
    pub fn update(&self, id: u64, update: UpdateTodoRequest) -> Result<Option<Todo>> {
        let mut state = self.state.lock();
        self.load_locked(&mut state)?;

        let Some(todo) = state.todos.iter_mut().find(|t| t.id == id) else {
            return Ok(None);
        };
        todo.apply(update);
        let updated = todo.clone();

        if let Err(e) = self.persist(&state.todos) {
            metrics::record_store_op("update", false);
            return Err(e);
        }

        metrics::record_store_op("update", true);
        Ok(Some(updated))
    }

    /// Remove the record; `false` when absent
    pub fn delete(&self, id: u64) -> Result<bool> {
        let mut state = self.state.lock();
        self.load_locked(&mut state)?;

        let Some(index) = state.todos.iter().position(|t| t.id == id) else {
            return Ok(false);
        };
        state.todos.remove(index);

        if let Err(e) = self.persist(&state.todos) {
            metrics::record_store_op("delete", false);
            return Err(e);
        }

        metrics::record_store_op("delete", true);
        Ok(true)
    }

    /// Slice `[(page-1)*limit, (page-1)*limit + limit)`; out-of-range pages are empty
    pub fn paginate(&self, page: usize, limit: usize) -> Result<Page> {
        let mut state = self.state.lock();
        self.load_locked(&mut state)?;

        let start = page.saturating_sub(1).saturating_mul(limit);
        let data = state.todos.iter().skip(start).take(limit).cloned().collect();

        Ok(Page {
            data,
            total: state.todos.len(),
        })
    }

    pub fn stats(&self) -> Result<TodoStats> {
        let mut state = self.state.lock();
        self.load_locked(&mut state)?;

        let total = state.todos.len();
        let completed = state.todos.iter().filter(|t| t.completed).count();
        Ok(TodoStats {
            total,
            completed,
            pending: total - completed,
        })
    }
}

fn next_id(todos: &[Todo]) -> u64 {
    todos.iter().map(|t| t.id).max().map_or(1, |max| max + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn new_todo(title: &str) -> NewTodo {
        NewTodo {
            title: title.to_string(),
            body: format!("{title} body"),
            completed: false,
        }
    }

    fn open_store() -> (TodoStore, TempDir) {
        let dir = TempDir::new().expect("create temp dir");
        let store = TodoStore::open(dir.path().join("db").join("todo.json")).unwrap();
        (store, dir)
    }

    #[test]
    fn test_open_materializes_empty_file() {
        let (store, _dir) = open_store();
        let raw = fs::read_to_string(store.path()).unwrap();
        let parsed: Vec<Todo> = serde_json::from_str(&raw).unwrap();
        assert!(parsed.is_empty());
        assert!(store.is_empty());
    }

    #[test]
    fn test_ensure_loaded_is_idempotent() {
        let (store, _dir) = open_store();
        store.create(new_todo("first")).unwrap();

        // A foreign write must not be picked up once the store is loaded
        fs::write(store.path(), "[]").unwrap();
        store.ensure_loaded().unwrap();
        assert_eq!(store.find_all().unwrap().len(), 1);
    }

    #[test]
    fn test_ids_are_max_plus_one() {
        let (store, _dir) = open_store();
        let a = store.create(new_todo("aaa")).unwrap();
        let b = store.create(new_todo("bbb")).unwrap();
        let c = store.create(new_todo("ccc")).unwrap();
        assert_eq!((a.id, b.id, c.id), (1, 2, 3));

        // Deleting a middle record does not affect the next id
        assert!(store.delete(2).unwrap());
        assert_eq!(store.create(new_todo("ddd")).unwrap().id, 4);

        // Deleting the max frees its id
        assert!(store.delete(4).unwrap());
        assert_eq!(store.create(new_todo("eee")).unwrap().id, 4);
    }

    #[test]
    fn test_id_resets_when_empty() {
        let (store, _dir) = open_store();
        store.create(new_todo("aaa")).unwrap();
        store.create(new_todo("bbb")).unwrap();
        store.delete(1).unwrap();
        store.delete(2).unwrap();
        assert_eq!(store.create(new_todo("ccc")).unwrap().id, 1);
    }

    #[test]
    fn test_update_and_delete_missing() {
        let (store, _dir) = open_store();
        let updated = store
            .update(
                42,
                UpdateTodoRequest {
                    completed: Some(true),
                    ..Default::default()
                },
            )
            .unwrap();
        assert!(updated.is_none());
        assert!(!store.delete(42).unwrap());
        assert!(store.find_by_id(42).unwrap().is_none());
    }

    #[test]
    fn test_partial_update_keeps_other_fields() {
        let (store, _dir) = open_store();
        let created = store.create(new_todo("Learn Rust")).unwrap();

        let updated = store
            .update(
                created.id,
                UpdateTodoRequest {
                    completed: Some(true),
                    ..Default::default()
                },
            )
            .unwrap()
            .unwrap();

        assert!(updated.completed);
        assert_eq!(updated.title, created.title);
        assert_eq!(updated.body, created.body);
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at > created.updated_at);
    }

    #[test]
    fn test_mutations_round_trip_through_disk() {
        let (store, dir) = open_store();
        store.create(new_todo("one")).unwrap();
        store.create(new_todo("two")).unwrap();
        store
            .update(
                1,
                UpdateTodoRequest {
                    title: Some("uno".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();
        store.delete(2).unwrap();
        let in_memory = store.find_all().unwrap();

        let reopened = TodoStore::open(dir.path().join("db").join("todo.json")).unwrap();
        assert_eq!(reopened.find_all().unwrap(), in_memory);
    }

    #[test]
    fn test_file_is_pretty_printed_array() {
        let (store, _dir) = open_store();
        store.create(new_todo("pretty")).unwrap();
        let raw = fs::read_to_string(store.path()).unwrap();
        assert!(raw.starts_with("[\n  {"));
        assert!(raw.contains("\"createdAt\""));
    }

    #[test]
    fn test_paginate_slices() {
        let (store, _dir) = open_store();
        for i in 0..25 {
            store.create(new_todo(&format!("todo {i}"))).unwrap();
        }

        let first = store.paginate(1, 10).unwrap();
        assert_eq!(first.data.len(), 10);
        assert_eq!(first.data[0].id, 1);
        assert_eq!(first.total, 25);

        let last = store.paginate(3, 10).unwrap();
        assert_eq!(last.data.len(), 5);
        assert_eq!(last.data[0].id, 21);

        let beyond = store.paginate(4, 10).unwrap();
        assert!(beyond.data.is_empty());
        assert_eq!(beyond.total, 25);
    }

    #[test]
    fn test_stats_counts() {
        let (store, _dir) = open_store();
        for title in ["aaa", "bbb", "ccc"] {
            store.create(new_todo(title)).unwrap();
        }
        store
            .update(
                2,
                UpdateTodoRequest {
                    completed: Some(true),
                    ..Default::default()
                },
            )
            .unwrap();

        let stats = store.stats().unwrap();
        assert_eq!(
            stats,
            TodoStats {
                total: 3,
                completed: 1,
                pending: 2
            }
        );
    }

    #[test]
    fn test_corrupt_file_is_moved_aside() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("todo.json");
        fs::write(&path, "{ not json").unwrap();

        let store = TodoStore::open(&path).unwrap();
        assert!(store.is_empty());
        assert_eq!(fs::read_to_string(&path).unwrap(), "[]");

        let quarantined = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .any(|e| e.file_name().to_string_lossy().contains(".corrupt-"));
        assert!(quarantined);
    }

    #[test]
    fn test_close_flushes_and_reloads_lazily() {
        let (store, _dir) = open_store();
        store.create(new_todo("kept")).unwrap();
        store.close().unwrap();
        assert!(store.is_empty());

        let all = store.find_all().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].title, "kept");
    }

    #[test]
    fn test_write_failure_propagates() {
        let dir = TempDir::new().unwrap();
        // The parent "directory" is a regular file, so every write fails
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "x").unwrap();
        let store = TodoStore::new(blocker.join("todo.json"));

        assert!(store.ensure_loaded().is_err());
        assert!(store.create(new_todo("never")).is_err());
    }
}
