//! Key-value persistence for editor state.

use parking_lot::RwLock;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::config::DEFAULT_STATE_FILE;
use crate::error::{ConsoleError, Result};

/// Storage backend for persisted editor values.
pub trait StateStore: Send + Sync {
    /// Read the raw value stored under `key`.
    fn get(&self, key: &str) -> Option<Value>;

    /// Store `value` under `key`.
    fn set(&self, key: &str, value: Value) -> Result<()>;

    /// Remove `key`, if present.
    fn remove(&self, key: &str) -> Result<()>;
}

/// In-memory store; nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryStateStore {
    values: RwLock<HashMap<String, Value>>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateStore for MemoryStateStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.values.read().get(key).cloned()
    }

    fn set(&self, key: &str, value: Value) -> Result<()> {
        self.values.write().insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.values.write().remove(key);
        Ok(())
    }
}

/// Store backed by a JSON object in a file, rewritten on every change.
#[derive(Debug)]
pub struct FileStateStore {
    path: PathBuf,
    values: RwLock<Map<String, Value>>,
}

impl FileStateStore {
    /// Open the store at `path`, reading existing values if the file exists.
    ///
    /// A file that is not a JSON object is treated as empty and replaced on
    /// the next write.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let values = if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            match serde_json::from_str::<Value>(&contents) {
                Ok(Value::Object(map)) => map,
                Ok(_) | Err(_) => {
                    tracing::warn!(
                        "Ignoring unreadable editor state file {:?}; starting empty",
                        path
                    );
                    Map::new()
                }
            }
        } else {
            Map::new()
        };

        Ok(Self {
            path,
            values: RwLock::new(values),
        })
    }

    /// Default location: `<config dir>/jsql-console/editor-state.json`.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("jsql-console")
            .join(DEFAULT_STATE_FILE)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, values: &Map<String, Value>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let contents = serde_json::to_string_pretty(values)?;
        std::fs::write(&self.path, contents).map_err(|e| {
            ConsoleError::Internal(format!(
                "Failed to write editor state {:?}: {}",
                self.path, e
            ))
        })
    }
}

impl StateStore for FileStateStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.values.read().get(key).cloned()
    }

    fn set(&self, key: &str, value: Value) -> Result<()> {
        let mut values = self.values.write();
        let mut next = (*values).clone();
        next.insert(key.to_string(), value);
        self.persist(&next)?;
        *values = next;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut values = self.values.write();
        if !values.contains_key(key) {
            return Ok(());
        }
        let mut next = (*values).clone();
        next.remove(key);
        self.persist(&next)?;
        *values = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemoryStateStore::new();
        assert!(store.get("k").is_none());
        store.set("k", json!("v")).unwrap();
        assert_eq!(store.get("k"), Some(json!("v")));
        store.remove("k").unwrap();
        assert!(store.get("k").is_none());
    }

    #[test]
    fn test_file_store_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("state.json");

        let store = FileStateStore::open(&path).unwrap();
        store.set("uma-dialect", json!("mysql")).unwrap();
        drop(store);

        let reopened = FileStateStore::open(&path).unwrap();
        assert_eq!(reopened.get("uma-dialect"), Some(json!("mysql")));
        assert_eq!(reopened.path(), path.as_path());
    }

    #[test]
    fn test_file_store_remove() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        let store = FileStateStore::open(&path).unwrap();
        store.set("a", json!(1)).unwrap();
        store.remove("a").unwrap();

        let reopened = FileStateStore::open(&path).unwrap();
        assert!(reopened.get("a").is_none());
    }

    #[test]
    fn test_file_store_ignores_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, "[not an object").unwrap();

        let store = FileStateStore::open(&path).unwrap();
        assert!(store.get("anything").is_none());
        store.set("a", json!(true)).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("\"a\": true"));
    }

    #[test]
    fn test_failed_write_keeps_previous_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, r#"{"a": 1}"#).unwrap();
        let store = FileStateStore::open(&path).unwrap();

        // A directory in the file's place makes every write fail.
        std::fs::remove_file(&path).unwrap();
        std::fs::create_dir(&path).unwrap();

        assert!(store.set("b", json!(2)).is_err());
        assert!(store.get("b").is_none());
        assert!(store.set("a", json!(3)).is_err());
        assert_eq!(store.get("a"), Some(json!(1)));
        assert!(store.remove("a").is_err());
        assert_eq!(store.get("a"), Some(json!(1)));
    }

    #[test]
    fn test_default_path_file_name() {
        let path = FileStateStore::default_path();
        assert!(path.ends_with("jsql-console/editor-state.json"));
    }
}
