use crate::error::Result;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

// Key names, shared with every persisted feature. Per-sheet keys append
// the sheet id.
pub const KEY_SHEETS: &str = "sheets";
pub const KEY_ACTIVE_SHEET: &str = "activeSheetId";
pub const KEY_SAVED_SELECTIONS: &str = "savedSelections";
pub const KEY_PDF_CONFIG: &str = "pdfConfig";
pub const KEY_TEAM_MEMBERS: &str = "teamMembers";
pub const KEY_LOGGED_IN: &str = "isLoggedIn";

pub fn hidden_columns_key(sheet_id: &str) -> String {
    format!("hiddenColumns_{}", sheet_id)
}

pub fn column_aliases_key(sheet_id: &str) -> String {
    format!("columnAliases_{}", sheet_id)
}

/// A key-value string store surviving restarts.
///
/// The engine never reaches for storage on its own: values are loaded at
/// initialization and written back by explicit save calls from the
/// surrounding application. Absence of a key means "use the default".
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

/// Read a JSON value under `key`, falling back to `T::default()` when the
/// key is absent.
pub fn load_json<T, S>(store: &S, key: &str) -> Result<T>
where
    T: DeserializeOwned + Default,
    S: KeyValueStore + ?Sized,
{
    match store.get(key) {
        Some(raw) => Ok(serde_json::from_str(&raw)?),
        None => Ok(T::default()),
    }
}

/// Write a JSON value under `key`.
pub fn save_json<T, S>(store: &S, key: &str, value: &T) -> Result<()>
where
    T: Serialize,
    S: KeyValueStore + ?Sized,
{
    store.set(key, &serde_json::to_string(value)?)
}

/// In-memory store for tests and ephemeral sessions.
#[derive(Default)]
pub struct MemoryStore {
    values: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.read().expect("store lock poisoned").get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.values
            .write()
            .expect("store lock poisoned")
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.values.write().expect("store lock poisoned").remove(key);
        Ok(())
    }
}

/// File-backed store: one JSON object on disk, rewritten on every set.
///
/// Small enough for the admin panel's key set; the write path creates the
/// parent directory on first use.
pub struct JsonFileStore {
    path: PathBuf,
    values: RwLock<HashMap<String, String>>,
}

impl JsonFileStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let values = if path.exists() {
            let raw = fs::read_to_string(&path)?;
            serde_json::from_str(&raw)?
        } else {
            HashMap::new()
        };
        Ok(JsonFileStore {
            path,
            values: RwLock::new(values),
        })
    }

    fn flush(&self, values: &HashMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, serde_json::to_string_pretty(values)?)?;
        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.read().expect("store lock poisoned").get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut values = self.values.write().expect("store lock poisoned");
        values.insert(key.to_string(), value.to_string());
        self.flush(&values)
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut values = self.values.write().expect("store lock poisoned");
        values.remove(key);
        self.flush(&values)
    }
}
