use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::ChatResult;

/// Root of the local key-value stores
pub struct Storage {
    pub data_dir: PathBuf,
}

impl Storage {
    pub fn new(data_dir: &Path) -> ChatResult<Self> {
        // Create data directory if it doesn't exist
        if !data_dir.exists() {
            fs::create_dir_all(data_dir)?;
        }

        Ok(Self {
            data_dir: data_dir.to_path_buf(),
        })
    }

    /// Open a named store, e.g. `app_prefs` or `chats`
    pub fn store(&self, name: &str) -> PreferenceStore {
        PreferenceStore {
            path: self.data_dir.join(format!("{}.json", name)),
        }
    }

    /// Clear all stored data
    pub fn clear_all(&self) -> ChatResult<()> {
        if self.data_dir.exists() {
            fs::remove_dir_all(&self.data_dir)?;
            fs::create_dir_all(&self.data_dir)?;
        }
        Ok(())
    }
}

/// A string-keyed store of string values, kept as one JSON object per file.
///
/// Reads and writes happen synchronously on the calling thread; concurrent
/// writers overwrite each other.
#[derive(Debug, Clone)]
pub struct PreferenceStore {
    path: PathBuf,
}

impl PreferenceStore {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get_string(&self, key: &str) -> ChatResult<Option<String>> {
        Ok(self.read_all()?.remove(key))
    }

    pub fn put_string(&self, key: &str, value: &str) -> ChatResult<()> {
        let mut entries = self.read_all()?;
        entries.insert(key.to_string(), value.to_string());
        self.write_all(&entries)
    }

    fn read_all(&self) -> ChatResult<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        Ok(serde_json::from_str(&content)?)
    }

    fn write_all(&self, entries: &BTreeMap<String, String>) -> ChatResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(entries)?;
        fs::write(&self.path, json)?;
        debug!("Wrote {} key(s) to {:?}", entries.len(), self.path);
        Ok(())
    }
}
