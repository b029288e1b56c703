//! Backing string stores.
//!
//! A [`KvStore`] is a flat, per-origin namespace of string keys to string
//! values. [`MemoryStore`] is the in-process fake used by tests and
//! [`LocalFsStore`] keeps the whole namespace in a single JSON file.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::StoreError;

/// Default byte quota, matching what browsers grant a local store per origin.
pub const DEFAULT_QUOTA_BYTES: usize = 5 * 1024 * 1024;

pub trait KvStore {
    fn get_item(&self, key: &str) -> Option<String>;
    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove_item(&mut self, key: &str) -> Result<(), StoreError>;
    fn keys(&self) -> Vec<String>;
    fn clear(&mut self) -> Result<(), StoreError>;
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
    quota_bytes: Option<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            entries: BTreeMap::new(),
            quota_bytes: Some(quota_bytes),
        }
    }
}

impl KvStore for MemoryStore {
    fn get_item(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        check_quota(&self.entries, self.quota_bytes, key, value)?;
        self.entries.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> Result<(), StoreError> {
        self.entries.remove(key);
        Ok(())
    }

    fn keys(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    fn clear(&mut self) -> Result<(), StoreError> {
        self.entries.clear();
        Ok(())
    }
}

/// Whole-namespace store persisted as one JSON object at `path`.
///
/// Every mutation rewrites the file through a temporary sibling and a rename,
/// so a crash leaves either the old or the new namespace on disk.
#[derive(Debug, Clone)]
pub struct LocalFsStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
    quota_bytes: Option<usize>,
}

impl LocalFsStore {
    /// Opens the store at `<data_dir>/store.json`, creating nothing until the
    /// first write.
    pub fn open(data_dir: impl AsRef<Path>, quota_bytes: Option<usize>) -> Result<Self, StoreError> {
        let path = data_dir.as_ref().join("store.json");
        let entries = load_entries(&path)?;
        Ok(Self {
            path,
            entries,
            quota_bytes,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<(), StoreError> {
        let parent = self.path.parent().unwrap_or_else(|| Path::new("."));
        std::fs::create_dir_all(parent)?;

        let tmp_path = self
            .path
            .with_extension(format!("tmp.{}", uuid::Uuid::new_v4().simple()));
        let data = serde_json::to_vec_pretty(&self.entries)?;
        std::fs::write(&tmp_path, &data)?;
        if let Err(err) = std::fs::rename(&tmp_path, &self.path) {
            let _ = std::fs::remove_file(&tmp_path);
            return Err(err.into());
        }
        Ok(())
    }
}

impl KvStore for LocalFsStore {
    fn get_item(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        check_quota(&self.entries, self.quota_bytes, key, value)?;
        let previous = self.entries.insert(key.to_owned(), value.to_owned());
        if let Err(err) = self.flush() {
            match previous {
                Some(previous) => self.entries.insert(key.to_owned(), previous),
                None => self.entries.remove(key),
            };
            return Err(err);
        }
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> Result<(), StoreError> {
        let Some(previous) = self.entries.remove(key) else {
            return Ok(());
        };
        if let Err(err) = self.flush() {
            self.entries.insert(key.to_owned(), previous);
            return Err(err);
        }
        Ok(())
    }

    fn keys(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    fn clear(&mut self) -> Result<(), StoreError> {
        let previous = std::mem::take(&mut self.entries);
        if let Err(err) = self.flush() {
            self.entries = previous;
            return Err(err);
        }
        Ok(())
    }
}

fn load_entries(path: &Path) -> Result<BTreeMap<String, String>, StoreError> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
        Err(err) => return Err(err.into()),
    };

    match serde_json::from_slice(&bytes) {
        Ok(entries) => Ok(entries),
        Err(err) => {
            let backup = path.with_extension("json.corrupt");
            tracing::warn!(
                path = %path.display(),
                backup = %backup.display(),
                error = %err,
                "store file is corrupted; moving it aside and starting empty"
            );
            std::fs::rename(path, &backup)?;
            Ok(BTreeMap::new())
        }
    }
}

fn check_quota(
    entries: &BTreeMap<String, String>,
    quota_bytes: Option<usize>,
    key: &str,
    value: &str,
) -> Result<(), StoreError> {
    let Some(limit) = quota_bytes else {
        return Ok(());
    };

    let others: usize = entries
        .iter()
        .filter(|(k, _)| k.as_str() != key)
        .map(|(k, v)| k.len() + v.len())
        .sum();
    let needed = others + key.len() + value.len();
    if needed > limit {
        return Err(StoreError::QuotaExceeded {
            key: key.to_owned(),
            needed,
            limit,
        });
    }
    Ok(())
}
