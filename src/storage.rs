//! Tolerant JSON layer over a [`KvStore`].
//!
//! Nothing here returns an error. Reads fall back to the caller's default and
//! delete entries that no longer parse; writes report failure as `false`.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::keys::{Namespace, StorageKey};
use crate::model::BookId;
use crate::store::KvStore;

#[derive(Debug, Clone)]
pub struct Storage<S> {
    store: S,
    key_prefix: Option<String>,
}

impl<S: KvStore> Storage<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            key_prefix: None,
        }
    }

    pub fn with_key_prefix(mut self, prefix: Option<String>) -> Self {
        self.key_prefix = prefix.filter(|p| !p.is_empty());
        self
    }

    pub fn book_key(&self, namespace: Namespace, book_id: &BookId) -> StorageKey {
        StorageKey::book(namespace, book_id).with_prefix(self.key_prefix.as_deref())
    }

    pub fn global_key(&self, namespace: Namespace) -> StorageKey {
        StorageKey::global(namespace).with_prefix(self.key_prefix.as_deref())
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Reads `key`, returning `default` when the entry is missing, unparseable
    /// or falsy (`null`, `false`, `0`, `""`).
    ///
    /// A stored `0` or `false` cannot be told apart from a missing entry here;
    /// use [`Storage::read_present`] when that matters.
    pub fn read<T: DeserializeOwned>(&mut self, key: &StorageKey, default: T) -> T {
        match self.read_raw(key) {
            Some((raw, value)) if !is_falsy(&value) => self.decode(key, &raw).unwrap_or(default),
            _ => default,
        }
    }

    /// Reads `key` without the falsy rule: any stored value that decodes is
    /// returned, including `0`, `false` and `null` for `Option` targets.
    pub fn read_present<T: DeserializeOwned>(&mut self, key: &StorageKey) -> Option<T> {
        let (raw, _) = self.read_raw(key)?;
        self.decode(key, &raw)
    }

    pub fn write<T: Serialize + ?Sized>(&mut self, key: &StorageKey, value: &T) -> bool {
        let key_str = key.to_string();
        let encoded = match serde_json::to_string(value) {
            Ok(encoded) => encoded,
            Err(err) => {
                tracing::warn!(key = %key_str, error = %err, "serialize storage entry");
                return false;
            }
        };

        match self.store.set_item(&key_str, &encoded) {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(key = %key_str, error = %err, "write storage entry");
                false
            }
        }
    }

    /// Removes every key it can; a failure on one key is logged and the rest
    /// are still attempted.
    pub fn clear_keys<'a>(&mut self, keys: impl IntoIterator<Item = &'a StorageKey>) {
        for key in keys {
            let key_str = key.to_string();
            if let Err(err) = self.store.remove_item(&key_str) {
                tracing::warn!(key = %key_str, error = %err, "clear storage entry");
            }
        }
    }

    /// Wipes the whole store. Returns `false` if the backing store refused.
    pub fn reset(&mut self) -> bool {
        match self.store.clear() {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(error = %err, "reset storage");
                false
            }
        }
    }

    fn read_raw(&mut self, key: &StorageKey) -> Option<(String, Value)> {
        let key_str = key.to_string();
        let raw = self.store.get_item(&key_str)?;
        match serde_json::from_str::<Value>(&raw) {
            Ok(value) => Some((raw, value)),
            Err(err) => {
                tracing::warn!(key = %key_str, error = %err, "discarding corrupted storage entry");
                self.remove_corrupted(&key_str);
                None
            }
        }
    }

    fn decode<T: DeserializeOwned>(&mut self, key: &StorageKey, raw: &str) -> Option<T> {
        match serde_json::from_str(raw) {
            Ok(decoded) => Some(decoded),
            Err(err) => {
                let key_str = key.to_string();
                tracing::warn!(key = %key_str, error = %err, "discarding storage entry with unexpected shape");
                self.remove_corrupted(&key_str);
                None
            }
        }
    }

    fn remove_corrupted(&mut self, key: &str) {
        if let Err(err) = self.store.remove_item(key) {
            tracing::warn!(key = %key, error = %err, "remove corrupted storage entry");
        }
    }
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f == 0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}
