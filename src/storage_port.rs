//! Key-value storage port used by the quiz and attempt stores.
//!
//! Stores only ever read, write and remove whole serialized collections under
//! fixed keys, so the port is three calls wide. [`AppDbState`](crate::local_db_state::AppDbState)
//! implements it on top of LMDB; [`MemoryStore`] keeps everything in a map and
//! is what the unit tests inject.

use std::cell::RefCell;
use std::collections::HashMap;

use log::warn;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::app_response::AppResponse;

pub trait KeyValueStore {
    /// Returns the raw value stored under `key`, or `None` when the key is unset.
    fn get(&self, key: &str) -> Result<Option<String>, AppResponse>;

    fn set(&self, key: &str, value: &str) -> Result<(), AppResponse>;

    /// Removes `key`. Removing a key that is not set is not an error.
    fn remove(&self, key: &str) -> Result<(), AppResponse>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for &T {
    fn get(&self, key: &str) -> Result<Option<String>, AppResponse> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), AppResponse> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), AppResponse> {
        (**self).remove(key)
    }
}

/// In-process store. Optionally refuses writes once a byte quota is reached,
/// mirroring the "quota exceeded" failure of browser storage.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<HashMap<String, String>>,
    quota_bytes: Option<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            entries: RefCell::new(HashMap::new()),
            quota_bytes: Some(quota_bytes),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    fn used_bytes_without(&self, key: &str) -> usize {
        self.entries
            .borrow()
            .iter()
            .filter(|(k, _)| k.as_str() != key)
            .map(|(k, v)| k.len() + v.len())
            .sum()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, AppResponse> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), AppResponse> {
        if let Some(quota) = self.quota_bytes {
            let needed = self.used_bytes_without(key) + key.len() + value.len();
            if needed > quota {
                return Err(AppResponse::StorageError(format!(
                    "Quota of {quota} bytes exceeded writing '{key}' ({needed} bytes needed)"
                )));
            }
        }

        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), AppResponse> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

/// Reads the JSON array stored under `key`, one record at a time.
///
/// A missing key, a failed read or a payload that is not a JSON array yields an
/// empty collection. Inside an array, records that do not deserialize are
/// skipped with a warning and the rest are kept, so the next write-back does
/// not lose them.
pub fn read_collection<S, T>(store: &S, key: &str) -> Vec<T>
where
    S: KeyValueStore + ?Sized,
    T: DeserializeOwned,
{
    let raw = match store.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Vec::new(),
        Err(e) => {
            warn!("Failed to read {key} from storage: {e}");
            return Vec::new();
        }
    };

    let records: Vec<Value> = match serde_json::from_str(&raw) {
        Ok(records) => records,
        Err(e) => {
            warn!("Failed to parse {key} from storage: {e}");
            return Vec::new();
        }
    };

    records
        .into_iter()
        .enumerate()
        .filter_map(|(idx, record)| match serde_json::from_value(record) {
            Ok(item) => Some(item),
            Err(e) => {
                warn!("Skipping unreadable record #{idx} in {key}: {e}");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_round_trips_values() {
        let store = MemoryStore::new();
        assert_eq!(store.get("k").unwrap(), None);

        store.set("k", "v").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));

        store.remove("k").unwrap();
        store.remove("k").unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn quota_rejects_oversized_writes() {
        let store = MemoryStore::with_quota(8);
        store.set("k", "1234").unwrap();

        let err = store.set("other", "123456").unwrap_err();
        assert!(matches!(err, AppResponse::StorageError(_)));

        // Overwriting the same key only counts the new value.
        store.set("k", "1234567").unwrap();
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn read_collection_skips_only_unreadable_records() {
        let store = MemoryStore::new();
        assert!(read_collection::<_, u32>(&store, "nums").is_empty());

        store.set("nums", r#"[1, "two", 3, null]"#).unwrap();
        assert_eq!(read_collection::<_, u32>(&store, "nums"), vec![1, 3]);

        for payload in ["{not json", r#"{"0":1}"#, "42"] {
            store.set("nums", payload).unwrap();
            assert!(read_collection::<_, u32>(&store, "nums").is_empty());
        }
    }
}
