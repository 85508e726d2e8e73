// The durable store of the collections.

use std::collections::HashMap;
use std::io::ErrorKind;

use serde::de::DeserializeOwned;

use crate::dashboard::*;

/// A string-keyed store of string values.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> DashboardResult<Option<String>>;
    fn set(&mut self, key: &str, value: String) -> DashboardResult<()>;
    /// Removing an absent key is not an error.
    fn remove(&mut self, key: &str) -> DashboardResult<()>;
}

/// Keeps everything in memory. Used by the tests and for dry runs.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> MemoryStore {
        MemoryStore::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> DashboardResult<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> DashboardResult<()> {
        self.values.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> DashboardResult<()> {
        self.values.remove(key);
        Ok(())
    }
}

/// One `<key>.json` file per key, in a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Opens the store, creating the directory if needed.
    pub fn open<P: Into<PathBuf>>(root: P) -> DashboardResult<FileStore> {
        let root: PathBuf = root.into();
        fs::create_dir_all(&root).context(OpeningFileSnafu {
            path: root.display().to_string(),
        })?;
        Ok(FileStore { root })
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.json", key))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> DashboardResult<Option<String>> {
        match fs::read_to_string(self.key_path(key)) {
            Ok(s) => Ok(Some(s)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).context(StoreReadSnafu { key }),
        }
    }

    fn set(&mut self, key: &str, value: String) -> DashboardResult<()> {
        // Readers never see a half-written value.
        let tmp = self.root.join(format!("{}.json.tmp", key));
        fs::write(&tmp, value).context(StoreWriteSnafu { key })?;
        fs::rename(&tmp, self.key_path(key)).context(StoreWriteSnafu { key })?;
        debug!("FileStore::set: wrote {:?}", self.key_path(key));
        Ok(())
    }

    fn remove(&mut self, key: &str) -> DashboardResult<()> {
        match fs::remove_file(self.key_path(key)) {
            Err(e) if e.kind() != ErrorKind::NotFound => Err(e).context(StoreRemoveSnafu { key }),
            _ => Ok(()),
        }
    }
}

/// Reads a collection. An absent or malformed value reads as an empty collection.
pub fn load_collection<T: DeserializeOwned>(
    store: &impl KeyValueStore,
    key: &str,
) -> DashboardResult<Vec<T>> {
    match store.get(key)? {
        None => Ok(Vec::new()),
        Some(s) => match serde_json::from_str::<Vec<T>>(&s) {
            Ok(v) => Ok(v),
            Err(e) => {
                warn!("Stored collection {} could not be read, using an empty one: {}", key, e);
                Ok(Vec::new())
            }
        },
    }
}

pub fn save_collection<T: Serialize>(
    store: &mut impl KeyValueStore,
    key: &str,
    records: &[T],
) -> DashboardResult<()> {
    let js = serde_json::to_string(records).context(SerializingCollectionSnafu { key })?;
    store.set(key, js)
}

pub fn load_collections(store: &impl KeyValueStore) -> DashboardResult<Collections> {
    Ok(Collections {
        technical: load_collection(store, CollectionKind::Technical.store_key())?,
        clinic: load_collection(store, CollectionKind::Clinic.store_key())?,
        growth: load_collection(store, CollectionKind::Growth.store_key())?,
    })
}

/// Set once the collections have been written or cleared. A store without it has never
/// been used, and only such a store gets the default dataset.
pub const INITIALIZED_KEY: &str = "initialized";

pub fn is_initialized(store: &impl KeyValueStore) -> DashboardResult<bool> {
    Ok(store.get(INITIALIZED_KEY)?.is_some())
}

fn mark_initialized(store: &mut impl KeyValueStore) -> DashboardResult<()> {
    store.set(INITIALIZED_KEY, "true".to_string())
}

pub fn save_collections(store: &mut impl KeyValueStore, c: &Collections) -> DashboardResult<()> {
    save_collection(store, CollectionKind::Technical.store_key(), &c.technical)?;
    save_collection(store, CollectionKind::Clinic.store_key(), &c.clinic)?;
    save_collection(store, CollectionKind::Growth.store_key(), &c.growth)?;
    mark_initialized(store)
}

/// Removes the three collections. The store stays initialized.
pub fn clear_collections(store: &mut impl KeyValueStore) -> DashboardResult<()> {
    for kind in CollectionKind::ALL {
        store.remove(kind.store_key())?;
    }
    mark_initialized(store)
}
