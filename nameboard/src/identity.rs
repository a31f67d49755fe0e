use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

pub const USER_ID_KEY: &str = "nameboard:user_id";
pub const USER_NAME_KEY: &str = "nameboard:user_name";

/// The locally remembered user. Either field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Identity {
    pub user_id: Option<String>,
    pub user_name: Option<String>,
}

impl Identity {
    pub fn is_bound(&self) -> bool {
        self.user_id.is_some()
    }
}

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[cfg(feature = "sled-store")]
    #[error(transparent)]
    Sled(#[from] sled::Error),
    #[error("stored value for {0} is not valid utf-8")]
    Encoding(&'static str),
    #[error("identity store lock poisoned")]
    Poisoned,
}

pub type IdentityHandle = Arc<dyn IdentityStore + Send + Sync + 'static>;

pub trait IdentityStore {
    fn get(&self) -> Result<Identity, StoreError>;
    /// Persist the given fields. `None` and empty values leave the stored
    /// field untouched.
    fn set(&self, user_id: Option<&str>, user_name: Option<&str>) -> Result<(), StoreError>;
    fn clear(&self) -> Result<(), StoreError>;
}

fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<&'static str, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdentityStore for MemoryStore {
    fn get(&self) -> Result<Identity, StoreError> {
        let entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(Identity { user_id: entries.get(USER_ID_KEY).cloned(), user_name: entries.get(USER_NAME_KEY).cloned() })
    }

    fn set(&self, user_id: Option<&str>, user_name: Option<&str>) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        if let Some(id) = present(user_id) {
            entries.insert(USER_ID_KEY, id.to_string());
        }
        if let Some(name) = present(user_name) {
            entries.insert(USER_NAME_KEY, name.to_string());
        }
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        entries.remove(USER_ID_KEY);
        entries.remove(USER_NAME_KEY);
        Ok(())
    }
}

#[cfg(feature = "sled-store")]
pub struct SledStore {
    db: sled::Db,
}

#[cfg(feature = "sled-store")]
impl SledStore {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        log::debug!("opening identity store at {}", path.display());
        // every write flushes itself; no background flusher
        let db = sled::Config::new().path(path).flush_every_ms(None).open()?;
        Ok(Self { db })
    }

    fn read(&self, key: &'static str) -> Result<Option<String>, StoreError> {
        match self.db.get(key)? {
            Some(bytes) => String::from_utf8(bytes.to_vec()).map(Some).map_err(|_| StoreError::Encoding(key)),
            None => Ok(None),
        }
    }
}

#[cfg(feature = "sled-store")]
impl IdentityStore for SledStore {
    fn get(&self) -> Result<Identity, StoreError> {
        Ok(Identity { user_id: self.read(USER_ID_KEY)?, user_name: self.read(USER_NAME_KEY)? })
    }

    fn set(&self, user_id: Option<&str>, user_name: Option<&str>) -> Result<(), StoreError> {
        if let Some(id) = present(user_id) {
            self.db.insert(USER_ID_KEY, id.as_bytes())?;
        }
        if let Some(name) = present(user_name) {
            self.db.insert(USER_NAME_KEY, name.as_bytes())?;
        }
        self.db.flush()?;
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        self.db.remove(USER_ID_KEY)?;
        self.db.remove(USER_NAME_KEY)?;
        self.db.flush()?;
        Ok(())
    }
}

/// Open the identity backend: durable under `path` when one is given,
/// process memory otherwise.
pub fn open_store(path: Option<&Path>) -> Result<IdentityHandle, StoreError> {
    match path {
        #[cfg(feature = "sled-store")]
        Some(path) => Ok(Arc::new(SledStore::open(path)?)),
        #[cfg(not(feature = "sled-store"))]
        Some(path) => {
            log::warn!("sled-store disabled; identity at {} will not persist", path.display());
            Ok(Arc::new(MemoryStore::new()))
        }
        None => Ok(Arc::new(MemoryStore::new())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exercise(store: &dyn IdentityStore) {
        assert_eq!(store.get().unwrap(), Identity::default());

        store.set(Some("u1"), Some("Alice")).unwrap();
        assert_eq!(store.get().unwrap(), Identity { user_id: Some("u1".into()), user_name: Some("Alice".into()) });

        // absent and empty fields keep what was stored
        store.set(None, Some("")).unwrap();
        assert_eq!(store.get().unwrap().user_name.as_deref(), Some("Alice"));
        store.set(Some("u2"), None).unwrap();
        assert_eq!(store.get().unwrap().user_id.as_deref(), Some("u2"));

        store.clear().unwrap();
        let cleared = store.get().unwrap();
        assert!(cleared.user_id.is_none());
        assert!(cleared.user_name.is_none());
        assert!(!cleared.is_bound());
    }

    #[test]
    fn memory_store_round_trip() {
        exercise(&MemoryStore::new());
    }

    #[cfg(feature = "sled-store")]
    #[test]
    fn sled_store_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        exercise(&SledStore::open(&dir.path().join("identity")).expect("open store"));
    }

    #[cfg(feature = "sled-store")]
    #[test]
    fn sled_store_survives_reopen() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("identity");
        {
            let store = SledStore::open(&path).expect("open store");
            store.set(Some("u9"), Some("Carol")).unwrap();
        }
        let store = SledStore::open(&path).expect("reopen store");
        let me = store.get().unwrap();
        assert_eq!(me.user_id.as_deref(), Some("u9"));
        assert_eq!(me.user_name.as_deref(), Some("Carol"));
    }

    #[test]
    fn open_store_without_path_is_ephemeral() {
        let store = open_store(None).unwrap();
        store.set(Some("u1"), Some("A")).unwrap();
        let other = open_store(None).unwrap();
        assert!(!other.get().unwrap().is_bound());
    }
}
