use std::collections::HashMap;
use std::sync::RwLock;

use atoll_fs::FsRoot;
use atoll_types::AuthorityId;

use crate::error::{StoreError, StoreResult};
use crate::key::RootKey;
use crate::traits::RootStore;

/// In-memory, HashMap-based root store.
///
/// Intended for tests and embedding. Roots are held as their serialized
/// payloads behind a `RwLock`, so the store exercises the same
/// encode/decode path as durable backends.
pub struct InMemoryRootStore {
    roots: RwLock<HashMap<RootKey, Vec<u8>>>,
}

impl InMemoryRootStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            roots: RwLock::new(HashMap::new()),
        }
    }

    /// Number of roots currently stored.
    pub fn len(&self) -> usize {
        self.roots.read().expect("lock poisoned").len()
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.roots.read().expect("lock poisoned").is_empty()
    }

    /// Remove all roots.
    pub fn clear(&self) {
        self.roots.write().expect("lock poisoned").clear();
    }

    /// The stored payload bytes for an authority, if any. Exposed so
    /// tests can assert bit-for-bit round-trips.
    pub fn payload(&self, authority: &AuthorityId) -> Option<Vec<u8>> {
        let key = RootKey::derive(authority);
        self.roots.read().expect("lock poisoned").get(&key).cloned()
    }
}

impl Default for InMemoryRootStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RootStore for InMemoryRootStore {
    fn load(&self, authority: &AuthorityId) -> StoreResult<Option<FsRoot>> {
        let key = RootKey::derive(authority);
        let roots = self.roots.read().expect("lock poisoned");
        match roots.get(&key) {
            None => Ok(None),
            Some(payload) => {
                let root = bincode::deserialize(payload)
                    .map_err(|e| StoreError::Serialization(e.to_string()))?;
                Ok(Some(root))
            }
        }
    }

    fn save(&self, root: &FsRoot) -> StoreResult<RootKey> {
        let key = RootKey::derive(root.authority());
        let payload =
            bincode::serialize(root).map_err(|e| StoreError::Serialization(e.to_string()))?;
        self.roots
            .write()
            .expect("lock poisoned")
            .insert(key, payload);
        Ok(key)
    }

    fn exists(&self, authority: &AuthorityId) -> StoreResult<bool> {
        let key = RootKey::derive(authority);
        Ok(self.roots.read().expect("lock poisoned").contains_key(&key))
    }

    fn remove(&self, authority: &AuthorityId) -> StoreResult<bool> {
        let key = RootKey::derive(authority);
        Ok(self
            .roots
            .write()
            .expect("lock poisoned")
            .remove(&key)
            .is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atoll_fs::{FileSpec, NullSink};

    fn auth() -> AuthorityId {
        AuthorityId::from_raw([1u8; 32])
    }

    fn populated_root() -> FsRoot {
        let mut fs = FsRoot::initialize(auth());
        fs.add_dir(&auth(), "/d", vec!["tag".into()], 1100, &NullSink)
            .unwrap();
        fs.add_file(
            &auth(),
            "/d/f.txt",
            FileSpec {
                tags: vec![],
                size: 64,
                blob_id: "blob-1".into(),
                end_epoch: 9,
            },
            false,
            1200,
            &NullSink,
        )
        .unwrap();
        fs
    }

    #[test]
    fn save_and_load_roundtrip() {
        let store = InMemoryRootStore::new();
        let root = populated_root();
        store.save(&root).unwrap();

        let loaded = store.load(&auth()).unwrap().expect("root should exist");
        assert_eq!(loaded, root);
        assert_eq!(loaded.stat("/d/f.txt").unwrap().size, 64);
    }

    #[test]
    fn load_missing_returns_none() {
        let store = InMemoryRootStore::new();
        assert!(store.load(&auth()).unwrap().is_none());
    }

    #[test]
    fn roundtrip_is_bit_for_bit() {
        let store = InMemoryRootStore::new();
        let root = populated_root();
        store.save(&root).unwrap();
        let first = store.payload(&auth()).unwrap();

        let loaded = store.load(&auth()).unwrap().unwrap();
        store.save(&loaded).unwrap();
        let second = store.payload(&auth()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn save_keys_by_the_roots_own_authority() {
        let store = InMemoryRootStore::new();
        let key = store.save(&populated_root()).unwrap();
        assert_eq!(key, RootKey::derive(&auth()));

        // A different identity sees nothing.
        let other = AuthorityId::from_raw([9u8; 32]);
        assert!(store.load(&other).unwrap().is_none());
        assert!(!store.exists(&other).unwrap());
    }

    #[test]
    fn save_replaces_previous_version() {
        let store = InMemoryRootStore::new();
        let mut root = populated_root();
        store.save(&root).unwrap();

        root.update_epoch(&auth(), 5).unwrap();
        store.save(&root).unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(store.load(&auth()).unwrap().unwrap().current_epoch(), 5);
    }

    #[test]
    fn remove_roots() {
        let store = InMemoryRootStore::new();
        store.save(&populated_root()).unwrap();
        assert!(store.remove(&auth()).unwrap());
        assert!(!store.remove(&auth()).unwrap());
        assert!(store.is_empty());
    }

    #[test]
    fn restored_root_still_enforces_authority() {
        let store = InMemoryRootStore::new();
        store.save(&populated_root()).unwrap();
        let mut restored = store.load(&auth()).unwrap().unwrap();

        let intruder = AuthorityId::from_raw([8u8; 32]);
        assert!(restored.update_epoch(&intruder, 1).is_err());
        assert!(restored.update_epoch(&auth(), 1).is_ok());
    }
}
