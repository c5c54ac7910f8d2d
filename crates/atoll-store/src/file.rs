use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use atoll_fs::FsRoot;
use atoll_types::AuthorityId;

use crate::error::{StoreError, StoreResult};
use crate::key::RootKey;
use crate::traits::RootStore;

/// Header size: 4 bytes payload length + 4 bytes CRC32.
const HEADER_SIZE: usize = 8;

/// File-backed root store: one framed file per root.
///
/// On-disk format:
/// ```text
/// [4 bytes: payload length (little-endian u32)]
/// [4 bytes: CRC32 of payload (little-endian u32)]
/// [N bytes: payload (bincode-serialized FsRoot)]
/// ```
///
/// Files are named `<root key hex>.root` under the store directory.
/// Writes go to a temporary sibling first and are renamed into place, so
/// a crash mid-save leaves the previous version intact; a torn temp file
/// fails the CRC check on load and is reported as corrupt rather than
/// silently accepted.
pub struct FileRootStore {
    dir: PathBuf,
}

impl FileRootStore {
    /// Open (or create) a store rooted at the given directory.
    pub fn open(dir: &Path) -> StoreResult<Self> {
        fs::create_dir_all(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    fn root_path(&self, key: &RootKey) -> PathBuf {
        self.dir.join(format!("{}.root", key.to_hex()))
    }

    fn frame(payload: &[u8]) -> Vec<u8> {
        let mut framed = Vec::with_capacity(HEADER_SIZE + payload.len());
        framed.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        framed.extend_from_slice(&crc32fast::hash(payload).to_le_bytes());
        framed.extend_from_slice(payload);
        framed
    }

    fn unframe(data: &[u8]) -> StoreResult<&[u8]> {
        if data.len() < HEADER_SIZE {
            return Err(StoreError::CorruptRoot {
                reason: format!("file shorter than header: {} bytes", data.len()),
            });
        }
        let length =
            u32::from_le_bytes([data[0], data[1], data[2], data[3]]) as usize;
        let expected_crc = u32::from_le_bytes([data[4], data[5], data[6], data[7]]);
        let payload = &data[HEADER_SIZE..];
        if payload.len() != length {
            return Err(StoreError::CorruptRoot {
                reason: format!("length mismatch: header says {length}, have {}", payload.len()),
            });
        }
        let actual_crc = crc32fast::hash(payload);
        if actual_crc != expected_crc {
            return Err(StoreError::CorruptRoot {
                reason: format!("CRC mismatch: expected {expected_crc:#010x}, got {actual_crc:#010x}"),
            });
        }
        Ok(payload)
    }
}

impl RootStore for FileRootStore {
    fn load(&self, authority: &AuthorityId) -> StoreResult<Option<FsRoot>> {
        let key = RootKey::derive(authority);
        let path = self.root_path(&key);
        let data = match fs::read(&path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let payload = match Self::unframe(&data) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(key = %key, path = %path.display(), "root file failed frame check");
                return Err(e);
            }
        };
        let root = bincode::deserialize(payload)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        debug!(key = %key, bytes = data.len(), "root loaded");
        Ok(Some(root))
    }

    fn save(&self, root: &FsRoot) -> StoreResult<RootKey> {
        let key = RootKey::derive(root.authority());
        let payload =
            bincode::serialize(root).map_err(|e| StoreError::Serialization(e.to_string()))?;
        let framed = Self::frame(&payload);

        let path = self.root_path(&key);
        let tmp = path.with_extension("root.tmp");
        fs::write(&tmp, &framed)?;
        fs::rename(&tmp, &path)?;
        debug!(key = %key, bytes = framed.len(), "root saved");
        Ok(key)
    }

    fn exists(&self, authority: &AuthorityId) -> StoreResult<bool> {
        let key = RootKey::derive(authority);
        Ok(self.root_path(&key).exists())
    }

    fn remove(&self, authority: &AuthorityId) -> StoreResult<bool> {
        let key = RootKey::derive(authority);
        match fs::remove_file(self.root_path(&key)) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
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
        fs.add_dir(&auth(), "/projects", vec![], 1100, &NullSink)
            .unwrap();
        fs.add_file(
            &auth(),
            "/projects/notes.md",
            FileSpec {
                tags: vec!["md".into()],
                size: 321,
                blob_id: "blob-9".into(),
                end_epoch: 40,
            },
            false,
            1200,
            &NullSink,
        )
        .unwrap();
        fs
    }

    #[test]
    fn save_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileRootStore::open(dir.path()).unwrap();
        let root = populated_root();

        store.save(&root).unwrap();
        let loaded = store.load(&auth()).unwrap().expect("root should exist");
        assert_eq!(loaded, root);
    }

    #[test]
    fn load_missing_returns_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileRootStore::open(dir.path()).unwrap();
        assert!(store.load(&auth()).unwrap().is_none());
        assert!(!store.exists(&auth()).unwrap());
    }

    #[test]
    fn file_is_named_by_root_key() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileRootStore::open(dir.path()).unwrap();
        let key = store.save(&populated_root()).unwrap();
        assert!(dir.path().join(format!("{}.root", key.to_hex())).exists());
    }

    #[test]
    fn corrupt_payload_is_detected() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileRootStore::open(dir.path()).unwrap();
        let key = store.save(&populated_root()).unwrap();

        // Flip a payload byte behind the store's back.
        let path = dir.path().join(format!("{}.root", key.to_hex()));
        let mut data = fs::read(&path).unwrap();
        let last = data.len() - 1;
        data[last] ^= 0xFF;
        fs::write(&path, &data).unwrap();

        let err = store.load(&auth()).unwrap_err();
        assert!(matches!(err, StoreError::CorruptRoot { .. }));
    }

    #[test]
    fn truncated_file_is_detected() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileRootStore::open(dir.path()).unwrap();
        let key = store.save(&populated_root()).unwrap();

        let path = dir.path().join(format!("{}.root", key.to_hex()));
        let data = fs::read(&path).unwrap();
        fs::write(&path, &data[..data.len() / 2]).unwrap();

        let err = store.load(&auth()).unwrap_err();
        assert!(matches!(err, StoreError::CorruptRoot { .. }));
    }

    #[test]
    fn save_replaces_previous_version() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileRootStore::open(dir.path()).unwrap();
        let mut root = populated_root();
        store.save(&root).unwrap();

        root.update_epoch(&auth(), 11).unwrap();
        store.save(&root).unwrap();

        let loaded = store.load(&auth()).unwrap().unwrap();
        assert_eq!(loaded.current_epoch(), 11);
    }

    #[test]
    fn remove_root_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileRootStore::open(dir.path()).unwrap();
        store.save(&populated_root()).unwrap();
        assert!(store.remove(&auth()).unwrap());
        assert!(!store.remove(&auth()).unwrap());
        assert!(store.load(&auth()).unwrap().is_none());
    }

    #[test]
    fn reopened_store_sees_saved_roots() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = FileRootStore::open(dir.path()).unwrap();
            store.save(&populated_root()).unwrap();
        }
        let store = FileRootStore::open(dir.path()).unwrap();
        let loaded = store.load(&auth()).unwrap().unwrap();
        assert_eq!(loaded.file_count(), 1);
        assert_eq!(loaded.stat("/projects/notes.md").unwrap().size, 321);
    }
}
