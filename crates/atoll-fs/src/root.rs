use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use atoll_types::{AuthorityId, ObjectId};

use crate::entry::{DirRecord, FileRecord, ListEntry, RecursiveSnapshot};
use crate::error::FsError;
use crate::event::{EventSink, FsEvent};
use crate::object::{validate_tags, DirObject, FileObject, FileSpec};
use crate::path::{ensure_trailing_slash, segments, strip_trailing_slash, validate};

/// Parent of a path's terminal name: the root itself, or a directory in
/// the arena.
type ParentRef = Option<ObjectId>;

/// The single owned root object: metadata, the two top-level name→id
/// indexes, and the two arenas owning every object in the tree.
///
/// All eleven operations live here. Mutations take `&mut self`, so a
/// single writer is enforced statically; hosts that share a root wrap it
/// in an `RwLock` (write lock for mutations, read lock for `list_dir`,
/// `stat`, and `get_dir_all`). Every failure path runs before the first
/// mutation, so an abort leaves the root bit-identical to its pre-call
/// state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FsRoot {
    pub(crate) current_epoch: u64,
    pub(crate) obj_id_counter: ObjectId,
    pub(crate) authority: AuthorityId,
    pub(crate) children_files: BTreeMap<String, ObjectId>,
    pub(crate) children_directories: BTreeMap<String, ObjectId>,
    pub(crate) file_arena: BTreeMap<ObjectId, FileObject>,
    pub(crate) dir_arena: BTreeMap<ObjectId, DirObject>,
}

impl FsRoot {
    /// Create a fresh root bound to the given authority: epoch 0, counter
    /// 0, empty indexes and arenas.
    pub fn initialize(authority: AuthorityId) -> Self {
        debug!(authority = %authority.short_id(), "initializing filesystem root");
        Self {
            current_epoch: 0,
            obj_id_counter: ObjectId::ROOT,
            authority,
            children_files: BTreeMap::new(),
            children_directories: BTreeMap::new(),
            file_arena: BTreeMap::new(),
            dir_arena: BTreeMap::new(),
        }
    }

    pub fn current_epoch(&self) -> u64 {
        self.current_epoch
    }

    /// The highest identifier issued so far (zero if none).
    pub fn obj_id_counter(&self) -> ObjectId {
        self.obj_id_counter
    }

    pub fn authority(&self) -> &AuthorityId {
        &self.authority
    }

    /// Number of files anywhere in the tree.
    pub fn file_count(&self) -> usize {
        self.file_arena.len()
    }

    /// Number of non-root directories anywhere in the tree.
    pub fn dir_count(&self) -> usize {
        self.dir_arena.len()
    }

    /// All file arena ids, ascending.
    pub fn file_ids(&self) -> Vec<ObjectId> {
        self.file_arena.keys().copied().collect()
    }

    /// All directory arena ids, ascending.
    pub fn dir_ids(&self) -> Vec<ObjectId> {
        self.dir_arena.keys().copied().collect()
    }

    // -----------------------------------------------------------------
    // Mutating operations
    // -----------------------------------------------------------------

    /// Set the current epoch. Only the bound authority may call this; the
    /// value is stored verbatim and nothing else changes.
    pub fn update_epoch(
        &mut self,
        authority: &AuthorityId,
        new_epoch: u64,
    ) -> Result<(), FsError> {
        self.require_authority(authority)?;
        self.current_epoch = new_epoch;
        Ok(())
    }

    /// Add a file at `path`, optionally replacing an existing one.
    ///
    /// With `overwrite`, the old object leaves the file arena and the name
    /// is rebound to a freshly issued id; the counter always advances on
    /// success. `now_ms` becomes the file's `create_ts` — the machine
    /// never reads a clock of its own.
    #[allow(clippy::too_many_arguments)]
    pub fn add_file(
        &mut self,
        authority: &AuthorityId,
        path: &str,
        spec: FileSpec,
        overwrite: bool,
        now_ms: u64,
        sink: &dyn EventSink,
    ) -> Result<(), FsError> {
        self.require_authority(authority)?;
        spec.validate()?;
        let (parent, name) = self.resolve_parent(path)?;

        let existing = self.file_index(parent)?.get(&name).copied();
        if let Some(id) = existing {
            let current = self.file_arena.get(&id).ok_or(FsError::ArenaMismatch)?;
            if !overwrite {
                sink.emit(FsEvent::FileAlreadyExists {
                    path: path.to_string(),
                    create_ts: current.create_ts,
                    tags: current.tags.clone(),
                    size: current.size,
                    blob_id: current.blob_id.clone(),
                    end_epoch: current.end_epoch,
                });
                return Err(FsError::FileAlreadyExists);
            }
            self.file_arena.remove(&id);
        }

        self.obj_id_counter = self.obj_id_counter.successor();
        let new_id = self.obj_id_counter;
        let file = FileObject::from_spec(spec, now_ms);

        let event = FsEvent::FileAdded {
            path: path.to_string(),
            create_ts: file.create_ts,
            tags: file.tags.clone(),
            size: file.size,
            blob_id: file.blob_id.clone(),
            end_epoch: file.end_epoch,
        };
        self.file_index_mut(parent)?.insert(name, new_id);
        self.file_arena.insert(new_id, file);

        debug!(path, id = %new_id, overwrite, "file added");
        sink.emit(event);
        Ok(())
    }

    /// Add an empty directory at `path`.
    pub fn add_dir(
        &mut self,
        authority: &AuthorityId,
        path: &str,
        tags: Vec<String>,
        now_ms: u64,
        sink: &dyn EventSink,
    ) -> Result<(), FsError> {
        self.require_authority(authority)?;
        validate_tags(&tags)?;
        let (parent, name) = self.resolve_parent(path)?;

        if let Some(id) = self.dir_index(parent)?.get(&name) {
            let current = self.dir_arena.get(id).ok_or(FsError::ArenaMismatch)?;
            sink.emit(FsEvent::DirAlreadyExists {
                path: path.to_string(),
                create_ts: current.create_ts,
                tags: current.tags.clone(),
            });
            return Err(FsError::DirectoryAlreadyExists);
        }

        self.obj_id_counter = self.obj_id_counter.successor();
        let new_id = self.obj_id_counter;
        let dir = DirObject::new(tags.clone(), now_ms);

        self.dir_index_mut(parent)?.insert(name, new_id);
        self.dir_arena.insert(new_id, dir);

        debug!(path, id = %new_id, "directory added");
        sink.emit(FsEvent::DirAdded {
            path: path.to_string(),
            create_ts: now_ms,
            tags,
        });
        Ok(())
    }

    /// Rename a file within its parent directory.
    ///
    /// `from` and `to` must agree on every segment but the last; renames
    /// never cross directories. The arena entry is untouched — identity
    /// and `create_ts` are preserved.
    pub fn rename_file(
        &mut self,
        authority: &AuthorityId,
        from: &str,
        to: &str,
    ) -> Result<(), FsError> {
        self.require_authority(authority)?;
        let (parent, from_name, to_name) = self.resolve_rename(from, to)?;

        let index = self.file_index(parent)?;
        if !index.contains_key(&from_name) {
            return Err(FsError::PathError);
        }
        if index.contains_key(&to_name) {
            return Err(FsError::FileAlreadyExists);
        }

        let index = self.file_index_mut(parent)?;
        let id = index.remove(&from_name).ok_or(FsError::PathError)?;
        index.insert(to_name, id);
        debug!(from, to, "file renamed");
        Ok(())
    }

    /// Rename a directory within its parent. Same contract as
    /// [`FsRoot::rename_file`], against the directory index.
    pub fn rename_dir(
        &mut self,
        authority: &AuthorityId,
        from: &str,
        to: &str,
    ) -> Result<(), FsError> {
        self.require_authority(authority)?;
        let (parent, from_name, to_name) = self.resolve_rename(from, to)?;

        let index = self.dir_index(parent)?;
        if !index.contains_key(&from_name) {
            return Err(FsError::PathError);
        }
        if index.contains_key(&to_name) {
            return Err(FsError::DirectoryAlreadyExists);
        }

        let index = self.dir_index_mut(parent)?;
        let id = index.remove(&from_name).ok_or(FsError::PathError)?;
        index.insert(to_name, id);
        debug!(from, to, "directory renamed");
        Ok(())
    }

    /// Delete a single file.
    pub fn delete_file(
        &mut self,
        authority: &AuthorityId,
        path: &str,
        sink: &dyn EventSink,
    ) -> Result<(), FsError> {
        self.require_authority(authority)?;
        let (parent, name) = self.resolve_parent(path)?;

        let id = *self
            .file_index(parent)?
            .get(&name)
            .ok_or(FsError::PathNotFound)?;
        if !self.file_arena.contains_key(&id) {
            return Err(FsError::ArenaMismatch);
        }

        self.file_index_mut(parent)?.remove(&name);
        self.file_arena.remove(&id);

        debug!(path, id = %id, "file deleted");
        sink.emit(FsEvent::Deleted {
            path: path.to_string(),
        });
        Ok(())
    }

    /// Delete a directory and garbage-collect every descendant in the
    /// same transaction. Succeeds on empty and non-empty directories.
    pub fn delete_dir(
        &mut self,
        authority: &AuthorityId,
        path: &str,
        sink: &dyn EventSink,
    ) -> Result<(), FsError> {
        self.require_authority(authority)?;
        let (parent, name) = self.resolve_parent(path)?;

        let dir_id = *self
            .dir_index(parent)?
            .get(&name)
            .ok_or(FsError::PathNotFound)?;

        let (file_ids, dir_ids) = self.collect_reachable(dir_id)?;
        // Removal by an absent key is fatal, so verify the whole set
        // before the first mutation. Directory presence was already
        // established by the traversal itself.
        for id in &file_ids {
            if !self.file_arena.contains_key(id) {
                return Err(FsError::ArenaMismatch);
            }
        }

        self.dir_index_mut(parent)?.remove(&name);
        for id in &file_ids {
            self.file_arena.remove(id);
        }
        for id in &dir_ids {
            self.dir_arena.remove(id);
        }

        debug!(
            path,
            files = file_ids.len(),
            dirs = dir_ids.len(),
            "directory deleted recursively"
        );
        sink.emit(FsEvent::Deleted {
            path: path.to_string(),
        });
        Ok(())
    }

    // -----------------------------------------------------------------
    // Read-only operations
    // -----------------------------------------------------------------

    /// List the children of a directory: subdirectories first, then
    /// files, each in index iteration order.
    ///
    /// The path is normalized to end with `/`; the bare root (and the
    /// empty string, which normalizes to it) lists the top level.
    pub fn list_dir(&self, path: &str) -> Result<Vec<ListEntry>, FsError> {
        let normalized = ensure_trailing_slash(path);
        validate(&normalized)?;

        let mut files = &self.children_files;
        let mut dirs = &self.children_directories;
        for segment in segments(&normalized) {
            let id = dirs.get(segment).ok_or(FsError::PathError)?;
            let dir = self.dir_arena.get(id).ok_or(FsError::ArenaMismatch)?;
            files = &dir.children_files;
            dirs = &dir.children_directories;
        }

        let mut entries = Vec::with_capacity(dirs.len() + files.len());
        for (name, id) in dirs {
            let dir = self.dir_arena.get(id).ok_or(FsError::ArenaMismatch)?;
            entries.push(ListEntry::dir(name, dir));
        }
        for (name, id) in files {
            let file = self.file_arena.get(id).ok_or(FsError::ArenaMismatch)?;
            entries.push(ListEntry::file(name, file));
        }
        Ok(entries)
    }

    /// Describe the object at `path`.
    ///
    /// The terminal name is looked up in the file index first, then the
    /// directory index; a name collision therefore resolves to the file.
    /// The bare root is not a valid argument.
    pub fn stat(&self, path: &str) -> Result<ListEntry, FsError> {
        let (parent, name) = self.resolve_parent(path).map_err(demote_root_error)?;

        if let Some(id) = self.file_index(parent)?.get(&name) {
            let file = self.file_arena.get(id).ok_or(FsError::ArenaMismatch)?;
            return Ok(ListEntry::file(&name, file));
        }
        if let Some(id) = self.dir_index(parent)?.get(&name) {
            let dir = self.dir_arena.get(id).ok_or(FsError::ArenaMismatch)?;
            return Ok(ListEntry::dir(&name, dir));
        }
        Err(FsError::PathNotFound)
    }

    /// Recursive snapshot of the directory subtree at `path`: its arena
    /// id, every descendant file, and every descendant directory
    /// (inclusive), ascending by id.
    pub fn get_dir_all(&self, path: &str) -> Result<RecursiveSnapshot, FsError> {
        let (parent, name) = self.resolve_parent(path).map_err(demote_root_error)?;
        let dir_id = *self
            .dir_index(parent)?
            .get(&name)
            .ok_or(FsError::PathError)?;

        let (file_ids, dir_ids) = self.collect_reachable(dir_id)?;

        let mut files = Vec::with_capacity(file_ids.len());
        for id in file_ids {
            let file = self.file_arena.get(&id).ok_or(FsError::ArenaMismatch)?;
            files.push(FileRecord {
                id,
                file: file.clone(),
            });
        }
        let mut dirs = Vec::with_capacity(dir_ids.len());
        for id in dir_ids {
            let dir = self.dir_arena.get(&id).ok_or(FsError::ArenaMismatch)?;
            dirs.push(DirRecord::from_dir(id, dir));
        }
        Ok(RecursiveSnapshot {
            dir_id,
            files,
            dirs,
        })
    }

    // -----------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------

    fn require_authority(&self, proof: &AuthorityId) -> Result<(), FsError> {
        if proof != &self.authority {
            return Err(FsError::Unauthorized);
        }
        Ok(())
    }

    /// Walk `path` to its final parent directory.
    ///
    /// Returns the parent reference and the terminal name. The bare root
    /// has no terminal name and is rejected with
    /// `InvalidPathOperationOnRoot`; read-only callers demote that to
    /// `PathError`.
    fn resolve_parent(&self, path: &str) -> Result<(ParentRef, String), FsError> {
        let clean = strip_trailing_slash(path);
        validate(clean)?;
        if clean == "/" {
            return Err(FsError::InvalidPathOperationOnRoot);
        }

        let mut segs: Vec<&str> = segments(clean).collect();
        let name = segs.pop().ok_or(FsError::PathError)?.to_string();

        let mut parent: ParentRef = None;
        let mut dirs = &self.children_directories;
        for segment in segs {
            let id = dirs.get(segment).ok_or(FsError::PathError)?;
            let dir = self.dir_arena.get(id).ok_or(FsError::ArenaMismatch)?;
            parent = Some(*id);
            dirs = &dir.children_directories;
        }
        Ok((parent, name))
    }

    /// Validate a rename pair: both paths walk to the same parent and
    /// agree verbatim on every non-terminal segment.
    fn resolve_rename(
        &self,
        from: &str,
        to: &str,
    ) -> Result<(ParentRef, String, String), FsError> {
        let (parent, from_name) = self.resolve_parent(from)?;
        let to_clean = strip_trailing_slash(to);
        validate(to_clean)?;

        let from_clean = strip_trailing_slash(from);
        let from_segs: Vec<&str> = segments(from_clean).collect();
        let to_segs: Vec<&str> = segments(to_clean).collect();
        if from_segs.len() != to_segs.len() {
            return Err(FsError::RenamePathMismatch);
        }
        let prefix_len = from_segs.len() - 1;
        if from_segs[..prefix_len] != to_segs[..prefix_len] {
            return Err(FsError::RenamePathMismatch);
        }

        let to_name = to_segs[prefix_len].to_string();
        Ok((parent, from_name, to_name))
    }

    fn file_index(&self, parent: ParentRef) -> Result<&BTreeMap<String, ObjectId>, FsError> {
        match parent {
            None => Ok(&self.children_files),
            Some(id) => Ok(&self
                .dir_arena
                .get(&id)
                .ok_or(FsError::ArenaMismatch)?
                .children_files),
        }
    }

    fn file_index_mut(
        &mut self,
        parent: ParentRef,
    ) -> Result<&mut BTreeMap<String, ObjectId>, FsError> {
        match parent {
            None => Ok(&mut self.children_files),
            Some(id) => Ok(&mut self
                .dir_arena
                .get_mut(&id)
                .ok_or(FsError::ArenaMismatch)?
                .children_files),
        }
    }

    fn dir_index(&self, parent: ParentRef) -> Result<&BTreeMap<String, ObjectId>, FsError> {
        match parent {
            None => Ok(&self.children_directories),
            Some(id) => Ok(&self
                .dir_arena
                .get(&id)
                .ok_or(FsError::ArenaMismatch)?
                .children_directories),
        }
    }

    fn dir_index_mut(
        &mut self,
        parent: ParentRef,
    ) -> Result<&mut BTreeMap<String, ObjectId>, FsError> {
        match parent {
            None => Ok(&mut self.children_directories),
            Some(id) => Ok(&mut self
                .dir_arena
                .get_mut(&id)
                .ok_or(FsError::ArenaMismatch)?
                .children_directories),
        }
    }

    /// Depth-first reachable-set collection from a directory id,
    /// inclusive of the start.
    ///
    /// Sets, not sequences: duplicates mean an id is reachable twice,
    /// which the tree construction forbids, so a revisit (of either kind)
    /// surfaces as `ArenaMismatch` rather than corrupting a later
    /// removal. The same guard terminates traversal of a cyclic arena.
    fn collect_reachable(
        &self,
        start: ObjectId,
    ) -> Result<(BTreeSet<ObjectId>, BTreeSet<ObjectId>), FsError> {
        let mut file_ids = BTreeSet::new();
        let mut dir_ids = BTreeSet::new();
        dir_ids.insert(start);

        let mut pending = vec![start];
        while let Some(id) = pending.pop() {
            let dir = self.dir_arena.get(&id).ok_or(FsError::ArenaMismatch)?;
            for child in dir.children_files.values() {
                if !file_ids.insert(*child) {
                    return Err(FsError::ArenaMismatch);
                }
            }
            for child in dir.children_directories.values() {
                if !dir_ids.insert(*child) {
                    return Err(FsError::ArenaMismatch);
                }
                pending.push(*child);
            }
        }
        Ok((file_ids, dir_ids))
    }
}

/// Read-only operations report a root target as a plain path defect.
fn demote_root_error(err: FsError) -> FsError {
    match err {
        FsError::InvalidPathOperationOnRoot => FsError::PathError,
        other => other,
    }
}
