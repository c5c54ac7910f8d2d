use serde::{Deserialize, Serialize};

use atoll_types::ObjectId;

use crate::object::{DirObject, FileObject};

/// One child of a directory, as returned by `list_dir` and `stat`.
///
/// A tagged record: `is_dir` discriminates the two variants. Directory
/// entries carry zeroed content fields (`size`, `blob_id`, `end_epoch`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListEntry {
    pub name: String,
    pub is_dir: bool,
    pub create_ts: u64,
    pub tags: Vec<String>,
    pub size: u64,
    pub blob_id: String,
    pub end_epoch: u64,
}

impl ListEntry {
    /// Entry describing a file.
    pub fn file(name: &str, file: &FileObject) -> Self {
        Self {
            name: name.to_string(),
            is_dir: false,
            create_ts: file.create_ts,
            tags: file.tags.clone(),
            size: file.size,
            blob_id: file.blob_id.clone(),
            end_epoch: file.end_epoch,
        }
    }

    /// Entry describing a directory. Content fields are zeroed.
    pub fn dir(name: &str, dir: &DirObject) -> Self {
        Self {
            name: name.to_string(),
            is_dir: true,
            create_ts: dir.create_ts,
            tags: dir.tags.clone(),
            size: 0,
            blob_id: String::new(),
            end_epoch: 0,
        }
    }
}

/// A file paired with its arena id, as returned by `get_dir_all`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    pub id: ObjectId,
    pub file: FileObject,
}

/// A directory flattened for `get_dir_all`.
///
/// The two name/id pairs are parallel sequences: the i-th name corresponds
/// to the i-th id.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirRecord {
    pub id: ObjectId,
    pub create_ts: u64,
    pub tags: Vec<String>,
    pub children_file_names: Vec<String>,
    pub children_file_ids: Vec<ObjectId>,
    pub children_directory_names: Vec<String>,
    pub children_directory_ids: Vec<ObjectId>,
}

impl DirRecord {
    /// Flatten a directory's child indexes into parallel sequences.
    pub fn from_dir(id: ObjectId, dir: &DirObject) -> Self {
        Self {
            id,
            create_ts: dir.create_ts,
            tags: dir.tags.clone(),
            children_file_names: dir.children_files.keys().cloned().collect(),
            children_file_ids: dir.children_files.values().copied().collect(),
            children_directory_names: dir.children_directories.keys().cloned().collect(),
            children_directory_ids: dir.children_directories.values().copied().collect(),
        }
    }
}

/// Recursive snapshot of a directory subtree, as returned by `get_dir_all`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecursiveSnapshot {
    /// Arena id of the directory the snapshot is rooted at.
    pub dir_id: ObjectId,
    /// Every file in the subtree, ascending by id.
    pub files: Vec<FileRecord>,
    /// Every directory in the subtree (inclusive of the root), ascending
    /// by id.
    pub dirs: Vec<DirRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dir_entry_zeroes_content_fields() {
        let dir = DirObject::new(vec!["folder".into()], 1100);
        let entry = ListEntry::dir("docs", &dir);
        assert!(entry.is_dir);
        assert_eq!(entry.size, 0);
        assert_eq!(entry.blob_id, "");
        assert_eq!(entry.end_epoch, 0);
        assert_eq!(entry.tags, vec!["folder".to_string()]);
    }

    #[test]
    fn dir_record_sequences_are_parallel() {
        let mut dir = DirObject::new(vec![], 0);
        dir.children_files.insert("b.txt".into(), ObjectId::from_u64(2));
        dir.children_files.insert("a.txt".into(), ObjectId::from_u64(5));
        dir.children_directories.insert("sub".into(), ObjectId::from_u64(3));

        let rec = DirRecord::from_dir(ObjectId::from_u64(1), &dir);
        assert_eq!(rec.children_file_names, vec!["a.txt", "b.txt"]);
        assert_eq!(
            rec.children_file_ids,
            vec![ObjectId::from_u64(5), ObjectId::from_u64(2)]
        );
        assert_eq!(rec.children_directory_names, vec!["sub"]);
        assert_eq!(rec.children_directory_ids, vec![ObjectId::from_u64(3)]);
    }
}
