use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use atoll_types::limits::{MAX_STRING_LEN, MAX_TAGS};
use atoll_types::ObjectId;

use crate::error::FsError;

/// Caller-supplied content metadata for a new file.
///
/// The state machine never holds file bytes; `blob_id` names an external,
/// content-addressed blob and `end_epoch` records when its reservation
/// lapses (stored, never enforced here).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSpec {
    pub tags: Vec<String>,
    pub size: u64,
    pub blob_id: String,
    pub end_epoch: u64,
}

impl FileSpec {
    /// Check tag count, tag lengths, and blob id length against the
    /// byte-exact limits.
    pub fn validate(&self) -> Result<(), FsError> {
        validate_tags(&self.tags)?;
        if self.blob_id.len() > MAX_STRING_LEN {
            return Err(FsError::StringTooLong);
        }
        Ok(())
    }
}

/// A file object as stored in the file arena.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileObject {
    /// Milliseconds since epoch, from the caller's clock argument.
    pub create_ts: u64,
    pub tags: Vec<String>,
    pub size: u64,
    pub blob_id: String,
    /// Epoch after which the external blob reservation lapses. Stored
    /// verbatim; never compared against the root's current epoch.
    pub end_epoch: u64,
}

impl FileObject {
    /// Materialize a file object from a validated spec.
    pub fn from_spec(spec: FileSpec, create_ts: u64) -> Self {
        Self {
            create_ts,
            tags: spec.tags,
            size: spec.size,
            blob_id: spec.blob_id,
            end_epoch: spec.end_epoch,
        }
    }
}

/// A non-root directory as stored in the directory arena.
///
/// Child indexes map names to arena ids. Name uniqueness is per directory
/// and per kind; the two indexes are independent, so a file and a
/// directory may share a name under one parent.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirObject {
    pub create_ts: u64,
    pub tags: Vec<String>,
    pub children_files: BTreeMap<String, ObjectId>,
    pub children_directories: BTreeMap<String, ObjectId>,
}

impl DirObject {
    /// A new empty directory.
    pub fn new(tags: Vec<String>, create_ts: u64) -> Self {
        Self {
            create_ts,
            tags,
            children_files: BTreeMap::new(),
            children_directories: BTreeMap::new(),
        }
    }

    /// Returns `true` if the directory has no children of either kind.
    pub fn is_empty(&self) -> bool {
        self.children_files.is_empty() && self.children_directories.is_empty()
    }
}

/// Check a tag sequence against the count and per-tag byte limits.
pub(crate) fn validate_tags(tags: &[String]) -> Result<(), FsError> {
    if tags.len() > MAX_TAGS {
        return Err(FsError::TooManyTags);
    }
    for tag in tags {
        if tag.len() > MAX_STRING_LEN {
            return Err(FsError::StringTooLong);
        }
    }
    Ok(())
}
