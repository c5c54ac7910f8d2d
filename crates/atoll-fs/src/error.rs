use thiserror::Error;

/// Abort-style errors surfaced by filesystem operations.
///
/// Every operation has a single failure path: it leaves the root unchanged
/// and returns one of these. The only observable side effect of a failed
/// operation is a preceding `*AlreadyExists` event, where applicable.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum FsError {
    /// Path fails syntactic validation, a non-terminal segment does not
    /// exist, or a read-only operation targets the root.
    #[error("path error or invalid path format")]
    PathError,

    /// Terminal name does not exist (stat, delete).
    #[error("path not found")]
    PathNotFound,

    /// A name→id entry points to a missing arena object, or traversal
    /// revisited an object. Surfaces internal invariant breakage.
    #[error("arena mismatch: object missing or aliased")]
    ArenaMismatch,

    /// add_file without overwrite, or rename_file destination occupied.
    #[error("file already exists at the specified path")]
    FileAlreadyExists,

    /// add_dir target exists, or rename_dir destination occupied.
    #[error("directory already exists at the specified path")]
    DirectoryAlreadyExists,

    /// rename from/to paths differ in a non-terminal segment.
    #[error("rename 'from' and 'to' paths must share the same parent directory")]
    RenamePathMismatch,

    /// A tag or blob identifier exceeds the maximum string length.
    #[error("string length exceeds maximum allowed")]
    StringTooLong,

    /// More tags than the maximum allowed.
    #[error("too many tags specified")]
    TooManyTags,

    /// A mutation targeted the root path `/` exactly.
    #[error("cannot perform this operation directly on the root path")]
    InvalidPathOperationOnRoot,

    /// Caller is not the root's bound authority.
    #[error("unauthorized operation")]
    Unauthorized,
}
