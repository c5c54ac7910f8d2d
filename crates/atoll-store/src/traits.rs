use atoll_fs::FsRoot;
use atoll_types::AuthorityId;

use crate::error::StoreResult;
use crate::key::RootKey;

/// Persistence boundary for filesystem roots.
///
/// All implementations must satisfy these invariants:
/// - A root is stored under the key derived from its own bound authority;
///   `save` takes no key argument, so callers cannot file a root under an
///   identity that is not its writer's.
/// - Payloads round-trip bit-for-bit: loading returns a root equal to the
///   one saved, and re-saving it produces the identical payload.
/// - All I/O errors are propagated, never silently ignored.
pub trait RootStore: Send + Sync {
    /// Load the root bound to `authority`.
    ///
    /// Returns `Ok(None)` if no root has been saved for that identity.
    fn load(&self, authority: &AuthorityId) -> StoreResult<Option<FsRoot>>;

    /// Persist a root under its authority-derived key, replacing any
    /// previous version. Returns the key it was stored under.
    fn save(&self, root: &FsRoot) -> StoreResult<RootKey>;

    /// Check whether a root exists for `authority`.
    fn exists(&self, authority: &AuthorityId) -> StoreResult<bool>;

    /// Remove the root for `authority`. Returns `true` if one existed.
    fn remove(&self, authority: &AuthorityId) -> StoreResult<bool>;
}
