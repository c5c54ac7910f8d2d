//! Structural invariant checks over a filesystem root.
//!
//! The auditor walks a [`FsRoot`] and reports every violation of the
//! state-machine invariants: arena coherence (every index entry resolves),
//! reachability (no orphans), single-parentage (no aliases), and counter
//! bounds. A healthy root always audits clean; the auditor exists so tests
//! can assert that after every operation, and so hosts can vet a root
//! restored from persistence.

use std::collections::BTreeSet;

use atoll_types::ObjectId;

use crate::root::FsRoot;

/// Result of auditing a root.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuditReport {
    pub violations: Vec<AuditViolation>,
}

impl AuditReport {
    /// Returns `true` if every invariant held.
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }
}

/// A specific invariant violation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuditViolation {
    pub kind: ViolationKind,
    pub detail: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViolationKind {
    /// A name→id entry whose id is missing from its arena.
    DanglingIndexEntry,
    /// An arena object no name path reaches.
    OrphanObject,
    /// An object reachable via more than one name path.
    AliasedObject,
    /// The id counter is not strictly above an allocated id.
    CounterBehind,
}

/// Audit a root against the structural invariants.
pub fn audit(root: &FsRoot) -> AuditReport {
    let mut violations = Vec::new();
    let mut seen_files: BTreeSet<ObjectId> = BTreeSet::new();
    let mut seen_dirs: BTreeSet<ObjectId> = BTreeSet::new();

    // Walk the tree from the root indexes, recording every edge. A
    // visited set bounds the walk even if the arena is cyclic.
    let mut pending: Vec<(String, ObjectId)> = Vec::new();
    check_indexes(
        root,
        "/",
        &root.children_files,
        &root.children_directories,
        &mut seen_files,
        &mut seen_dirs,
        &mut pending,
        &mut violations,
    );
    while let Some((path, dir_id)) = pending.pop() {
        let Some(dir) = root.dir_arena.get(&dir_id) else {
            // Already reported as dangling by the parent.
            continue;
        };
        check_indexes(
            root,
            &path,
            &dir.children_files,
            &dir.children_directories,
            &mut seen_files,
            &mut seen_dirs,
            &mut pending,
            &mut violations,
        );
    }

    for id in root.file_arena.keys() {
        if !seen_files.contains(id) {
            violations.push(AuditViolation {
                kind: ViolationKind::OrphanObject,
                detail: format!("file object {id} is unreachable from root"),
            });
        }
    }
    for id in root.dir_arena.keys() {
        if !seen_dirs.contains(id) {
            violations.push(AuditViolation {
                kind: ViolationKind::OrphanObject,
                detail: format!("directory object {id} is unreachable from root"),
            });
        }
    }

    let counter = root.obj_id_counter;
    let max_allocated = root
        .file_arena
        .keys()
        .chain(root.dir_arena.keys())
        .max()
        .copied();
    if let Some(max) = max_allocated {
        if counter < max {
            violations.push(AuditViolation {
                kind: ViolationKind::CounterBehind,
                detail: format!("counter {counter} is behind allocated id {max}"),
            });
        }
    }

    AuditReport { violations }
}

#[allow(clippy::too_many_arguments)]
fn check_indexes(
    root: &FsRoot,
    path: &str,
    files: &std::collections::BTreeMap<String, ObjectId>,
    dirs: &std::collections::BTreeMap<String, ObjectId>,
    seen_files: &mut BTreeSet<ObjectId>,
    seen_dirs: &mut BTreeSet<ObjectId>,
    pending: &mut Vec<(String, ObjectId)>,
    violations: &mut Vec<AuditViolation>,
) {
    for (name, id) in files {
        if !root.file_arena.contains_key(id) {
            violations.push(AuditViolation {
                kind: ViolationKind::DanglingIndexEntry,
                detail: format!("file entry {path}{name} points at missing object {id}"),
            });
        }
        if !seen_files.insert(*id) {
            violations.push(AuditViolation {
                kind: ViolationKind::AliasedObject,
                detail: format!("file object {id} reachable via {path}{name} and another path"),
            });
        }
    }
    for (name, id) in dirs {
        if !root.dir_arena.contains_key(id) {
            violations.push(AuditViolation {
                kind: ViolationKind::DanglingIndexEntry,
                detail: format!("directory entry {path}{name} points at missing object {id}"),
            });
        }
        if seen_dirs.insert(*id) {
            pending.push((format!("{path}{name}/"), *id));
        } else {
            violations.push(AuditViolation {
                kind: ViolationKind::AliasedObject,
                detail: format!(
                    "directory object {id} reachable via {path}{name} and another path"
                ),
            });
        }
    }
}
