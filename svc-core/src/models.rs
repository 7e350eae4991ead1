use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use std::fmt;
use std::path::PathBuf;

/// Position of a blob inside the [`ContentStore`](crate::store::ContentStore).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct BlobHandle(pub(crate) usize);

impl BlobHandle {
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for BlobHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "blob#{}", self.0)
    }
}

/// Stable slot of a commit in the [`CommitGraph`](crate::graph::CommitGraph) arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct CommitHandle(pub(crate) usize);

impl CommitHandle {
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for CommitHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "commit#{}", self.0)
    }
}

/// Position of a branch in the [`BranchTable`](crate::branch::BranchTable).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct BranchId(pub(crate) usize);

impl BranchId {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Digest of a file's path and content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint(pub(crate) u64);

impl Fingerprint {
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

impl Serialize for Fingerprint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct CommitId(pub(crate) String);

impl CommitId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for CommitId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for CommitId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for CommitId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl fmt::Display for CommitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One file as recorded in a working set or a commit snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackedFile {
    pub name: String,
    pub fingerprint: Fingerprint,
    pub blob: BlobHandle,
    pub len: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ChangeKind {
    Addition,
    Deletion,
    Modification {
        before: Fingerprint,
        after: Fingerprint,
    },
}

impl ChangeKind {
    pub fn as_str(&self) -> &str {
        match self {
            ChangeKind::Addition => "addition",
            ChangeKind::Deletion => "deletion",
            ChangeKind::Modification { .. } => "modification",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Change {
    pub file_name: String,
    pub kind: ChangeKind,
}

impl Change {
    pub fn addition(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            kind: ChangeKind::Addition,
        }
    }

    pub fn deletion(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            kind: ChangeKind::Deletion,
        }
    }

    pub fn modification(file_name: impl Into<String>, before: Fingerprint, after: Fingerprint) -> Self {
        Self {
            file_name: file_name.into(),
            kind: ChangeKind::Modification { before, after },
        }
    }
}

/// A finalized node of the commit graph.
///
/// Nothing outside the graph can mutate a commit once it has been created; the
/// only post-creation edits are the graph appending child handles and the merge
/// path recording a second parent before the node is handed out.
#[derive(Debug, Clone, Serialize)]
pub struct Commit {
    pub(crate) id: CommitId,
    pub(crate) message: String,
    pub(crate) timestamp: DateTime<Utc>,
    pub(crate) files: Vec<TrackedFile>,
    pub(crate) changes: Vec<Change>,
    /// At most two entries: the first parent, then the merged-in branch head.
    pub(crate) parents: Vec<CommitHandle>,
    pub(crate) children: Vec<CommitHandle>,
    pub(crate) branch: BranchId,
}

impl Commit {
    /// A detached node; the graph fills in parent and child edges on insert.
    pub(crate) fn new(
        id: CommitId,
        message: String,
        files: Vec<TrackedFile>,
        changes: Vec<Change>,
        branch: BranchId,
    ) -> Self {
        Self {
            id,
            message,
            timestamp: Utc::now(),
            files,
            changes,
            parents: Vec::new(),
            children: Vec::new(),
            branch,
        }
    }

    pub fn id(&self) -> &CommitId {
        &self.id
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn files(&self) -> &[TrackedFile] {
        &self.files
    }

    pub fn file(&self, name: &str) -> Option<&TrackedFile> {
        self.files.iter().find(|f| f.name == name)
    }

    pub fn changes(&self) -> &[Change] {
        &self.changes
    }

    pub fn parent_handles(&self) -> &[CommitHandle] {
        &self.parents
    }

    pub fn child_handles(&self) -> &[CommitHandle] {
        &self.children
    }

    pub fn branch(&self) -> BranchId {
        self.branch
    }

    pub fn is_root(&self) -> bool {
        self.parents.is_empty()
    }

    pub fn is_merge(&self) -> bool {
        self.parents.len() == 2
    }
}

/// Caller-supplied outcome for one file during a merge.
///
/// A `resolved_path` of `None` (or an empty path) drops `file_name` from the
/// merged working set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub file_name: String,
    pub resolved_path: Option<PathBuf>,
}

impl Resolution {
    pub fn new(file_name: impl Into<String>, resolved_path: impl Into<PathBuf>) -> Self {
        Self {
            file_name: file_name.into(),
            resolved_path: Some(resolved_path.into()),
        }
    }

    pub fn drop_file(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            resolved_path: None,
        }
    }

    /// The replacement path, treating an empty path the same as none.
    pub fn replacement(&self) -> Option<&PathBuf> {
        self.resolved_path
            .as_ref()
            .filter(|p| !p.as_os_str().is_empty())
    }
}
