//! # svc-core
//!
//! Core library for svc - a small in-memory version-control engine.
//!
//! A [`Repository`] tracks files through a [`FileBackend`], records snapshots
//! into a commit graph, keeps one working set per branch and merges branches
//! with caller-supplied resolutions. All state lives in memory for the life of
//! the repository value.

pub mod backend;
pub mod branch;
pub mod config;
pub mod detect;
pub mod diff;
pub mod error;
pub mod graph;
pub mod hash;
mod merge;
pub mod models;
pub mod repository;
pub mod store;
pub mod working_set;

pub use backend::{DiskBackend, FileBackend, MemoryBackend};
pub use branch::{Branch, BranchName, BranchTable};
pub use config::{RepositoryConfig, DEFAULT_BRANCH};
pub use detect::{ChangeDetector, Scan};
pub use diff::{DiffLine, DiffLineType, FileDiff};
pub use error::{Error, ErrorKind, Result};
pub use graph::CommitGraph;
pub use models::{
    BlobHandle, BranchId, Change, ChangeKind, Commit, CommitHandle, CommitId, Fingerprint,
    Resolution, TrackedFile,
};
pub use repository::{Repository, TeardownReport};
pub use store::ContentStore;
pub use working_set::WorkingSet;
