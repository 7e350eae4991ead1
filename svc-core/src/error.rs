use std::path::PathBuf;

use thiserror::Error;

use crate::models::{BlobHandle, CommitHandle};

pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification of every [`Error`], used by callers that only care
/// about which class of failure occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidArgument,
    NotFound,
    Conflict,
    Dirty,
    IoFailure,
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid branch name: {0:?}")]
    InvalidBranchName(String),

    #[error("Commit not found: {0}")]
    CommitNotFound(String),

    #[error("Branch not found: {0}")]
    BranchNotFound(String),

    #[error("File not tracked: {0}")]
    FileNotTracked(String),

    #[error("Blob not found: {0}")]
    BlobNotFound(BlobHandle),

    #[error("Commit handle out of range: {0}")]
    DanglingCommit(CommitHandle),

    #[error("File already tracked: {0}")]
    AlreadyTracked(String),

    #[error("Branch already exists: {0}")]
    BranchAlreadyExists(String),

    #[error("Cannot merge branch {0} into itself")]
    SelfMerge(String),

    #[error("Branch {0} has no commits and the history already has a root")]
    UnbornBranch(String),

    #[error("Uncommitted changes on branch {0}")]
    UncommittedChanges(String),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Io { .. } => ErrorKind::IoFailure,
            Error::InvalidArgument(_) | Error::InvalidBranchName(_) => ErrorKind::InvalidArgument,
            Error::CommitNotFound(_)
            | Error::BranchNotFound(_)
            | Error::FileNotTracked(_)
            | Error::BlobNotFound(_)
            | Error::DanglingCommit(_) => ErrorKind::NotFound,
            Error::AlreadyTracked(_)
            | Error::BranchAlreadyExists(_)
            | Error::SelfMerge(_)
            | Error::UnbornBranch(_) => ErrorKind::Conflict,
            Error::UncommittedChanges(_) => ErrorKind::Dirty,
        }
    }
}
