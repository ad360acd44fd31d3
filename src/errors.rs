//! Engine error kinds
//!
//! Every fallible engine operation returns one of these variants. None of them is
//! fatal to the process: each aborts only the operation that raised it, and the
//! engine validates before it mutates, so the aggregates are left exactly as they
//! were before the call.

use crate::artifacts::objects::digest::Digest;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("no branch named '{0}' exists")]
    NoSuchBranch(String),

    #[error("no commit with id '{0}' exists")]
    NoSuchCommit(String),

    #[error("commit id prefix '{prefix}' is ambiguous: {candidates:?}")]
    AmbiguousCommit {
        prefix: String,
        candidates: Vec<String>,
    },

    #[error("a branch named '{0}' already exists")]
    AlreadyExistsBranch(String),

    #[error("cannot delete the current branch '{0}'")]
    DeleteCurrentBranch(String),

    #[error("invalid branch name: '{0}'")]
    InvalidBranchName(String),

    #[error("'{0}' is not staged")]
    NotStaged(String),

    #[error("merge conflict in '{0}'")]
    MergeConflict(String),

    /// Only possible in a graph with more than one root, e.g. hand-edited history.
    #[error("commits '{0}' and '{1}' share no common ancestor")]
    NoCommonAncestor(String, String),

    /// The branch being merged is already an ancestor of the current branch.
    #[error("cannot merge '{0}': it is an ancestor of the current branch")]
    ReverseMerge(String),

    #[error("no stored content for digest {0}")]
    ContentNotFound(Digest),

    #[error("storage failure at '{path}': {source}")]
    Storage {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl EngineError {
    pub(crate) fn storage(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        EngineError::Storage {
            path: path.into(),
            source,
        }
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
