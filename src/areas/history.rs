//! Commit graph
//!
//! Owns every commit, the branch table (branch name to commit id) and the name of
//! the current head branch. The graph is a rooted DAG: each commit has one parent
//! except the root (none) and merge commits (two).
//!
//! ## Invariants
//!
//! - every branch points at a commit present in the graph
//! - once the first commit exists, `head` names a branch present in the table
//! - parents are always created before their children
//! - commits are never mutated after creation; `children` is a derived index
//!
//! Every operation validates before it mutates, so a failed call leaves the graph
//! exactly as it found it. Merges compute the whole reconciled snapshot (or the
//! first conflict) before touching the branch table.

use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::merge::ancestors::{AncestorFinder, SlimCommit};
use crate::artifacts::merge::reconcile::reconcile;
use crate::artifacts::objects::commit::{
    Commit, CommitDraft, CommitId, CommitIdWidth, Signature, Snapshot,
};
use crate::artifacts::objects::digest::Digest;
use crate::artifacts::objects::hasher::ContentHasher;
use crate::errors::{EngineError, EngineResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{info, warn};

/// Result of a successful merge
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    /// Both branches already point at the same commit
    AlreadyUpToDate,
    /// The current branch was moved forward to the other branch's commit
    FastForward { from: CommitId, to: CommitId },
    /// A new two-parent commit was created and both branches moved to it
    Merged { commit: CommitId, base: CommitId },
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct CommitGraph {
    commits: BTreeMap<CommitId, Commit>,
    branches: BTreeMap<BranchName, CommitId>,
    head: BranchName,
    #[serde(skip)]
    id_width: CommitIdWidth,
}

impl CommitGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_id_width(id_width: CommitIdWidth) -> Self {
        CommitGraph {
            id_width,
            ..Self::default()
        }
    }

    pub fn id_width(&self) -> CommitIdWidth {
        self.id_width
    }

    pub(crate) fn set_id_width(&mut self, id_width: CommitIdWidth) {
        self.id_width = id_width;
    }

    pub fn is_empty(&self) -> bool {
        self.commits.is_empty()
    }

    pub fn len(&self) -> usize {
        self.commits.len()
    }

    /// Record a new commit on the current branch
    ///
    /// The very first commit becomes the root, creates the `master` branch and
    /// makes it the head. Every later commit takes the current branch's commit as
    /// its parent and advances the branch to itself. Whether there is anything new
    /// to commit is the caller's policy.
    pub fn commit(
        &mut self,
        hasher: &dyn ContentHasher,
        signature: Signature,
        message: &str,
        snapshot: Snapshot,
    ) -> EngineResult<&Commit> {
        let (parent, generation) = if self.is_empty() {
            self.head = BranchName::default();
            (None, 0)
        } else {
            let parent = self.head_commit()?;
            (Some(parent.id().clone()), parent.generation() + 1)
        };

        let draft = CommitDraft {
            signature,
            message: message.to_string(),
            parent,
            second_parent: None,
            files: snapshot,
            generation,
        };
        let commit_id = self.insert_commit(hasher, draft);
        self.branches.insert(self.head.clone(), commit_id.clone());

        info!(commit = %commit_id, branch = %self.head, "created commit");

        self.find_commit(&commit_id)
    }

    pub fn head_commit(&self) -> EngineResult<&Commit> {
        self.commit_by_branch(self.head.as_str())
    }

    pub fn current_branch(&self) -> &BranchName {
        &self.head
    }

    pub fn commit_by_branch(&self, branch: &str) -> EngineResult<&Commit> {
        let commit_id = self
            .branches
            .get(branch)
            .ok_or_else(|| EngineError::NoSuchBranch(branch.to_string()))?;

        self.find_commit(commit_id)
    }

    pub fn find_commit(&self, commit_id: &CommitId) -> EngineResult<&Commit> {
        self.commits
            .get(commit_id)
            .ok_or_else(|| EngineError::NoSuchCommit(commit_id.to_string()))
    }

    pub fn commits(&self) -> impl Iterator<Item = &Commit> {
        self.commits.values()
    }

    pub fn branches(&self) -> impl Iterator<Item = (&BranchName, &CommitId)> {
        self.branches.iter()
    }

    pub fn has_branch(&self, branch: &str) -> bool {
        self.branches.contains_key(branch)
    }

    /// Create a branch at the current head's commit
    pub fn add_branch(&mut self, branch: &str) -> EngineResult<()> {
        let branch_name = BranchName::try_parse(branch)?;
        if self.branches.contains_key(&branch_name) {
            return Err(EngineError::AlreadyExistsBranch(branch.to_string()));
        }
        let commit_id = self.head_commit()?.id().clone();

        info!(branch = %branch_name, commit = %commit_id, "created branch");
        self.branches.insert(branch_name, commit_id);

        Ok(())
    }

    /// Remove a branch; the commits it pointed at are left alone
    pub fn delete_branch(&mut self, branch: &str) -> EngineResult<CommitId> {
        if !self.branches.contains_key(branch) {
            return Err(EngineError::NoSuchBranch(branch.to_string()));
        }
        if self.head.as_str() == branch {
            return Err(EngineError::DeleteCurrentBranch(branch.to_string()));
        }

        info!(branch, "deleted branch");
        self.branches
            .remove(branch)
            .ok_or_else(|| EngineError::NoSuchBranch(branch.to_string()))
    }

    /// Make `branch` the head; the working tree is the caller's business
    pub fn switch_branch_to(&mut self, branch: &str) -> EngineResult<()> {
        let Some((branch_name, _)) = self.branches.get_key_value(branch) else {
            return Err(EngineError::NoSuchBranch(branch.to_string()));
        };

        self.head = branch_name.clone();
        info!(branch, "switched head");

        Ok(())
    }

    /// Point the current branch at any existing commit, regardless of ancestry
    pub fn reset_current_branch_to(&mut self, commit_id: &CommitId) -> EngineResult<()> {
        self.find_commit(commit_id)?;
        if !self.branches.contains_key(&self.head) {
            return Err(EngineError::NoSuchBranch(self.head.to_string()));
        }

        info!(branch = %self.head, commit = %commit_id, "reset branch");
        self.branches.insert(self.head.clone(), commit_id.clone());

        Ok(())
    }

    /// Resolve a full commit id or an unambiguous prefix of one
    pub fn resolve_commit(&self, prefix: &str) -> EngineResult<CommitId> {
        let prefix = prefix.to_ascii_lowercase();
        let candidates = self
            .commits
            .keys()
            .filter(|commit_id| commit_id.as_str().starts_with(&prefix))
            .collect::<Vec<_>>();

        if let Some(exact) = candidates.iter().find(|id| id.as_str() == prefix) {
            return Ok((*exact).clone());
        }

        match candidates.as_slice() {
            [] => Err(EngineError::NoSuchCommit(prefix)),
            [single] => Ok((*single).clone()),
            many => Err(EngineError::AmbiguousCommit {
                prefix,
                candidates: many.iter().map(|id| id.to_string()).collect(),
            }),
        }
    }

    /// Lowest common ancestor of two commits
    ///
    /// Equal ids return that commit directly. Otherwise the deepest commit found
    /// in both full ancestor sets wins, smallest id first on ties.
    pub fn find_common_ancestor(&self, a: &CommitId, b: &CommitId) -> EngineResult<&Commit> {
        self.find_commit(a)?;
        self.find_commit(b)?;

        let lca = self
            .ancestor_finder()
            .find_lowest_common_ancestor(a, b)
            .ok_or_else(|| EngineError::NoCommonAncestor(a.to_string(), b.to_string()))?;

        self.find_commit(&lca)
    }

    /// Whether `ancestor` is reachable from `descendant` through parent edges
    pub fn is_ancestor(&self, ancestor: &CommitId, descendant: &CommitId) -> bool {
        self.ancestor_finder().is_ancestor(ancestor, descendant)
    }

    /// Merge `other_branch` into the current branch
    ///
    /// Fast-forwards when the current commit is an ancestor of the other, refuses
    /// when the other is an ancestor of the current, and otherwise reconciles the
    /// three snapshots into a new merge commit that both branches then point at.
    pub fn merge_branch(
        &mut self,
        hasher: &dyn ContentHasher,
        signature: Signature,
        other_branch: &str,
    ) -> EngineResult<MergeOutcome> {
        let other_branch_name = BranchName::try_parse(other_branch)
            .map_err(|_| EngineError::NoSuchBranch(other_branch.to_string()))?;
        let other = self.commit_by_branch(other_branch)?;
        let current = self.head_commit()?;

        if current.id() == other.id() {
            return Ok(MergeOutcome::AlreadyUpToDate);
        }

        let base = self.find_common_ancestor(current.id(), other.id())?;

        if base.id() == other.id() {
            return Err(EngineError::ReverseMerge(other_branch.to_string()));
        }

        if base.id() == current.id() {
            let (from, to) = (current.id().clone(), other.id().clone());
            info!(branch = %self.head, from = %from, to = %to, "fast-forward");
            self.branches.insert(self.head.clone(), to.clone());

            return Ok(MergeOutcome::FastForward { from, to });
        }

        let files = reconcile(base.files(), current.files(), other.files())?;
        let base_id = base.id().clone();
        let draft = CommitDraft {
            signature,
            message: format!("Merged {} with {}.", self.head, other_branch),
            parent: Some(current.id().clone()),
            second_parent: Some(other.id().clone()),
            files,
            generation: current.generation().max(other.generation()) + 1,
        };

        let commit_id = self.insert_commit(hasher, draft);
        self.branches.insert(self.head.clone(), commit_id.clone());
        self.branches.insert(other_branch_name, commit_id.clone());

        info!(commit = %commit_id, base = %base_id, other = other_branch, "created merge commit");

        Ok(MergeOutcome::Merged {
            commit: commit_id,
            base: base_id,
        })
    }

    /// Commits reachable from head by following first parents only, newest first
    pub fn first_parent_history(&self) -> impl Iterator<Item = &Commit> {
        std::iter::successors(self.head_commit().ok(), |commit| {
            commit
                .parent()
                .and_then(|parent| self.commits.get(parent))
        })
    }

    /// Whether any commit snapshot still refers to `digest`
    pub fn references_digest(&self, digest: &Digest) -> bool {
        self.commits
            .values()
            .any(|commit| commit.files().values().any(|d| d == digest))
    }

    /// Check the structural invariants, e.g. after loading persisted state
    pub fn verify(&self) -> EngineResult<()> {
        if self.is_empty() {
            return match self.branches.keys().next() {
                Some(branch) => Err(EngineError::NoSuchBranch(branch.to_string())),
                None => Ok(()),
            };
        }

        for commit_id in self.branches.values() {
            self.find_commit(commit_id)?;
        }
        if !self.branches.contains_key(&self.head) {
            return Err(EngineError::NoSuchBranch(self.head.to_string()));
        }
        for commit in self.commits.values() {
            for parent in commit.parents() {
                self.find_commit(parent)?;
            }
        }

        Ok(())
    }

    /// Rebuild every commit's children from parent pointers
    pub(crate) fn rebuild_children(&mut self) {
        let mut edges = self
            .commits
            .values()
            .flat_map(|commit| {
                commit
                    .parents()
                    .map(|parent| (commit.timestamp(), parent.clone(), commit.id().clone()))
            })
            .collect::<Vec<_>>();
        edges.sort();

        self.commits.values_mut().for_each(Commit::clear_children);
        for (_, parent, child) in edges {
            if let Some(parent) = self.commits.get_mut(&parent) {
                parent.add_child(child);
            }
        }
    }

    fn insert_commit(&mut self, hasher: &dyn ContentHasher, draft: CommitDraft) -> CommitId {
        let mut salt = 0;
        let commit_id = loop {
            let candidate = draft.derive_id(hasher, self.id_width, salt);
            if !self.commits.contains_key(&candidate) {
                break candidate;
            }
            warn!(commit = %candidate, salt, "truncated commit id already taken, re-deriving");
            salt += 1;
        };

        let parents = draft
            .parent
            .iter()
            .chain(draft.second_parent.iter())
            .cloned()
            .collect::<Vec<_>>();
        for parent in parents {
            if let Some(parent) = self.commits.get_mut(&parent) {
                parent.add_child(commit_id.clone());
            }
        }

        self.commits
            .insert(commit_id.clone(), draft.into_commit(commit_id.clone()));

        commit_id
    }

    fn ancestor_finder<'g>(
        &'g self,
    ) -> AncestorFinder<'g, impl Fn(&CommitId) -> Option<SlimCommit<'g>> + 'g> {
        AncestorFinder::new(|commit_id: &CommitId| {
            self.commits.get(commit_id).map(|commit| SlimCommit {
                id: commit.id(),
                parents: commit.parents().collect(),
                generation: commit.generation(),
            })
        })
    }
}
