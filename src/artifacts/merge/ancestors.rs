//! Lowest common ancestor search over the commit DAG
//!
//! ## Algorithm
//!
//! 1. Collect the full ancestor set of each input commit (the commit itself
//!    included) with a breadth-first walk that follows *every* parent edge, so the
//!    second parent of a merge commit is never skipped.
//! 2. Intersect the two sets.
//! 3. Pick the element with the greatest generation number (longest distance from
//!    the root). Ties are broken by the smallest commit id.
//!
//! A commit with the greatest generation in the intersection can never be an
//! ancestor of another common ancestor, because every descendant has a strictly
//! greater generation. Searching downward from a single root and counting
//! matches per subtree is only correct while the graph is still a tree; it
//! miscounts as soon as a merge commit gives a node two paths to the root.
//!
//! The finder knows nothing about where commits live: it is handed a loader
//! closure, which keeps it usable over the in-memory graph and over test fixtures.

use crate::artifacts::objects::commit::CommitId;
use std::collections::{HashSet, VecDeque};
use tracing::debug;

/// Minimal view of a commit needed for ancestry queries
#[derive(Debug, Clone)]
pub struct SlimCommit<'c> {
    pub id: &'c CommitId,
    pub parents: Vec<&'c CommitId>,
    pub generation: u32,
}

pub struct AncestorFinder<'c, CommitLoaderFn>
where
    CommitLoaderFn: Fn(&CommitId) -> Option<SlimCommit<'c>>,
{
    /// Returns `None` for ids unknown to the backing store
    commit_loader: CommitLoaderFn,
    _marker: std::marker::PhantomData<&'c ()>,
}

impl<'c, CommitLoaderFn> AncestorFinder<'c, CommitLoaderFn>
where
    CommitLoaderFn: Fn(&CommitId) -> Option<SlimCommit<'c>>,
{
    pub fn new(commit_loader: CommitLoaderFn) -> Self {
        Self {
            commit_loader,
            _marker: std::marker::PhantomData,
        }
    }

    /// Every commit reachable from `start` through parent edges, `start` included
    pub fn ancestors(&self, start: &CommitId) -> HashSet<CommitId> {
        let mut visited = HashSet::new();
        let mut queue = VecDeque::from([start.clone()]);

        while let Some(commit_id) = queue.pop_front() {
            let Some(commit) = (self.commit_loader)(&commit_id) else {
                continue;
            };
            if !visited.insert(commit_id) {
                continue;
            }

            for parent_id in commit.parents {
                if !visited.contains(parent_id) {
                    queue.push_back(parent_id.clone());
                }
            }
        }

        visited
    }

    /// Whether `ancestor` is reachable from `descendant` (a commit is its own ancestor)
    pub fn is_ancestor(&self, ancestor: &CommitId, descendant: &CommitId) -> bool {
        self.ancestors(descendant).contains(ancestor)
    }

    /// Deepest commit reachable from both `a` and `b`
    ///
    /// Returns `None` if either id is unknown or the two histories share no commit.
    pub fn find_lowest_common_ancestor(&self, a: &CommitId, b: &CommitId) -> Option<CommitId> {
        if a == b {
            return (self.commit_loader)(a).map(|commit| commit.id.clone());
        }

        let ancestors_of_a = self.ancestors(a);
        let ancestors_of_b = self.ancestors(b);

        debug!(
            source = %a,
            target = %b,
            source_ancestors = ancestors_of_a.len(),
            target_ancestors = ancestors_of_b.len(),
            "collected ancestor sets"
        );

        let lowest = ancestors_of_a
            .intersection(&ancestors_of_b)
            .filter_map(|commit_id| {
                (self.commit_loader)(commit_id).map(|commit| (commit.generation, commit_id))
            })
            .max_by(|(left_generation, left_id), (right_generation, right_id)| {
                left_generation
                    .cmp(right_generation)
                    .then_with(|| right_id.cmp(left_id))
            })
            .map(|(_, commit_id)| commit_id.clone());

        debug!(source = %a, target = %b, lca = ?lowest, "lowest common ancestor");

        lowest
    }
}
