//! Staging area
//!
//! The pending-commit index: maps a working-tree-relative file name to the digest
//! of the version intended for the next commit, and records the committed names
//! the next commit should drop. It is not content-addressed itself, and it is
//! cleared whenever the working tree is resynchronised to a commit (commit,
//! checkout, merge, reset).

use crate::artifacts::objects::commit::Snapshot;
use crate::artifacts::objects::digest::Digest;
use crate::errors::{EngineError, EngineResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StagingArea {
    /// Staged file names mapped to their intended digests
    tracking: Snapshot,
    /// Names to leave out of the next commit
    #[serde(default)]
    removed: BTreeSet<String>,
}

impl StagingArea {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage each name, replacing any digest previously staged under it
    ///
    /// Staging a name also cancels a pending removal of it.
    pub fn track<I>(&mut self, files: I)
    where
        I: IntoIterator<Item = (String, Digest)>,
    {
        for (name, digest) in files {
            debug!(file = %name, digest = %digest, "staged");
            self.removed.remove(&name);
            self.tracking.insert(name, digest);
        }
    }

    /// Mark a name for removal from the next commit
    ///
    /// Any digest staged under the name is dropped and returned.
    pub fn stage_removal(&mut self, name: &str) -> Option<Digest> {
        debug!(file = %name, "staged removal");
        self.removed.insert(name.to_string());
        self.tracking.remove(name)
    }

    pub fn is_removed(&self, name: &str) -> bool {
        self.removed.contains(name)
    }

    pub fn removals(&self) -> impl Iterator<Item = &String> {
        self.removed.iter()
    }

    /// Remove a staged name, returning the digest it was staged with
    pub fn untrack(&mut self, name: &str) -> EngineResult<Digest> {
        self.tracking
            .remove(name)
            .ok_or_else(|| EngineError::NotStaged(name.to_string()))
    }

    pub fn get(&self, name: &str) -> Option<&Digest> {
        self.tracking.get(name)
    }

    /// A copy of the staged mapping, safe to hand to a new commit
    pub fn snapshot(&self) -> Snapshot {
        self.tracking.clone()
    }

    pub fn entries(&self) -> impl Iterator<Item = (&String, &Digest)> {
        self.tracking.iter()
    }

    pub fn count(&self) -> usize {
        self.tracking.len()
    }

    /// Nothing staged and no removal pending
    pub fn is_empty(&self) -> bool {
        self.tracking.is_empty() && self.removed.is_empty()
    }

    pub fn clear(&mut self) {
        self.tracking.clear();
        self.removed.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;

    fn digest(seed: char) -> Digest {
        Digest::try_parse(seed.to_string().repeat(40)).unwrap()
    }

    #[fixture]
    fn staged() -> StagingArea {
        let mut staging = StagingArea::new();
        staging.track([
            ("a.txt".to_string(), digest('1')),
            ("dir/b.txt".to_string(), digest('2')),
        ]);
        staging
    }

    #[rstest]
    fn untrack_returns_staged_digest_once(mut staged: StagingArea) {
        assert_eq!(staged.untrack("a.txt").unwrap(), digest('1'));
        assert_eq!(staged.get("a.txt"), None);
        assert_eq!(staged.count(), 1);

        assert!(matches!(
            staged.untrack("a.txt"),
            Err(EngineError::NotStaged(name)) if name == "a.txt"
        ));
    }

    #[rstest]
    fn restaging_replaces_digest(mut staged: StagingArea) {
        staged.track([("a.txt".to_string(), digest('9'))]);

        assert_eq!(staged.get("a.txt"), Some(&digest('9')));
        assert_eq!(staged.count(), 2);
    }

    #[rstest]
    fn snapshot_is_detached_from_later_changes(mut staged: StagingArea) {
        let snapshot = staged.snapshot();
        staged.clear();

        assert!(staged.is_empty());
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.get("dir/b.txt"), Some(&digest('2')));
    }

    #[rstest]
    fn staged_removal_drops_entry_until_restaged(mut staged: StagingArea) {
        assert_eq!(staged.stage_removal("a.txt"), Some(digest('1')));
        assert_eq!(staged.stage_removal("committed.txt"), None);

        assert_eq!(staged.get("a.txt"), None);
        assert_eq!(
            staged.removals().collect::<Vec<_>>(),
            vec!["a.txt", "committed.txt"]
        );

        staged.track([("a.txt".to_string(), digest('3'))]);

        assert!(!staged.is_removed("a.txt"));
        assert!(staged.is_removed("committed.txt"));
    }

    #[rstest]
    fn pending_removal_keeps_area_non_empty() {
        let mut staging = StagingArea::new();
        staging.stage_removal("a.txt");

        assert_eq!(staging.count(), 0);
        assert!(!staging.is_empty());

        staging.clear();
        assert!(staging.is_empty());
    }

    #[test]
    fn documents_without_removals_still_load() {
        let staging: StagingArea = serde_json::from_str(r#"{"tracking": {}}"#).unwrap();

        assert!(staging.is_empty());
    }
}
