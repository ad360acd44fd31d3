//! Three-way reconciliation of commit snapshots
//!
//! Given the snapshot of the lowest common ancestor (`base`) and the two sides
//! being merged (`current` and `other`), every file name present in any of the
//! three is resolved independently:
//!
//! | base | current          | other            | result            |
//! |------|------------------|------------------|-------------------|
//! | x    | x                | x                | x                 |
//! | x    | y                | x                | y                 |
//! | x    | x                | y                | y                 |
//! | x    | y                | y                | y                 |
//! | x    | y                | z                | conflict          |
//! | x    | any              | absent           | current           |
//! | x    | absent           | any              | other             |
//! | x    | absent           | absent           | dropped           |
//! | -    | y                | absent or y      | y                 |
//! | -    | absent           | z                | z                 |
//! | -    | y                | z                | conflict          |
//!
//! Names are visited in sorted order and the first conflict aborts the whole
//! reconciliation, so the reported file is deterministic and no partial result
//! ever escapes.

use crate::artifacts::objects::commit::Snapshot;
use crate::artifacts::objects::digest::Digest;
use crate::errors::EngineError;
use std::collections::BTreeSet;
use tracing::debug;

pub fn reconcile(
    base: &Snapshot,
    current: &Snapshot,
    other: &Snapshot,
) -> Result<Snapshot, EngineError> {
    let file_names = base
        .keys()
        .chain(current.keys())
        .chain(other.keys())
        .collect::<BTreeSet<_>>();

    let mut merged = Snapshot::new();
    for file_name in file_names {
        let resolved = resolve_file(
            file_name,
            base.get(file_name),
            current.get(file_name),
            other.get(file_name),
        )?;

        if let Some(digest) = resolved {
            merged.insert(file_name.clone(), digest.clone());
        }
    }

    Ok(merged)
}

fn resolve_file<'s>(
    file_name: &str,
    base: Option<&'s Digest>,
    current: Option<&'s Digest>,
    other: Option<&'s Digest>,
) -> Result<Option<&'s Digest>, EngineError> {
    let resolved = match (base, current, other) {
        (Some(base), Some(current), Some(other)) => {
            if current == base {
                Some(other)
            } else if other == base || current == other {
                Some(current)
            } else {
                return Err(EngineError::MergeConflict(file_name.to_string()));
            }
        }
        (Some(_), Some(current), None) => Some(current),
        (Some(_), None, Some(other)) => Some(other),
        (Some(_), None, None) => None,
        (None, Some(current), Some(other)) if current != other => {
            return Err(EngineError::MergeConflict(file_name.to_string()));
        }
        (None, Some(current), _) => Some(current),
        (None, None, Some(other)) => Some(other),
        (None, None, None) => None,
    };

    debug!(file = file_name, digest = ?resolved.map(Digest::to_short), "resolved");

    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use rstest::rstest;

    fn digest(seed: char) -> Digest {
        Digest::try_parse(seed.to_string().repeat(40)).unwrap()
    }

    fn snapshot(entries: &[(&str, char)]) -> Snapshot {
        entries
            .iter()
            .map(|(name, seed)| (name.to_string(), digest(*seed)))
            .collect()
    }

    #[rstest]
    #[case::unchanged(Some('1'), Some('1'), Some('1'), Some('1'))]
    #[case::only_current_changed(Some('1'), Some('2'), Some('1'), Some('2'))]
    #[case::only_other_changed(Some('1'), Some('1'), Some('3'), Some('3'))]
    #[case::both_changed_identically(Some('1'), Some('2'), Some('2'), Some('2'))]
    #[case::removed_in_other(Some('1'), Some('2'), None, Some('2'))]
    #[case::removed_in_current(Some('1'), None, Some('3'), Some('3'))]
    #[case::removed_in_both(Some('1'), None, None, None)]
    #[case::added_in_current(None, Some('2'), None, Some('2'))]
    #[case::added_in_other(None, None, Some('3'), Some('3'))]
    #[case::added_identically(None, Some('2'), Some('2'), Some('2'))]
    fn resolves_single_file(
        #[case] base: Option<char>,
        #[case] current: Option<char>,
        #[case] other: Option<char>,
        #[case] expected: Option<char>,
    ) {
        let as_snapshot = |seed: Option<char>| match seed {
            Some(seed) => snapshot(&[("f", seed)]),
            None => Snapshot::new(),
        };

        let merged = reconcile(
            &as_snapshot(base),
            &as_snapshot(current),
            &as_snapshot(other),
        )
        .unwrap();

        assert_eq!(merged, as_snapshot(expected));
    }

    #[rstest]
    #[case::both_modified(Some('1'), Some('2'), Some('3'))]
    #[case::both_added_differently(None, Some('2'), Some('3'))]
    fn conflicting_file_aborts(
        #[case] base: Option<char>,
        #[case] current: Option<char>,
        #[case] other: Option<char>,
    ) {
        let as_snapshot = |seed: Option<char>| match seed {
            Some(seed) => snapshot(&[("f1", seed)]),
            None => Snapshot::new(),
        };

        let result = reconcile(
            &as_snapshot(base),
            &as_snapshot(current),
            &as_snapshot(other),
        );

        assert!(matches!(result, Err(EngineError::MergeConflict(name)) if name == "f1"));
    }

    #[test]
    fn merges_independent_changes() {
        let base = snapshot(&[("f1", '1'), ("f2", '2')]);
        let current = snapshot(&[("f1", 'a'), ("f2", '2')]);
        let other = snapshot(&[("f1", '1'), ("f2", 'b')]);

        let merged = reconcile(&base, &current, &other).unwrap();

        assert_eq!(merged, snapshot(&[("f1", 'a'), ("f2", 'b')]));
    }

    #[test]
    fn reports_first_conflict_in_name_order() {
        let base = snapshot(&[("b.txt", '1'), ("a.txt", '1')]);
        let current = snapshot(&[("b.txt", '2'), ("a.txt", '2')]);
        let other = snapshot(&[("b.txt", '3'), ("a.txt", '3')]);

        let result = reconcile(&base, &current, &other);

        assert!(matches!(result, Err(EngineError::MergeConflict(name)) if name == "a.txt"));
    }

    fn arbitrary_snapshot() -> impl Strategy<Value = Snapshot> {
        proptest::collection::btree_map("[a-d]", prop::sample::select(vec!['1', '2', '3']), 0..4)
            .prop_map(|entries| {
                entries
                    .into_iter()
                    .map(|(name, seed)| (name, digest(seed)))
                    .collect()
            })
    }

    proptest! {
        #[test]
        fn swapping_sides_gives_same_result(
            base in arbitrary_snapshot(),
            current in arbitrary_snapshot(),
            other in arbitrary_snapshot(),
        ) {
            let forward = reconcile(&base, &current, &other);
            let backward = reconcile(&base, &other, &current);

            match (forward, backward) {
                (Ok(forward), Ok(backward)) => {
                    prop_assert_eq!(forward, backward);
                }
                (Err(EngineError::MergeConflict(a)), Err(EngineError::MergeConflict(b))) => {
                    prop_assert_eq!(a, b);
                }
                (forward, backward) => {
                    prop_assert!(false, "asymmetric outcome: {:?} vs {:?}", forward, backward);
                }
            }
        }

        #[test]
        fn unchanged_side_takes_other_but_keeps_its_deletions_out(
            base in arbitrary_snapshot(),
            other in arbitrary_snapshot(),
        ) {
            // a file only the other side deleted survives from the current side
            let mut expected = other.clone();
            for (name, digest) in &base {
                expected.entry(name.clone()).or_insert_with(|| digest.clone());
            }

            prop_assert_eq!(reconcile(&base, &base, &other).unwrap(), expected);
        }
    }
}
