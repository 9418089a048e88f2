use tracing::debug;

use super::history::HistoryEntry;
use super::selector::Selector;
use super::version::VersionRef;

/// Compute the versions that appeared since `cursor`, oldest first.
///
/// `history` must yield entries newest first. Every entry the selector accepts is
/// collected until the entry whose reference equals the cursor has been seen; that
/// entry is the last one considered and is itself included when it matches. Without
/// a cursor, or when the cursor never shows up, the whole history is collected.
pub fn enumerate<I>(
    history: I,
    selector: &dyn Selector,
    cursor: Option<&VersionRef>,
) -> Vec<VersionRef>
where
    I: IntoIterator<Item = HistoryEntry>,
{
    let mut collected = Vec::new();
    let mut scanned = 0usize;
    let mut cursor_found = false;

    for entry in history {
        scanned += 1;

        let reached_cursor = cursor == Some(entry.reference());

        if selector.matches(&entry) {
            collected.push(into_reference(entry));
        }

        if reached_cursor {
            cursor_found = true;
            break;
        }
    }

    collected.reverse();

    debug!(
        scanned,
        collected = collected.len(),
        cursor_found,
        "enumerated history"
    );

    collected
}

fn into_reference(entry: HistoryEntry) -> VersionRef {
    match entry {
        HistoryEntry::Tag(name) => name,
        HistoryEntry::Commit { id, .. } => id,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::selector::{PathSelector, TagSelector};

    fn refs(names: &[&str]) -> Vec<VersionRef> {
        names.iter().map(|n| VersionRef::new(*n)).collect()
    }

    fn sample_commits() -> Vec<HistoryEntry> {
        vec![
            HistoryEntry::commit("c5", ["a.txt"]),
            HistoryEntry::commit("c4", ["b.txt"]),
            HistoryEntry::commit("c3", ["a.txt"]),
            HistoryEntry::commit("c2", ["c.txt"]),
            HistoryEntry::commit("c1", ["a.txt"]),
        ]
    }

    #[test]
    fn test_path_mode_truncates_at_cursor_inclusive() {
        let selector = PathSelector::new(&["a.txt"]).unwrap();
        let cursor = VersionRef::new("c3");

        let result = enumerate(sample_commits(), &selector, Some(&cursor));

        assert_eq!(result, refs(&["c3", "c5"]));
    }

    #[test]
    fn test_tag_mode_first_run() {
        let selector = TagSelector::new(r"^v2\.\d+$").unwrap();
        let history = vec![
            HistoryEntry::tag("v2.1"),
            HistoryEntry::tag("v2.0-rc"),
            HistoryEntry::tag("v2.0"),
        ];

        let result = enumerate(history, &selector, None);

        assert_eq!(result, refs(&["v2.0", "v2.1"]));
    }

    #[test]
    fn test_first_run_returns_all_matches_oldest_first() {
        let selector = PathSelector::new(&["a.txt"]).unwrap();

        let result = enumerate(sample_commits(), &selector, None);

        assert_eq!(result, refs(&["c1", "c3", "c5"]));
    }

    #[test]
    fn test_unknown_cursor_is_full_backfill() {
        let selector = PathSelector::new::<&str>(&[]).unwrap();
        let cursor = VersionRef::new("deadbeef");

        let with_unknown = enumerate(sample_commits(), &selector, Some(&cursor));
        let first_run = enumerate(sample_commits(), &selector, None);

        assert_eq!(with_unknown, first_run);
        assert_eq!(with_unknown, refs(&["c1", "c2", "c3", "c4", "c5"]));
    }

    #[test]
    fn test_cursor_stops_walk_even_when_not_matching() {
        let selector = PathSelector::new(&["a.txt"]).unwrap();
        let cursor = VersionRef::new("c4");

        let result = enumerate(sample_commits(), &selector, Some(&cursor));

        assert_eq!(result, refs(&["c5"]));
    }

    #[test]
    fn test_cursor_at_head_returns_only_head_when_matching() {
        let selector = PathSelector::new(&["a.txt"]).unwrap();
        let cursor = VersionRef::new("c5");

        let result = enumerate(sample_commits(), &selector, Some(&cursor));

        assert_eq!(result, refs(&["c5"]));
    }

    #[test]
    fn test_cursor_at_non_matching_head_returns_empty() {
        let selector = PathSelector::new(&["c.txt"]).unwrap();
        let history = vec![
            HistoryEntry::commit("c2", ["a.txt"]),
            HistoryEntry::commit("c1", ["c.txt"]),
        ];
        let cursor = VersionRef::new("c2");

        assert!(enumerate(history, &selector, Some(&cursor)).is_empty());
    }

    #[test]
    fn test_no_matching_tags_is_empty() {
        let selector = TagSelector::new("^release-").unwrap();
        let history = vec![HistoryEntry::tag("v2"), HistoryEntry::tag("v1")];

        assert!(enumerate(history, &selector, None).is_empty());
    }

    #[test]
    fn test_no_matching_paths_is_empty() {
        let selector = PathSelector::new(&["docs/**"]).unwrap();

        assert!(enumerate(sample_commits(), &selector, None).is_empty());
    }

    #[test]
    fn test_empty_history_is_empty() {
        let selector = PathSelector::new::<&str>(&[]).unwrap();
        let cursor = VersionRef::new("c1");

        assert!(enumerate(Vec::new(), &selector, Some(&cursor)).is_empty());
        assert!(enumerate(Vec::new(), &selector, None).is_empty());
    }

    #[test]
    fn test_result_is_strictly_oldest_to_newest() {
        let history: Vec<HistoryEntry> = (0..20)
            .rev()
            .map(|i| HistoryEntry::commit(format!("c{}", i), [format!("f{}.txt", i % 3)]))
            .collect();
        let positions: Vec<VersionRef> = history.iter().map(|e| e.reference().clone()).collect();
        let selector = PathSelector::new(&["f0.txt", "f2.txt"]).unwrap();

        let result = enumerate(history, &selector, None);

        assert!(!result.is_empty());
        let indices: Vec<usize> = result
            .iter()
            .map(|r| positions.iter().position(|p| p == r).unwrap())
            .collect();
        for pair in indices.windows(2) {
            assert!(pair[0] > pair[1], "not oldest first: {:?}", indices);
        }
    }

    #[test]
    fn test_nothing_older_than_cursor_is_included() {
        let selector = PathSelector::new::<&str>(&[]).unwrap();
        let cursor = VersionRef::new("c3");

        let result = enumerate(sample_commits(), &selector, Some(&cursor));

        assert_eq!(result, refs(&["c3", "c4", "c5"]));
        assert!(!result.contains(&VersionRef::new("c2")));
        assert!(!result.contains(&VersionRef::new("c1")));
    }

    #[test]
    fn test_walk_does_not_pull_past_cursor() {
        let selector = PathSelector::new::<&str>(&[]).unwrap();
        let cursor = VersionRef::new("c4");
        let mut pulled = 0;
        let history = sample_commits().into_iter().inspect(|_| pulled += 1);

        enumerate(history, &selector, Some(&cursor));

        assert_eq!(pulled, 2);
    }
}
