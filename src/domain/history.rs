use std::collections::BTreeSet;

use super::version::VersionRef;

/// One item read from a history provider.
///
/// Tags carry only their name; commits carry the set of paths they changed,
/// which the path selector matches against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryEntry {
    Tag(VersionRef),
    Commit {
        id: VersionRef,
        files: BTreeSet<String>,
    },
}

impl HistoryEntry {
    pub fn tag(name: impl Into<VersionRef>) -> Self {
        HistoryEntry::Tag(name.into())
    }

    pub fn commit<I, S>(id: impl Into<VersionRef>, files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        HistoryEntry::Commit {
            id: id.into(),
            files: files.into_iter().map(Into::into).collect(),
        }
    }

    /// The reference this entry would be reported as
    pub fn reference(&self) -> &VersionRef {
        match self {
            HistoryEntry::Tag(name) => name,
            HistoryEntry::Commit { id, .. } => id,
        }
    }

    /// Changed paths; empty for tags
    pub fn files(&self) -> impl Iterator<Item = &str> {
        let files = match self {
            HistoryEntry::Tag(_) => None,
            HistoryEntry::Commit { files, .. } => Some(files),
        };
        files.into_iter().flatten().map(String::as_str)
    }
}
