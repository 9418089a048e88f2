use crate::error::Result;
use crate::git::{CommitInfo, Commits, HistoryProvider};

/// In-memory history for testing without a git mirror.
///
/// Tags and commits are recorded in creation order and listed newest first.
#[derive(Debug, Clone, Default)]
pub struct MockRepository {
    tags: Vec<String>,
    commits: Vec<CommitInfo>,
}

impl MockRepository {
    /// Create a new empty mock repository
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a tag created after all previous ones
    pub fn tag(mut self, name: impl Into<String>) -> Self {
        self.tags.push(name.into());
        self
    }

    /// Record a commit on top of the branch, touching `files`
    pub fn commit<I, S>(mut self, id: impl Into<String>, files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.commits.push(CommitInfo {
            id: id.into(),
            files: files.into_iter().map(Into::into).collect(),
        });
        self
    }
}

impl HistoryProvider for MockRepository {
    fn list_tags(&self) -> Result<Vec<String>> {
        Ok(self.tags.iter().rev().cloned().collect())
    }

    fn list_commits(&self, with_files: bool) -> Result<Commits<'_>> {
        Ok(Box::new(self.commits.iter().rev().map(move |commit| {
            let mut commit = commit.clone();
            if !with_files {
                commit.files.clear();
            }
            Ok(commit)
        })))
    }
}
