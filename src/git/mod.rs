//! History provider abstraction
//!
//! The version enumerator never talks to git directly. It consumes the
//! newest-first sequences produced by a [HistoryProvider]:
//!
//! - [repository::Git2Repository]: an on-disk mirror of the remote kept in sync with `git2`
//! - [mock::MockRepository]: an in-memory history for tests
//!
//! ```rust
//! # use git_resource::git::{HistoryProvider, MockRepository};
//! # use git_resource::domain::SelectorConfig;
//! let repo = MockRepository::new().tag("v1.0").tag("v1.1");
//! let mut history = repo.history(&SelectorConfig::Tags("^v".into())).unwrap();
//! let newest = history.next().unwrap().unwrap();
//! assert_eq!(newest.reference().as_str(), "v1.1");
//! ```

pub mod mock;
pub mod repository;

pub use mock::MockRepository;
pub use repository::{Git2Repository, RepositoryParams};

use std::collections::BTreeSet;

use crate::domain::{HistoryEntry, SelectorConfig};
use crate::error::Result;

/// Commit information needed for path filtering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitInfo {
    /// The full commit hash
    pub id: String,
    /// Paths changed by the commit relative to its first parent
    pub files: BTreeSet<String>,
}

impl From<CommitInfo> for HistoryEntry {
    fn from(commit: CommitInfo) -> Self {
        HistoryEntry::Commit {
            id: commit.id.into(),
            files: commit.files,
        }
    }
}

/// Lazily produced commits; each item is computed only when pulled
pub type Commits<'a> = Box<dyn Iterator<Item = Result<CommitInfo>> + 'a>;

/// Lazily produced history entries, newest first
pub type History<'a> = Box<dyn Iterator<Item = Result<HistoryEntry>> + 'a>;

/// Source of newest-first history for one branch.
///
/// Implementations read from already synchronized data; fetching happens
/// before enumeration starts.
pub trait HistoryProvider {
    /// All tag names, most recently created first
    fn list_tags(&self) -> Result<Vec<String>>;

    /// Commits reachable from the branch head, newest first.
    ///
    /// Changed paths are only computed when `with_files` is set; otherwise
    /// every commit carries an empty file set.
    fn list_commits(&self, with_files: bool) -> Result<Commits<'_>>;

    /// Tags in tag mode, commits otherwise
    fn history(&self, config: &SelectorConfig) -> Result<History<'_>> {
        match config {
            SelectorConfig::Tags(_) => Ok(Box::new(
                self.list_tags()?
                    .into_iter()
                    .map(|name| Ok(HistoryEntry::tag(name))),
            )),
            SelectorConfig::Paths(patterns) => Ok(Box::new(
                self.list_commits(!patterns.is_empty())?
                    .map(|commit| commit.map(HistoryEntry::from)),
            )),
        }
    }
}
