//! Selection rules deciding which history entries count as versions.

use globset::{Glob, GlobSet, GlobSetBuilder};
use regex::Regex;

use super::history::HistoryEntry;
use crate::error::{ResourceError, Result};

/// Predicate over a history entry.
///
/// Implementations compile their patterns once at construction and are pure afterwards.
pub trait Selector {
    fn matches(&self, entry: &HistoryEntry) -> bool;
}

/// Matches tag names against a regular expression (unanchored unless the pattern anchors itself)
#[derive(Debug, Clone)]
pub struct TagSelector {
    regex: Regex,
}

impl TagSelector {
    pub fn new(pattern: &str) -> Result<Self> {
        let regex = Regex::new(pattern).map_err(|e| ResourceError::pattern(pattern, e))?;
        Ok(TagSelector { regex })
    }
}

impl Selector for TagSelector {
    fn matches(&self, entry: &HistoryEntry) -> bool {
        self.regex.is_match(entry.reference().as_str())
    }
}

/// Matches commits that touched at least one path matching any of the globs.
///
/// With no globs configured every entry matches.
#[derive(Debug, Clone)]
pub struct PathSelector {
    globs: Option<GlobSet>,
}

impl PathSelector {
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self> {
        if patterns.is_empty() {
            return Ok(PathSelector { globs: None });
        }

        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            let pattern = pattern.as_ref();
            let glob = Glob::new(pattern).map_err(|e| ResourceError::pattern(pattern, e))?;
            builder.add(glob);
        }

        let globs = builder
            .build()
            .map_err(|e| ResourceError::pattern(join_patterns(patterns), e))?;

        Ok(PathSelector { globs: Some(globs) })
    }
}

fn join_patterns<S: AsRef<str>>(patterns: &[S]) -> String {
    patterns
        .iter()
        .map(|p| p.as_ref())
        .collect::<Vec<_>>()
        .join(", ")
}

impl Selector for PathSelector {
    fn matches(&self, entry: &HistoryEntry) -> bool {
        match &self.globs {
            None => true,
            Some(globs) => entry.files().any(|file| globs.is_match(file)),
        }
    }
}

/// Which selector to build, decided once when the request is parsed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectorConfig {
    /// Enumerate tags whose names match the regular expression
    Tags(String),
    /// Enumerate commits touching the given globs (all commits when empty)
    Paths(Vec<String>),
}

impl SelectorConfig {
    /// Compile the configured patterns, failing on the first invalid one
    pub fn build(&self) -> Result<Box<dyn Selector>> {
        match self {
            SelectorConfig::Tags(pattern) => Ok(Box::new(TagSelector::new(pattern)?)),
            SelectorConfig::Paths(patterns) => {
                Ok(Box::new(PathSelector::new(patterns.as_slice())?))
            }
        }
    }

    pub fn is_tag_mode(&self) -> bool {
        matches!(self, SelectorConfig::Tags(_))
    }
}
