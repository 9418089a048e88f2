use serde::{Deserialize, Serialize};
use std::io::Read;

use crate::domain::{SelectorConfig, Version, VersionRef};
use crate::error::{ResourceError, Result};

/// Returns the branch tracked when the source does not name one.
fn default_branch() -> String {
    "master".to_string()
}

/// Source configuration of the resource, as declared in the pipeline.
///
/// Credentials are passed through untouched to the repository client.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Source {
    pub url: String,

    #[serde(default = "default_branch")]
    pub branch: String,

    #[serde(default)]
    pub login: Option<String>,

    #[serde(default)]
    pub password: Option<String>,

    #[serde(default)]
    pub private_key: Option<String>,

    #[serde(default)]
    pub tag_regex: Option<String>,

    #[serde(default)]
    pub paths: Vec<String>,
}

impl Source {
    /// Decides between tag and path-filter mode.
    ///
    /// A non-empty `tag_regex` selects tag mode; anything else falls back to
    /// filtering commits by `paths`, which matches every commit when empty.
    pub fn selector_config(&self) -> SelectorConfig {
        match self.tag_regex.as_deref() {
            Some(pattern) if !pattern.is_empty() => SelectorConfig::Tags(pattern.to_string()),
            _ => SelectorConfig::Paths(self.paths.clone()),
        }
    }
}

/// Request handed to `check` on stdin.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct CheckRequest {
    pub source: Source,

    #[serde(default)]
    pub version: Option<Version>,
}

impl CheckRequest {
    /// Parses and validates a request document.
    ///
    /// # Returns
    /// * `Ok(CheckRequest)` - Parsed request
    /// * `Err` - If the document is not valid JSON or misses required fields
    pub fn from_json(input: &str) -> Result<Self> {
        let request: CheckRequest = serde_json::from_str(input)
            .map_err(|e| ResourceError::config(format!("Cannot parse request: {}", e)))?;

        if request.source.url.trim().is_empty() {
            return Err(ResourceError::config("source.url must not be empty"));
        }
        if request.source.branch.trim().is_empty() {
            return Err(ResourceError::config("source.branch must not be empty"));
        }

        Ok(request)
    }

    /// Reads a request from any reader (stdin in production).
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self> {
        let mut input = String::new();
        reader.read_to_string(&mut input)?;
        Self::from_json(&input)
    }

    /// The last version the caller knows about; an empty reference counts as none.
    pub fn cursor(&self) -> Option<&VersionRef> {
        self.version
            .as_ref()
            .map(|v| &v.reference)
            .filter(|r| !r.as_str().is_empty())
    }
}
