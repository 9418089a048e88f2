use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier of one discoverable point in history (a tag name or a commit id).
///
/// Equality is exact string equality; no normalisation (case, short hashes) is applied.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VersionRef(String);

impl VersionRef {
    /// Create a new reference from a string
    pub fn new(reference: impl Into<String>) -> Self {
        VersionRef(reference.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VersionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for VersionRef {
    fn from(s: &str) -> Self {
        VersionRef::new(s)
    }
}

impl From<String> for VersionRef {
    fn from(s: String) -> Self {
        VersionRef(s)
    }
}

/// Version record exchanged with the orchestrator: `{"ref": "<reference>"}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Version {
    #[serde(rename = "ref")]
    pub reference: VersionRef,
}

impl Version {
    pub fn new(reference: impl Into<VersionRef>) -> Self {
        Version {
            reference: reference.into(),
        }
    }
}

impl From<VersionRef> for Version {
    fn from(reference: VersionRef) -> Self {
        Version { reference }
    }
}
