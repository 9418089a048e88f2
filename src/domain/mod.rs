//! Domain logic - pure version discovery rules independent of git operations

pub mod enumerator;
pub mod history;
pub mod selector;
pub mod version;

pub use enumerator::enumerate;
pub use history::HistoryEntry;
pub use selector::{PathSelector, Selector, SelectorConfig, TagSelector};
pub use version::{Version, VersionRef};
