pub mod check;
pub mod config;
pub mod domain;
pub mod error;
pub mod git;
pub mod logging;
pub mod output;

pub use error::{ResourceError, Result};
