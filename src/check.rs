//! The `check` operation: discover versions that appeared since the last known one.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::config::{CheckRequest, Source};
use crate::domain::{enumerate, Selector, SelectorConfig, Version, VersionRef};
use crate::error::Result;
use crate::git::{Git2Repository, HistoryProvider, RepositoryParams};

/// Name of the mirror directory created under the system temp dir
pub const CACHE_DIRECTORY_NAME: &str = "git-repository-cache";

/// Default location of the on-disk mirror.
///
/// Every invocation shares this directory; concurrent checks of different
/// sources must use distinct `--cache-dir` values.
pub fn default_cache_dir() -> PathBuf {
    std::env::temp_dir().join(CACHE_DIRECTORY_NAME)
}

/// A compiled selection rule ready to be applied to a history provider
pub struct VersionCheck {
    config: SelectorConfig,
    selector: Box<dyn Selector>,
}

impl VersionCheck {
    /// Compiles the source's selection rule.
    ///
    /// # Returns
    /// * `Ok(VersionCheck)` - All patterns compiled
    /// * `Err` - The first pattern that failed to compile, with the parser's reason
    pub fn new(source: &Source) -> Result<Self> {
        let config = source.selector_config();
        let selector = config.build()?;
        Ok(VersionCheck { config, selector })
    }

    pub fn config(&self) -> &SelectorConfig {
        &self.config
    }

    /// Versions newer than `cursor` (inclusive when it matches), oldest first
    pub fn run<P: HistoryProvider + ?Sized>(
        &self,
        provider: &P,
        cursor: Option<&VersionRef>,
    ) -> Result<Vec<Version>> {
        let mut failure = None;
        let history = provider.history(&self.config)?.map_while(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                failure = Some(e);
                None
            }
        });

        let versions = enumerate(history, self.selector.as_ref(), cursor);

        if let Some(e) = failure {
            return Err(e);
        }

        Ok(versions.into_iter().map(Version::from).collect())
    }
}

/// Full check: compile the selector, sync the mirror under `cache_dir`, enumerate.
pub fn run_check(request: &CheckRequest, cache_dir: &Path) -> Result<Vec<Version>> {
    let source = &request.source;

    info!(
        workdir = %cache_dir.display(),
        remote = %source.url,
        branch = %source.branch,
        "check"
    );

    let check = VersionCheck::new(source)?;

    let repo = Git2Repository::sync(
        cache_dir,
        &source.branch,
        RepositoryParams::from_source(source),
    )?;

    let versions = check.run(&repo, request.cursor())?;

    info!(
        count = versions.len(),
        tag_mode = check.config().is_tag_mode(),
        cursor = request.cursor().map(VersionRef::as_str).unwrap_or("<none>"),
        "discovered versions"
    );

    Ok(versions)
}
