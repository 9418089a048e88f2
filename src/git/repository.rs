use std::collections::BTreeSet;
use std::path::Path;

use git2::build::RepoBuilder;
use git2::{
    AutotagOption, Commit, Cred, CredentialType, ErrorCode, FetchOptions, FetchPrune, Oid,
    Reference, RemoteCallbacks, Repository as Git2Repo, Sort,
};
use tracing::{debug, info};

use crate::config::Source;
use crate::error::{ResourceError, Result};
use crate::git::{CommitInfo, Commits, HistoryProvider};

const REMOTE_NAME: &str = "origin";

/// How many times libgit2 may ask for credentials before giving up.
const MAX_CREDENTIAL_ATTEMPTS: usize = 3;

/// Remote location and the credentials used to reach it
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RepositoryParams {
    pub remote_url: String,
    pub http_login: Option<String>,
    pub http_password: Option<String>,
    pub ssh_private_key: Option<String>,
}

impl RepositoryParams {
    pub fn from_source(source: &Source) -> Self {
        RepositoryParams {
            remote_url: source.url.clone(),
            http_login: source.login.clone(),
            http_password: source.password.clone(),
            ssh_private_key: source.private_key.clone(),
        }
    }

    /// Fetch options answering credential requests from these params.
    ///
    /// HTTP login/password is offered for plaintext auth, the private key for
    /// SSH auth, and default credentials otherwise.
    fn fetch_options(&self) -> FetchOptions<'_> {
        let mut callbacks = RemoteCallbacks::new();
        let mut attempts = 0;

        callbacks.credentials(move |_url, username_from_url, allowed_types| {
            attempts += 1;
            if attempts > MAX_CREDENTIAL_ATTEMPTS {
                return Err(git2::Error::from_str("authentication failed"));
            }

            let username = username_from_url.unwrap_or("git");

            if allowed_types.contains(CredentialType::USER_PASS_PLAINTEXT) {
                if let (Some(login), Some(password)) = (&self.http_login, &self.http_password) {
                    return Cred::userpass_plaintext(login, password);
                }
            }

            if allowed_types.contains(CredentialType::SSH_KEY) {
                if let Some(key) = &self.ssh_private_key {
                    return Cred::ssh_key_from_memory(username, None, key, None);
                }
            }

            if allowed_types.contains(CredentialType::USERNAME) {
                return Cred::username(username);
            }

            Cred::default()
        });

        let mut fetch_options = FetchOptions::new();
        fetch_options.remote_callbacks(callbacks);
        fetch_options.download_tags(AutotagOption::All);
        fetch_options.prune(FetchPrune::On);
        fetch_options
    }
}

/// Bare on-disk mirror of the remote, tracking a single branch
pub struct Git2Repository {
    repo: Git2Repo,
    branch: String,
    params: RepositoryParams,
}

impl Git2Repository {
    /// Opens the mirror at `path` and brings it up to date, cloning afresh when
    /// the directory cannot be reused.
    pub fn sync<P: AsRef<Path>>(path: P, branch: &str, params: RepositoryParams) -> Result<Self> {
        let path = path.as_ref();

        match Self::open(path, branch, params.clone()) {
            Ok(repo) => {
                info!(path = %path.display(), "updating existing mirror");
                repo.update()?;
                Ok(repo)
            }
            Err(e) => {
                info!(path = %path.display(), reason = %e, "cloning new mirror");
                Self::clone(path, branch, params)
            }
        }
    }

    /// Opens an existing mirror.
    ///
    /// # Returns
    /// * `Ok(Git2Repository)` - The directory holds a repository whose `origin` is `params.remote_url`
    /// * `Err` - If the directory is not a repository or points at another remote
    pub fn open<P: AsRef<Path>>(path: P, branch: &str, params: RepositoryParams) -> Result<Self> {
        let path = path.as_ref();
        let repo = Git2Repo::open(path)?;

        {
            let remote = repo.find_remote(REMOTE_NAME)?;
            if remote.url() != Some(params.remote_url.as_str()) {
                return Err(ResourceError::repository(format!(
                    "Mirror at '{}' tracks '{}', expected '{}'",
                    path.display(),
                    remote.url().unwrap_or("<invalid utf-8>"),
                    params.remote_url
                )));
            }
        }

        Ok(Git2Repository {
            repo,
            branch: branch.to_string(),
            params,
        })
    }

    /// Clones the remote into `path`.
    ///
    /// The clone is staged in a sibling directory and moved into place only once
    /// it succeeded. An existing `path` is replaced only when it is empty or
    /// already a git repository; any other directory is left untouched.
    pub fn clone<P: AsRef<Path>>(path: P, branch: &str, params: RepositoryParams) -> Result<Self> {
        let path = path.as_ref();

        ensure_replaceable(path)?;

        let parent = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(parent)?;

        let staging = tempfile::Builder::new()
            .prefix(".git-resource-clone-")
            .tempdir_in(parent)?;
        let staged = staging.path().join("mirror");

        RepoBuilder::new()
            .bare(true)
            .branch(branch)
            .fetch_options(params.fetch_options())
            .clone(&params.remote_url, &staged)
            .map_err(|e| {
                ResourceError::repository(format!(
                    "Cannot clone '{}' (branch '{}'): {}",
                    params.remote_url, branch, e
                ))
            })?;

        if path.exists() {
            std::fs::remove_dir_all(path)?;
        }
        std::fs::rename(&staged, path)?;

        let repo = Git2Repo::open(path)?;

        Ok(Git2Repository {
            repo,
            branch: branch.to_string(),
            params,
        })
    }

    /// Fetches the tracked branch and all tags from `origin`.
    pub fn update(&self) -> Result<()> {
        let mut remote = self.repo.find_remote(REMOTE_NAME)?;

        let branch_refspec = format!(
            "+refs/heads/{branch}:refs/remotes/{remote}/{branch}",
            branch = self.branch,
            remote = REMOTE_NAME
        );
        let refspecs = [branch_refspec.as_str(), "+refs/tags/*:refs/tags/*"];

        let mut fetch_options = self.params.fetch_options();
        remote
            .fetch(&refspecs, Some(&mut fetch_options), None)
            .map_err(|e| {
                ResourceError::repository(format!(
                    "Cannot fetch '{}' from '{}': {}",
                    self.branch, self.params.remote_url, e
                ))
            })?;

        Ok(())
    }

    /// Commit at the tip of the tracked branch.
    ///
    /// The remote-tracking ref is preferred since `update` refreshes it; the
    /// local branch created by the initial clone is the fallback.
    fn branch_head(&self) -> Result<Oid> {
        let candidates = [
            format!("refs/remotes/{}/{}", REMOTE_NAME, self.branch),
            format!("refs/heads/{}", self.branch),
        ];

        for name in &candidates {
            match self.repo.find_reference(name) {
                Ok(reference) => return Ok(reference.peel_to_commit()?.id()),
                Err(e) if e.code() == ErrorCode::NotFound => continue,
                Err(e) => return Err(e.into()),
            }
        }

        Err(ResourceError::repository(format!(
            "Branch '{}' not found in mirror",
            self.branch
        )))
    }

    /// Paths touched by a commit relative to its first parent (every path for a root commit).
    ///
    /// Paths that are not valid UTF-8 are decoded lossily so they can still be matched.
    fn changed_files(&self, commit: &Commit<'_>) -> Result<BTreeSet<String>> {
        let tree = commit.tree()?;
        let parent_tree = if commit.parent_count() > 0 {
            Some(commit.parent(0)?.tree()?)
        } else {
            None
        };

        let diff = self
            .repo
            .diff_tree_to_tree(parent_tree.as_ref(), Some(&tree), None)?;

        let mut files = BTreeSet::new();
        for delta in diff.deltas() {
            for file in [delta.old_file(), delta.new_file()] {
                if let Some(path) = file.path() {
                    files.insert(path.to_string_lossy().into_owned());
                }
            }
        }

        Ok(files)
    }
}

/// Fails unless `path` is absent, an empty directory, or a git repository.
fn ensure_replaceable(path: &Path) -> Result<()> {
    if !path.exists() || Git2Repo::open(path).is_ok() {
        return Ok(());
    }

    if path.is_dir() && std::fs::read_dir(path)?.next().is_none() {
        return Ok(());
    }

    Err(ResourceError::repository(format!(
        "Refusing to replace '{}': it is neither empty nor a git repository",
        path.display()
    )))
}

/// Seconds since epoch at which a tag was created: tagger time for annotated
/// tags, the target commit's time for lightweight ones.
fn tag_created_at(reference: &Reference<'_>) -> i64 {
    if let Ok(tag) = reference.peel_to_tag() {
        if let Some(tagger) = tag.tagger() {
            return tagger.when().seconds();
        }
    }

    reference
        .peel_to_commit()
        .map(|commit| commit.time().seconds())
        .unwrap_or(0)
}

impl HistoryProvider for Git2Repository {
    fn list_tags(&self) -> Result<Vec<String>> {
        let names = self.repo.tag_names(None)?;

        let mut tags = Vec::new();
        for name in names.iter().flatten() {
            let reference = self.repo.find_reference(&format!("refs/tags/{}", name))?;
            tags.push((tag_created_at(&reference), name.to_string()));
        }

        tags.sort_by(|a, b| b.cmp(a));
        debug!(count = tags.len(), "listed tags");

        Ok(tags.into_iter().map(|(_, name)| name).collect())
    }

    fn list_commits(&self, with_files: bool) -> Result<Commits<'_>> {
        let head = self.branch_head()?;

        let mut revwalk = self.repo.revwalk()?;
        revwalk.set_sorting(Sort::TOPOLOGICAL | Sort::TIME)?;
        revwalk.push(head)?;

        debug!(head = %head, branch = %self.branch, with_files, "walking commits");

        Ok(Box::new(revwalk.map(move |oid| {
            let oid = oid?;
            let files = if with_files {
                self.changed_files(&self.repo.find_commit(oid)?)?
            } else {
                BTreeSet::new()
            };

            Ok(CommitInfo {
                id: oid.to_string(),
                files,
            })
        })))
    }
}
