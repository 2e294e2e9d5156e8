//! # Repository Controller
//!
//! [`Repository`] drives one local checkout through the state machine
//!
//! ```text
//! Absent --create--> Cloned --fetch--> Fetched --checkout--> CheckedOut --clean--> Clean
//! ```
//!
//! [`Repository::sync`] runs the canonical sequence used before any file is
//! read from a checkout: fetch from `origin`, check out the requested ref,
//! then remove untracked files. A ref naming a branch of `origin` resets the
//! local branch to the fetched `origin/<ref>`; tags and commits are checked
//! out as they are. Every operation is idempotent on the remote side and any
//! failure aborts the sequence with the error of the git call that failed.
//!
//! ## Design
//!
//! All git calls go through a [`GitRunner`] with the checkout root passed as
//! the working directory, so operations never change the process working
//! directory. The runner is a trait object, which lets tests substitute a
//! recording mock and assert on the exact command sequence.
//!
//! Remote and branch bookkeeping reads `.git/config` directly (rust-ini)
//! instead of shelling out.

use crate::error::{Error, Result};
use crate::git::GitRunner;
use log::{debug, info};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// The remote every checkout is synchronized from.
pub const DEFAULT_REMOTE: &str = "origin";

/// Position of a checkout in the state machine, as reached by this process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepositoryState {
    /// No repository at the root
    Absent,
    /// A repository existed before this process touched it
    Present,
    Cloned,
    Fetched,
    CheckedOut,
    Clean,
}

/// Controller for one local git working copy.
pub struct Repository {
    root: PathBuf,
    runner: Arc<dyn GitRunner>,
    state: RepositoryState,
}

impl std::fmt::Debug for Repository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repository")
            .field("root", &self.root)
            .field("state", &self.state)
            .finish()
    }
}

impl Repository {
    /// Open the controller for `root`. Nothing is run.
    pub fn new(root: impl Into<PathBuf>, runner: Arc<dyn GitRunner>) -> Self {
        let root = root.into();
        let state = if root.join(".git").join("config").is_file() {
            RepositoryState::Present
        } else {
            RepositoryState::Absent
        };
        Self {
            root,
            runner,
            state,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn state(&self) -> RepositoryState {
        self.state
    }

    /// Returns true if the root holds a repository.
    pub fn exists(&self) -> bool {
        self.config_path().is_file()
    }

    fn config_path(&self) -> PathBuf {
        self.root.join(".git").join("config")
    }

    fn git(&self, args: &[&str]) -> Result<String> {
        self.runner.run_checked(args, Some(&self.root))
    }

    /// Clone `url` into the root, creating missing parent directories.
    pub fn create(&mut self, url: &str) -> Result<()> {
        if self.root.join(".git").exists() {
            return Err(Error::AlreadyExists {
                path: self.root.display().to_string(),
            });
        }
        if let Some(parent) = self.root.parent() {
            fs::create_dir_all(parent)?;
        }

        info!("Cloning {} into {}", url, self.root.display());
        let root = self.root.to_string_lossy().into_owned();
        self.runner
            .run_checked(&["clone", "-q", url, &root], None)?;
        self.state = RepositoryState::Cloned;
        Ok(())
    }

    /// Fetch from `remote`, which must be a URL or a configured remote name.
    pub fn fetch(&mut self, remote: &str) -> Result<()> {
        if url::Url::parse(remote).is_err() && !self.remote_exists(remote)? {
            return Err(Error::InvalidRemote {
                remote: remote.to_string(),
            });
        }
        self.git(&["fetch", "-q", remote])?;
        self.state = RepositoryState::Fetched;
        Ok(())
    }

    /// Merge `branch` into the current branch.
    pub fn merge(&mut self, branch: &str) -> Result<()> {
        self.git(&["merge", branch])?;
        Ok(())
    }

    /// Reset the index, and the working tree too when `hard` is set.
    pub fn reset(&mut self, hard: bool) -> Result<()> {
        if hard {
            self.git(&["reset", "--hard"])?;
        } else {
            self.git(&["reset"])?;
        }
        Ok(())
    }

    /// Check out a branch, tag or commit.
    pub fn branch_checkout(&mut self, name: &str) -> Result<()> {
        self.git(&["checkout", "-q", name])?;
        self.state = RepositoryState::CheckedOut;
        Ok(())
    }

    /// Remove untracked files and directories.
    pub fn clean(&mut self) -> Result<()> {
        self.git(&["clean", "-fd"])?;
        self.state = RepositoryState::Clean;
        Ok(())
    }

    /// Bring the checkout to `reference`: fetch `origin`, check out, clean.
    pub fn sync(&mut self, reference: &str) -> Result<()> {
        debug!("Synchronizing {} to {}", self.root.display(), reference);
        self.fetch(DEFAULT_REMOTE)?;
        if self.remote_branch_exists(DEFAULT_REMOTE, reference)? {
            let upstream = format!("{}/{}", DEFAULT_REMOTE, reference);
            self.git(&["checkout", "-q", "-B", reference, &upstream])?;
            self.state = RepositoryState::CheckedOut;
        } else {
            self.branch_checkout(reference)?;
        }
        self.clean()
    }

    /// Returns true if `remote` had a branch `name` as of the last fetch.
    pub fn remote_branch_exists(&self, remote: &str, name: &str) -> Result<bool> {
        let tracking = format!("refs/remotes/{}/{}", remote, name);
        let result = self
            .runner
            .run(&["rev-parse", "--verify", "-q", &tracking], Some(&self.root))?;
        Ok(result.success())
    }

    /// Add a remote. Fails if a remote with that name exists.
    pub fn remote_add(&mut self, name: &str, url: &str) -> Result<()> {
        if self.remote_exists(name)? {
            return Err(Error::InvalidArgument {
                message: format!("Remote {} already exists", name),
            });
        }
        self.git(&["remote", "add", name, url])?;
        Ok(())
    }

    /// Change the URL of an existing remote.
    pub fn remote_set_url(&mut self, name: &str, url: &str) -> Result<()> {
        if !self.remote_exists(name)? {
            return Err(Error::InvalidRemote {
                remote: name.to_string(),
            });
        }
        self.git(&["remote", "set-url", name, url])?;
        Ok(())
    }

    /// Remove a remote. Removing an unknown remote does nothing.
    pub fn remote_remove(&mut self, name: &str) -> Result<()> {
        if self.remote_exists(name)? {
            self.git(&["remote", "rm", name])?;
        }
        Ok(())
    }

    pub fn remote_exists(&self, name: &str) -> Result<bool> {
        Ok(self.remotes()?.contains_key(name))
    }

    /// Create branch `name` from `parent` and check it out.
    ///
    /// With `parent_remote`, that remote is fetched first and the branch
    /// starts from `<parent_remote>/<parent>`.
    pub fn branch_create(
        &mut self,
        name: &str,
        parent: &str,
        parent_remote: Option<&str>,
    ) -> Result<()> {
        if self.branch_exists(name)? {
            return Err(Error::InvalidArgument {
                message: format!("Branch {} already exists", name),
            });
        }

        let start = match parent_remote {
            Some(remote) => {
                self.fetch(remote)?;
                format!("{}/{}", remote, parent)
            }
            None => parent.to_string(),
        };
        self.git(&["checkout", "-q", "-b", name, &start])?;
        self.state = RepositoryState::CheckedOut;
        Ok(())
    }

    pub fn branch_exists(&self, name: &str) -> Result<bool> {
        Ok(self.branches()?.iter().any(|branch| branch == name))
    }

    /// Delete a branch. Deleting an unknown branch does nothing.
    pub fn branch_remove(&mut self, name: &str) -> Result<()> {
        if self.branch_exists(name)? {
            self.git(&["branch", "-D", name])?;
        }
        Ok(())
    }

    /// Configured remotes and their URLs.
    pub fn remotes(&self) -> Result<BTreeMap<String, String>> {
        let mut remotes = BTreeMap::new();
        for (kind, name, url) in self.config_sections()? {
            if kind == "remote" {
                remotes.insert(name, url.unwrap_or_default());
            }
        }
        Ok(remotes)
    }

    /// Branches with a `[branch "..."]` section in the configuration.
    pub fn branches(&self) -> Result<Vec<String>> {
        Ok(self
            .config_sections()?
            .into_iter()
            .filter(|(kind, _, _)| kind == "branch")
            .map(|(_, name, _)| name)
            .collect())
    }

    /// `(kind, name, url)` for every `[kind "name"]` section of `.git/config`.
    fn config_sections(&self) -> Result<Vec<(String, String, Option<String>)>> {
        let path = self.config_path();
        if !path.is_file() {
            return Ok(Vec::new());
        }
        let text = fs::read_to_string(&path)?;
        let config = ini::Ini::load_from_str(&text).map_err(|e| Error::Configuration {
            message: format!("Unable to read {}: {}", path.display(), e),
            hint: None,
        })?;

        let mut sections = Vec::new();
        for (section, properties) in config.iter() {
            let Some((kind, name)) = section.and_then(split_section_name) else {
                continue;
            };
            let url = properties.get("url").map(str::to_string);
            sections.push((kind, name, url));
        }
        Ok(sections)
    }
}

/// Split a git config section header such as `remote "origin"` into its
/// kind and subsection name.
fn split_section_name(section: &str) -> Option<(String, String)> {
    let (kind, rest) = section.trim().split_once(char::is_whitespace)?;
    let name = rest.trim().trim_matches('"');
    if name.is_empty() {
        None
    } else {
        Some((kind.to_string(), name.to_string()))
    }
}
