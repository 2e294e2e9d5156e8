//! Checkout store
//!
//! Repositories imported by a manifest are checked out under a cache root,
//! one directory per URL named by [`path::checkout_dir_name`]. A checkout is
//! reused across builds; every build still runs the full sync sequence on it
//! so the files read are those of the requested ref.
//!
//! Within one build, a `(url, ref)` pair is synchronized only once.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{debug, info};

use crate::error::Result;
use crate::git::GitRunner;
use crate::path;
use crate::repository::Repository;

/// Key of a synchronized checkout within one build
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CheckoutKey {
    pub url: String,
    pub r#ref: String,
}

impl CheckoutKey {
    pub fn new(url: &str, r#ref: &str) -> Self {
        Self {
            url: url.to_string(),
            r#ref: r#ref.to_string(),
        }
    }
}

/// Default cache root: the user cache directory, or the system temp
/// directory when there is none.
pub fn default_cache_root() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("phar-packager")
}

/// Owns the checkout directories below one cache root.
pub struct CheckoutStore {
    root: PathBuf,
    runner: Arc<dyn GitRunner>,
    prepared: HashMap<CheckoutKey, PathBuf>,
}

impl CheckoutStore {
    pub fn new(root: impl Into<PathBuf>, runner: Arc<dyn GitRunner>) -> Self {
        Self {
            root: root.into(),
            runner,
            prepared: HashMap::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding the checkout of `url`.
    pub fn path_for(&self, url: &str) -> PathBuf {
        self.root.join(path::checkout_dir_name(url))
    }

    /// Make sure the checkout of `url` is at `reference` and clean, cloning
    /// it first if needed. Returns the checkout root.
    pub fn prepare(&mut self, url: &str, reference: &str) -> Result<PathBuf> {
        let key = CheckoutKey::new(url, reference);
        if let Some(path) = self.prepared.get(&key) {
            debug!("Checkout of {} at {} already prepared", url, reference);
            return Ok(path.clone());
        }

        fs::create_dir_all(&self.root)?;
        let checkout = self.path_for(url);
        let mut repository = Repository::new(&checkout, self.runner.clone());
        if !repository.exists() {
            repository.create(url)?;
        }
        repository.sync(reference)?;
        info!("Checked out {} at {} in {}", url, reference, checkout.display());

        // A different ref of the same URL now owns the directory.
        self.prepared.retain(|prepared, _| prepared.url != url);
        self.prepared.insert(key, checkout.clone());
        Ok(checkout)
    }
}
