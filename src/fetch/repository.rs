//! Fetching packages from git repositories

use std::path::PathBuf;

use tracing::info;

use super::{SourceFetcher, SourceTree, wrong_scheme};
use crate::error::{Result, SpmError};
use crate::git;
use crate::source::Locator;
use crate::temp::ScratchDir;

/// Clones into `<workdir>/<repo name>` and reads the checked-out tree.
///
/// Without `keep_checkout` the clone is removed as soon as its files are in
/// memory, whether or not reading succeeded.
#[derive(Debug, Clone)]
pub struct RepositoryFetcher {
    workdir: PathBuf,
    keep_checkout: bool,
}

impl RepositoryFetcher {
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        Self {
            workdir: workdir.into(),
            keep_checkout: false,
        }
    }

    /// Leave the checkout on disk and record its location in the tree
    #[must_use]
    pub fn keep_checkout(mut self, keep: bool) -> Self {
        self.keep_checkout = keep;
        self
    }
}

impl SourceFetcher for RepositoryFetcher {
    fn fetch(&self, locator: &Locator) -> Result<SourceTree> {
        let Locator::Repository(repo) = locator else {
            return Err(wrong_scheme(locator, "repository"));
        };
        let url = repo.clone_url();
        let branch = repo.branch();
        info!("Clone repository from {url} (branch: {branch})");

        let target = self.workdir.join(&repo.repo_name);
        let checkout = if self.keep_checkout {
            ScratchDir::kept(&target)
        } else {
            ScratchDir::new(&target)
        };

        let cloned = git::clone_branch(&url, branch, checkout.path())?;
        let files = git::read_head_tree(&cloned).map_err(|e| SpmError::GitTreeReadFailed {
            url: url.clone(),
            reason: e.message().to_string(),
        })?;

        let tree = SourceTree::new(files);
        Ok(if self.keep_checkout {
            tree.with_location(target)
        } else {
            tree
        })
    }
}
