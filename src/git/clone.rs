//! Repository cloning operations
//!
//! This module handles:
//! - Shallow, single-branch clones over HTTPS, SSH or `file://`
//! - A single retry after removing a non-empty clone target

use std::fs;
use std::path::Path;

use git2::{ErrorCode, FetchOptions, RemoteCallbacks, Repository, build::RepoBuilder};
use tracing::{info, warn};

use super::auth::setup_auth_callbacks;
use super::error::interpret_git_error;
use crate::error::{Result, SpmError};

fn is_local(url: &str) -> bool {
    url.starts_with("file://") || Path::new(url).is_absolute()
}

fn clone_once(url: &str, branch: &str, target: &Path) -> std::result::Result<Repository, git2::Error> {
    let mut callbacks = RemoteCallbacks::new();
    setup_auth_callbacks(&mut callbacks);

    let mut fetch_options = FetchOptions::new();
    fetch_options.remote_callbacks(callbacks);
    // Shallow fetches are not supported by the local transport
    if !is_local(url) {
        fetch_options.depth(1);
    }

    let refspec = format!("+refs/heads/{branch}:refs/remotes/origin/{branch}");
    let mut builder = RepoBuilder::new();
    builder
        .branch(branch)
        .fetch_options(fetch_options)
        .remote_create(move |repo, name, url| repo.remote_with_fetch(name, url, &refspec));
    builder.clone(url, target)
}

/// Clone a single branch of `url` into `target`.
///
/// If `target` already exists and is not empty it is removed and the clone
/// is retried once. A second "exists" failure is reported as
/// [`SpmError::DirtyTarget`].
pub fn clone_branch(url: &str, branch: &str, target: &Path) -> Result<Repository> {
    let clone_failed = |e: &git2::Error| SpmError::GitCloneFailed {
        url: url.to_string(),
        reason: interpret_git_error(e),
    };

    match clone_once(url, branch, target) {
        Ok(repo) => Ok(repo),
        Err(e) if e.code() == ErrorCode::Exists => {
            warn!("repository non empty: {}", target.display());
            info!("remove directory: {}", target.display());
            fs::remove_dir_all(target).map_err(|io| SpmError::DirtyTarget {
                path: format!("{}: {io}", target.display()),
            })?;
            clone_once(url, branch, target).map_err(|e| {
                if e.code() == ErrorCode::Exists {
                    SpmError::DirtyTarget {
                        path: target.display().to_string(),
                    }
                } else {
                    clone_failed(&e)
                }
            })
        }
        Err(e) => Err(clone_failed(&e)),
    }
}
