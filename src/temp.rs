//! Scratch directories for clones
//!
//! Temp paths are always absolute so a relative `TMPDIR` never places
//! scratch clones under the current working directory.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

/// Returns a directory path suitable for creating temporary directories.
pub fn temp_dir_base() -> PathBuf {
    let t = env::temp_dir();
    if t.is_absolute() {
        t
    } else {
        #[cfg(windows)]
        {
            env::var("TEMP")
                .or_else(|_| env::var("TMP"))
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("C:\\Windows\\Temp"))
        }
        #[cfg(not(windows))]
        {
            PathBuf::from("/tmp")
        }
    }
}

/// A directory that is removed when dropped, unless it was marked to be kept.
///
/// Removal happens on every exit path of the owning scope, including early
/// returns through `?` and unwinding panics.
#[derive(Debug)]
pub struct ScratchDir {
    path: PathBuf,
    keep: bool,
}

impl ScratchDir {
    /// Removed on drop
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            keep: false,
        }
    }

    /// Left on disk after drop
    pub fn kept(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            keep: true,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        if self.keep || !self.path.exists() {
            return;
        }
        match fs::remove_dir_all(&self.path) {
            Ok(()) => debug!("removed scratch directory {}", self.path.display()),
            Err(e) => debug!(
                "failed to remove scratch directory {}: {e}",
                self.path.display()
            ),
        }
    }
}
