//! In-memory file trees produced by fetchers

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Result, SpmError};

/// Permission bits used when a source does not record a mode
pub const DEFAULT_FILE_MODE: u32 = 0o644;

/// A single fetched file; `path` is relative and always `/`-separated
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedFile {
    pub path: String,
    pub content: Vec<u8>,
    pub mode: u32,
}

impl FetchedFile {
    pub fn new(path: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
            mode: DEFAULT_FILE_MODE,
        }
    }

    #[must_use]
    pub fn with_mode(mut self, mode: u32) -> Self {
        self.mode = mode;
        self
    }
}

/// The files of one fetched package, in fetch order
#[derive(Debug, Clone, Default)]
pub struct SourceTree {
    files: Vec<FetchedFile>,
    /// Set when the fetcher already left a checkout of this tree on disk
    location: Option<PathBuf>,
}

impl SourceTree {
    pub fn new(files: Vec<FetchedFile>) -> Self {
        Self {
            files,
            location: None,
        }
    }

    #[must_use]
    pub fn with_location(mut self, location: impl Into<PathBuf>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn files(&self) -> &[FetchedFile] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn location(&self) -> Option<&Path> {
        self.location.as_deref()
    }

    pub fn get(&self, path: &str) -> Option<&FetchedFile> {
        self.files.iter().find(|f| f.path == path)
    }

    /// Files under `sub_path`, re-rooted so their paths are relative to it.
    ///
    /// An empty `sub_path` returns the whole tree.
    pub fn scoped(&self, sub_path: &str) -> SourceTree {
        let sub_path = sub_path.trim_matches('/');
        if sub_path.is_empty() {
            return SourceTree::new(self.files.clone());
        }
        let prefix = format!("{sub_path}/");
        let files = self
            .files
            .iter()
            .filter_map(|f| {
                f.path.strip_prefix(&prefix).map(|rest| FetchedFile {
                    path: rest.to_string(),
                    content: f.content.clone(),
                    mode: f.mode,
                })
            })
            .collect();
        SourceTree::new(files)
    }

    /// Write every file below `dest`, creating directories as needed.
    ///
    /// Paths that would escape `dest` are rejected.
    pub fn write_to(&self, dest: &Path) -> Result<()> {
        fs::create_dir_all(dest).map_err(|e| write_failed(dest, &e))?;
        for file in &self.files {
            let relative = safe_relative_path(&file.path).ok_or_else(|| {
                SpmError::ArchiveInvalid {
                    reason: format!("refusing to write outside destination: {}", file.path),
                }
            })?;
            let target = dest.join(relative);
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent).map_err(|e| write_failed(parent, &e))?;
            }
            fs::write(&target, &file.content).map_err(|e| write_failed(&target, &e))?;
            set_mode(&target, file.mode)?;
        }
        Ok(())
    }
}

fn safe_relative_path(path: &str) -> Option<PathBuf> {
    let mut out = PathBuf::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => return None,
            s => out.push(s),
        }
    }
    if out.as_os_str().is_empty() {
        None
    } else {
        Some(out)
    }
}

fn write_failed(path: &Path, err: &std::io::Error) -> SpmError {
    SpmError::FileWriteFailed {
        path: path.display().to_string(),
        reason: err.to_string(),
    }
}

#[cfg(unix)]
fn set_mode(path: &Path, mode: u32) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    if mode & 0o777 == 0 {
        return Ok(());
    }
    fs::set_permissions(path, fs::Permissions::from_mode(mode & 0o777))
        .map_err(|e| write_failed(path, &e))
}

#[cfg(not(unix))]
fn set_mode(_path: &Path, _mode: u32) -> Result<()> {
    Ok(())
}
