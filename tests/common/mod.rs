//! Common test utilities for spm integration tests

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use git2::{Repository, Signature};
use tempfile::TempDir;

/// `spm` with every connection variable cleared
#[allow(deprecated)]
pub fn spm_cmd() -> Command {
    let mut cmd = Command::cargo_bin("spm").expect("Failed to find spm binary");
    for var in [
        "SF_USERNAME",
        "SF_PASSWORD",
        "SF_ENDPOINT",
        "SF_APIVERSION",
        "SF_POLLSECONDS",
        "SF_TIMEOUTSECONDS",
        "RUST_LOG",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

/// A scratch directory for one test
pub struct TestWorkspace {
    #[allow(dead_code)]
    pub temp: TempDir,
    pub path: PathBuf,
}

impl TestWorkspace {
    pub fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let path = temp.path().to_path_buf();
        Self { temp, path }
    }

    /// Write a file in workspace
    pub fn write_file(&self, path: &str, content: &str) {
        let file_path = self.path.join(path);
        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        std::fs::write(&file_path, content).expect("Failed to write file");
    }

    /// Read a file from workspace
    pub fn read_file(&self, path: &str) -> String {
        std::fs::read_to_string(self.path.join(path)).expect("Failed to read file")
    }

    /// Check if a file exists in workspace
    pub fn file_exists(&self, path: &str) -> bool {
        self.path.join(path).exists()
    }

    /// Commit `files` to a new repository at `name` on `branch`.
    ///
    /// Returns the `file://` locator for it.
    pub fn create_git_repo(&self, name: &str, branch: &str, files: &[(&str, &str)]) -> String {
        let repo_path = self.path.join(name);
        let repo = Repository::init(&repo_path).expect("Failed to init repository");
        for (path, content) in files {
            let file_path = repo_path.join(path);
            if let Some(parent) = file_path.parent() {
                std::fs::create_dir_all(parent).expect("Failed to create parent directory");
            }
            std::fs::write(&file_path, content).expect("Failed to write file");
        }
        commit_all(&repo, &repo_path, branch);
        format!("file://{}@{branch}", repo_path.display())
    }
}

fn commit_all(repo: &Repository, root: &Path, branch: &str) {
    let mut index = repo.index().expect("Failed to open index");
    index
        .add_all(["*"].iter(), git2::IndexAddOption::DEFAULT, None)
        .expect("Failed to stage files");
    index.write().expect("Failed to write index");
    let tree_id = index.write_tree().expect("Failed to write tree");
    let tree = repo.find_tree(tree_id).expect("Failed to find tree");
    let sig = Signature::now("spm", "spm@example.com").expect("Failed to create signature");
    let commit = repo
        .commit(None, &sig, &sig, "initial", &tree, &[])
        .expect("Failed to commit");
    let commit = repo.find_commit(commit).expect("Failed to find commit");
    repo.branch(branch, &commit, true)
        .expect("Failed to create branch");
    repo.set_head(&format!("refs/heads/{branch}"))
        .expect("Failed to set HEAD");
    assert!(root.join(".git").exists());
}
