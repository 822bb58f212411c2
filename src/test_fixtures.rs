//! Test fixtures: throwaway git repositories and in-process doubles for the
//! fetcher, remote service and sleeper seams.
//!
//! ```ignore
//! let fixture = RepoFixture::new()
//!     .with_file("src/package.xml", "<Package/>")
//!     .commit("initial");
//! let url = fixture.url(); // file:///tmp/.../origin
//! ```

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Duration;

use git2::{IndexAddOption, Repository, RepositoryInitOptions, Signature};
use tempfile::TempDir;

use crate::archive;
use crate::config::PACKAGE_FILE_NAME;
use crate::deploy::Sleeper;
use crate::error::{Result, SpmError};
use crate::fetch::{FetchedFile, SourceFetcher, SourceTree};
use crate::remote::{
    Connector, DeployJob, DeployStatus, JobId, MetadataApi, RetrieveRequest, RetrieveStatus,
    ServiceTarget,
};
use crate::source::Locator;

/// Create a temp directory in the system temp location.
///
/// # Panics
///
/// Panics if the temp directory cannot be created.
#[must_use]
pub fn create_temp_dir() -> TempDir {
    TempDir::new_in(crate::temp::temp_dir_base()).expect("Failed to create temp directory")
}

/// A git repository on disk whose initial branch is `master`
pub struct RepoFixture {
    _temp: TempDir,
    path: PathBuf,
    repo: Repository,
}

impl RepoFixture {
    /// # Panics
    ///
    /// Panics if the repository cannot be initialised.
    #[must_use]
    pub fn new() -> Self {
        let temp = create_temp_dir();
        let path = temp.path().join("origin");
        let mut opts = RepositoryInitOptions::new();
        opts.initial_head("master");
        let repo = Repository::init_opts(&path, &opts).expect("Failed to init git repository");
        Self {
            _temp: temp,
            path,
            repo,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `file://` URL of the repository
    pub fn url(&self) -> String {
        format!("file://{}", self.path.display())
    }

    /// # Panics
    ///
    /// Panics if the file cannot be written.
    #[must_use]
    pub fn with_file(self, relative: &str, content: &str) -> Self {
        let target = self.path.join(relative);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).expect("Failed to create directory");
        }
        fs::write(&target, content).expect("Failed to write file");
        self
    }

    /// Write a file with the executable bit set
    ///
    /// # Panics
    ///
    /// Panics if the file cannot be written.
    #[cfg(unix)]
    #[must_use]
    pub fn with_executable(self, relative: &str, content: &str) -> Self {
        use std::os::unix::fs::PermissionsExt;
        let fixture = self.with_file(relative, content);
        fs::set_permissions(
            fixture.path.join(relative),
            fs::Permissions::from_mode(0o755),
        )
        .expect("Failed to set permissions");
        fixture
    }

    /// Stage everything in the work tree and commit it on the current branch
    ///
    /// # Panics
    ///
    /// Panics if staging or committing fails.
    #[must_use]
    pub fn commit(self, message: &str) -> Self {
        {
            let mut index = self.repo.index().expect("Failed to open index");
            index
                .add_all(["*"].iter(), IndexAddOption::DEFAULT, None)
                .expect("Failed to stage files");
            index.write().expect("Failed to write index");
            let tree_id = index.write_tree().expect("Failed to write tree");
            let tree = self.repo.find_tree(tree_id).expect("Failed to find tree");
            let signature =
                Signature::now("spm", "spm@example.com").expect("Failed to create signature");
            let parent = self
                .repo
                .head()
                .ok()
                .and_then(|head| head.peel_to_commit().ok());
            let parents: Vec<&git2::Commit<'_>> = parent.iter().collect();
            self.repo
                .commit(Some("HEAD"), &signature, &signature, message, &tree, &parents)
                .expect("Failed to commit");
        }
        self
    }

    /// Create `name` at the current commit and make it the checked-out branch
    ///
    /// # Panics
    ///
    /// Panics if there is no commit yet or the branch cannot be created.
    #[must_use]
    pub fn branch(self, name: &str) -> Self {
        {
            let head = self
                .repo
                .head()
                .and_then(|head| head.peel_to_commit())
                .expect("Failed to resolve HEAD");
            self.repo
                .branch(name, &head, false)
                .expect("Failed to create branch");
            self.repo
                .set_head(&format!("refs/heads/{name}"))
                .expect("Failed to switch branch");
        }
        self
    }
}

impl Default for RepoFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Ordered log of fetches and deploys shared between doubles
pub type Journal = Rc<RefCell<Vec<String>>>;

/// A package tree whose `package.xml` holds `name` and whose `package.yml`
/// lists `dependencies`, both under `sub_path`
#[must_use]
pub fn package_tree(name: &str, sub_path: &str, dependencies: &[&str]) -> SourceTree {
    let at = |file: &str| {
        if sub_path.is_empty() {
            file.to_string()
        } else {
            format!("{sub_path}/{file}")
        }
    };
    let mut files = vec![FetchedFile::new(at("package.xml"), name)];
    if !dependencies.is_empty() {
        let mut yaml = String::from("packages:\n");
        for dep in dependencies {
            yaml.push_str(&format!("  - \"{dep}\"\n"));
        }
        files.push(FetchedFile::new(at(PACKAGE_FILE_NAME), yaml));
    }
    SourceTree::new(files)
}

/// Sleeper that only counts
#[derive(Debug, Default)]
pub struct NoopSleeper {
    sleeps: Cell<u32>,
    total: Cell<Duration>,
}

impl NoopSleeper {
    pub fn sleeps(&self) -> u32 {
        self.sleeps.get()
    }

    pub fn total(&self) -> Duration {
        self.total.get()
    }
}

impl Sleeper for NoopSleeper {
    fn sleep(&self, duration: Duration) {
        self.sleeps.set(self.sleeps.get() + 1);
        self.total.set(self.total.get() + duration);
    }
}

/// Fetcher that serves canned trees and records every call.
///
/// Locators without a canned tree get `package_tree(<display>, "", &[])`.
#[derive(Debug, Default)]
pub struct RecordingFetcher {
    trees: HashMap<String, SourceTree>,
    failing: HashSet<String>,
    fetched: RefCell<Vec<String>>,
    journal: Option<Journal>,
}

impl RecordingFetcher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// # Panics
    ///
    /// Panics if `spec` is not a valid locator.
    #[must_use]
    pub fn with_tree(mut self, spec: &str, tree: SourceTree) -> Self {
        let key = Locator::parse(spec).expect("valid locator").key();
        self.trees.insert(key, tree);
        self
    }

    /// # Panics
    ///
    /// Panics if `spec` is not a valid locator.
    #[must_use]
    pub fn failing(mut self, spec: &str) -> Self {
        self.failing
            .insert(Locator::parse(spec).expect("valid locator").key());
        self
    }

    #[must_use]
    pub fn with_journal(mut self, journal: &Journal) -> Self {
        self.journal = Some(Rc::clone(journal));
        self
    }

    /// Keys of every fetched locator, in call order
    pub fn fetched(&self) -> Vec<String> {
        self.fetched.borrow().clone()
    }
}

impl SourceFetcher for RecordingFetcher {
    fn fetch(&self, locator: &Locator) -> Result<SourceTree> {
        let key = locator.key();
        self.fetched.borrow_mut().push(key.clone());
        if let Some(journal) = &self.journal {
            journal.borrow_mut().push(format!("fetch {locator}"));
        }
        if self.failing.contains(&key) {
            return Err(SpmError::GitCloneFailed {
                url: locator.to_string(),
                reason: "Repository not found".to_string(),
            });
        }
        Ok(self
            .trees
            .get(&key)
            .cloned()
            .unwrap_or_else(|| package_tree(&locator.to_string(), "", &[])))
    }
}

/// Metadata API double with scripted job progress
#[derive(Debug, Default)]
pub struct ScriptedApi {
    /// Check on which a deploy reports done; `None` never finishes
    deploy_done_on: Option<u32>,
    deploy_success: bool,
    deploy_errors: Vec<String>,
    reject_submit: Option<String>,
    retrieve_archive: Option<Vec<u8>>,
    retrieve_done_on: u32,
    submitted: RefCell<Vec<Vec<u8>>>,
    job_checks: Cell<u32>,
    status_checks: Cell<u32>,
    retrieve_checks: Cell<u32>,
    retrieve_requests: RefCell<Vec<RetrieveRequest>>,
    journal: Option<Journal>,
}

impl ScriptedApi {
    /// Every deploy succeeds on its `checks`-th status check
    #[must_use]
    pub fn done_after(checks: u32) -> Self {
        Self {
            deploy_done_on: Some(checks),
            deploy_success: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn never_done() -> Self {
        Self::default()
    }

    /// Every deploy finishes unsuccessfully on the first check
    #[must_use]
    pub fn failing(errors: Vec<String>) -> Self {
        Self {
            deploy_done_on: Some(1),
            deploy_success: false,
            deploy_errors: errors,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn rejecting_submit(reason: &str) -> Self {
        Self {
            reject_submit: Some(reason.to_string()),
            ..Self::default()
        }
    }

    /// Retrieves finish with `archive` on their `checks`-th status check
    #[must_use]
    pub fn with_retrieve_archive(mut self, archive: Vec<u8>, checks: u32) -> Self {
        self.retrieve_archive = Some(archive);
        self.retrieve_done_on = checks;
        self
    }

    #[must_use]
    pub fn with_journal(mut self, journal: &Journal) -> Self {
        self.journal = Some(Rc::clone(journal));
        self
    }

    /// Archives passed to `submit_deploy`, in order
    pub fn submitted(&self) -> Vec<Vec<u8>> {
        self.submitted.borrow().clone()
    }

    /// Deploy status checks across all jobs
    pub fn status_checks(&self) -> u32 {
        self.status_checks.get()
    }

    pub fn retrieve_checks(&self) -> u32 {
        self.retrieve_checks.get()
    }

    pub fn retrieve_requests(&self) -> Vec<RetrieveRequest> {
        self.retrieve_requests.borrow().clone()
    }
}

/// Content of the deployed `package.xml`, used to name journal entries
fn deployed_package(archive_bytes: &[u8]) -> String {
    archive::read(archive_bytes)
        .ok()
        .and_then(|tree| {
            tree.get("src/package.xml")
                .map(|f| String::from_utf8_lossy(&f.content).into_owned())
        })
        .unwrap_or_else(|| "?".to_string())
}

impl MetadataApi for ScriptedApi {
    fn submit_deploy(&self, archive_bytes: &[u8]) -> Result<DeployJob> {
        if let Some(reason) = &self.reject_submit {
            return Err(SpmError::DeploySubmitFailed {
                reason: reason.clone(),
            });
        }
        if let Some(journal) = &self.journal {
            journal
                .borrow_mut()
                .push(format!("deploy {}", deployed_package(archive_bytes)));
        }
        self.submitted.borrow_mut().push(archive_bytes.to_vec());
        self.job_checks.set(0);
        Ok(DeployJob::new(format!(
            "0Af{:012}",
            self.submitted.borrow().len()
        )))
    }

    fn check_deploy_status(&self, _job: &JobId) -> Result<DeployStatus> {
        self.status_checks.set(self.status_checks.get() + 1);
        self.job_checks.set(self.job_checks.get() + 1);
        let done = self
            .deploy_done_on
            .is_some_and(|on| self.job_checks.get() >= on);
        Ok(DeployStatus {
            done,
            success: done && self.deploy_success,
            errors: if done {
                self.deploy_errors.clone()
            } else {
                Vec::new()
            },
        })
    }

    fn submit_retrieve(&self, request: &RetrieveRequest) -> Result<JobId> {
        self.retrieve_requests.borrow_mut().push(request.clone());
        Ok(JobId("09S000000000001".to_string()))
    }

    fn check_retrieve_status(&self, _job: &JobId) -> Result<RetrieveStatus> {
        self.retrieve_checks.set(self.retrieve_checks.get() + 1);
        let done = self.retrieve_archive.is_some()
            && self.retrieve_checks.get() >= self.retrieve_done_on;
        Ok(RetrieveStatus {
            done,
            archive: if done {
                self.retrieve_archive.clone()
            } else {
                None
            },
            errors: Vec::new(),
        })
    }
}

impl MetadataApi for Rc<ScriptedApi> {
    fn submit_deploy(&self, archive_bytes: &[u8]) -> Result<DeployJob> {
        (**self).submit_deploy(archive_bytes)
    }

    fn check_deploy_status(&self, job: &JobId) -> Result<DeployStatus> {
        (**self).check_deploy_status(job)
    }

    fn submit_retrieve(&self, request: &RetrieveRequest) -> Result<JobId> {
        (**self).submit_retrieve(request)
    }

    fn check_retrieve_status(&self, job: &JobId) -> Result<RetrieveStatus> {
        (**self).check_retrieve_status(job)
    }
}

/// Connector handing out a shared [`ScriptedApi`]
#[derive(Debug)]
pub struct ScriptedConnector {
    api: Rc<ScriptedApi>,
    logins: RefCell<Vec<String>>,
}

impl ScriptedConnector {
    pub fn new(api: Rc<ScriptedApi>) -> Self {
        Self {
            api,
            logins: RefCell::new(Vec::new()),
        }
    }

    /// `username@endpoint` of every login, in order
    pub fn logins(&self) -> Vec<String> {
        self.logins.borrow().clone()
    }
}

impl Connector for ScriptedConnector {
    fn connect(&self, target: &ServiceTarget) -> Result<Box<dyn MetadataApi>> {
        self.logins.borrow_mut().push(format!(
            "{}@{}",
            target.credentials.username, target.endpoint
        ));
        Ok(Box::new(Rc::clone(&self.api)))
    }
}
