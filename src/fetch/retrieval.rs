//! Fetching packages straight from the metadata service

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::{SourceFetcher, SourceTree, wrong_scheme};
use crate::archive;
use crate::config::RetrieveManifest;
use crate::deploy::{PollOutcome, PollPolicy, Sleeper, poll_until};
use crate::error::{Result, SpmError};
use crate::remote::{Connector, Credentials, ServiceTarget};
use crate::source::{Locator, RetrievalLocator};

/// Folder the service wraps unpackaged retrieves in
const RETRIEVE_ROOT: &str = "unpackaged";

/// Logs in with the locator's own credentials, submits a retrieve for the
/// types named in its manifest and polls until the archive is ready.
pub struct RetrievalFetcher<'a> {
    connector: &'a dyn Connector,
    policy: PollPolicy,
    sleeper: &'a dyn Sleeper,
    /// Where the archive is unpacked as-is, if anywhere
    output: Option<PathBuf>,
}

impl<'a> RetrievalFetcher<'a> {
    pub fn new(connector: &'a dyn Connector, policy: PollPolicy, sleeper: &'a dyn Sleeper) -> Self {
        Self {
            connector,
            policy,
            sleeper,
            output: None,
        }
    }

    /// Also unpack each retrieved archive below `dir` and record it as the
    /// tree's location
    #[must_use]
    pub fn unpack_to(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output = Some(dir.into());
        self
    }

    fn retrieve(&self, sf: &RetrievalLocator) -> Result<SourceTree> {
        if sf.username.is_empty() {
            return Err(SpmError::MissingUsername);
        }
        if sf.password.is_empty() {
            return Err(SpmError::MissingPassword);
        }
        let manifest = RetrieveManifest::from_path(Path::new(&sf.manifest_path))?;

        let session = self.connector.connect(&ServiceTarget {
            endpoint: sf.endpoint.clone(),
            api_version: sf.api_version.clone(),
            credentials: Credentials::new(&sf.username, &sf.password),
        })?;

        info!("Start Retrieve Request...");
        let job = session.submit_retrieve(&manifest.to_request(&sf.api_version))?;
        let outcome = poll_until(&self.policy, self.sleeper, || {
            info!("Check Retrieve Status...");
            let status = session.check_retrieve_status(&job)?;
            Ok(status.done.then_some(status))
        })?;

        let status = match outcome {
            PollOutcome::Done(status) => status,
            PollOutcome::TimedOut { elapsed, .. } => {
                return Err(SpmError::RetrieveTimedOut {
                    elapsed_secs: elapsed.as_secs(),
                });
            }
        };
        for message in &status.errors {
            debug!("retrieve {job}: {message}");
        }
        let Some(bytes) = status.archive else {
            let reason = if status.errors.is_empty() {
                format!("job {job} finished without an archive")
            } else {
                status.errors.join("; ")
            };
            return Err(SpmError::RetrieveFailed { reason });
        };

        match &self.output {
            Some(dir) => {
                let tree = archive::unpack(&bytes, dir)?;
                Ok(strip_retrieve_root(tree).with_location(dir))
            }
            None => Ok(strip_retrieve_root(archive::read(&bytes)?)),
        }
    }
}

fn strip_retrieve_root(tree: SourceTree) -> SourceTree {
    let prefix = format!("{RETRIEVE_ROOT}/");
    let wrapped = !tree.is_empty() && tree.files().iter().all(|f| f.path.starts_with(&prefix));
    if wrapped {
        tree.scoped(RETRIEVE_ROOT)
    } else {
        tree
    }
}

impl SourceFetcher for RetrievalFetcher<'_> {
    fn fetch(&self, locator: &Locator) -> Result<SourceTree> {
        match locator {
            Locator::Retrieval(sf) => self.retrieve(sf),
            Locator::Repository(_) => Err(wrong_scheme(locator, "retrieval")),
        }
    }
}
