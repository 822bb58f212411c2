//! Deploy orchestration
//!
//! Submit an archive, then poll the job at a fixed interval until the
//! service reports it done or the timeout passes:
//!
//! ```text
//! Submitting -> Polling -> Succeeded | Failed | TimedOut
//! ```

mod poll;

pub use poll::{PollOutcome, PollPolicy, Sleeper, ThreadSleeper, poll_until};

use tracing::{debug, error, info};

use crate::error::{Result, SpmError};
use crate::remote::MetadataApi;

pub struct Deployer<'a> {
    api: &'a dyn MetadataApi,
    policy: PollPolicy,
    sleeper: &'a dyn Sleeper,
}

impl<'a> Deployer<'a> {
    pub fn new(api: &'a dyn MetadataApi, policy: PollPolicy, sleeper: &'a dyn Sleeper) -> Self {
        Self {
            api,
            policy,
            sleeper,
        }
    }

    /// Deploy `archive` and wait for the result.
    ///
    /// `label` names the package in progress lines. A job that finishes
    /// unsuccessfully is [`SpmError::DeployFailed`]; running out of time is
    /// [`SpmError::DeployTimedOut`].
    pub fn deploy(&self, archive: &[u8], label: &str) -> Result<()> {
        let job = self.api.submit_deploy(archive)?;
        debug!("{label}: deploy job {} submitted", job.id);

        let outcome = poll_until(&self.policy, self.sleeper, || {
            info!("{label}: Check Deploy Result...");
            let status = self.api.check_deploy_status(&job.id)?;
            Ok(status.done.then_some(status))
        })?;

        match outcome {
            PollOutcome::Done(status) if status.success => {
                debug!(
                    "{label}: job {} finished after {:?}",
                    job.id,
                    job.submitted_at.elapsed()
                );
                info!("{label}: Deploy is successful");
                Ok(())
            }
            PollOutcome::Done(status) => {
                let details = if status.errors.is_empty() {
                    format!("job {} reported failure", job.id)
                } else {
                    status.errors.join("; ")
                };
                error!("{label}: Deploy failed: {details}");
                Err(SpmError::DeployFailed { details })
            }
            PollOutcome::TimedOut { elapsed, polls } => {
                error!(
                    "{label}: Deploy is timeout. Please check release status for the deployment"
                );
                debug!("{label}: gave up on job {} after {polls} checks", job.id);
                Err(SpmError::DeployTimedOut {
                    elapsed_secs: elapsed.as_secs(),
                })
            }
        }
    }
}
