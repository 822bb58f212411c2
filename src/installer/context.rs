//! Per-run install configuration

use std::path::PathBuf;

use crate::deploy::PollPolicy;
use crate::error::{Result, SpmError};
use crate::remote::{Credentials, ServiceTarget};

/// Settings shared read-only by every install in one invocation
#[derive(Debug, Clone)]
pub struct InstallContext {
    pub credentials: Credentials,
    pub endpoint: String,
    pub api_version: String,
    pub poll: PollPolicy,
    /// Where clone-only mode materialises packages
    pub directory: PathBuf,
    pub clone_only: bool,
}

impl InstallContext {
    /// Deploying needs both username and password; clone-only needs neither.
    pub fn check_configuration(&self) -> Result<()> {
        if self.clone_only {
            return Ok(());
        }
        if self.credentials.username.is_empty() {
            return Err(SpmError::MissingUsername);
        }
        if self.credentials.password.is_empty() {
            return Err(SpmError::MissingPassword);
        }
        Ok(())
    }

    pub fn service_target(&self) -> ServiceTarget {
        ServiceTarget {
            endpoint: self.endpoint.clone(),
            api_version: self.api_version.clone(),
            credentials: self.credentials.clone(),
        }
    }
}
