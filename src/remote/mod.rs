//! Remote metadata service collaborator
//!
//! The installer only talks to the service through [`Connector`] and
//! [`MetadataApi`]; [`soap::SoapConnector`] is the production implementation.

mod envelope;
pub mod soap;

use std::fmt;
use std::time::Instant;

use crate::error::Result;

pub use soap::SoapConnector;

/// Production login host
pub const DEFAULT_LOGIN_ENDPOINT: &str = "login.salesforce.com";

/// Login credentials for the metadata service
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Where and as whom to log in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceTarget {
    /// Bare login host, e.g. `login.salesforce.com`
    pub endpoint: String,
    pub api_version: String,
    pub credentials: Credentials,
}

/// Opaque identifier of an asynchronous service job
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JobId(pub String);

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A submitted deploy, used as the polling key
#[derive(Debug, Clone)]
pub struct DeployJob {
    pub id: JobId,
    pub submitted_at: Instant,
}

impl DeployJob {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: JobId(id.into()),
            submitted_at: Instant::now(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeployStatus {
    pub done: bool,
    pub success: bool,
    /// Component and test failures reported by the service
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RetrieveStatus {
    pub done: bool,
    /// Decoded zip archive; present once `done` is set
    pub archive: Option<Vec<u8>>,
    pub errors: Vec<String>,
}

/// One `<types>` entry of a retrieve request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataType {
    pub name: String,
    pub members: Vec<String>,
}

/// What to pull from the service
#[derive(Debug, Clone, PartialEq)]
pub struct RetrieveRequest {
    pub api_version: String,
    pub types: Vec<MetadataType>,
}

/// An authenticated session against the metadata API
pub trait MetadataApi {
    fn submit_deploy(&self, archive: &[u8]) -> Result<DeployJob>;

    fn check_deploy_status(&self, job: &JobId) -> Result<DeployStatus>;

    fn submit_retrieve(&self, request: &RetrieveRequest) -> Result<JobId>;

    fn check_retrieve_status(&self, job: &JobId) -> Result<RetrieveStatus>;
}

/// Creates sessions; one login per call
pub trait Connector {
    fn connect(&self, target: &ServiceTarget) -> Result<Box<dyn MetadataApi>>;
}
