//! Error types and handling for spm
//!
//! Uses `thiserror` for error definitions and `miette` for diagnostic codes.
//!
//! Variants are grouped by the stage that raises them:
//! - configuration (credentials, package files)
//! - locator parsing
//! - fetching (git clone, metadata retrieval)
//! - packaging
//! - deploying
//! - dependency walking

use miette::Diagnostic;
use thiserror::Error;

/// Main error type for spm operations
#[derive(Error, Diagnostic, Debug)]
pub enum SpmError {
    // Configuration errors
    #[error("Username is required")]
    #[diagnostic(
        code(spm::config::missing_username),
        help("Pass --username or set SF_USERNAME")
    )]
    MissingUsername,

    #[error("Password is required")]
    #[diagnostic(
        code(spm::config::missing_password),
        help("Pass --password or set SF_PASSWORD")
    )]
    MissingPassword,

    #[error("Failed to read configuration file: {path}: {reason}")]
    #[diagnostic(code(spm::config::read_failed))]
    ConfigReadFailed { path: String, reason: String },

    #[error("Failed to parse configuration file: {path}: {reason}")]
    #[diagnostic(code(spm::config::parse_failed))]
    ConfigParseFailed { path: String, reason: String },

    // Locator errors
    #[error("Repository not specified")]
    #[diagnostic(
        code(spm::locator::empty),
        help("Valid formats: owner/repo[/path][@ref], https://host/owner/repo[/path][@ref], sf://user:pass@endpoint[?path=..&version=..]")
    )]
    EmptySpecifier,

    #[error("Invalid package locator '{input}': {reason}")]
    #[diagnostic(code(spm::locator::invalid))]
    InvalidLocator { input: String, reason: String },

    #[error("Invalid query string '{query}': {reason}")]
    #[diagnostic(code(spm::locator::invalid_query))]
    InvalidQuery { query: String, reason: String },

    // Fetch errors
    #[error("Failed to clone repository: {url}: {reason}")]
    #[diagnostic(
        code(spm::git::clone_failed),
        help("Check that the URL and branch are correct and you have access to the repository")
    )]
    GitCloneFailed { url: String, reason: String },

    #[error("Clone target is not empty after cleanup: {path}")]
    #[diagnostic(
        code(spm::git::dirty_target),
        help("Remove the directory manually or choose another --directory")
    )]
    DirtyTarget { path: String },

    #[error("Failed to read repository tree for {url}: {reason}")]
    #[diagnostic(code(spm::git::tree_read_failed))]
    GitTreeReadFailed { url: String, reason: String },

    #[error("Git operation failed: {message}")]
    #[diagnostic(code(spm::git::operation_failed))]
    GitOperationFailed { message: String },

    #[error("Authentication failed for {endpoint}: {reason}")]
    #[diagnostic(
        code(spm::remote::auth_failed),
        help("Check username, password (with security token) and endpoint")
    )]
    AuthFailed { endpoint: String, reason: String },

    #[error("Retrieve failed: {reason}")]
    #[diagnostic(code(spm::remote::retrieve_failed))]
    RetrieveFailed { reason: String },

    #[error("Retrieve timed out after {elapsed_secs}s")]
    #[diagnostic(code(spm::remote::retrieve_timed_out))]
    RetrieveTimedOut { elapsed_secs: u64 },

    // Packaging errors
    #[error("Failed to pack '{path}': {reason}")]
    #[diagnostic(code(spm::archive::read_failed))]
    PackReadFailed { path: String, reason: String },

    #[error("Invalid archive: {reason}")]
    #[diagnostic(code(spm::archive::invalid))]
    ArchiveInvalid { reason: String },

    #[error("Poll interval must be at least one second when a timeout is set")]
    #[diagnostic(
        code(spm::config::poll_interval),
        help("Pass --poll-seconds 1 or more")
    )]
    InvalidPollInterval,

    // Deploy errors
    #[error("Failed to submit deploy: {reason}")]
    #[diagnostic(code(spm::deploy::submit_failed))]
    DeploySubmitFailed { reason: String },

    #[error("Failed to check deploy status: {reason}")]
    #[diagnostic(code(spm::deploy::status_failed))]
    DeployStatusFailed { reason: String },

    #[error("Deploy failed: {details}")]
    #[diagnostic(code(spm::deploy::failed))]
    DeployFailed { details: String },

    #[error("Deploy is timeout after {elapsed_secs}s. Please check release status for the deployment")]
    #[diagnostic(
        code(spm::deploy::timed_out),
        help("The deploy may still complete; raise --timeout-seconds or use 0 to wait indefinitely")
    )]
    DeployTimedOut { elapsed_secs: u64 },

    // Dependency errors
    #[error("Circular dependency detected: {chain}")]
    #[diagnostic(
        code(spm::deps::circular),
        help("Remove the circular dependency from package.yml")
    )]
    CircularDependency { chain: String },

    // File system errors
    #[error("Failed to write file: {path}: {reason}")]
    #[diagnostic(code(spm::fs::write_failed))]
    FileWriteFailed { path: String, reason: String },

    #[error("IO error: {message}")]
    #[diagnostic(code(spm::fs::io_error))]
    IoError { message: String },

    // Aggregating wrapper for the top-level coordinator
    #[error("{package}: {source} (via {chain})")]
    #[diagnostic(code(spm::install::failed))]
    InstallFailed {
        /// Locator that was being installed when the error surfaced
        package: String,
        /// Full in-flight chain, outermost first
        chain: String,
        source: Box<SpmError>,
    },
}

impl SpmError {
    /// Wrap an error with the in-flight locator stack.
    ///
    /// Already-wrapped errors are returned as-is so the innermost package
    /// (the one that actually failed) is the one reported.
    pub fn in_package(self, stack: &[String]) -> Self {
        if matches!(self, SpmError::InstallFailed { .. }) {
            return self;
        }
        let Some(package) = stack.last() else {
            return self;
        };
        SpmError::InstallFailed {
            package: package.clone(),
            chain: stack.join(" -> "),
            source: Box::new(self),
        }
    }

    /// The underlying error, with any `InstallFailed` wrapper removed
    pub fn root_cause(&self) -> &SpmError {
        match self {
            SpmError::InstallFailed { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

impl From<std::io::Error> for SpmError {
    fn from(err: std::io::Error) -> Self {
        SpmError::IoError {
            message: err.to_string(),
        }
    }
}

impl From<serde_yaml::Error> for SpmError {
    fn from(err: serde_yaml::Error) -> Self {
        SpmError::ConfigParseFailed {
            path: "unknown".to_string(),
            reason: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for SpmError {
    fn from(err: toml::de::Error) -> Self {
        SpmError::ConfigParseFailed {
            path: "unknown".to_string(),
            reason: err.to_string(),
        }
    }
}

impl From<git2::Error> for SpmError {
    fn from(err: git2::Error) -> Self {
        SpmError::GitOperationFailed {
            message: err.to_string(),
        }
    }
}

impl From<zip::result::ZipError> for SpmError {
    fn from(err: zip::result::ZipError) -> Self {
        SpmError::ArchiveInvalid {
            reason: err.to_string(),
        }
    }
}

impl From<reqwest::Error> for SpmError {
    fn from(err: reqwest::Error) -> Self {
        SpmError::IoError {
            message: format!("HTTP request failed: {err}"),
        }
    }
}

/// Result type alias using miette for error handling
pub type Result<T> = miette::Result<T, SpmError>;
