//! Package locators
//!
//! A `Locator` is the parsed form of a package specifier. Accepted forms:
//! - `https://host/owner/repo[/sub/path][@ref]`
//! - `owner/repo[/sub/path][@ref]` (host defaults to `github.com`)
//! - `file:///abs/path/to/repo[@ref]` (local repository)
//! - `sf://username:password@endpoint[?path=..&version=..]` (retrieval source)

use std::fmt;

use crate::error::{Result, SpmError};
use crate::source::url_parser;

/// Host used when a specifier omits it
pub const DEFAULT_REPOSITORY: &str = "github.com";

/// Branch used when a specifier omits `@ref`
pub const DEFAULT_REF: &str = "master";

/// Metadata API version used when none is configured
pub const DEFAULT_API_VERSION: &str = "38.0";

/// Retrieval manifest used when the `sf://` form has no `path` parameter
pub const DEFAULT_MANIFEST_PATH: &str = "./package.toml";

/// Which kind of source a locator points at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    RepositorySource,
    RetrievalSource,
}

/// How a repository is reached
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    Https,
    File,
}

/// A git repository, optionally scoped to a subdirectory and ref
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryLocator {
    pub transport: Transport,
    /// Empty for local repositories
    pub host: String,
    /// Parent directory for local repositories
    pub owner: String,
    pub repo_name: String,
    /// Deploy root inside the tree; empty means the tree root
    pub sub_path: String,
    /// Explicit `@ref`, if any
    pub git_ref: Option<String>,
}

impl RepositoryLocator {
    /// Branch to clone
    pub fn branch(&self) -> &str {
        self.git_ref.as_deref().unwrap_or(DEFAULT_REF)
    }

    /// URL handed to git
    pub fn clone_url(&self) -> String {
        match self.transport {
            Transport::Https => format!("https://{}/{}/{}", self.host, self.owner, self.repo_name),
            Transport::File => format!("file://{}/{}", self.owner, self.repo_name),
        }
    }

    /// Full URL form, including sub path and explicit ref
    pub fn full_url(&self) -> String {
        let mut url = self.clone_url();
        if !self.sub_path.is_empty() {
            url.push('/');
            url.push_str(&self.sub_path);
        }
        if let Some(git_ref) = &self.git_ref {
            url.push('@');
            url.push_str(git_ref);
        }
        url
    }
}

/// Connection parameters for pulling metadata from the service itself
#[derive(Clone, PartialEq, Eq)]
pub struct RetrievalLocator {
    pub username: String,
    pub password: String,
    pub endpoint: String,
    pub api_version: String,
    pub manifest_path: String,
}

impl fmt::Debug for RetrievalLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetrievalLocator")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("endpoint", &self.endpoint)
            .field("api_version", &self.api_version)
            .field("manifest_path", &self.manifest_path)
            .finish()
    }
}

/// Parsed package specifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Locator {
    Repository(RepositoryLocator),
    Retrieval(RetrievalLocator),
}

impl Locator {
    /// Parse a package specifier.
    ///
    /// Pure: the same input always yields an equal locator.
    pub fn parse(raw: &str) -> Result<Self> {
        let input = raw.trim();
        if input.is_empty() {
            return Err(SpmError::EmptySpecifier);
        }

        if let Some(rest) = input.strip_prefix("sf://") {
            return parse_retrieval(input, rest).map(Locator::Retrieval);
        }
        if let Some(rest) = input.strip_prefix("file://") {
            return parse_file(input, rest).map(Locator::Repository);
        }
        if let Some(rest) = input.strip_prefix("https://") {
            return parse_https(input, rest).map(Locator::Repository);
        }
        if url_parser::is_shorthand(input) {
            return parse_https(input, &format!("{DEFAULT_REPOSITORY}/{input}"))
                .map(Locator::Repository);
        }

        Err(SpmError::InvalidLocator {
            input: input.to_string(),
            reason: "Unknown locator format".to_string(),
        })
    }

    pub fn scheme(&self) -> Scheme {
        match self {
            Locator::Repository(_) => Scheme::RepositorySource,
            Locator::Retrieval(_) => Scheme::RetrievalSource,
        }
    }

    /// Deploy root inside the fetched tree
    pub fn sub_path(&self) -> &str {
        match self {
            Locator::Repository(repo) => &repo.sub_path,
            Locator::Retrieval(_) => "",
        }
    }

    /// Identity used for cycle detection: host, owner, repo, sub path and ref.
    ///
    /// Unlike [`fmt::Display`] the ref is always present, so `org/repo` and
    /// `org/repo@master` share a key.
    pub fn key(&self) -> String {
        match self {
            Locator::Repository(repo) => {
                let mut key = repo.clone_url();
                if !repo.sub_path.is_empty() {
                    key.push('/');
                    key.push_str(&repo.sub_path);
                }
                format!("{key}@{}", repo.branch())
            }
            Locator::Retrieval(sf) => format!("sf://{}@{}", sf.username, sf.endpoint),
        }
    }

    /// Point a retrieval locator at a different manifest file
    #[must_use]
    pub fn with_manifest_path(self, path: impl Into<String>) -> Self {
        match self {
            Locator::Retrieval(mut sf) => {
                sf.manifest_path = path.into();
                Locator::Retrieval(sf)
            }
            other => other,
        }
    }
}

impl fmt::Display for Locator {
    /// Human-readable form; never includes the password
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locator::Repository(repo) => f.write_str(&repo.full_url()),
            Locator::Retrieval(sf) => write!(f, "sf://{}@{}", sf.username, sf.endpoint),
        }
    }
}

fn parse_https(input: &str, rest: &str) -> Result<RepositoryLocator> {
    let (main_part, git_ref) = url_parser::split_ref(rest);
    let (host, owner, repo_name, sub_path) = url_parser::split_repository_path(main_part)
        .ok_or_else(|| SpmError::InvalidLocator {
            input: input.to_string(),
            reason: "expected host/owner/repository".to_string(),
        })?;

    Ok(RepositoryLocator {
        transport: Transport::Https,
        host: host.to_string(),
        owner: owner.to_string(),
        repo_name: repo_name.to_string(),
        sub_path,
        git_ref: git_ref.map(str::to_string),
    })
}

fn parse_file(input: &str, rest: &str) -> Result<RepositoryLocator> {
    let (path, git_ref) = url_parser::split_ref(rest);
    let path = path.trim_end_matches('/');
    let invalid = || SpmError::InvalidLocator {
        input: input.to_string(),
        reason: "expected an absolute repository path".to_string(),
    };
    if !path.starts_with('/') {
        return Err(invalid());
    }
    let (parent, repo_name) = path.rsplit_once('/').ok_or_else(invalid)?;
    if repo_name.is_empty() {
        return Err(invalid());
    }

    Ok(RepositoryLocator {
        transport: Transport::File,
        host: String::new(),
        owner: parent.to_string(),
        repo_name: repo_name.to_string(),
        sub_path: String::new(),
        git_ref: git_ref.map(str::to_string),
    })
}

fn parse_retrieval(input: &str, rest: &str) -> Result<RetrievalLocator> {
    let (authority, query) = match rest.split_once('?') {
        Some((authority, query)) => (authority, Some(query)),
        None => (rest, None),
    };
    let invalid = |reason: &str| SpmError::InvalidLocator {
        input: input.to_string(),
        reason: reason.to_string(),
    };

    let (credentials, endpoint) = authority
        .rsplit_once('@')
        .ok_or_else(|| invalid("expected username:password@endpoint"))?;
    let (username, password) = credentials
        .split_once(':')
        .ok_or_else(|| invalid("expected username:password@endpoint"))?;
    if endpoint.is_empty() || endpoint.contains('/') {
        return Err(invalid("endpoint must be a bare host name"));
    }

    let params = match query {
        Some(q) => url_parser::parse_query(q)?,
        None => url_parser::RetrievalQuery::default(),
    };

    Ok(RetrievalLocator {
        username: username.to_string(),
        password: password.to_string(),
        endpoint: endpoint.to_string(),
        api_version: params
            .version
            .unwrap_or_else(|| DEFAULT_API_VERSION.to_string()),
        manifest_path: params
            .path
            .unwrap_or_else(|| DEFAULT_MANIFEST_PATH.to_string()),
    })
}
