//! Source fetching
//!
//! A [`SourceFetcher`] turns a [`Locator`] into a [`SourceTree`]. The
//! [`Dispatcher`] picks the fetcher from the locator's scheme:
//! - `RepositorySource` -> [`RepositoryFetcher`] (git clone)
//! - `RetrievalSource` -> [`RetrievalFetcher`] (metadata retrieve job)

mod repository;
mod retrieval;
mod tree;

pub use repository::RepositoryFetcher;
pub use retrieval::RetrievalFetcher;
pub use tree::{DEFAULT_FILE_MODE, FetchedFile, SourceTree};

use crate::error::{Result, SpmError};
use crate::source::{Locator, Scheme};

/// Produces the files of one package
pub trait SourceFetcher {
    fn fetch(&self, locator: &Locator) -> Result<SourceTree>;
}

/// Routes each locator to the fetcher for its scheme
pub struct Dispatcher<'a> {
    repository: &'a dyn SourceFetcher,
    retrieval: &'a dyn SourceFetcher,
}

impl<'a> Dispatcher<'a> {
    pub fn new(repository: &'a dyn SourceFetcher, retrieval: &'a dyn SourceFetcher) -> Self {
        Self {
            repository,
            retrieval,
        }
    }

    pub fn dispatch(&self, locator: &Locator) -> &'a dyn SourceFetcher {
        match locator.scheme() {
            Scheme::RepositorySource => self.repository,
            Scheme::RetrievalSource => self.retrieval,
        }
    }
}

impl SourceFetcher for Dispatcher<'_> {
    fn fetch(&self, locator: &Locator) -> Result<SourceTree> {
        self.dispatch(locator).fetch(locator)
    }
}

fn wrong_scheme(locator: &Locator, expected: &str) -> SpmError {
    SpmError::InvalidLocator {
        input: locator.to_string(),
        reason: format!("expected a {expected} locator"),
    }
}
