//! Package sources
//!
//! This module handles parsing package specifiers into [`Locator`]s:
//! - GitHub short-form: `owner/repo`, `owner/repo/sub/path@ref`
//! - Full repository URLs: `https://host/owner/repo[/sub/path][@ref]`
//! - Local repositories: `file:///abs/path/repo[@ref]`
//! - Retrieval sources: `sf://user:pass@endpoint?path=package.toml&version=38.0`
//!
//! ## Module Organization
//!
//! - `locator.rs`: Locator types and parsing
//! - `url_parser.rs`: grammar helpers (ref splitting, query parsing)

pub mod locator;
pub mod url_parser;

pub use locator::{
    DEFAULT_API_VERSION, DEFAULT_REF, DEFAULT_REPOSITORY, Locator, RepositoryLocator,
    RetrievalLocator, Scheme, Transport,
};
