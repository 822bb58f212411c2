//! Configuration file handling for spm
//!
//! This module contains data structures for:
//! - `package.yml` - Dependency list inside a package, or a `--packages` file
//! - `package.toml` - Retrieval manifest for `sf://` sources

pub mod package_file;
pub mod retrieve_manifest;

pub use package_file::{PACKAGE_FILE_NAME, PackageFile};
pub use retrieve_manifest::RetrieveManifest;
