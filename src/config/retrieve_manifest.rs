//! Retrieval manifest (`package.toml`) data structures

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{Result, SpmError};
use crate::remote::{MetadataType, RetrieveRequest};

/// Metadata to pull from the service
///
/// ```toml
/// version = 38.0
///
/// [[types]]
/// name = "ApexClass"
/// members = ["HelloSpm", "HelloSpm_Test"]
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RetrieveManifest {
    /// API version of the retrieved package; falls back to the locator's
    #[serde(default)]
    pub version: Option<f64>,
    #[serde(default)]
    pub types: Vec<ManifestType>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ManifestType {
    pub name: String,
    #[serde(default)]
    pub members: Vec<String>,
}

impl RetrieveManifest {
    pub fn from_toml(source: &str) -> Result<Self> {
        Ok(toml::from_str(source)?)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let source = fs::read_to_string(path).map_err(|e| SpmError::ConfigReadFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        toml::from_str(&source).map_err(|e| SpmError::ConfigParseFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }

    /// Build the retrieve selector, using `default_version` when the
    /// manifest does not pin one
    pub fn to_request(&self, default_version: &str) -> RetrieveRequest {
        let api_version = self
            .version
            .map_or_else(|| default_version.to_string(), |v| format!("{v:.1}"));
        RetrieveRequest {
            api_version,
            types: self
                .types
                .iter()
                .map(|t| MetadataType {
                    name: t.name.clone(),
                    members: t.members.clone(),
                })
                .collect(),
        }
    }
}
