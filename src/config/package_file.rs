//! Package list (`package.yml`) data structures

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SpmError};
use crate::source::Locator;

/// Dependency manifest looked up at the deploy root of every fetched package
pub const PACKAGE_FILE_NAME: &str = "package.yml";

/// Ordered list of package specifiers
///
/// ```yaml
/// packages:
///   - https://github.com/org/base
///   - org/utils/src@v2
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageFile {
    #[serde(default)]
    pub packages: Vec<String>,
}

impl PackageFile {
    /// Parse a package file; blank content means no packages
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn from_bytes(source: &str, bytes: &[u8]) -> Result<Self> {
        let yaml = std::str::from_utf8(bytes).map_err(|e| SpmError::ConfigParseFailed {
            path: source.to_string(),
            reason: e.to_string(),
        })?;
        Self::from_yaml(yaml).map_err(|e| with_path(e, source))
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let yaml = fs::read_to_string(path).map_err(|e| SpmError::ConfigReadFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_yaml(&yaml).map_err(|e| with_path(e, &path.display().to_string()))
    }

    /// Parse every entry, in file order.
    ///
    /// The first unparsable entry fails the whole list.
    pub fn locators(&self) -> Result<Vec<Locator>> {
        self.packages.iter().map(|raw| Locator::parse(raw)).collect()
    }
}

fn with_path(err: SpmError, path: &str) -> SpmError {
    match err {
        SpmError::ConfigParseFailed { reason, .. } => SpmError::ConfigParseFailed {
            path: path.to_string(),
            reason,
        },
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::Scheme;

    #[test]
    fn test_parse_packages() {
        let file = PackageFile::from_yaml(
            "packages:\n  - https://github.com/org/base\n  - org/utils/src@v2\n",
        )
        .expect("Failed to parse package file");
        assert_eq!(
            file.packages,
            vec!["https://github.com/org/base", "org/utils/src@v2"]
        );

        let locators = file.locators().expect("Failed to parse locators");
        let Locator::Repository(base) = &locators[0] else {
            panic!("Expected repository locator, got {:?}", locators[0]);
        };
        assert_eq!(
            (base.host.as_str(), base.owner.as_str(), base.repo_name.as_str()),
            ("github.com", "org", "base")
        );
        assert_eq!(base.sub_path, "");
        let Locator::Repository(utils) = &locators[1] else {
            panic!("Expected repository locator, got {:?}", locators[1]);
        };
        assert_eq!(utils.repo_name, "utils");
        assert_eq!(utils.sub_path, "src");
        assert_eq!(utils.branch(), "v2");
    }

    #[test]
    fn test_blank_file_has_no_packages() {
        assert_eq!(
            PackageFile::from_yaml("  \n").expect("Failed to parse package file"),
            PackageFile::default()
        );
        assert!(
            PackageFile::from_yaml("packages: []\n")
                .expect("Failed to parse package file")
                .packages
                .is_empty()
        );
    }

    #[test]
    fn test_locators_expand_shorthand() {
        let file = PackageFile::from_yaml("packages:\n  - org/lib@dev\n  - sf://u:p@host\n")
            .expect("Failed to parse package file");
        let locators = file.locators().expect("Failed to parse locators");
        assert_eq!(locators[0].to_string(), "https://github.com/org/lib@dev");
        assert_eq!(locators[1].scheme(), Scheme::RetrievalSource);
    }

    #[test]
    fn test_empty_entry_is_empty_specifier() {
        let file = PackageFile::from_yaml("packages:\n  - \"\"\n").expect("Failed to parse");
        assert!(matches!(file.locators(), Err(SpmError::EmptySpecifier)));
    }

    #[test]
    fn test_invalid_yaml_reports_path() {
        match PackageFile::from_bytes("lib/package.yml", b"packages: [unclosed") {
            Err(SpmError::ConfigParseFailed { path, .. }) => assert_eq!(path, "lib/package.yml"),
            other => panic!("Expected ConfigParseFailed, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let result = PackageFile::from_path(Path::new("/nonexistent/spm/package.yml"));
        assert!(matches!(result, Err(SpmError::ConfigReadFailed { .. })));
    }
}
