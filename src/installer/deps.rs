//! Dependency loading from fetched trees

use tracing::debug;

use crate::config::{PACKAGE_FILE_NAME, PackageFile};
use crate::error::Result;
use crate::fetch::SourceTree;
use crate::source::Locator;

fn manifest_path(sub_path: &str) -> String {
    let sub_path = sub_path.trim_matches('/');
    if sub_path.is_empty() {
        PACKAGE_FILE_NAME.to_string()
    } else {
        format!("{sub_path}/{PACKAGE_FILE_NAME}")
    }
}

/// Locators listed in `<sub_path>/package.yml`, in file order.
///
/// A tree without the file has no dependencies.
pub fn load_dependencies(tree: &SourceTree, sub_path: &str) -> Result<Vec<Locator>> {
    let path = manifest_path(sub_path);
    let Some(file) = tree.get(&path) else {
        debug!("no {path}, no dependencies");
        return Ok(Vec::new());
    };
    PackageFile::from_bytes(&path, &file.content)?.locators()
}
