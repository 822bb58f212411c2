//! Zip packaging of source trees
//!
//! Deploy archives put every file under a root prefix (`src/`), keep file
//! order as fetched, and use a fixed timestamp so the same tree always packs
//! to the same bytes.

use std::io::{Cursor, Read, Write};
use std::path::{Component, Path};

use tracing::{debug, warn};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipArchive, ZipWriter};

use crate::error::{Result, SpmError};
use crate::fetch::{DEFAULT_FILE_MODE, FetchedFile, SourceTree};

/// Root folder of deploy archives
pub const DEPLOY_ROOT: &str = "src";

/// Manifest every deployable package carries at its root
pub const PACKAGE_MANIFEST: &str = "package.xml";

const DESTRUCTIVE_MANIFEST: &str = "destructiveChanges.xml";

fn entry_options(mode: u32) -> SimpleFileOptions {
    let permissions = match mode & 0o777 {
        0 => DEFAULT_FILE_MODE,
        bits => bits,
    };
    SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .unix_permissions(permissions)
        .last_modified_time(DateTime::default())
}

/// Pack `tree` into a zip archive with every entry under `root_prefix/`.
///
/// Either the whole archive is returned or nothing is.
pub fn pack(tree: &SourceTree, root_prefix: &str) -> Result<Vec<u8>> {
    let prefix = root_prefix.trim_matches('/');
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));

    for file in tree.files() {
        let name = if prefix.is_empty() {
            file.path.clone()
        } else {
            format!("{prefix}/{}", file.path)
        };
        let pack_failed = |e: &dyn std::fmt::Display| SpmError::PackReadFailed {
            path: file.path.clone(),
            reason: e.to_string(),
        };
        writer
            .start_file(name.as_str(), entry_options(file.mode))
            .map_err(|e| pack_failed(&e))?;
        writer.write_all(&file.content).map_err(|e| pack_failed(&e))?;
    }

    let bytes = writer.finish()?.into_inner();
    debug!("packed {} files ({} bytes)", tree.len(), bytes.len());
    Ok(bytes)
}

/// Pack the removal of a package.
///
/// The package's `package.xml` becomes `destructiveChanges.xml` and an empty
/// `package.xml` for `api_version` is added beside it.
pub fn pack_destructive(tree: &SourceTree, root_prefix: &str, api_version: &str) -> Result<Vec<u8>> {
    let manifest = tree
        .get(PACKAGE_MANIFEST)
        .ok_or_else(|| SpmError::ArchiveInvalid {
            reason: format!("no {PACKAGE_MANIFEST} at the package root to uninstall"),
        })?;

    let destructive = SourceTree::new(vec![
        FetchedFile::new(PACKAGE_MANIFEST, empty_package_manifest(api_version)),
        FetchedFile::new(DESTRUCTIVE_MANIFEST, manifest.content.clone()),
    ]);
    pack(&destructive, root_prefix)
}

fn empty_package_manifest(api_version: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<Package xmlns="http://soap.sforce.com/2006/04/metadata">
    <version>{api_version}</version>
</Package>
"#
    )
}

/// Decode a zip archive into a tree.
///
/// Directory entries are skipped, as are entries whose names would escape
/// the archive root.
pub fn read(bytes: &[u8]) -> Result<SourceTree> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;
    let mut files = Vec::with_capacity(archive.len());

    for index in 0..archive.len() {
        let mut entry = archive.by_index(index)?;
        if entry.is_dir() {
            continue;
        }
        let Some(path) = entry.enclosed_name().as_deref().and_then(slash_path) else {
            warn!("skipping archive entry outside the root: {}", entry.name());
            continue;
        };
        let mode = entry.unix_mode().unwrap_or(DEFAULT_FILE_MODE);
        let mut content = Vec::with_capacity(usize::try_from(entry.size()).unwrap_or_default());
        entry.read_to_end(&mut content)?;
        files.push(FetchedFile::new(path, content).with_mode(mode));
    }

    Ok(SourceTree::new(files))
}

/// Materialise an archive below `dest`
pub fn unpack(bytes: &[u8], dest: &Path) -> Result<SourceTree> {
    let tree = read(bytes)?;
    tree.write_to(dest)?;
    Ok(tree)
}

fn slash_path(path: &Path) -> Option<String> {
    let parts: Vec<&str> = path
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => part.to_str(),
            _ => None,
        })
        .collect();
    (!parts.is_empty()).then(|| parts.join("/"))
}
