//! Command helper utilities

use std::path::{Path, PathBuf};

use console::Style;
use tempfile::TempDir;

use crate::cli::ConnectionArgs;
use crate::config::PackageFile;
use crate::deploy::PollPolicy;
use crate::error::{Result, SpmError};
use crate::installer::InstallContext;
use crate::remote::Credentials;
use crate::source::Locator;
use crate::temp::temp_dir_base;

/// Seconds between retrieve status checks
pub const RETRIEVE_POLL_SECONDS: u64 = 2;

/// Locators from a `--packages` file, or the single positional locator.
///
/// A missing or blank positional locator is `EmptySpecifier`.
pub fn load_locators(locator: Option<&str>, packages: Option<&Path>) -> Result<Vec<Locator>> {
    if let Some(path) = packages {
        return PackageFile::from_path(path)?.locators();
    }
    let raw = locator.unwrap_or_default();
    Ok(vec![Locator::parse(raw)?])
}

pub fn current_dir() -> Result<PathBuf> {
    std::env::current_dir().map_err(|e| SpmError::IoError {
        message: format!("Failed to get current directory: {e}"),
    })
}

/// Fresh working directory for clones that are read and thrown away.
///
/// Created inside `parent` when given, else under the system temp dir.
pub fn scratch_dir(parent: Option<&Path>) -> Result<TempDir> {
    let scratch_failed = |e: std::io::Error| SpmError::IoError {
        message: format!("Failed to create scratch directory: {e}"),
    };
    let parent = match parent {
        Some(dir) => {
            std::fs::create_dir_all(dir).map_err(scratch_failed)?;
            dir.to_path_buf()
        }
        None => temp_dir_base(),
    };
    tempfile::Builder::new()
        .prefix("spm-")
        .tempdir_in(parent)
        .map_err(scratch_failed)
}

/// Where repositories get cloned.
///
/// Clone-only runs keep their checkouts in `requested` (or the current
/// directory). Deploy runs always get a fresh scratch directory, nested in
/// `requested` if one was given, so nothing already on disk is replaced.
pub fn working_directory(
    clone_only: bool,
    requested: Option<PathBuf>,
) -> Result<(PathBuf, Option<TempDir>)> {
    if clone_only {
        let dir = match requested {
            Some(dir) => dir,
            None => current_dir()?,
        };
        return Ok((dir, None));
    }
    let scratch = scratch_dir(requested.as_deref())?;
    Ok((scratch.path().to_path_buf(), Some(scratch)))
}

pub fn install_context(
    connection: &ConnectionArgs,
    directory: PathBuf,
    clone_only: bool,
) -> InstallContext {
    InstallContext {
        credentials: Credentials::new(&connection.username, &connection.password),
        endpoint: connection.endpoint.clone(),
        api_version: connection.api_version.clone(),
        poll: PollPolicy::from_secs(connection.poll_seconds, connection.timeout_seconds),
        directory,
        clone_only,
    }
}

pub fn print_done(verb: &str, count: usize) {
    let noun = if count == 1 { "package" } else { "packages" };
    println!(
        "{} {verb} {count} {noun}",
        Style::new().green().bold().apply_to("✓")
    );
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;
    use crate::fetch::{RepositoryFetcher, SourceFetcher};
    use crate::test_fixtures::{RepoFixture, create_temp_dir};
    use std::fs;

    #[test]
    fn test_load_single_locator() {
        let locators = load_locators(Some("org/repo@dev"), None).expect("valid locator");
        assert_eq!(locators.len(), 1);
        assert_eq!(locators[0].to_string(), "https://github.com/org/repo@dev");
    }

    #[test]
    fn test_missing_locator_is_empty_specifier() {
        assert!(matches!(
            load_locators(None, None),
            Err(SpmError::EmptySpecifier)
        ));
        assert!(matches!(
            load_locators(Some(""), None),
            Err(SpmError::EmptySpecifier)
        ));
    }

    #[test]
    fn test_packages_file_wins_over_locator() {
        let temp = create_temp_dir();
        let path = temp.path().join("packages.yml");
        fs::write(&path, "packages:\n  - org/a\n  - org/b@v2\n").expect("Failed to write file");

        let locators = load_locators(Some("org/ignored"), Some(&path)).expect("valid file");
        let names: Vec<String> = locators.iter().map(ToString::to_string).collect();
        assert_eq!(
            names,
            vec!["https://github.com/org/a", "https://github.com/org/b@v2"]
        );
    }

    #[test]
    fn test_scratch_dir_is_absolute() {
        let dir = scratch_dir(None).expect("Failed to create scratch directory");
        assert!(dir.path().is_absolute());
    }

    #[test]
    fn test_clone_only_uses_requested_directory() {
        let temp = create_temp_dir();
        let (dir, scratch) =
            working_directory(true, Some(temp.path().to_path_buf())).expect("working directory");
        assert_eq!(dir, temp.path());
        assert!(scratch.is_none());
    }

    #[test]
    fn test_deploy_nests_scratch_in_requested_directory() {
        let temp = create_temp_dir();
        let (dir, scratch) =
            working_directory(false, Some(temp.path().to_path_buf())).expect("working directory");
        assert_ne!(dir, temp.path());
        assert!(dir.starts_with(temp.path()));
        drop(scratch);
        assert!(!dir.exists());
        assert!(temp.path().exists());
    }

    #[test]
    fn test_deploy_fetch_leaves_existing_checkout_alone() {
        let fixture = RepoFixture::new()
            .with_file("src/package.xml", "<Package/>")
            .commit("initial");
        let temp = create_temp_dir();
        let existing = temp.path().join("origin");
        fs::create_dir_all(&existing).expect("Failed to create directory");
        fs::write(existing.join("work.txt"), "uncommitted").expect("Failed to write file");

        let (dir, _scratch) =
            working_directory(false, Some(temp.path().to_path_buf())).expect("working directory");
        let locator = Locator::parse(&format!("{}@master", fixture.url())).expect("valid locator");
        let tree = RepositoryFetcher::new(&dir)
            .fetch(&locator)
            .expect("Failed to fetch");

        assert!(tree.get("src/package.xml").is_some());
        assert_eq!(
            fs::read_to_string(existing.join("work.txt")).expect("Failed to read file"),
            "uncommitted"
        );
    }
}
