//! Reading a checked-out commit into memory

use git2::{ObjectType, Repository, TreeWalkMode, TreeWalkResult};

use crate::fetch::FetchedFile;

/// Every blob reachable from HEAD's tree, in pre-order walk order.
///
/// Paths are `/`-separated and relative to the repository root; modes are
/// the git file modes (`0o100644`, `0o100755`, ...).
pub fn read_head_tree(repo: &Repository) -> Result<Vec<FetchedFile>, git2::Error> {
    let tree = repo.head()?.peel_to_tree()?;
    let mut files = Vec::new();
    let mut failure = None;

    tree.walk(TreeWalkMode::PreOrder, |root, entry| {
        if entry.kind() != Some(ObjectType::Blob) {
            return TreeWalkResult::Ok;
        }
        let Some(name) = entry.name() else {
            return TreeWalkResult::Skip;
        };
        match repo.find_blob(entry.id()) {
            Ok(blob) => {
                files.push(
                    FetchedFile::new(format!("{root}{name}"), blob.content())
                        .with_mode(u32::try_from(entry.filemode()).unwrap_or_default()),
                );
                TreeWalkResult::Ok
            }
            Err(e) => {
                failure = Some(e);
                TreeWalkResult::Abort
            }
        }
    })?;

    match failure {
        Some(e) => Err(e),
        None => Ok(files),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::RepoFixture;

    fn read_tree_at(path: &std::path::Path) -> Vec<FetchedFile> {
        let repo = Repository::open(path).expect("Failed to open repository");
        read_head_tree(&repo).expect("Failed to read tree")
    }

    #[test]
    fn test_reads_all_blobs_with_relative_paths() {
        let fixture = RepoFixture::new()
            .with_file("README.md", "readme")
            .with_file("src/package.xml", "<Package/>")
            .with_file("src/classes/Foo.cls", "class Foo {}")
            .commit("initial");

        let files = read_tree_at(fixture.path());
        let mut paths: Vec<&str> = files.iter().map(|f| f.path.as_str()).collect();
        paths.sort_unstable();
        assert_eq!(
            paths,
            vec!["README.md", "src/classes/Foo.cls", "src/package.xml"]
        );
        let foo = files
            .iter()
            .find(|f| f.path == "src/classes/Foo.cls")
            .expect("Foo.cls should be present");
        assert_eq!(foo.content, b"class Foo {}");
        assert_eq!(foo.mode, 0o100_644);
    }

    #[cfg(unix)]
    #[test]
    fn test_keeps_executable_mode() {
        let fixture = RepoFixture::new()
            .with_executable("bin/run.sh", "#!/bin/sh")
            .commit("initial");

        let files = read_tree_at(fixture.path());
        assert_eq!(files[0].mode, 0o100_755);
    }
}
