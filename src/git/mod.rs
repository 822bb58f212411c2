//! Git operations for fetching packages
//!
//! This module handles:
//! - Shallow, single-branch clones (HTTPS, SSH and local `file://` repositories)
//! - Retrying once into a dirty clone target after removing it
//! - Reading every blob of the checked-out commit into memory
//!
//! Authentication is delegated entirely to git's native system:
//! - SSH keys from ~/.ssh/ and the SSH agent
//! - Git credential helpers

mod auth;
mod clone;
mod error;
mod tree;

pub use clone::clone_branch;
pub use tree::read_head_tree;
