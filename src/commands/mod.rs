//! Command implementations for spm CLI

pub mod clone;
pub mod completions;
mod helpers;
pub mod install;
pub mod uninstall;
pub mod version;
