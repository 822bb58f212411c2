//! CLI definitions using clap derive API
//!
//! This module is organized into submodules for each command's argument types:
//! - install: Install command arguments and the shared connection flags
//! - clone: Clone command arguments
//! - uninstall: Uninstall command arguments
//! - completions: Completions command arguments

use clap::builder::{Styles, styling::AnsiColor};
use clap::{Parser, Subcommand};

pub mod clone;
pub mod completions;
pub mod install;
pub mod uninstall;

pub use clone::CloneArgs;
pub use completions::CompletionsArgs;
pub use install::{ConnectionArgs, InstallArgs};
pub use uninstall::UninstallArgs;

/// spm - Salesforce package manager
///
/// Deploy metadata packages straight from git repositories.
#[derive(Parser, Debug)]
#[command(
    name = "spm",
    author,
    version,
    color = clap::ColorChoice::Always,
    styles = Styles::styled()
        .header(AnsiColor::Green.on_default().bold())
        .usage(AnsiColor::Green.on_default().bold())
        .literal(AnsiColor::Cyan.on_default().bold())
        .placeholder(AnsiColor::Cyan.on_default()),
    about = "Salesforce package manager",
    long_about = "spm installs Salesforce metadata packages from git repositories (or from another org) \
                  into an org, deploying every package listed in a package's package.yml first.",
    after_help = "\x1b[1m\x1b[32mExamples:\x1b[0m\n   \
                  spm install myorg/myrepo                     \x1b[90m# Deploy from GitHub shorthand\x1b[0m\n   \
                  spm install myorg/myrepo/src@develop         \x1b[90m# Deploy a subdirectory of a branch\x1b[0m\n   \
                  spm install -P packages.yml                  \x1b[90m# Deploy every package in a list\x1b[0m\n   \
                  spm install myorg/myrepo --clone-only        \x1b[90m# Only clone the repository\x1b[0m\n   \
                  spm clone sf://user:pass@login.salesforce.com \x1b[90m# Retrieve metadata to disk\x1b[0m\n   \
                  spm uninstall myorg/myrepo                   \x1b[90m# Delete a package's components\x1b[0m\n\n\
                  "
)]
pub struct Cli {
    /// Enable verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Deploy packages and their dependencies
    #[command(visible_alias = "i")]
    Install(InstallArgs),

    /// Download a package without deploying it
    Clone(CloneArgs),

    /// Delete a package's components from the org
    Uninstall(UninstallArgs),

    /// Show version information
    #[command(hide = true)]
    Version,

    /// Generate shell completions
    Completions(CompletionsArgs),
}
