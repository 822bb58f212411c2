use std::path::PathBuf;

use clap::Parser;

use super::ConnectionArgs;

/// Arguments for the uninstall command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Delete the components of a package:\n    spm uninstall myorg/myrepo\n\n\
                  Delete every package in a list:\n    spm uninstall -P packages.yml")]
pub struct UninstallArgs {
    /// Package locator whose package.xml lists the components to delete
    pub locator: Option<String>,

    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// YAML file with a `packages` list to uninstall instead of a single locator
    #[arg(long = "packages", short = 'P', value_name = "FILE")]
    pub packages: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::super::{Cli, Commands};
    use clap::Parser;

    #[test]
    fn test_cli_parsing_uninstall() {
        let cli = Cli::try_parse_from(["spm", "uninstall", "org/repo", "-u", "admin", "-p", "pw"])
            .unwrap_or_else(|e| panic!("Failed to parse CLI arguments: {e}"));
        match cli.command {
            Commands::Uninstall(args) => {
                assert_eq!(args.locator.as_deref(), Some("org/repo"));
                assert_eq!(args.connection.username, "admin");
                assert!(args.packages.is_none());
            }
            _ => panic!("Expected Uninstall command"),
        }
    }
}
