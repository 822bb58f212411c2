use std::path::PathBuf;

use clap::Parser;

/// Arguments for the clone command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Retrieve metadata listed in package.toml:\n    spm clone sf://user:pass@login.salesforce.com\n\n\
                  Use another manifest and output directory:\n    spm clone sf://user:pass@login.salesforce.com --package meta.toml -d ./retrieved\n\n\
                  Clone a repository branch:\n    spm clone myorg/myrepo@develop")]
pub struct CloneArgs {
    /// Package locator
    pub locator: String,

    /// Retrieval manifest to use for sf:// locators
    #[arg(long, value_name = "FILE")]
    pub package: Option<String>,

    /// Output directory (defaults to the current directory)
    #[arg(long, short = 'd', value_name = "DIR")]
    pub directory: Option<PathBuf>,

    /// Seconds to wait for a retrieve before giving up (0 waits forever)
    #[arg(
        long = "timeout-seconds",
        alias = "timeoutSeconds",
        env = "SF_TIMEOUTSECONDS",
        default_value_t = 0
    )]
    pub timeout_seconds: u64,
}
