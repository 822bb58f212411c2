use std::path::PathBuf;

use clap::{Args, Parser};

use crate::remote::DEFAULT_LOGIN_ENDPOINT;
use crate::source::DEFAULT_API_VERSION;

/// Login and polling flags shared by install and uninstall
#[derive(Args, Debug, Clone)]
pub struct ConnectionArgs {
    /// Username to log in with
    #[arg(long, short = 'u', env = "SF_USERNAME", default_value = "")]
    pub username: String,

    /// Password (with security token appended if required)
    #[arg(long, short = 'p', env = "SF_PASSWORD", default_value = "", hide_env_values = true)]
    pub password: String,

    /// Login host
    #[arg(long, short = 'e', env = "SF_ENDPOINT", default_value = DEFAULT_LOGIN_ENDPOINT)]
    pub endpoint: String,

    /// Metadata API version
    #[arg(long = "apiversion", env = "SF_APIVERSION", default_value = DEFAULT_API_VERSION)]
    pub api_version: String,

    /// Seconds between deploy status checks
    #[arg(
        long = "poll-seconds",
        alias = "pollSeconds",
        env = "SF_POLLSECONDS",
        default_value_t = 5,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub poll_seconds: u64,

    /// Give up waiting for a deploy after this many seconds (0 waits forever)
    #[arg(
        long = "timeout-seconds",
        alias = "timeoutSeconds",
        env = "SF_TIMEOUTSECONDS",
        default_value_t = 0
    )]
    pub timeout_seconds: u64,
}

/// Arguments for the install command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                   Install from GitHub:\n    spm install myorg/myrepo\n    \
                   spm install https://github.com/myorg/myrepo/src@develop\n\n\
                   Install every package in a list:\n    spm install -P packages.yml\n\n\
                   Clone without deploying:\n    spm install myorg/myrepo --clone-only -d ./vendor")]
pub struct InstallArgs {
    /// Package locator: owner/repo[/path][@ref], https://host/owner/repo[/path][@ref]
    /// or sf://user:pass@endpoint[?path=..&version=..]
    pub locator: Option<String>,

    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// YAML file with a `packages` list to install instead of a single locator
    #[arg(long = "packages", short = 'P', value_name = "FILE")]
    pub packages: Option<PathBuf>,

    /// Only download packages; do not deploy or follow dependencies
    #[arg(long = "clone-only")]
    pub clone_only: bool,

    /// Directory for downloaded packages (defaults to the current directory)
    #[arg(long, short = 'd', value_name = "DIR")]
    pub directory: Option<PathBuf>,
}
