//! Clone command

use crate::cli::CloneArgs;
use crate::commands::helpers::{RETRIEVE_POLL_SECONDS, current_dir, print_done};
use crate::deploy::{PollPolicy, ThreadSleeper};
use crate::error::Result;
use crate::fetch::{Dispatcher, RepositoryFetcher, RetrievalFetcher};
use crate::installer::{InstallContext, Installer};
use crate::remote::{Credentials, DEFAULT_LOGIN_ENDPOINT, SoapConnector};
use crate::source::{DEFAULT_API_VERSION, Locator};

/// Download one package into the output directory without deploying it
pub fn run(args: CloneArgs) -> Result<()> {
    let mut locator = Locator::parse(&args.locator)?;
    if let Some(manifest) = args.package {
        locator = locator.with_manifest_path(manifest);
    }
    let directory = match args.directory {
        Some(dir) => dir,
        None => current_dir()?,
    };

    let ctx = InstallContext {
        credentials: Credentials::default(),
        endpoint: DEFAULT_LOGIN_ENDPOINT.to_string(),
        api_version: DEFAULT_API_VERSION.to_string(),
        poll: PollPolicy::from_secs(RETRIEVE_POLL_SECONDS, args.timeout_seconds),
        directory,
        clone_only: true,
    };

    let sleeper = ThreadSleeper;
    let connector = SoapConnector::new()?;
    let repository = RepositoryFetcher::new(&ctx.directory).keep_checkout(true);
    let retrieval =
        RetrievalFetcher::new(&connector, ctx.poll, &sleeper).unpack_to(&ctx.directory);
    let dispatcher = Dispatcher::new(&repository, &retrieval);

    Installer::new(&ctx, &dispatcher, &sleeper).install(&[locator])?;
    print_done("Cloned", 1);
    Ok(())
}
