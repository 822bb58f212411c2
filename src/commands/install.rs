//! Install command
//!
//! Wires the CLI arguments into an [`Installer`]: one login for the whole
//! run, a scratch directory for clones, and fetchers for both sources.

use tracing::debug;

use crate::cli::InstallArgs;
use crate::commands::helpers::{
    RETRIEVE_POLL_SECONDS, install_context, load_locators, print_done, working_directory,
};
use crate::deploy::{PollPolicy, ThreadSleeper};
use crate::error::Result;
use crate::fetch::{Dispatcher, RepositoryFetcher, RetrievalFetcher};
use crate::installer::Installer;
use crate::remote::{Connector, SoapConnector};

pub fn run(args: InstallArgs) -> Result<()> {
    let locators = load_locators(args.locator.as_deref(), args.packages.as_deref())?;

    // Held until the end of the run; dropping it removes deploy-mode clones
    let (directory, _scratch) = working_directory(args.clone_only, args.directory)?;
    debug!("working directory: {}", directory.display());

    let ctx = install_context(&args.connection, directory, args.clone_only);
    ctx.check_configuration()?;

    let sleeper = ThreadSleeper;
    let connector = SoapConnector::new()?;
    let session = if ctx.clone_only {
        None
    } else {
        Some(connector.connect(&ctx.service_target())?)
    };

    let repository = RepositoryFetcher::new(&ctx.directory).keep_checkout(ctx.clone_only);
    let mut retrieval = RetrievalFetcher::new(
        &connector,
        PollPolicy::from_secs(RETRIEVE_POLL_SECONDS, args.connection.timeout_seconds),
        &sleeper,
    );
    if ctx.clone_only {
        retrieval = retrieval.unpack_to(&ctx.directory);
    }
    let dispatcher = Dispatcher::new(&repository, &retrieval);

    let mut installer = Installer::new(&ctx, &dispatcher, &sleeper);
    if let Some(session) = &session {
        installer = installer.with_api(&**session);
    }
    installer.install(&locators)?;

    print_done(
        if ctx.clone_only { "Cloned" } else { "Installed" },
        locators.len(),
    );
    Ok(())
}
