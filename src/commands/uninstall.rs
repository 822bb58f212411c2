//! Uninstall command

use crate::cli::UninstallArgs;
use crate::commands::helpers::{
    RETRIEVE_POLL_SECONDS, install_context, load_locators, print_done, scratch_dir,
};
use crate::deploy::{PollPolicy, ThreadSleeper};
use crate::error::Result;
use crate::fetch::{Dispatcher, RepositoryFetcher, RetrievalFetcher};
use crate::installer::Installer;
use crate::remote::{Connector, SoapConnector};

pub fn run(args: UninstallArgs) -> Result<()> {
    let locators = load_locators(args.locator.as_deref(), args.packages.as_deref())?;
    let scratch = scratch_dir(None)?;

    let ctx = install_context(&args.connection, scratch.path().to_path_buf(), false);
    ctx.check_configuration()?;

    let sleeper = ThreadSleeper;
    let connector = SoapConnector::new()?;
    let session = connector.connect(&ctx.service_target())?;

    let repository = RepositoryFetcher::new(&ctx.directory);
    let retrieval = RetrievalFetcher::new(
        &connector,
        PollPolicy::from_secs(RETRIEVE_POLL_SECONDS, args.connection.timeout_seconds),
        &sleeper,
    );
    let dispatcher = Dispatcher::new(&repository, &retrieval);

    Installer::new(&ctx, &dispatcher, &sleeper)
        .with_api(&*session)
        .uninstall(&locators)?;

    print_done("Uninstalled", locators.len());
    Ok(())
}
