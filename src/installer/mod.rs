//! Install coordination
//!
//! For each locator, in order:
//! 1. fetch its tree
//! 2. in clone-only mode, materialise it and stop
//! 3. install the dependencies listed in its `package.yml`, depth first
//! 4. pack the deploy root and deploy it
//!
//! The first failure stops the whole run. Every locator is pushed onto an
//! in-flight stack for the duration of its install; errors are tagged with
//! the package on top of that stack.

mod context;
mod deps;


pub use context::InstallContext;
pub use deps::load_dependencies;

use tracing::{debug, info};

use crate::archive::{self, DEPLOY_ROOT};
use crate::deploy::{Deployer, Sleeper};
use crate::error::{Result, SpmError};
use crate::fetch::{SourceFetcher, SourceTree};
use crate::remote::MetadataApi;
use crate::source::Locator;

pub struct Installer<'a> {
    ctx: &'a InstallContext,
    fetcher: &'a dyn SourceFetcher,
    api: Option<&'a dyn MetadataApi>,
    sleeper: &'a dyn Sleeper,
    /// Display form of each in-flight locator, outermost first
    stack: Vec<String>,
    /// Cycle-detection keys, parallel to `stack`
    keys: Vec<String>,
}

impl<'a> Installer<'a> {
    pub fn new(ctx: &'a InstallContext, fetcher: &'a dyn SourceFetcher, sleeper: &'a dyn Sleeper) -> Self {
        Self {
            ctx,
            fetcher,
            api: None,
            sleeper,
            stack: Vec::new(),
            keys: Vec::new(),
        }
    }

    /// Session used for deploys; not needed in clone-only mode
    #[must_use]
    pub fn with_api(mut self, api: &'a dyn MetadataApi) -> Self {
        self.api = Some(api);
        self
    }

    /// Install `locators` in order, stopping at the first failure
    pub fn install(&mut self, locators: &[Locator]) -> Result<()> {
        self.ctx.check_configuration()?;
        self.install_all(locators)
    }

    /// Deploy the removal of each package in `locators`.
    ///
    /// Dependencies are left in place.
    pub fn uninstall(&mut self, locators: &[Locator]) -> Result<()> {
        self.ctx.check_configuration()?;
        for locator in locators {
            self.in_frame(locator, |installer| installer.uninstall_current(locator))?;
        }
        Ok(())
    }

    fn install_all(&mut self, locators: &[Locator]) -> Result<()> {
        for locator in locators {
            self.in_frame(locator, |installer| installer.install_current(locator))?;
        }
        Ok(())
    }

    /// Run `work` with `locator` on top of the in-flight stack.
    ///
    /// The frame is popped whatever `work` returns, and its error is tagged
    /// with the stack as it was when the error surfaced.
    fn in_frame(
        &mut self,
        locator: &Locator,
        work: impl FnOnce(&mut Self) -> Result<()>,
    ) -> Result<()> {
        self.check_cycle(locator)
            .map_err(|e| e.in_package(&self.stack))?;

        self.stack.push(locator.to_string());
        self.keys.push(locator.key());
        debug!("{locator}: start (depth {})", self.stack.len());

        let result = work(self).map_err(|e| e.in_package(&self.stack));

        self.stack.pop();
        self.keys.pop();
        result
    }

    fn check_cycle(&self, locator: &Locator) -> Result<()> {
        let key = locator.key();
        if self.keys.contains(&key) {
            let mut chain = self.keys.clone();
            chain.push(key);
            return Err(SpmError::CircularDependency {
                chain: chain.join(" -> "),
            });
        }
        Ok(())
    }

    fn top(&self) -> &str {
        self.stack.last().map_or("", String::as_str)
    }

    fn install_current(&mut self, locator: &Locator) -> Result<()> {
        let tree = self.fetcher.fetch(locator)?;
        if self.ctx.clone_only {
            return self.materialize(&tree);
        }

        let dependencies = load_dependencies(&tree, locator.sub_path())?;
        if !dependencies.is_empty() {
            info!("{}: Install {} dependencies", self.top(), dependencies.len());
        }
        self.install_all(&dependencies)?;

        let package = deploy_root(&tree, locator)?;
        let bytes = archive::pack(&package, DEPLOY_ROOT)?;
        self.deployer()?.deploy(&bytes, self.top())
    }

    fn uninstall_current(&mut self, locator: &Locator) -> Result<()> {
        let tree = self.fetcher.fetch(locator)?;
        let package = deploy_root(&tree, locator)?;
        let bytes = archive::pack_destructive(&package, DEPLOY_ROOT, &self.ctx.api_version)?;
        self.deployer()?.deploy(&bytes, self.top())
    }

    fn materialize(&self, tree: &SourceTree) -> Result<()> {
        if let Some(location) = tree.location() {
            info!("{}: Cloned to {}", self.top(), location.display());
            return Ok(());
        }
        tree.write_to(&self.ctx.directory)?;
        info!(
            "{}: Wrote {} files to {}",
            self.top(),
            tree.len(),
            self.ctx.directory.display()
        );
        Ok(())
    }

    fn deployer(&self) -> Result<Deployer<'a>> {
        let api = self.api.ok_or_else(|| SpmError::DeploySubmitFailed {
            reason: "not logged in to the metadata service".to_string(),
        })?;
        Ok(Deployer::new(api, self.ctx.poll, self.sleeper))
    }
}

/// The part of `tree` that gets deployed
fn deploy_root(tree: &SourceTree, locator: &Locator) -> Result<SourceTree> {
    let package = tree.scoped(locator.sub_path());
    if package.is_empty() {
        return Err(SpmError::ArchiveInvalid {
            reason: format!("no files under '{}'", locator.sub_path()),
        });
    }
    Ok(package)
}
