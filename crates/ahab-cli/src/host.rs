//! Access to the outside world: configuration on disk and the runtime
//! binary on `PATH`.

use std::path::PathBuf;

use ahab_common::config::{self, LoadedConfig};
use ahab_common::error::Result;
use ahab_runtime::dispatch::{self, DockerCli, Runtime};

/// Supplies configuration and a runtime on demand.
///
/// Both are resolved lazily so that help output works without either.
pub trait Host {
    /// Loads the project configuration.
    ///
    /// # Errors
    ///
    /// Returns a configuration or I/O error if nothing usable is found.
    fn load_config(&self) -> Result<LoadedConfig>;

    /// Returns the runtime commands are dispatched to.
    ///
    /// # Errors
    ///
    /// Returns a spawn error if the runtime binary cannot be found.
    fn runtime(&self) -> Result<Box<dyn Runtime + '_>>;

    /// Runtime program name as shown in help text.
    fn runtime_name(&self) -> &str;
}

/// The real environment of the running process.
#[derive(Debug)]
pub struct HostEnvironment {
    config: Option<PathBuf>,
    runtime: String,
}

impl HostEnvironment {
    /// Creates a host reading `config` (or discovering one) and running `runtime`.
    pub const fn new(config: Option<PathBuf>, runtime: String) -> Self {
        Self { config, runtime }
    }
}

impl Host for HostEnvironment {
    fn load_config(&self) -> Result<LoadedConfig> {
        config::load(self.config.as_deref())
    }

    fn runtime(&self) -> Result<Box<dyn Runtime + '_>> {
        let cli = DockerCli::locate(&self.runtime)?;
        dispatch::shield_interrupts();
        Ok(Box::new(cli))
    }

    fn runtime_name(&self) -> &str {
        &self.runtime
    }
}
