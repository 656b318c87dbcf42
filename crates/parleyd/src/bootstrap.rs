//! Daemon bootstrap orchestration.

use std::sync::Arc;

use ortho_config::{OrthoConfig, OrthoError};
use thiserror::Error;

use parley_commands::{CommandRegistry, Dispatcher, RegistryError, builtin};
use parley_config::{Config, ConfigError, SessionPaths, SessionPathsError};
use parley_session::{SessionOrigin, SessionStore};

use crate::health::HealthReporter;
use crate::process::ShutdownToken;
use crate::protocol::Connector;
use crate::supervisor::{Supervisor, SupervisorExit, SupervisorSettings};
use crate::telemetry::{self, TelemetryError, TelemetryHandle};

/// Trait abstracting configuration loading for testability.
pub trait ConfigLoader: Send + Sync {
    /// Loads the daemon configuration.
    ///
    /// # Errors
    ///
    /// Returns the loader's error when no configuration can be produced.
    fn load(&self) -> Result<Config, Arc<OrthoError>>;
}

/// Loader that delegates to [`Config::load`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemConfigLoader;

impl ConfigLoader for SystemConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Config::load()
    }
}

/// Loader that always yields the same configuration.
#[derive(Debug, Clone)]
pub struct StaticConfigLoader {
    config: Config,
}

impl StaticConfigLoader {
    /// Wraps an already resolved configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self { config }
    }
}

impl ConfigLoader for StaticConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Ok(self.config.clone())
    }
}

/// Errors surfaced during bootstrap.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// Configuration failed to load.
    #[error("failed to load configuration: {source}")]
    Configuration {
        /// Underlying loader error.
        #[source]
        source: Arc<OrthoError>,
    },
    /// Configuration loaded but holds inconsistent values.
    #[error("invalid configuration: {source}")]
    Invalid {
        /// Violated invariant.
        #[source]
        source: ConfigError,
    },
    /// Telemetry initialisation failed.
    #[error("failed to initialise telemetry: {source}")]
    Telemetry {
        /// Underlying telemetry error.
        #[source]
        source: TelemetryError,
    },
    /// The session directory could not be prepared.
    #[error("failed to prepare session directory: {source}")]
    SessionPaths {
        /// Filesystem error reported while preparing the directory.
        #[source]
        source: SessionPathsError,
    },
    /// The built-in command table is inconsistent.
    #[error("failed to register built-in commands: {source}")]
    Registry {
        /// Registration conflict.
        #[source]
        source: RegistryError,
    },
}

/// Result of a successful bootstrap invocation.
pub struct Daemon {
    config: Config,
    store: SessionStore,
    origin: SessionOrigin,
    registry: Arc<CommandRegistry>,
    telemetry: TelemetryHandle,
    reporter: Arc<dyn HealthReporter>,
}

impl Daemon {
    /// Accessor for the resolved configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Credential store backing the connection.
    #[must_use]
    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Where the session in the credential directory came from.
    #[must_use]
    pub fn origin(&self) -> SessionOrigin {
        self.origin
    }

    /// Commands available to the dispatcher.
    #[must_use]
    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    /// Accessor for the telemetry handle, primarily useful for testing.
    #[must_use]
    pub fn telemetry(&self) -> TelemetryHandle {
        self.telemetry
    }

    /// Supervises connections from `connector` until shutdown or a terminal
    /// close.
    pub fn run(self, connector: &dyn Connector, shutdown: &ShutdownToken) -> SupervisorExit {
        let settings = SupervisorSettings::from_config(&self.config, self.origin);
        let dispatcher = Dispatcher::new(self.registry, self.config.command_prefix());
        let mut supervisor = Supervisor::new(settings, self.store, dispatcher, self.reporter);
        supervisor.run(connector, shutdown)
    }
}

impl std::fmt::Debug for Daemon {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Daemon")
            .field("config", &self.config)
            .field("store", &self.store)
            .field("origin", &self.origin)
            .field("commands", &self.registry.len())
            .finish_non_exhaustive()
    }
}

/// Bootstraps the daemon using the supplied collaborators.
///
/// Loads and validates configuration, installs telemetry, prepares the
/// credential directory (restoring a supplied session blob when no valid
/// local session exists) and registers the built-in commands.
///
/// # Errors
///
/// Returns [`BootstrapError`] for the first step that fails; the reporter has
/// already been told about it.
pub fn bootstrap_with(
    loader: &dyn ConfigLoader,
    reporter: Arc<dyn HealthReporter>,
) -> Result<Daemon, BootstrapError> {
    reporter.bootstrap_starting();
    match prepare(loader, reporter.as_ref()) {
        Ok((config, store, origin, registry, telemetry)) => {
            reporter.bootstrap_succeeded(&config);
            Ok(Daemon {
                config,
                store,
                origin,
                registry: Arc::new(registry),
                telemetry,
                reporter,
            })
        }
        Err(error) => {
            reporter.bootstrap_failed(&error);
            Err(error)
        }
    }
}

type Prepared = (
    Config,
    SessionStore,
    SessionOrigin,
    CommandRegistry,
    TelemetryHandle,
);

fn prepare(
    loader: &dyn ConfigLoader,
    reporter: &dyn HealthReporter,
) -> Result<Prepared, BootstrapError> {
    let config = loader
        .load()
        .map_err(|source| BootstrapError::Configuration { source })?;
    config
        .validate()
        .map_err(|source| BootstrapError::Invalid { source })?;
    let telemetry =
        telemetry::initialise(&config).map_err(|source| BootstrapError::Telemetry { source })?;

    let paths = SessionPaths::from_config(&config)
        .map_err(|source| BootstrapError::SessionPaths { source })?;
    let store = SessionStore::new(paths.session_dir());
    let origin = store.prepare(config.session_blob());
    reporter.session_prepared(origin);

    let registry = builtin::registry().map_err(|source| BootstrapError::Registry { source })?;
    Ok((config, store, origin, registry, telemetry))
}
