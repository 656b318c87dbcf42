//! Configuration loaders rooted in a temporary directory.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use camino::Utf8PathBuf;
use ortho_config::{OrthoConfig, OrthoError};
use tempfile::TempDir;

use parley_config::Config;

use crate::bootstrap::ConfigLoader;

/// Loader whose session directory lives under a private temporary directory.
pub struct TestConfigLoader {
    root: TempDir,
    config: Config,
}

impl TestConfigLoader {
    #[must_use]
    pub fn new() -> Self {
        let root = TempDir::new().expect("failed to create temporary directory");
        let config = Config {
            session_dir: Some(utf8(&root.path().join("session"))),
            log_filter: Some("warn".to_owned()),
            ..Config::default()
        };
        Self { root, config }
    }

    /// Credential directory handed to the daemon.
    #[must_use]
    pub fn session_dir(&self) -> PathBuf {
        self.root.path().join("session")
    }

    /// Mutable access to the configuration returned by [`ConfigLoader::load`].
    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    /// Directs the first-pairing export to `name` under the root.
    pub fn export_to(&mut self, name: &str) -> PathBuf {
        let path = self.root.path().join(name);
        self.config.session_export_path = Some(utf8(&path));
        path
    }
}

impl Default for TestConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader for TestConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Ok(self.config.clone())
    }
}

/// Loader that intentionally fails by passing an unparseable CLI value.
pub struct FailingConfigLoader;

impl ConfigLoader for FailingConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        let args = vec![
            OsString::from("parleyd"),
            OsString::from("--max-reconnect-attempts"),
            OsString::from("many"),
        ];
        Config::load_from_iter(args)
    }
}

fn utf8(path: &Path) -> Utf8PathBuf {
    Utf8PathBuf::from_path_buf(path.to_path_buf()).expect("temporary path was not valid UTF-8")
}
