//! `pgbuild.toml` configuration.
//!
//! ```toml
//! database_url = "postgres://localhost/app"
//!
//! [diff]
//! checks = true
//!
//! [build]
//! layout = "psql"
//! ```

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::builder::Layout;
use crate::error::{PgBuildError, PgBuildResult, read_file};

pub const CONFIG_FILE: &str = "pgbuild.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Default deploy destination.
    pub database_url: Option<String>,
    pub diff: DiffConfig,
    pub build: BuildConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DiffConfig {
    /// Diff check constraints too.
    pub checks: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
    pub layout: Layout,
}

impl Config {
    pub fn from_toml_str(content: &str) -> PgBuildResult<Self> {
        toml::from_str(content).map_err(|e| PgBuildError::Config(e.to_string()))
    }

    /// Load the first configuration found.
    ///
    /// An explicit path must exist. Otherwise `./pgbuild.toml` then
    /// `<config dir>/pgbuild/config.toml` are tried, falling back to defaults.
    pub fn load(explicit: Option<&Path>) -> PgBuildResult<Self> {
        if let Some(path) = explicit {
            return Self::load_file(path);
        }

        match Self::candidates().into_iter().find(|p| p.is_file()) {
            Some(path) => Self::load_file(&path),
            None => {
                tracing::debug!("No configuration file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    fn load_file(path: &Path) -> PgBuildResult<Self> {
        let config = Self::from_toml_str(&read_file(path)?)
            .map_err(|e| PgBuildError::Config(format!("{}: {}", path.display(), e)))?;
        tracing::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    fn candidates() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(CONFIG_FILE)];
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("pgbuild").join("config.toml"));
        }
        paths
    }
}
