//! # Swarm Config
//!
//! Settings for an application that polls a torrent daemon: where the daemon
//! is, how often to refresh torrent records, and how long to wait for it.
//!
//! Sources are layered, later ones overriding earlier ones:
//!
//! 1. Built-in defaults.
//! 2. A configuration file: an explicit path, or `config.toml` in the
//!    platform's configuration directory if it exists. TOML, YAML and JSON
//!    are recognised by extension.
//! 3. `SWARM_`-prefixed environment variables (`SWARM_DAEMON`,
//!    `SWARM_REFRESH`, `SWARM_TIMEOUT`).

pub mod error;
mod url;

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use serde::{Deserialize, Serialize};
use swarm_types::Timedelta;
use tracing::instrument;

pub use crate::error::{Error, ErrorKind, Result};
pub use crate::url::{DaemonUrl, Scheme};

pub const ENV_PREFIX: &str = "SWARM_";
pub const FILE_NAME: &str = "config.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Daemon RPC address.
    pub daemon: DaemonUrl,
    /// How often torrent records are refreshed.
    pub refresh: Timedelta,
    /// Request timeout, in seconds.
    pub timeout: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            daemon: DaemonUrl::default(),
            refresh: Timedelta::from_secs(5),
            timeout: 10,
        }
    }
}

impl Config {
    /// Loads and validates the configuration.
    ///
    /// # Errors
    ///
    /// - [`ErrorKind::NotFound`] if `path` is given but doesn't exist.
    /// - [`ErrorKind::UnsupportedFormat`] for unknown file extensions.
    /// - [`ErrorKind::Invalid`] if the merged sources don't make a valid
    ///   configuration.
    #[instrument(name = "loading configuration")]
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let figment = Figment::from(Serialized::defaults(Self::default()));
        let figment = match path {
            Some(path) if !path.exists() => exn::bail!(ErrorKind::NotFound(path.to_path_buf())),
            Some(path) => Self::merge_file(figment, path)?,
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::merge_file(figment, &path)?,
                _ => figment,
            },
        };
        let config: Self = figment
            .merge(Env::prefixed(ENV_PREFIX))
            .extract()
            .or_raise(|| ErrorKind::Invalid("configuration sources don't form a valid configuration".to_string()))?;
        config.validate()?;
        tracing::debug!(daemon = %config.daemon, refresh = %config.refresh, timeout = config.timeout, "Loaded configuration");
        Ok(config)
    }

    /// `config.toml` in the platform's configuration directory for swarm.
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "swarm").map(|dirs| dirs.config_dir().join(FILE_NAME))
    }

    fn merge_file(figment: Figment, path: &Path) -> Result<Figment> {
        tracing::debug!(path = %path.display(), "Reading configuration file");
        Ok(match path.extension().and_then(OsStr::to_str) {
            Some("toml") => figment.merge(Toml::file_exact(path)),
            Some("yaml" | "yml") => figment.merge(Yaml::file_exact(path)),
            Some("json") => figment.merge(Json::file_exact(path)),
            _ => exn::bail!(ErrorKind::UnsupportedFormat(path.to_path_buf())),
        })
    }

    pub fn validate(&self) -> Result<()> {
        if !self.refresh.is_positive() {
            exn::bail!(ErrorKind::Invalid(format!("refresh interval must be positive, found {}", self.refresh)));
        }
        if self.timeout == 0 {
            exn::bail!(ErrorKind::Invalid("timeout must be at least one second".to_string()));
        }
        Ok(())
    }

    /// The refresh interval as a [`Duration`].
    pub fn refresh_interval(&self) -> Duration {
        self.refresh.duration().and_then(|duration| duration.try_into().ok()).unwrap_or(Duration::from_secs(5))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}
