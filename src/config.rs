//! voix-transfer configuration.
//!
//! Loaded from `~/.voix-transfer/config.toml` unless `--config` points
//! elsewhere. Every key is optional; a missing default file means defaults.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::channel::Adb;
use crate::locator::DEFAULT_REMOTE_ROOT;
use crate::orchestrator::Settings;

/// Errors from loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("invalid config at {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// voix-transfer configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct Config {
    /// The adb binary to invoke.
    pub adb: PathBuf,

    /// Device serial, for when more than one device is attached.
    pub serial: Option<String>,

    /// Recordings root on the device.
    pub remote_root: String,

    /// Local directory recordings are pulled into.
    pub destination: PathBuf,

    /// Seconds between call-state polls.
    pub call_poll_secs: u64,

    /// Seconds between transfer cycles.
    pub cycle_poll_secs: u64,

    /// Kill adb commands that run longer than this. Unset means wait forever.
    pub command_timeout_secs: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            adb: PathBuf::from("adb"),
            serial: None,
            remote_root: DEFAULT_REMOTE_ROOT.to_string(),
            destination: PathBuf::from("."),
            call_poll_secs: 5,
            cycle_poll_secs: 10,
            command_timeout_secs: None,
        }
    }
}

impl Config {
    /// Load config from `explicit`, or from the default path.
    ///
    /// An explicit path must exist. The default path may be absent,
    /// in which case defaults are used.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let (path, required) = match explicit {
            Some(path) => (path.to_path_buf(), true),
            None => match Self::path() {
                Some(path) => (path, false),
                None => return Ok(Self::default()),
            },
        };

        let contents = match fs::read_to_string(&path) {
            Ok(s) => s,
            Err(e) if e.kind() == io::ErrorKind::NotFound && !required => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                return Ok(Self::default());
            }
            Err(source) => return Err(ConfigError::Read { path, source }),
        };

        Self::from_toml(&contents, &path)
    }

    /// Parse and validate config text. `path` is only used in errors.
    pub fn from_toml(contents: &str, path: &Path) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// The default config file path: `~/.voix-transfer/config.toml`.
    pub fn path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".voix-transfer").join("config.toml"))
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.call_poll_secs == 0 {
            return Err(ConfigError::Invalid(
                "call-poll-secs must be at least 1".to_string(),
            ));
        }
        if self.cycle_poll_secs == 0 {
            return Err(ConfigError::Invalid(
                "cycle-poll-secs must be at least 1".to_string(),
            ));
        }
        if self.command_timeout_secs == Some(0) {
            return Err(ConfigError::Invalid(
                "command-timeout-secs must be at least 1 (omit it to wait forever)".to_string(),
            ));
        }
        if self.remote_root.trim().is_empty() {
            return Err(ConfigError::Invalid("remote-root is empty".to_string()));
        }
        Ok(())
    }

    /// The adb channel this config describes.
    pub fn channel(&self) -> Adb {
        Adb::new(&self.adb)
            .with_serial(self.serial.clone())
            .with_timeout(self.command_timeout_secs.map(Duration::from_secs))
    }

    /// Orchestrator settings this config describes.
    pub fn settings(&self) -> Settings {
        Settings {
            remote_root: self.remote_root.clone(),
            destination: self.destination.clone(),
            call_poll: Duration::from_secs(self.call_poll_secs),
            cycle_poll: Duration::from_secs(self.cycle_poll_secs),
        }
    }
}
