//! Probe configuration.
//!
//! Holds the settings the connectivity prober reads: which well-known host to
//! probe, how long to wait for each probe, and the user agent to send. The
//! settings can be built in code or loaded from a TOML file.

use std::path::Path;
use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use thiserror::Error;

/// Host probed first on every connectivity check.
pub const DEFAULT_WELL_KNOWN_URL: &str = "http://www.google.com";

/// Configuration for connectivity probing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeConfig {
    /// URL that is always probed first.
    /// Default: `http://www.google.com`
    pub well_known_url: String,

    /// Time to wait for each HEAD request before treating it as a failed connect.
    /// Default: none (the HTTP client's own behavior)
    pub probe_timeout: Option<Duration>,

    /// User agent sent with each probe.
    /// Default: none (the HTTP client's own user agent)
    pub user_agent: Option<String>,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            well_known_url: DEFAULT_WELL_KNOWN_URL.to_string(),
            probe_timeout: None,
            user_agent: None,
        }
    }
}

/// Errors that can occur when loading probe configuration.
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    /// The configuration file was not found.
    #[error("configuration file not found: {0}")]
    FileNotFound(String),

    /// The configuration file could not be parsed.
    #[error("failed to parse configuration: {0}")]
    ParseError(#[from] ConfigError),

    /// The configuration file path is invalid.
    #[error("invalid configuration path: {0}")]
    InvalidPath(String),
}

/// On-disk form of [`ProbeConfig`].
#[derive(Debug, Default, Deserialize)]
struct ProbeConfigFile {
    #[serde(default)]
    well_known_url: Option<String>,
    #[serde(default)]
    probe_timeout_secs: Option<u64>,
    #[serde(default)]
    user_agent: Option<String>,
}

impl From<ProbeConfigFile> for ProbeConfig {
    fn from(file: ProbeConfigFile) -> Self {
        let defaults = ProbeConfig::default();
        Self {
            well_known_url: file.well_known_url.unwrap_or(defaults.well_known_url),
            probe_timeout: file.probe_timeout_secs.map(Duration::from_secs),
            user_agent: file.user_agent,
        }
    }
}

impl ProbeConfig {
    /// Creates a new ProbeConfig with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the well-known URL.
    pub fn with_well_known_url(mut self, url: impl Into<String>) -> Self {
        self.well_known_url = url.into();
        self
    }

    /// Sets the per-probe timeout.
    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = Some(timeout);
        self
    }

    /// Sets the user agent.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Load probe configuration from a TOML file.
    ///
    /// Values in the file can be overridden with environment variables
    /// prefixed `WHATNET_`, e.g. `WHATNET_PROBE_TIMEOUT_SECS=5`.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use whatnet::connectivity::ProbeConfig;
    ///
    /// let config = ProbeConfig::load("whatnet.toml")?;
    /// # Ok::<(), whatnet::connectivity::ConfigLoadError>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigLoadError> {
        let path = path.as_ref();

        let path_str = path
            .to_str()
            .ok_or_else(|| ConfigLoadError::InvalidPath(format!("{:?}", path)))?;

        if !path.exists() {
            return Err(ConfigLoadError::FileNotFound(path_str.to_string()));
        }

        let config = Config::builder()
            .add_source(File::with_name(path_str))
            .add_source(Environment::with_prefix("WHATNET").try_parsing(true))
            .build()?;

        let file: ProbeConfigFile = config.try_deserialize()?;

        Ok(file.into())
    }
}
