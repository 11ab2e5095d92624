//! Connectivity checking module.
//!
//! This module answers "is basic internet connectivity present?" by looking at
//! the local interfaces first and then probing a well-known host (plus an
//! optional caller-supplied host) with HTTP HEAD requests. Probe failures are
//! interpreted with the error classifier.

pub mod config;
pub mod interfaces;
pub mod probe;

use std::fmt;
use std::io;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::error::{classify, BasicErrorType, BoxError};

// Re-export main types for convenient access
pub use config::{ConfigLoadError, ProbeConfig, DEFAULT_WELL_KNOWN_URL};
pub use interfaces::{
    InterfaceAddr, InterfaceSnapshot, InterfaceSource, InterfaceSummary, SystemInterfaces,
};
pub use probe::{ProbeClient, ReqwestProbeClient};

/// Outcome of a connectivity check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConnectionStatus {
    /// The host has no network interfaces.
    NoInterfaces,
    /// No interface is up.
    NoInterfacesUp,
    /// Up interfaces only carry loopback addresses.
    NoNonLoopbacksFound,
    /// Interfaces look fine but a probe could not reach its host.
    NoInternet,
    /// Every probe received a response.
    Connected,
}

impl ConnectionStatus {
    /// Returns the stable string identifier of this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionStatus::NoInterfaces => "NoInterfaces",
            ConnectionStatus::NoInterfacesUp => "NoInterfacesUp",
            ConnectionStatus::NoNonLoopbacksFound => "NoNonLoopbacksFound",
            ConnectionStatus::NoInternet => "NoInternet",
            ConnectionStatus::Connected => "Connected",
        }
    }

    /// Returns true if the check found working connectivity.
    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionStatus::Connected)
    }
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors a connectivity check returns instead of a status.
#[derive(Debug, Error)]
pub enum ConnectivityError {
    /// Local interfaces could not be enumerated.
    #[error("failed to enumerate network interfaces: {0}")]
    Interfaces(#[source] io::Error),

    /// The HTTP client could not be constructed.
    #[error("failed to create HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    /// A probe failed for a reason other than missing connectivity.
    #[error("probe of {url} failed ({category}): {source}")]
    Probe {
        /// The URL that was probed.
        url: String,
        /// How the failure was classified.
        category: BasicErrorType,
        /// The raw error returned by the probe client.
        #[source]
        source: BoxError,
    },
}

/// Checks connectivity using a probe client and an interface source.
pub struct ConnectivityProber<C, I> {
    client: C,
    interfaces: I,
    well_known_url: String,
}

impl ConnectivityProber<ReqwestProbeClient, SystemInterfaces> {
    /// Create a prober with the system interfaces and a `reqwest` client.
    pub fn new() -> Result<Self, ConnectivityError> {
        Self::with_config(&ProbeConfig::default())
    }

    /// Create a prober from the given configuration.
    pub fn with_config(config: &ProbeConfig) -> Result<Self, ConnectivityError> {
        let client = ReqwestProbeClient::new(config)?;
        Ok(ConnectivityProber::with_parts(
            client,
            SystemInterfaces::new(),
            config.well_known_url.clone(),
        ))
    }
}

impl<C, I> ConnectivityProber<C, I>
where
    C: ProbeClient,
    I: InterfaceSource,
{
    /// Create a prober from explicit collaborators.
    pub fn with_parts(client: C, interfaces: I, well_known_url: impl Into<String>) -> Self {
        Self {
            client,
            interfaces,
            well_known_url: well_known_url.into(),
        }
    }

    /// Returns the URL probed first on every check.
    pub fn well_known_url(&self) -> &str {
        &self.well_known_url
    }

    /// Checks for basic internet connectivity.
    ///
    /// An interface is up, it has a non-loopback IP address, and the
    /// well-known host answers a HEAD request.
    pub async fn check_connection(&self) -> Result<ConnectionStatus, ConnectivityError> {
        self.check_connection_and_host("").await
    }

    /// Same as [`check_connection`](Self::check_connection), and also probes
    /// `extra_url` unless it is empty.
    ///
    /// # Errors
    /// Returns an error when interfaces cannot be enumerated, or when a probe
    /// fails for a reason that is not a connectivity problem.
    pub async fn check_connection_and_host(
        &self,
        extra_url: &str,
    ) -> Result<ConnectionStatus, ConnectivityError> {
        let interfaces = self
            .interfaces
            .interfaces()
            .map_err(ConnectivityError::Interfaces)?;

        let summary = InterfaceSummary::of(&interfaces);
        debug!(
            total = summary.total,
            up = summary.up,
            non_loopback = summary.non_loopback,
            "enumerated interfaces"
        );

        if let Some(status) = local_status(&summary) {
            info!(status = %status, "connectivity check finished");
            return Ok(status);
        }

        for url in probe_targets(&self.well_known_url, extra_url) {
            if let Err(err) = self.client.head(url).await {
                let basic = classify(err);
                let category = basic.category();
                if category.is_connectivity() {
                    info!(url, category = %category, "probe could not reach host");
                    return Ok(ConnectionStatus::NoInternet);
                }
                warn!(url, category = %category, "probe failed");
                return Err(ConnectivityError::Probe {
                    url: url.to_string(),
                    category,
                    source: basic.into_cause(),
                });
            }
            debug!(url, "probe succeeded");
        }

        info!(status = %ConnectionStatus::Connected, "connectivity check finished");
        Ok(ConnectionStatus::Connected)
    }
}

/// Decides the status from local interfaces alone, if they already rule out connectivity.
fn local_status(summary: &InterfaceSummary) -> Option<ConnectionStatus> {
    if summary.total == 0 {
        Some(ConnectionStatus::NoInterfaces)
    } else if summary.up == 0 {
        Some(ConnectionStatus::NoInterfacesUp)
    } else if summary.non_loopback == 0 {
        Some(ConnectionStatus::NoNonLoopbacksFound)
    } else {
        None
    }
}

/// Probe order: the well-known URL, then the extra URL when given.
fn probe_targets<'a>(well_known_url: &'a str, extra_url: &'a str) -> Vec<&'a str> {
    let mut targets = vec![well_known_url];
    if !extra_url.is_empty() {
        targets.push(extra_url);
    }
    targets
}

/// Checks for basic internet connectivity with the default prober.
pub async fn check_connection() -> Result<ConnectionStatus, ConnectivityError> {
    ConnectivityProber::new()?.check_connection().await
}

/// Checks connectivity with the default prober and also probes `extra_url`.
pub async fn check_connection_and_host(
    extra_url: &str,
) -> Result<ConnectionStatus, ConnectivityError> {
    ConnectivityProber::new()?
        .check_connection_and_host(extra_url)
        .await
}
