//! HTTP HEAD probes.
//!
//! A probe only tests reachability: any HTTP response, whatever its status,
//! counts as success. The response is dropped before returning so the
//! underlying connection is released.

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use super::config::ProbeConfig;
use crate::error::BoxError;

/// Client capable of issuing a HEAD request.
#[async_trait]
pub trait ProbeClient: Send + Sync {
    /// Sends a HEAD request to `url`.
    ///
    /// # Returns
    /// `Ok(())` if any response was received, or the client's error otherwise
    async fn head(&self, url: &str) -> Result<(), BoxError>;
}

/// Probe client backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct ReqwestProbeClient {
    /// HTTP client for probe requests
    client: Client,
}

impl ReqwestProbeClient {
    /// Create a new probe client from the given configuration
    pub fn new(config: &ProbeConfig) -> Result<Self, reqwest::Error> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.probe_timeout {
            builder = builder.timeout(timeout).connect_timeout(timeout);
        }
        if let Some(user_agent) = &config.user_agent {
            builder = builder.user_agent(user_agent.as_str());
        }

        Ok(Self {
            client: builder.build()?,
        })
    }

    /// Wrap an existing client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ProbeClient for ReqwestProbeClient {
    async fn head(&self, url: &str) -> Result<(), BoxError> {
        let response = self.client.head(url).send().await?;
        debug!(url, status = %response.status(), "probe answered");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_client_builds_with_timeout_and_user_agent() {
        let config = ProbeConfig::new()
            .with_probe_timeout(Duration::from_secs(2))
            .with_user_agent("whatnet-test");
        assert!(ReqwestProbeClient::new(&config).is_ok());
    }

    #[tokio::test]
    async fn test_invalid_url_is_an_error() {
        let client = ReqwestProbeClient::new(&ProbeConfig::default()).unwrap();
        assert!(client.head("not a url").await.is_err());
    }
}
