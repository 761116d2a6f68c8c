//! Public IPv4 discovery.

use crate::error::{DdnsError, Result};
use async_trait::async_trait;
use std::net::Ipv4Addr;
use std::time::Duration;

/// Plain-text IPv4 echo service.
pub const DEFAULT_DISCOVERY_URL: &str = "https://api.ipify.org?format=text";

/// Deadline for the whole discovery request, body included.
pub const DISCOVERY_TIMEOUT: Duration = Duration::from_secs(15);

/// Source of the host's current public IPv4 address.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IpDiscoverer: Send + Sync {
    /// Return the public IPv4 address as text.
    async fn discover_ipv4(&self) -> Result<String>;
}

/// IPv4 discoverer backed by an HTTP echo service.
pub struct IpDetector {
    client: reqwest::Client,
    url: String,
    timeout: Duration,
}

impl IpDetector {
    /// Create a detector for the default service.
    pub fn new() -> Self {
        Self::with_url(DEFAULT_DISCOVERY_URL)
    }

    /// Create a detector for a custom service (for testing).
    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
            timeout: DISCOVERY_TIMEOUT,
        }
    }

    /// Override the request deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn fetch(&self) -> Result<String> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| transport_error(&self.url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DdnsError::ip_discovery(format!(
                "HTTP {} from {}",
                status, self.url
            )));
        }

        response
            .text()
            .await
            .map_err(|e| transport_error(&self.url, e))
    }
}

impl Default for IpDetector {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IpDiscoverer for IpDetector {
    async fn discover_ipv4(&self) -> Result<String> {
        // Dropping the fetch future on expiry cancels the in-flight request.
        let body = tokio::time::timeout(self.timeout, self.fetch())
            .await
            .map_err(|_| {
                DdnsError::ip_discovery(format!(
                    "no response from {} within {}s",
                    self.url,
                    self.timeout.as_secs_f32()
                ))
            })??;

        let ip = body.trim();
        if ip.parse::<Ipv4Addr>().is_err() {
            return Err(DdnsError::ip_discovery(format!(
                "Invalid IPv4 response: {:?}",
                ip
            )));
        }

        tracing::debug!("Detected IPv4 {} from {}", ip, self.url);
        Ok(ip.to_string())
    }
}

fn transport_error(url: &str, e: reqwest::Error) -> DdnsError {
    DdnsError::IpDiscovery {
        message: format!("request to {} failed", url),
        source: Some(e),
    }
}
