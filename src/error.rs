//! Error types for netlify-ddns.

use thiserror::Error;

/// Result type alias for netlify-ddns.
pub type Result<T> = std::result::Result<T, DdnsError>;

/// DDNS error types.
#[derive(Error, Debug)]
pub enum DdnsError {
    /// Missing or invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Public IPv4 lookup failed or timed out.
    #[error("{message}")]
    IpDiscovery {
        message: String,
        #[source]
        source: Option<reqwest::Error>,
    },

    /// Netlify API call failed after the adapter's retries.
    #[error("{message}")]
    Api {
        operation: &'static str,
        status: Option<reqwest::StatusCode>,
        message: String,
        #[source]
        source: Option<reqwest::Error>,
    },
}

impl DdnsError {
    pub fn ip_discovery(message: impl Into<String>) -> Self {
        DdnsError::IpDiscovery {
            message: message.into(),
            source: None,
        }
    }

    pub fn api(operation: &'static str, message: impl Into<String>) -> Self {
        DdnsError::Api {
            operation,
            status: None,
            message: message.into(),
            source: None,
        }
    }

    /// Prefix the error message with `context`, keeping the error kind.
    pub fn context(mut self, context: &str) -> Self {
        match &mut self {
            DdnsError::Config(message)
            | DdnsError::IpDiscovery { message, .. }
            | DdnsError::Api { message, .. } => {
                *message = format!("{}: {}", context, message);
            }
        }
        self
    }

    pub fn is_ip_discovery(&self) -> bool {
        matches!(self, DdnsError::IpDiscovery { .. })
    }

    pub fn is_api(&self) -> bool {
        matches!(self, DdnsError::Api { .. })
    }
}
