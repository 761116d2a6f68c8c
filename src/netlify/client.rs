//! HTTP client for the Netlify DNS API.

use super::{DnsApi, DnsRecord, DnsRecordCreate};
use crate::error::{DdnsError, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use std::fmt;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.netlify.com/api/v1";

/// User-Agent sent with every API request.
pub const USER_AGENT: &str = "NetlifyDDNS";

/// Total attempts per operation, first try included.
pub const DEFAULT_RETRY_ATTEMPTS: u32 = 3;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Injects authentication into outgoing requests.
#[derive(Clone)]
pub struct Credentials {
    token: String,
}

impl Credentials {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    /// Attach the bearer token and user agent to a request.
    pub fn apply(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .bearer_auth(&self.token)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("token", &"<REDACTED>")
            .finish()
    }
}

/// Bounded retry policy for API calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, first try included.
    pub max_attempts: u32,
    /// Delay before the second attempt; doubles on each further attempt.
    pub base_delay: Duration,
    /// Upper bound for any single delay, `Retry-After` included.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_RETRY_ATTEMPTS,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    /// Single attempt, no retries.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }

    fn delay(&self, attempt: u32, headers: Option<&HeaderMap>) -> Duration {
        headers
            .and_then(retry_after)
            .map(|d| d.min(self.max_delay))
            .unwrap_or_else(|| self.backoff(attempt))
    }
}

#[derive(Debug, Clone, Copy)]
struct Operation {
    name: &'static str,
    idempotent: bool,
    /// A 404 after a failed attempt means that attempt already took effect.
    done_when_missing: bool,
}

const LIST: Operation = Operation {
    name: "list DNS records",
    idempotent: true,
    done_when_missing: false,
};

const CREATE: Operation = Operation {
    name: "create DNS record",
    idempotent: false,
    done_when_missing: false,
};

const DELETE: Operation = Operation {
    name: "delete DNS record",
    idempotent: true,
    done_when_missing: true,
};

impl Operation {
    fn retries_status(&self, status: StatusCode) -> bool {
        status == StatusCode::TOO_MANY_REQUESTS || (self.idempotent && status.is_server_error())
    }

    fn applied_earlier(&self, attempt: u32, status: StatusCode) -> bool {
        self.done_when_missing && attempt > 1 && status == StatusCode::NOT_FOUND
    }

    // A create is only repeated when it cannot have reached the provider.
    fn retries_transport(&self, e: &reqwest::Error) -> bool {
        e.is_connect() || (self.idempotent && (e.is_timeout() || e.is_request()))
    }
}

#[derive(Debug, Deserialize)]
struct NetlifyError {
    message: String,
}

/// Netlify DNS API client.
pub struct NetlifyClient {
    client: reqwest::Client,
    base_url: String,
    credentials: Credentials,
    retry: RetryPolicy,
}

impl NetlifyClient {
    /// Create a client for the public Netlify API.
    pub fn new(access_token: impl Into<String>) -> Result<Self> {
        Self::with_base_url(access_token, DEFAULT_BASE_URL)
    }

    /// Create with custom base URL (for testing).
    pub fn with_base_url(
        access_token: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| DdnsError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            credentials: Credentials::new(access_token),
            retry: RetryPolicy::default(),
        })
    }

    /// Replace the retry policy.
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    fn records_url(&self, zone_id: &str) -> String {
        format!("{}/dns_zones/{}/dns_records", self.base_url, zone_id)
    }

    /// Send a request built by `build`, retrying per the policy.
    async fn send<F>(&self, op: Operation, build: F) -> Result<Response>
    where
        F: Fn(&reqwest::Client) -> RequestBuilder,
    {
        let mut attempt = 0;

        loop {
            attempt += 1;
            let request = self.credentials.apply(build(&self.client));
            let can_retry = attempt < self.retry.max_attempts;

            let (delay, reason) = match request.send().await {
                Ok(response) if response.status().is_success() => return Ok(response),
                Ok(response) if op.applied_earlier(attempt, response.status()) => {
                    tracing::debug!(
                        "{} returned HTTP 404 on attempt {}, earlier attempt took effect",
                        op.name,
                        attempt
                    );
                    return Ok(response);
                }
                Ok(response) => {
                    let status = response.status();
                    if !(can_retry && op.retries_status(status)) {
                        return Err(api_error(op, response).await);
                    }
                    (
                        self.retry.delay(attempt, Some(response.headers())),
                        format!("HTTP {}", status),
                    )
                }
                Err(e) => {
                    if !(can_retry && op.retries_transport(&e)) {
                        return Err(DdnsError::Api {
                            operation: op.name,
                            status: None,
                            message: format!("{} request failed", op.name),
                            source: Some(e),
                        });
                    }
                    (self.retry.delay(attempt, None), e.to_string())
                }
            };

            tracing::warn!(
                "{} attempt {}/{} failed ({}), retrying in {:?}",
                op.name,
                attempt,
                self.retry.max_attempts,
                reason,
                delay
            );
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl DnsApi for NetlifyClient {
    async fn list_records(&self, zone_id: &str) -> Result<Vec<DnsRecord>> {
        let url = self.records_url(zone_id);
        tracing::debug!("GET {}", url);

        let response = self.send(LIST, |client| client.get(&url)).await?;
        response.json().await.map_err(|e| decode_error(LIST, e))
    }

    async fn create_record(&self, zone_id: &str, record: &DnsRecordCreate) -> Result<DnsRecord> {
        let url = self.records_url(zone_id);
        tracing::debug!("POST {} {:?}", url, record);

        let response = self
            .send(CREATE, |client| client.post(&url).json(record))
            .await?;
        response.json().await.map_err(|e| decode_error(CREATE, e))
    }

    async fn delete_record(&self, zone_id: &str, record_id: &str) -> Result<()> {
        let url = format!("{}/{}", self.records_url(zone_id), record_id);
        tracing::debug!("DELETE {}", url);

        self.send(DELETE, |client| client.delete(&url)).await?;
        Ok(())
    }
}

fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
        .map(Duration::from_secs)
}

async fn api_error(op: Operation, response: Response) -> DdnsError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();

    let detail = serde_json::from_str::<NetlifyError>(&body)
        .map(|e| e.message)
        .ok()
        .or_else(|| {
            let body = body.trim();
            (!body.is_empty()).then(|| body.to_string())
        })
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown error").to_string());

    DdnsError::Api {
        operation: op.name,
        status: Some(status),
        message: format!("{} failed with HTTP {}: {}", op.name, status.as_u16(), detail),
        source: None,
    }
}

fn decode_error(op: Operation, e: reqwest::Error) -> DdnsError {
    DdnsError::Api {
        operation: op.name,
        status: None,
        message: format!("{}: invalid response body", op.name),
        source: Some(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    #[test]
    fn test_backoff_doubles_and_caps() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.backoff(1), Duration::from_millis(500));
        assert_eq!(policy.backoff(2), Duration::from_secs(1));
        assert_eq!(policy.backoff(3), Duration::from_secs(2));
        assert_eq!(policy.backoff(30), Duration::from_secs(10));
    }

    #[test]
    fn test_retry_after_header_wins() {
        let policy = RetryPolicy::default();
        let mut headers = HeaderMap::new();
        headers.insert(RETRY_AFTER, HeaderValue::from_static("3"));
        assert_eq!(policy.delay(1, Some(&headers)), Duration::from_secs(3));

        headers.insert(RETRY_AFTER, HeaderValue::from_static("3600"));
        assert_eq!(policy.delay(1, Some(&headers)), policy.max_delay);
    }

    #[test]
    fn test_retryable_statuses() {
        assert!(LIST.retries_status(StatusCode::BAD_GATEWAY));
        assert!(DELETE.retries_status(StatusCode::TOO_MANY_REQUESTS));
        assert!(CREATE.retries_status(StatusCode::TOO_MANY_REQUESTS));
        assert!(!CREATE.retries_status(StatusCode::INTERNAL_SERVER_ERROR));
        assert!(!LIST.retries_status(StatusCode::UNAUTHORIZED));
        assert!(!DELETE.retries_status(StatusCode::NOT_FOUND));
    }

    #[test]
    fn test_missing_after_retry_only_for_delete() {
        assert!(DELETE.applied_earlier(2, StatusCode::NOT_FOUND));
        assert!(!DELETE.applied_earlier(1, StatusCode::NOT_FOUND));
        assert!(!DELETE.applied_earlier(2, StatusCode::GONE));
        assert!(!LIST.applied_earlier(2, StatusCode::NOT_FOUND));
        assert!(!CREATE.applied_earlier(2, StatusCode::NOT_FOUND));
    }

    #[test]
    fn test_credentials_debug_redacted() {
        let creds = Credentials::new("top-secret");
        assert!(!format!("{:?}", creds).contains("top-secret"));
    }
}
