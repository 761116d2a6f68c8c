//! Netlify DNS API adapter.
//!
//! Netlify DNS has no in-place record update, so the adapter only exposes
//! the list, create and delete operations the reconciler needs.

mod client;


pub use client::{
    Credentials, NetlifyClient, RetryPolicy, DEFAULT_BASE_URL, DEFAULT_RETRY_ATTEMPTS, USER_AGENT,
};

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Record type managed by this crate.
pub const RECORD_TYPE_A: &str = "A";

/// A DNS record as returned by Netlify.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DnsRecord {
    pub id: String,
    #[serde(rename = "dns_zone_id", default)]
    pub zone_id: String,
    pub hostname: String,
    #[serde(rename = "type")]
    pub record_type: String,
    #[serde(default)]
    pub value: String,
    /// `None` means the provider default applies.
    #[serde(default)]
    pub ttl: Option<u64>,
}

impl DnsRecord {
    pub fn is_a_record(&self) -> bool {
        self.record_type == RECORD_TYPE_A
    }
}

/// Payload for creating a DNS record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsRecordCreate {
    pub hostname: String,
    #[serde(rename = "type")]
    pub record_type: String,
    pub value: String,
    /// Omitted from the request body when `None`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u64>,
}

impl DnsRecordCreate {
    /// Build an A record payload.
    pub fn a_record(hostname: impl Into<String>, value: impl Into<String>, ttl: Option<u64>) -> Self {
        Self {
            hostname: hostname.into(),
            record_type: RECORD_TYPE_A.to_string(),
            value: value.into(),
            ttl,
        }
    }
}

/// DNS record operations within a zone.
///
/// Implementations own their retry policy; a returned error is final.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DnsApi: Send + Sync {
    /// List every record in the zone.
    async fn list_records(&self, zone_id: &str) -> Result<Vec<DnsRecord>>;

    /// Create a record in the zone.
    async fn create_record(&self, zone_id: &str, record: &DnsRecordCreate) -> Result<DnsRecord>;

    /// Delete a record from the zone.
    async fn delete_record(&self, zone_id: &str, record_id: &str) -> Result<()>;
}
