//! Reconciliation of the managed A record against the current public IPv4.
//!
//! Netlify has no record update, so a stale record is replaced by deleting
//! it and then creating a new one. The delete always comes first because
//! the provider refuses two A records with the same hostname.

use crate::config::Config;
use crate::detector::IpDiscoverer;
use crate::error::Result;
use crate::netlify::{DnsApi, DnsRecord, DnsRecordCreate};

/// The record being reconciled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    /// Netlify zone identifier, e.g. `example_com`.
    pub zone_id: String,
    /// Fully-qualified hostname, e.g. `home.example.com`.
    pub hostname: String,
}

impl From<&Config> for Target {
    fn from(config: &Config) -> Self {
        Self {
            zone_id: config.zone_id().to_string(),
            hostname: config.record_hostname().to_string(),
        }
    }
}

/// What needs to happen to reach the desired state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Plan {
    /// The record already points at the current address.
    NoChange,
    /// No A record exists yet.
    Create(DnsRecordCreate),
    /// An A record exists with a different value.
    Replace {
        stale: DnsRecord,
        create: DnsRecordCreate,
    },
}

/// Result of a successful reconciliation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    NoChange,
    Updated {
        previous: Option<DnsRecord>,
        record: DnsRecord,
    },
}

/// First A record at `hostname`, in list order.
///
/// Any further A records at the same hostname are not considered.
pub fn find_existing<'a>(records: &'a [DnsRecord], hostname: &str) -> Option<&'a DnsRecord> {
    records
        .iter()
        .find(|r| r.hostname == hostname && r.is_a_record())
}

/// Decide how to bring `records` in line with `ip`.
pub fn plan(records: &[DnsRecord], target: &Target, ip: &str) -> Plan {
    let Some(existing) = find_existing(records, &target.hostname) else {
        return Plan::Create(DnsRecordCreate::a_record(&target.hostname, ip, None));
    };

    if existing.hostname == target.hostname && existing.value == ip {
        return Plan::NoChange;
    }

    Plan::Replace {
        stale: existing.clone(),
        create: DnsRecordCreate::a_record(&target.hostname, ip, existing.ttl),
    }
}

/// Runs a single reconciliation pass.
pub struct Reconciler<'a> {
    discoverer: &'a dyn IpDiscoverer,
    api: &'a dyn DnsApi,
    target: Target,
}

impl<'a> Reconciler<'a> {
    pub fn new(discoverer: &'a dyn IpDiscoverer, api: &'a dyn DnsApi, target: Target) -> Self {
        Self {
            discoverer,
            api,
            target,
        }
    }

    /// Discover the public address and make the A record match it.
    ///
    /// Errors are returned as-is with a short context prefix; nothing is
    /// retried here.
    pub async fn reconcile(&self) -> Result<Outcome> {
        let ip = self
            .discoverer
            .discover_ipv4()
            .await
            .map_err(|e| e.context("error retrieving your public ipv4 address"))?;

        let records = self
            .api
            .list_records(&self.target.zone_id)
            .await
            .map_err(|e| e.context("error listing DNS records from Netlify DNS"))?;

        let (previous, create) = match plan(&records, &self.target, &ip) {
            Plan::NoChange => return Ok(Outcome::NoChange),
            Plan::Create(create) => (None, create),
            Plan::Replace { stale, create } => {
                tracing::info!("removing DNS record {}, ip {}", stale.hostname, stale.value);

                // A record listed without an owning zone belongs to the listed zone.
                let zone_id = if stale.zone_id.is_empty() {
                    &self.target.zone_id
                } else {
                    &stale.zone_id
                };

                self.api
                    .delete_record(zone_id, &stale.id)
                    .await
                    .map_err(|e| e.context("error deleting existing record from Netlify DNS"))?;

                (Some(stale), create)
            }
        };

        tracing::info!("add DNS record {}, ip {}", create.hostname, create.value);

        let record = self
            .api
            .create_record(&self.target.zone_id, &create)
            .await
            .map_err(|e| e.context("error creating new DNS record on Netlify DNS"))?;

        Ok(Outcome::Updated { previous, record })
    }
}
