//! Configuration loaded from `NETLIFY_*` environment variables.

use crate::error::{DdnsError, Result};
use std::collections::HashMap;
use std::fmt;

/// Prefix shared by every configuration variable.
pub const ENV_PREFIX: &str = "NETLIFY";

/// Record label used when `NETLIFY_RECORD` is unset.
pub const DEFAULT_RECORD: &str = "home";

/// Immutable runtime configuration.
///
/// The Netlify zone identifier and the record hostname are derived once
/// here and never change for the lifetime of the value.
#[derive(Clone, PartialEq, Eq)]
pub struct Config {
    access_token: String,
    zone: String,
    record: String,
    zone_id: String,
    record_hostname: String,
}

impl Config {
    /// Build a configuration, rejecting empty required fields.
    pub fn new(
        access_token: impl Into<String>,
        zone: impl Into<String>,
        record: impl Into<String>,
    ) -> Result<Self> {
        let access_token = access_token.into().trim().to_string();
        let zone = zone.into().trim().to_string();
        let record = record.into().trim().to_string();

        if access_token.is_empty() {
            return Err(missing("ACCESSTOKEN"));
        }
        if zone.is_empty() {
            return Err(missing("ZONE"));
        }
        if record.is_empty() {
            return Err(missing("RECORD"));
        }

        let zone_id = zone.replace('.', "_");
        let record_hostname = format!("{}.{}", record, zone);

        Ok(Self {
            access_token,
            zone,
            record,
            zone_id,
            record_hostname,
        })
    }

    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_vars(std::env::vars())
    }

    /// Load configuration from arbitrary `(name, value)` pairs.
    ///
    /// Names are matched case-insensitively against `NETLIFY_ACCESSTOKEN`,
    /// `NETLIFY_ZONE` and `NETLIFY_RECORD`. An empty `NETLIFY_RECORD`
    /// falls back to the default label.
    pub fn from_vars<I, K, V>(vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let prefix = format!("{}_", ENV_PREFIX);
        let vars: HashMap<String, String> = vars
            .into_iter()
            .filter_map(|(key, value)| {
                let key = key.as_ref().to_ascii_uppercase();
                key.strip_prefix(&prefix)
                    .map(|field| (field.to_string(), value.into()))
            })
            .collect();

        let access_token = vars.get("ACCESSTOKEN").cloned().unwrap_or_default();
        let zone = vars.get("ZONE").cloned().unwrap_or_default();
        let record = vars
            .get("RECORD")
            .filter(|r| !r.trim().is_empty())
            .cloned()
            .unwrap_or_else(|| DEFAULT_RECORD.to_string());

        Self::new(access_token, zone, record)
    }

    /// Bearer token for the Netlify API.
    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    /// Zone name in dotted form, e.g. `example.com`.
    pub fn zone(&self) -> &str {
        &self.zone
    }

    /// Record label within the zone.
    pub fn record(&self) -> &str {
        &self.record
    }

    /// Netlify zone identifier: the zone name with `.` replaced by `_`.
    pub fn zone_id(&self) -> &str {
        &self.zone_id
    }

    /// Fully-qualified hostname of the managed A record.
    pub fn record_hostname(&self) -> &str {
        &self.record_hostname
    }
}

// The access token never appears in Debug output.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("access_token", &"<REDACTED>")
            .field("zone", &self.zone)
            .field("record", &self.record)
            .field("zone_id", &self.zone_id)
            .field("record_hostname", &self.record_hostname)
            .finish()
    }
}

fn missing(field: &str) -> DdnsError {
    DdnsError::Config(format!("{}_{} is required", ENV_PREFIX, field))
}
