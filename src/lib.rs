//! # netlify-ddns
//!
//! A Dynamic DNS updater for Netlify DNS.
//!
//! Each run discovers the host's public IPv4 address and makes a single
//! A record in a Netlify zone point at it. Netlify DNS cannot update a
//! record in place, so a stale record is deleted and recreated with the
//! same TTL.
//!
//! ## Usage
//!
//! ```bash
//! export NETLIFY_ACCESSTOKEN=...
//! export NETLIFY_ZONE=example.com
//! export NETLIFY_RECORD=home   # optional, defaults to "home"
//!
//! netlify-ddns
//! ```

pub mod config;
pub mod detector;
pub mod error;
pub mod netlify;
pub mod reconcile;

pub use config::Config;
pub use detector::{IpDetector, IpDiscoverer};
pub use error::{DdnsError, Result};
pub use netlify::{DnsApi, NetlifyClient};
pub use reconcile::{Outcome, Reconciler, Target};
