//! netlify-ddns - point a Netlify DNS A record at this host's public IPv4.

use anyhow::Context;
use clap::Parser;
use netlify_ddns::config::Config;
use netlify_ddns::detector::IpDetector;
use netlify_ddns::netlify::NetlifyClient;
use netlify_ddns::reconcile::{Outcome, Reconciler, Target};
use std::io::IsTerminal;
use std::process::ExitCode;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Configuration is read from NETLIFY_ACCESSTOKEN, NETLIFY_ZONE and
/// NETLIFY_RECORD (default "home").
#[derive(Parser)]
#[command(name = "netlify-ddns")]
#[command(about = "Dynamic DNS updater for Netlify DNS")]
#[command(version)]
struct Cli {}

/// Process exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
    /// Record updated or already current.
    Success = 0,
    /// Configuration, IP discovery or API failure.
    Failure = 1,
}

impl From<Status> for ExitCode {
    fn from(status: Status) -> Self {
        ExitCode::from(status as u8)
    }
}

fn status(result: &anyhow::Result<Outcome>) -> Status {
    match result {
        Ok(Outcome::NoChange) | Ok(Outcome::Updated { .. }) => Status::Success,
        Err(_) => Status::Failure,
    }
}

fn init_tracing() {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();

    let stderr = std::io::stderr();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(stderr.is_terminal())
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let _ = Cli::parse();
    init_tracing();

    let result = cmd_update().await;
    match &result {
        Ok(Outcome::NoChange) => {}
        Ok(Outcome::Updated { previous, record }) => {
            tracing::debug!(
                "updated {} from {:?} to {}",
                record.hostname,
                previous.as_ref().map(|r| &r.value),
                record.value
            );
        }
        Err(e) => tracing::error!("error updating DNS record: {:#}", e),
    }

    status(&result).into()
}

fn load_config<I, K, V>(vars: I) -> anyhow::Result<Config>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: Into<String>,
{
    Config::from_vars(vars).context("invalid configuration")
}

async fn cmd_update() -> anyhow::Result<Outcome> {
    let config = load_config(std::env::vars())?;
    tracing::debug!("{:?}", config);

    let detector = IpDetector::new();
    let client = NetlifyClient::new(config.access_token())?;

    let reconciler = Reconciler::new(&detector, &client, Target::from(&config));
    Ok(reconciler.reconcile().await?)
}
