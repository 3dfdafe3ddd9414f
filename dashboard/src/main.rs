mod command;
mod config;
mod error;
mod host;
mod transport;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::{Cli, DashboardConfig};
use crate::error::HostError;
use crate::host::Host;

#[tokio::main]
async fn main() -> Result<(), HostError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = DashboardConfig::from_cli(Cli::parse())?;
    info!(
        base_url = %config.base_url,
        notification_ms = config.notification_lifetime.as_millis() as u64,
        "dashboard starting"
    );

    println!("{}", command::HELP);
    Host::run(config, host::stdin_lines()).await
}

/// Logs go to stderr so they do not interleave with the rendered view.
fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}
