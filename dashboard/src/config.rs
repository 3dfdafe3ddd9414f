use std::time::Duration;

use clap::{Parser, ValueEnum};
use url::Url;

use crate::error::HostError;

/// Command line arguments. Every flag can also come from the environment
/// (or a `.env` file).
#[derive(Parser, Debug)]
#[command(name = "user-dashboard")]
#[command(about = "Terminal dashboard for managing user records")]
#[command(version)]
pub struct Cli {
    /// Deployment whose default endpoint to use
    #[arg(long, env = "DASHBOARD_ENV", value_enum, default_value_t = Environment::Development)]
    pub env: Environment,

    /// Override the environment's API endpoint
    #[arg(long, env = "DASHBOARD_API_URL", value_name = "URL")]
    pub api_url: Option<String>,

    /// How long a notification stays on screen
    #[arg(long, env = "DASHBOARD_NOTIFICATION_MS", value_name = "MS", default_value_t = 5000)]
    pub notification_ms: u64,

    /// Per-request timeout
    #[arg(long, env = "DASHBOARD_TIMEOUT_MS", value_name = "MS", default_value_t = 30_000)]
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    /// Endpoints differ only in host.
    pub fn default_base_url(self) -> &'static str {
        match self {
            Environment::Development => "http://localhost:3000/api",
            Environment::Production => "http://server2.gpark.digital:9002",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardConfig {
    pub base_url: String,
    pub notification_lifetime: Duration,
    pub request_timeout: Duration,
}

impl DashboardConfig {
    pub fn from_cli(cli: Cli) -> Result<Self, HostError> {
        let base_url = cli
            .api_url
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| cli.env.default_base_url().to_string());

        let parsed = Url::parse(&base_url).map_err(|source| HostError::InvalidBaseUrl {
            url: base_url.clone(),
            source,
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(HostError::UnsupportedScheme(parsed.scheme().to_string()));
        }

        if cli.timeout_ms == 0 {
            return Err(HostError::InvalidSetting("timeout must be greater than zero"));
        }

        Ok(Self {
            base_url,
            notification_lifetime: Duration::from_millis(cli.notification_ms),
            request_timeout: Duration::from_millis(cli.timeout_ms),
        })
    }
}
