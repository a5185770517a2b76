//! Startup configuration.
//!
//! Settings come from flags with environment fallbacks and are validated
//! once into an immutable [`Config`] that handlers receive through the
//! router state.

use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use clap::{Parser, ValueEnum};
use reqwest::Url;

use crate::cards::CardSchema;
use crate::error::ConfigError;

const ENV_TEAMS_CHANNEL: &str = "TEAMS_CHANNEL";
const ENV_TEAMS_CHANNEL_WORKFLOW: &str = "TEAMS_CHANNEL_WORKFLOW";

/// Raw command-line / environment settings.
#[derive(Debug, Clone, Parser)]
#[command(name = "card-relay")]
#[command(about = "Relays monitoring and CI/CD webhooks to Teams channels as cards")]
#[command(version)]
pub struct Settings {
    /// IP address to bind (IPv4 or IPv6)
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = 8080)]
    pub port: u16,

    /// Webhook receiving message cards
    #[arg(long, env = "TEAMS_CHANNEL", hide_env_values = true)]
    pub teams_channel: Option<String>,

    /// Workflow webhook receiving adaptive cards
    #[arg(long, env = "TEAMS_CHANNEL_WORKFLOW", hide_env_values = true)]
    pub teams_channel_workflow: Option<String>,

    /// Timeout for each downstream webhook call, in seconds
    #[arg(long, env = "RELAY_TIMEOUT_SECS", default_value_t = 5)]
    pub relay_timeout_secs: u64,

    /// Largest accepted request body, in bytes
    #[arg(long, env = "MAX_BODY_BYTES", default_value_t = 1024 * 1024)]
    pub max_body_bytes: usize,

    /// Log output format
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Validated, read-only process configuration.
#[derive(Clone)]
pub struct Config {
    pub listen_addr: SocketAddr,
    /// Destination for message cards
    pub legacy_webhook: Url,
    /// Destination for adaptive cards
    pub adaptive_webhook: Url,
    pub relay_timeout: Duration,
    pub max_body_bytes: usize,
}

impl Config {
    /// Webhook URL for cards of the given schema.
    #[must_use]
    pub fn destination(&self, schema: CardSchema) -> &str {
        match schema {
            CardSchema::Legacy => self.legacy_webhook.as_str(),
            CardSchema::Adaptive => self.adaptive_webhook.as_str(),
        }
    }
}

// Webhook URLs embed credentials, so they never reach logs.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("listen_addr", &self.listen_addr)
            .field("legacy_webhook", &"<redacted>")
            .field("adaptive_webhook", &"<redacted>")
            .field("relay_timeout", &self.relay_timeout)
            .field("max_body_bytes", &self.max_body_bytes)
            .finish()
    }
}

impl TryFrom<Settings> for Config {
    type Error = ConfigError;

    fn try_from(settings: Settings) -> Result<Self, Self::Error> {
        let legacy_webhook = webhook_url(ENV_TEAMS_CHANNEL, settings.teams_channel)?;
        let adaptive_webhook =
            webhook_url(ENV_TEAMS_CHANNEL_WORKFLOW, settings.teams_channel_workflow)?;

        let host: IpAddr = settings
            .host
            .trim()
            .parse()
            .map_err(|e: std::net::AddrParseError| ConfigError::Invalid {
                key: "HOST",
                reason: e.to_string(),
            })?;

        if settings.relay_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                key: "RELAY_TIMEOUT_SECS",
                reason: "must be at least 1 second".to_string(),
            });
        }
        if settings.max_body_bytes == 0 {
            return Err(ConfigError::Invalid {
                key: "MAX_BODY_BYTES",
                reason: "must be greater than zero".to_string(),
            });
        }

        Ok(Self {
            listen_addr: SocketAddr::new(host, settings.port),
            legacy_webhook,
            adaptive_webhook,
            relay_timeout: Duration::from_secs(settings.relay_timeout_secs),
            max_body_bytes: settings.max_body_bytes,
        })
    }
}

fn webhook_url(key: &'static str, value: Option<String>) -> Result<Url, ConfigError> {
    let raw = value
        .filter(|v| !v.trim().is_empty())
        .ok_or(ConfigError::Missing(key))?;

    let url = Url::parse(raw.trim()).map_err(|e| ConfigError::Invalid {
        key,
        reason: e.to_string(),
    })?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::Invalid {
            key,
            reason: format!("unsupported scheme {other:?}"),
        }),
    }
}
