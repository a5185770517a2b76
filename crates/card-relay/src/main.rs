//! Card relay server.
//!
//! Receives monitoring and CI/CD webhooks and forwards them to Teams
//! channels as message cards or adaptive cards.

use std::sync::Arc;

use anyhow::{Context, Result};
use card_relay::{run_server, AppState, Config, LogFormat, Settings, WebhookRelay};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::parse();
    init_tracing(settings.log_format);

    let config = Config::try_from(settings).context("invalid configuration")?;
    info!(
        listen_addr = %config.listen_addr,
        relay_timeout_secs = config.relay_timeout.as_secs(),
        max_body_bytes = config.max_body_bytes,
        "Starting card relay"
    );

    let relay = WebhookRelay::new(config.relay_timeout).context("failed to create relay")?;
    let state = AppState::new(config, Arc::new(relay));

    run_server(state).await
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}
