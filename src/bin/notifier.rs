//! Notification bot entry point.

use dotenvy::dotenv;
use leaflet_admin::{bot, config::settings::BotSettings, errors::Result};
use tracing::error;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    dotenv().ok();

    let settings =
        BotSettings::from_env().inspect_err(|e| error!("Invalid bot configuration: {e}"))?;
    bot::run_bot(settings).await
}
