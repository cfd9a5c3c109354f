//! Web service entry point.

use leaflet_admin::{
    api::{self, state::AppState},
    config::{database, seed, settings::ServerSettings},
    core::{
        notify::{ChannelNotifier, LogNotifier, Notifier},
        user,
    },
    errors::Result,
    storage::FileStore,
};
use dotenvy::dotenv;
use poise::serenity_prelude::{ChannelId, Http};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; env vars can also be set externally
    dotenv().ok();

    let settings = ServerSettings::from_env()
        .inspect_err(|e| error!("Invalid configuration: {e}"))?;

    // 3. Database and reference data
    let db = database::create_connection(&settings.database_url)
        .await
        .inspect(|_| info!("Database connected"))
        .inspect_err(|e| error!("Failed to connect to database: {e}"))?;
    database::create_tables(&db).await?;
    seed::seed_from_file(&db, &settings.seed_file).await?;
    if let Some((username, password)) = &settings.admin {
        user::ensure_admin(&db, username, password).await?;
    }

    // 4. Payment announcements go to Discord when configured, to the log otherwise
    let notifier: Arc<dyn Notifier> = match &settings.chat {
        Some(chat) => Arc::new(ChannelNotifier::new(
            Arc::new(Http::new(&chat.bot_token)),
            ChannelId::new(chat.channel_id),
        )),
        None => {
            info!("No chat channel configured, notifications go to the log");
            Arc::new(LogNotifier)
        }
    };

    let state = AppState::new(
        db,
        &settings.jwt_secret,
        FileStore::new(&settings.upload_dir),
        notifier,
    );

    // 5. Serve until Ctrl-C
    let listener = tokio::net::TcpListener::bind(&settings.bind_addr).await?;
    info!("Listening on {}", settings.bind_addr);
    axum::serve(listener, api::router(state))
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for shutdown signal: {e}");
            }
            info!("Shutting down");
        })
        .await?;

    Ok(())
}
