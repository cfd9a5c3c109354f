//! Notification bot - Discord interface that announces upcoming customer orders.
//!
//! The bot shares nothing with the web service except its HTTP API: it polls the
//! pending orders through [`client::ApiClient`], posts them to the configured channel,
//! and acknowledges what it delivered.

/// HTTP client for the service API
pub mod client;
/// Discord command implementations (general, operator)
pub mod commands;
/// Minute-by-minute sweep job
pub mod scheduler;
/// A single notification pass
pub mod sweep;

use crate::{
    config::settings::BotSettings,
    core::notify::ChannelNotifier,
    errors::{Error, Result},
};
use client::ApiClient;
use poise::serenity_prelude as serenity;
use std::sync::Arc;
use sweep::Sweeper;
use tokio_cron_scheduler::JobScheduler;
use tracing::{error, info, instrument, warn};

/// Shared data available to all bot commands.
pub struct BotData {
    /// Runs sweeps for both the scheduler and `/notify`
    pub sweeper: Arc<Sweeper>,
    /// Discord user allowed to run operator commands
    pub operator_id: u64,
    /// Keeps the sweep job alive for the lifetime of the bot
    pub scheduler: JobScheduler,
}

async fn on_error(error: poise::FrameworkError<'_, BotData, Error>) {
    match error {
        poise::FrameworkError::Setup { error, .. } => {
            error!("Failed to start bot: {error}");
        }
        poise::FrameworkError::Command { error, ctx, .. } => {
            error!("Error in command `{}`: {error}", ctx.command().name);
            if let Err(e) = ctx.say(format!("Произошла ошибка: {error}")).await {
                error!("Failed to send error message: {e}");
            }
        }
        error => {
            if let Err(e) = poise::builtins::on_error(error).await {
                error!("Error while handling error: {e}");
            }
        }
    }
}

/// Connects to Discord, registers the commands and starts the sweep scheduler.
#[instrument(skip(settings), fields(api = %settings.api_base_url))]
pub async fn run_bot(settings: BotSettings) -> Result<()> {
    let client = Arc::new(ApiClient::new(
        &settings.api_base_url,
        &settings.username,
        &settings.password,
    ));
    // The client logs in again on the first request if this fails
    if let Err(e) = client.login().await {
        warn!("Initial API login failed: {e}");
    }

    let channel = serenity::ChannelId::new(settings.chat.channel_id);
    let operator_id = settings.operator_id;
    let window_minutes = settings.notify_window_minutes;

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: vec![
                commands::ping(),
                commands::help(),
                commands::notify(),
                commands::work(),
            ],
            on_error: |error| Box::pin(on_error(error)),
            ..Default::default()
        })
        .setup(move |ctx, ready, framework| {
            Box::pin(async move {
                info!("Logged in as {}", ready.user.name);
                info!("Registering commands globally...");
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;

                let sink = Arc::new(ChannelNotifier::new(Arc::clone(&ctx.http), channel));
                let sweeper = Arc::new(Sweeper::new(client, sink, window_minutes));
                let scheduler = scheduler::start_scheduler(Arc::clone(&sweeper)).await?;

                Ok(BotData {
                    sweeper,
                    operator_id,
                    scheduler,
                })
            })
        })
        .build();

    let intents = serenity::GatewayIntents::GUILD_MESSAGES
        | serenity::GatewayIntents::DIRECT_MESSAGES
        | serenity::GatewayIntents::MESSAGE_CONTENT;

    info!("Setting up Serenity client for Poise framework...");
    let mut client = serenity::ClientBuilder::new(&settings.chat.bot_token, intents)
        .framework(framework)
        .await
        .inspect_err(|e| error!("Error creating client: {e}"))?;

    info!("Starting bot client...");
    client
        .start()
        .await
        .inspect_err(|e| error!("Client error: {e}"))?;
    Ok(())
}
