//! Outbound chat notifications sent by the web service.

use crate::errors::Result;
use async_trait::async_trait;
use poise::serenity_prelude::{ChannelId, Http};
use std::sync::Arc;
use tracing::info;

/// Delivers a short text message to the operators' channel.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, text: &str) -> Result<()>;
}

/// Posts notifications to a Discord channel through the bot's HTTP client.
pub struct ChannelNotifier {
    http: Arc<Http>,
    channel: ChannelId,
}

impl ChannelNotifier {
    #[must_use]
    pub const fn new(http: Arc<Http>, channel: ChannelId) -> Self {
        Self { http, channel }
    }
}

#[async_trait]
impl Notifier for ChannelNotifier {
    async fn notify(&self, text: &str) -> Result<()> {
        self.channel.say(&self.http, text).await?;
        Ok(())
    }
}

/// Fallback used when no chat channel is configured: the message only goes to the log.
#[derive(Debug, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, text: &str) -> Result<()> {
        info!(target: "notify", "{text}");
        Ok(())
    }
}
