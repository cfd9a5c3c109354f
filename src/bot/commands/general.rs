//! General commands - ping and help.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::BotData,
        errors::{Error, Result},
    };

    /// Responds with "Pong!" to test bot connectivity.
    #[poise::command(slash_command, prefix_command)]
    pub async fn ping(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        ctx.say("Pong!").await?;
        Ok(())
    }

    /// Lists the available commands.
    #[poise::command(slash_command, prefix_command)]
    pub async fn help(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "**Уведомления о заказах**\n\
        Бот раз в минуту присылает в канал заказы, до которых осталось меньше часа.\n\n\
        **Команды оператора**\n\
        • `/notify` - отправить уведомления прямо сейчас.\n\
        • `/work` - состояние планировщика и счётчики.\n\n\
        **Прочее**\n\
        • `/ping` - проверить, что бот отвечает.\n\
        • `/help` - показать эту справку.";

        ctx.say(help_text).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
