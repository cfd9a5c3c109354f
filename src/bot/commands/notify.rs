//! Operator commands - trigger a sweep and inspect the scheduler.

use std::fmt::Write;

/// Formats the `/work` reply.
fn status_text(status: &crate::bot::sweep::SweepStatus) -> String {
    let scheduler = if status.scheduler_running {
        "работает"
    } else {
        "остановлен"
    };
    let last_sweep = status.last_sweep.map_or_else(
        || "ещё не было".to_string(),
        |at| at.format("%d.%m.%Y %H:%M:%S UTC").to_string(),
    );
    let mut text = format!(
        "Планировщик: {scheduler}\n\
        Последняя проверка: {last_sweep}\n\
        Отправлено в последней проверке: {}\n\
        Отправлено всего: {}",
        status.last_sent, status.total_sent
    );
    if let Some(error) = &status.last_error {
        let _ = write!(text, "\nПоследняя ошибка: {error}");
    }
    text
}

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use super::status_text;
    use crate::{
        bot::BotData,
        errors::{Error, Result},
    };

    type Context<'a> = poise::Context<'a, BotData, Error>;

    /// Only the configured operator may run these commands.
    async fn is_operator(ctx: Context<'_>) -> Result<bool> {
        let allowed = ctx.author().id.get() == ctx.data().operator_id;
        if !allowed {
            ctx.say("⛔ Команда доступна только оператору").await?;
        }
        Ok(allowed)
    }

    /// Sends pending order notifications right now.
    #[poise::command(slash_command, prefix_command, check = "is_operator")]
    pub async fn notify(ctx: Context<'_>) -> Result<()> {
        ctx.defer().await?;
        match ctx.data().sweeper.sweep().await {
            Ok(0) => ctx.say("Новых заказов для уведомления нет").await?,
            Ok(sent) => ctx.say(format!("✅ Отправлено уведомлений: {sent}")).await?,
            Err(e) => ctx.say(format!("❌ Не удалось проверить заказы: {e}")).await?,
        };
        Ok(())
    }

    /// Shows whether the scheduler is running and what it has sent.
    #[poise::command(slash_command, prefix_command, check = "is_operator")]
    pub async fn work(ctx: Context<'_>) -> Result<()> {
        let status = ctx.data().sweeper.status().await;
        ctx.say(status_text(&status)).await?;
        Ok(())
    }
}

pub use inner::*;

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::bot::sweep::SweepStatus;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_status_text_before_first_sweep() {
        let text = status_text(&SweepStatus::default());
        assert!(text.contains("Планировщик: остановлен"));
        assert!(text.contains("Последняя проверка: ещё не было"));
        assert!(!text.contains("ошибка"));
    }

    #[test]
    fn test_status_text_with_error() {
        let status = SweepStatus {
            scheduler_running: true,
            last_sweep: Some(Utc.with_ymd_and_hms(2026, 10, 19, 9, 5, 0).unwrap()),
            last_sent: 0,
            total_sent: 12,
            last_error: Some("API недоступен".to_string()),
        };
        let text = status_text(&status);
        assert!(text.contains("Планировщик: работает"));
        assert!(text.contains("19.10.2026 09:05:00 UTC"));
        assert!(text.contains("Отправлено всего: 12"));
        assert!(text.contains("Последняя ошибка: API недоступен"));
    }
}
