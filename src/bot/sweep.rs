//! One notification pass: fetch upcoming orders, announce each, acknowledge the sent ones.

use crate::{
    api::dto::PendingOrderDto,
    bot::client::ApiClient,
    core::notify::Notifier,
    errors::Result,
};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, instrument, warn};

/// Renders the chat message for one upcoming order. Times are shown in UTC.
#[must_use]
pub fn format_order(order: &PendingOrderDto, now: DateTime<Utc>) -> String {
    let minutes = (order.scheduled_at - now).num_minutes().max(0);
    let mut lines = vec![
        format!("🔔 Заказ #{} через {minutes} мин", order.id),
        format!("Клиент: {}, {}", order.client_name, order.phone),
    ];
    match &order.city {
        Some(city) => lines.push(format!("Адрес: {city}, {}", order.address)),
        None => lines.push(format!("Адрес: {}", order.address)),
    }
    lines.push(format!(
        "Время: {} UTC",
        order.scheduled_at.format("%d.%m.%Y %H:%M")
    ));
    if let Some(worker) = &order.worker {
        lines.push(format!("Мастер: {worker}"));
    }
    if !order.description.trim().is_empty() {
        lines.push(format!("Описание: {}", order.description.trim()));
    }
    if let Some(price) = order.price {
        lines.push(format!("Стоимость: {price:.0} ₽"));
    }
    lines.join("\n")
}

/// Counters reported by `/work`.
#[derive(Debug, Clone, Default)]
pub struct SweepStatus {
    pub scheduler_running: bool,
    pub last_sweep: Option<DateTime<Utc>>,
    pub last_sent: usize,
    pub total_sent: u64,
    pub last_error: Option<String>,
}

/// Runs sweeps; concurrent calls are serialized so an order is never announced twice.
pub struct Sweeper {
    client: Arc<ApiClient>,
    sink: Arc<dyn Notifier>,
    window_minutes: i64,
    status: Mutex<SweepStatus>,
    running: Mutex<()>,
}

impl Sweeper {
    #[must_use]
    pub fn new(client: Arc<ApiClient>, sink: Arc<dyn Notifier>, window_minutes: i64) -> Self {
        Self {
            client,
            sink,
            window_minutes,
            status: Mutex::new(SweepStatus::default()),
            running: Mutex::new(()),
        }
    }

    pub async fn status(&self) -> SweepStatus {
        self.status.lock().await.clone()
    }

    pub async fn set_scheduler_running(&self, running: bool) {
        self.status.lock().await.scheduler_running = running;
    }

    /// Announces every pending order and acknowledges the ones that were delivered.
    /// Returns how many messages were sent.
    #[instrument(skip(self))]
    pub async fn sweep(&self) -> Result<usize> {
        let _guard = self.running.lock().await;
        let result = self.sweep_once().await;

        let mut status = self.status.lock().await;
        status.last_sweep = Some(Utc::now());
        match &result {
            Ok(sent) => {
                status.last_sent = *sent;
                status.total_sent += *sent as u64;
                status.last_error = None;
            }
            Err(e) => status.last_error = Some(e.to_string()),
        }
        result
    }

    async fn sweep_once(&self) -> Result<usize> {
        let pending = self.client.fetch_pending(self.window_minutes).await?;
        if pending.is_empty() {
            return Ok(0);
        }

        let now = Utc::now();
        let mut sent = Vec::with_capacity(pending.len());
        for order in &pending {
            match self.sink.notify(&format_order(order, now)).await {
                Ok(()) => sent.push(order.id),
                Err(e) => warn!("Failed to announce order {}: {e}", order.id),
            }
        }

        // Undelivered orders stay pending and are retried on the next sweep
        self.client.mark_notified(&sent).await?;
        info!("Announced {} of {} pending orders", sent.len(), pending.len());
        Ok(sent.len())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::{
        core::{order, types::Role},
        errors::Error,
        test_utils::*,
    };
    use async_trait::async_trait;
    use chrono::{Duration, TimeZone};

    fn pending(id: i64) -> PendingOrderDto {
        PendingOrderDto {
            id,
            client_name: "Иван".to_string(),
            phone: "+7 900".to_string(),
            address: "ул. Ленина, 1".to_string(),
            city: Some("Москва".to_string()),
            worker: None,
            scheduled_at: Utc.with_ymd_and_hms(2026, 10, 19, 14, 30, 0).unwrap(),
            description: String::new(),
            price: Some(3500.0),
        }
    }

    #[test]
    fn test_format_order() {
        let now = Utc.with_ymd_and_hms(2026, 10, 19, 14, 0, 0).unwrap();
        let text = format_order(&pending(7), now);

        assert!(text.starts_with("🔔 Заказ #7 через 30 мин"));
        assert!(text.contains("Адрес: Москва, ул. Ленина, 1"));
        assert!(text.contains("Время: 19.10.2026 14:30 UTC"));
        assert!(text.contains("Стоимость: 3500 ₽"));
        assert!(!text.contains("Мастер"));
        assert!(!text.contains("Описание"));
    }

    struct FailingNotifier;

    #[async_trait]
    impl Notifier for FailingNotifier {
        async fn notify(&self, _text: &str) -> Result<()> {
            Err(Error::validation("channel unavailable"))
        }
    }

    async fn app_with_orders() -> Result<(TestApp, Arc<ApiClient>)> {
        let app = setup_test_app().await?;
        create_test_user(&app.state.db, "bot", Role::Manager).await?;
        for minutes in [10, 40] {
            order::create_order(
                &app.state.db,
                order_input(Utc::now() + Duration::minutes(minutes)),
                "manager",
            )
            .await?;
        }
        let client = Arc::new(ApiClient::new(
            &serve_test_app(&app).await,
            "bot",
            TEST_PASSWORD,
        ));
        Ok((app, client))
    }

    #[tokio::test]
    async fn test_sweep_sends_and_acknowledges() -> Result<()> {
        let (_app, client) = app_with_orders().await?;
        let sink = Arc::new(RecordingNotifier::default());
        let sweeper = Sweeper::new(client, Arc::clone(&sink) as Arc<dyn Notifier>, 60);

        assert_eq!(sweeper.sweep().await?, 2);
        assert_eq!(sink.messages().len(), 2);

        // Acknowledged orders are not announced again
        assert_eq!(sweeper.sweep().await?, 0);
        assert_eq!(sink.messages().len(), 2);

        let status = sweeper.status().await;
        assert_eq!(status.total_sent, 2);
        assert_eq!(status.last_sent, 0);
        assert!(status.last_sweep.is_some());
        assert!(status.last_error.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn test_undelivered_orders_stay_pending() -> Result<()> {
        let (_app, client) = app_with_orders().await?;

        let failing = Sweeper::new(Arc::clone(&client), Arc::new(FailingNotifier), 60);
        assert_eq!(failing.sweep().await?, 0);

        let sink = Arc::new(RecordingNotifier::default());
        let working = Sweeper::new(client, Arc::clone(&sink) as Arc<dyn Notifier>, 60);
        assert_eq!(working.sweep().await?, 2);

        Ok(())
    }
}
