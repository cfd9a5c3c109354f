//! Endpoints polled by the notification bot.

use crate::{
    api::{
        auth::{CurrentUser, Permission},
        dto::{MarkNotifiedRequest, MarkNotifiedResponse, PendingOrderDto},
        state::AppState,
    },
    core::{city, order, worker},
    errors::{Error, Result},
};
use axum::{
    Json,
    extract::{Query, State},
};
use chrono::{Duration, Utc};
use serde::Deserialize;
use std::collections::HashMap;
use tracing::debug;

const DEFAULT_WINDOW_MINUTES: i64 = 60;
/// One week
const MAX_WINDOW_MINUTES: i64 = 7 * 24 * 60;

#[derive(Debug, Default, Deserialize)]
pub struct PendingQuery {
    pub within_minutes: Option<i64>,
}

/// GET /api/telegram?within_minutes=N
pub async fn pending(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<PendingQuery>,
) -> Result<Json<Vec<PendingOrderDto>>> {
    user.require(&[Permission::Notifications])?;

    let minutes = query.within_minutes.unwrap_or(DEFAULT_WINDOW_MINUTES);
    if !(1..=MAX_WINDOW_MINUTES).contains(&minutes) {
        return Err(Error::validation(format!(
            "within_minutes должно быть от 1 до {MAX_WINDOW_MINUTES}"
        )));
    }

    let orders =
        order::pending_notifications(&state.db, Utc::now(), Duration::minutes(minutes)).await?;
    if orders.is_empty() {
        return Ok(Json(Vec::new()));
    }

    let cities: HashMap<i64, String> = city::get_all_cities(&state.db)
        .await?
        .into_iter()
        .map(|c| (c.id, c.name))
        .collect();
    let workers: HashMap<i64, String> = worker::get_workers(&state.db, true)
        .await?
        .into_iter()
        .map(|w| (w.id, w.name))
        .collect();

    debug!("{} orders pending notification", orders.len());
    Ok(Json(
        orders
            .into_iter()
            .map(|o| PendingOrderDto {
                id: o.id,
                city: o.city_id.and_then(|id| cities.get(&id).cloned()),
                worker: o.worker_id.and_then(|id| workers.get(&id).cloned()),
                client_name: o.client_name,
                phone: o.phone,
                address: o.address,
                scheduled_at: o.scheduled_at,
                description: o.description,
                price: o.price,
            })
            .collect(),
    ))
}

/// PATCH /api/telegram
pub async fn mark_notified(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(body): Json<MarkNotifiedRequest>,
) -> Result<Json<MarkNotifiedResponse>> {
    user.require(&[Permission::Notifications])?;
    let updated = order::mark_notified(&state.db, &body.ids).await?;
    Ok(Json(MarkNotifiedResponse { updated }))
}
