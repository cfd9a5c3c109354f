//! Customer order business logic, including the queries the notification bot polls.

use crate::{
    core::{
        audit::{self, AuditEvent, RecordKind},
        city,
        types::OrderState,
        worker,
    },
    entities::{Order, order},
    errors::{Error, Result},
};
use chrono::{DateTime, Duration, Utc};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*, sea_query::Expr};
use serde::Deserialize;

/// Editable order fields.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderInput {
    pub client_name: String,
    pub phone: String,
    pub address: String,
    pub city_id: Option<i64>,
    pub worker_id: Option<i64>,
    pub scheduled_at: DateTime<Utc>,
    #[serde(default)]
    pub description: String,
    pub price: Option<f64>,
}

/// Optional filters for [`get_orders`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderFilter {
    pub state: Option<OrderState>,
    pub city_id: Option<i64>,
    pub worker_id: Option<i64>,
}

async fn validate<C>(db: &C, input: &OrderInput) -> Result<()>
where
    C: ConnectionTrait,
{
    if input.client_name.trim().is_empty() {
        return Err(Error::validation("Имя клиента не может быть пустым"));
    }
    if input.phone.trim().is_empty() {
        return Err(Error::validation("Телефон клиента не может быть пустым"));
    }
    if let Some(price) = input.price {
        if !price.is_finite() || price < 0.0 {
            return Err(Error::validation("Цена должна быть неотрицательным числом"));
        }
    }
    city::ensure_city_exists(db, input.city_id).await?;
    if let Some(worker_id) = input.worker_id {
        let assigned = worker::get_worker_by_id(db, worker_id)
            .await?
            .ok_or(Error::WorkerNotFound { id: worker_id })?;
        if !assigned.is_active {
            return Err(Error::validation(format!(
                "Работник {} неактивен",
                assigned.name
            )));
        }
    }
    Ok(())
}

/// Lists orders by scheduled time, soonest first.
pub async fn get_orders(db: &DatabaseConnection, filter: &OrderFilter) -> Result<Vec<order::Model>> {
    let mut query = Order::find();
    if let Some(state) = filter.state {
        query = query.filter(order::Column::State.eq(state.as_str()));
    }
    if let Some(city_id) = filter.city_id {
        query = query.filter(order::Column::CityId.eq(city_id));
    }
    if let Some(worker_id) = filter.worker_id {
        query = query.filter(order::Column::WorkerId.eq(worker_id));
    }
    query
        .order_by_asc(order::Column::ScheduledAt)
        .all(db)
        .await
        .map_err(Into::into)
}

pub async fn get_order_by_id(db: &DatabaseConnection, order_id: i64) -> Result<Option<order::Model>> {
    Order::find_by_id(order_id).one(db).await.map_err(Into::into)
}

/// Creates a `NEW`, not yet announced order.
pub async fn create_order(
    db: &DatabaseConnection,
    input: OrderInput,
    who_did: &str,
) -> Result<order::Model> {
    let txn = db.begin().await?;
    validate(&txn, &input).await?;

    let created = order::ActiveModel {
        client_name: Set(input.client_name.trim().to_string()),
        phone: Set(input.phone.trim().to_string()),
        address: Set(input.address.trim().to_string()),
        city_id: Set(input.city_id),
        worker_id: Set(input.worker_id),
        scheduled_at: Set(input.scheduled_at),
        description: Set(input.description),
        price: Set(input.price),
        state: Set(OrderState::New.as_str().to_string()),
        notified: Set(false),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    audit::record(
        &txn,
        who_did,
        &AuditEvent::OrderCreated {
            order_id: created.id,
            client_name: created.client_name.clone(),
        },
    )
    .await?;

    txn.commit().await?;
    Ok(created)
}

/// Replaces an order's editable fields.
///
/// Moving the visit to a different time re-arms the bot notification.
pub async fn update_order(
    db: &DatabaseConnection,
    order_id: i64,
    input: OrderInput,
    who_did: &str,
) -> Result<order::Model> {
    let txn = db.begin().await?;
    validate(&txn, &input).await?;

    let existing = Order::find_by_id(order_id)
        .one(&txn)
        .await?
        .ok_or(Error::OrderNotFound { id: order_id })?;
    let rescheduled = existing.scheduled_at != input.scheduled_at;

    let mut model: order::ActiveModel = existing.into();
    model.client_name = Set(input.client_name.trim().to_string());
    model.phone = Set(input.phone.trim().to_string());
    model.address = Set(input.address.trim().to_string());
    model.city_id = Set(input.city_id);
    model.worker_id = Set(input.worker_id);
    model.scheduled_at = Set(input.scheduled_at);
    model.description = Set(input.description);
    model.price = Set(input.price);
    if rescheduled {
        model.notified = Set(false);
    }
    let updated = model.update(&txn).await?;

    audit::record(
        &txn,
        who_did,
        &AuditEvent::RecordUpdated {
            kind: RecordKind::Order,
            id: updated.id,
            name: updated.client_name.clone(),
        },
    )
    .await?;

    txn.commit().await?;
    Ok(updated)
}

/// Sets the order state.
pub async fn change_order_state(
    db: &DatabaseConnection,
    order_id: i64,
    state: OrderState,
    who_did: &str,
) -> Result<order::Model> {
    let txn = db.begin().await?;
    let existing = Order::find_by_id(order_id)
        .one(&txn)
        .await?
        .ok_or(Error::OrderNotFound { id: order_id })?;
    let from = existing.state.clone();

    let mut model: order::ActiveModel = existing.into();
    model.state = Set(state.as_str().to_string());
    let updated = model.update(&txn).await?;

    audit::record(
        &txn,
        who_did,
        &AuditEvent::OrderStateChanged {
            order_id,
            from,
            to: state.as_str().to_string(),
        },
    )
    .await?;

    txn.commit().await?;
    Ok(updated)
}

pub async fn delete_order(db: &DatabaseConnection, order_id: i64, who_did: &str) -> Result<()> {
    let txn = db.begin().await?;
    let existing = Order::find_by_id(order_id)
        .one(&txn)
        .await?
        .ok_or(Error::OrderNotFound { id: order_id })?;

    audit::record(
        &txn,
        who_did,
        &AuditEvent::RecordDeleted {
            kind: RecordKind::Order,
            id: existing.id,
            name: existing.client_name.clone(),
        },
    )
    .await?;
    existing.delete(&txn).await?;

    txn.commit().await?;
    Ok(())
}

/// Orders the bot has not announced yet whose visit falls within
/// `[now, now + window]`, soonest first. Only `NEW` and `IN_WORK` orders qualify.
pub async fn pending_notifications(
    db: &DatabaseConnection,
    now: DateTime<Utc>,
    window: Duration,
) -> Result<Vec<order::Model>> {
    Order::find()
        .filter(order::Column::Notified.eq(false))
        .filter(order::Column::State.is_in([
            OrderState::New.as_str(),
            OrderState::InWork.as_str(),
        ]))
        .filter(order::Column::ScheduledAt.gte(now))
        .filter(order::Column::ScheduledAt.lte(now + window))
        .order_by_asc(order::Column::ScheduledAt)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Flags the given orders as announced. Returns how many rows changed.
pub async fn mark_notified(db: &DatabaseConnection, order_ids: &[i64]) -> Result<u64> {
    if order_ids.is_empty() {
        return Ok(0);
    }
    let result = Order::update_many()
        .col_expr(order::Column::Notified, Expr::value(true))
        .filter(order::Column::Id.is_in(order_ids.iter().copied()))
        .filter(order::Column::Notified.eq(false))
        .exec(db)
        .await?;
    Ok(result.rows_affected)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_create_order_validation() -> Result<()> {
        let db = setup_test_db().await?;

        let mut input = order_input(Utc::now());
        input.client_name = " ".to_string();
        let err = create_order(&db, input, "manager").await.unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));

        let mut input = order_input(Utc::now());
        input.worker_id = Some(999);
        let err = create_order(&db, input, "manager").await.unwrap_err();
        assert!(matches!(err, Error::WorkerNotFound { id: 999 }));

        let mut input = order_input(Utc::now());
        input.city_id = Some(999);
        let err = create_order(&db, input, "manager").await.unwrap_err();
        assert!(matches!(err, Error::CityNotFound { id: 999 }));

        let mut input = order_input(Utc::now());
        input.price = Some(-1.0);
        let err = create_order(&db, input, "manager").await.unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));

        Ok(())
    }

    #[tokio::test]
    async fn test_create_order_with_inactive_worker_rejected() -> Result<()> {
        let db = setup_test_db().await?;
        let worker = create_test_worker(&db, "Олег").await?;
        crate::core::worker::deactivate_worker(&db, worker.id, "admin").await?;

        let mut input = order_input(Utc::now());
        input.worker_id = Some(worker.id);
        let err = create_order(&db, input, "manager").await.unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));

        Ok(())
    }

    #[tokio::test]
    async fn test_state_change_and_filter() -> Result<()> {
        let db = setup_test_db().await?;
        let order = create_order(&db, order_input(Utc::now()), "manager").await?;
        assert_eq!(order.state, "NEW");

        let changed = change_order_state(&db, order.id, OrderState::Done, "manager").await?;
        assert_eq!(changed.state, "DONE");

        let done = get_orders(
            &db,
            &OrderFilter {
                state: Some(OrderState::Done),
                ..OrderFilter::default()
            },
        )
        .await?;
        assert_eq!(done.len(), 1);

        let logs = audit::list_entries(&db, &audit::LogFilter::default()).await?;
        assert!(logs[0].description.contains("NEW → DONE"));

        Ok(())
    }

    #[tokio::test]
    async fn test_pending_notifications_window() -> Result<()> {
        let db = setup_test_db().await?;
        let now = Utc::now();

        let soon = create_order(&db, order_input(now + Duration::minutes(30)), "m").await?;
        let later = create_order(&db, order_input(now + Duration::minutes(10)), "m").await?;
        create_order(&db, order_input(now + Duration::hours(5)), "m").await?;
        create_order(&db, order_input(now - Duration::minutes(5)), "m").await?;
        let cancelled = create_order(&db, order_input(now + Duration::minutes(20)), "m").await?;
        change_order_state(&db, cancelled.id, OrderState::Cancelled, "m").await?;

        let pending = pending_notifications(&db, now, Duration::minutes(60)).await?;
        let ids: Vec<i64> = pending.iter().map(|o| o.id).collect();
        assert_eq!(ids, vec![later.id, soon.id]);

        assert_eq!(mark_notified(&db, &ids).await?, 2);
        assert!(pending_notifications(&db, now, Duration::minutes(60)).await?.is_empty());

        // Already-notified rows are not counted twice
        assert_eq!(mark_notified(&db, &ids).await?, 0);
        assert_eq!(mark_notified(&db, &[]).await?, 0);

        Ok(())
    }

    #[tokio::test]
    async fn test_reschedule_rearms_notification() -> Result<()> {
        let db = setup_test_db().await?;
        let now = Utc::now();
        let order = create_order(&db, order_input(now + Duration::minutes(5)), "m").await?;
        mark_notified(&db, &[order.id]).await?;

        let same_time = update_order(&db, order.id, order_input(order.scheduled_at), "m").await?;
        assert!(same_time.notified);

        let moved =
            update_order(&db, order.id, order_input(now + Duration::minutes(40)), "m").await?;
        assert!(!moved.notified);

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_order() -> Result<()> {
        let db = setup_test_db().await?;
        let order = create_order(&db, order_input(Utc::now()), "m").await?;

        delete_order(&db, order.id, "m").await?;
        assert!(get_order_by_id(&db, order.id).await?.is_none());

        let err = delete_order(&db, order.id, "m").await.unwrap_err();
        assert!(matches!(err, Error::OrderNotFound { .. }));

        Ok(())
    }
}
