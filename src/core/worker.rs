//! Worker business logic - technicians assigned to customer orders.

use crate::{
    core::{
        audit::{self, AuditEvent, RecordKind},
        city,
    },
    entities::{Worker, worker},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use serde::Deserialize;

/// Editable worker fields.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerInput {
    pub name: String,
    pub phone: String,
    pub city_id: Option<i64>,
    #[serde(default)]
    pub specialty: String,
}

/// Lists workers by name; inactive ones only when `include_inactive` is set.
pub async fn get_workers(
    db: &DatabaseConnection,
    include_inactive: bool,
) -> Result<Vec<worker::Model>> {
    let mut query = Worker::find();
    if !include_inactive {
        query = query.filter(worker::Column::IsActive.eq(true));
    }
    query
        .order_by_asc(worker::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds a worker by ID.
pub async fn get_worker_by_id<C>(db: &C, worker_id: i64) -> Result<Option<worker::Model>>
where
    C: ConnectionTrait,
{
    Worker::find_by_id(worker_id).one(db).await.map_err(Into::into)
}

pub async fn create_worker(
    db: &DatabaseConnection,
    input: WorkerInput,
    who_did: &str,
) -> Result<worker::Model> {
    if input.name.trim().is_empty() {
        return Err(Error::validation("Имя работника не может быть пустым"));
    }

    let txn = db.begin().await?;
    city::ensure_city_exists(&txn, input.city_id).await?;
    let created = worker::ActiveModel {
        name: Set(input.name.trim().to_string()),
        phone: Set(input.phone.trim().to_string()),
        city_id: Set(input.city_id),
        specialty: Set(input.specialty.trim().to_string()),
        is_active: Set(true),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    audit::record(
        &txn,
        who_did,
        &AuditEvent::RecordCreated {
            kind: RecordKind::Worker,
            id: created.id,
            name: created.name.clone(),
        },
    )
    .await?;

    txn.commit().await?;
    Ok(created)
}

pub async fn update_worker(
    db: &DatabaseConnection,
    worker_id: i64,
    input: WorkerInput,
    who_did: &str,
) -> Result<worker::Model> {
    if input.name.trim().is_empty() {
        return Err(Error::validation("Имя работника не может быть пустым"));
    }

    let txn = db.begin().await?;
    city::ensure_city_exists(&txn, input.city_id).await?;
    let mut model: worker::ActiveModel = get_worker_by_id(&txn, worker_id)
        .await?
        .ok_or(Error::WorkerNotFound { id: worker_id })?
        .into();
    model.name = Set(input.name.trim().to_string());
    model.phone = Set(input.phone.trim().to_string());
    model.city_id = Set(input.city_id);
    model.specialty = Set(input.specialty.trim().to_string());
    let updated = model.update(&txn).await?;

    audit::record(
        &txn,
        who_did,
        &AuditEvent::RecordUpdated {
            kind: RecordKind::Worker,
            id: updated.id,
            name: updated.name.clone(),
        },
    )
    .await?;

    txn.commit().await?;
    Ok(updated)
}

/// Marks a worker inactive so no new orders can be assigned.
pub async fn deactivate_worker(
    db: &DatabaseConnection,
    worker_id: i64,
    who_did: &str,
) -> Result<worker::Model> {
    let txn = db.begin().await?;
    let mut model: worker::ActiveModel = get_worker_by_id(&txn, worker_id)
        .await?
        .ok_or(Error::WorkerNotFound { id: worker_id })?
        .into();
    model.is_active = Set(false);
    let updated = model.update(&txn).await?;

    audit::record(
        &txn,
        who_did,
        &AuditEvent::RecordDeleted {
            kind: RecordKind::Worker,
            id: updated.id,
            name: updated.name.clone(),
        },
    )
    .await?;

    txn.commit().await?;
    Ok(updated)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_worker_crud() -> Result<()> {
        let db = setup_test_db().await?;
        let worker = create_test_worker(&db, "Олег").await?;
        assert_eq!(worker.specialty, "окна");
        assert!(worker.is_active);

        let updated = update_worker(
            &db,
            worker.id,
            WorkerInput {
                name: "Олег К.".to_string(),
                phone: "1".to_string(),
                city_id: None,
                specialty: "ковры".to_string(),
            },
            "admin",
        )
        .await?;
        assert_eq!(updated.name, "Олег К.");
        assert_eq!(updated.specialty, "ковры");

        deactivate_worker(&db, worker.id, "admin").await?;
        assert!(get_workers(&db, false).await?.is_empty());
        assert_eq!(get_workers(&db, true).await?.len(), 1);

        let err = deactivate_worker(&db, 999, "admin").await.unwrap_err();
        assert!(matches!(err, Error::WorkerNotFound { id: 999 }));

        Ok(())
    }

    #[tokio::test]
    async fn test_worker_city_must_exist() -> Result<()> {
        let db = setup_test_db().await?;
        let input = |city_id| WorkerInput {
            name: "Олег".to_string(),
            phone: "1".to_string(),
            city_id,
            specialty: String::new(),
        };

        let err = create_worker(&db, input(Some(999)), "admin")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::CityNotFound { id: 999 }));

        let worker = create_worker(&db, input(None), "admin").await?;
        let err = update_worker(&db, worker.id, input(Some(999)), "admin")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::CityNotFound { id: 999 }));
        assert!(get_worker_by_id(&db, worker.id).await?.unwrap().city_id.is_none());

        Ok(())
    }
}
