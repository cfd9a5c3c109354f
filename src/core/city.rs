//! City business logic - the service areas orders are grouped by.

use crate::{
    core::audit::{self, AuditEvent, RecordKind},
    entities::{
        City, Distributor, LeafletOrder, Order, Worker, city, distributor, leaflet_order, order,
        worker,
    },
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};

/// Retrieves all cities ordered by name.
pub async fn get_all_cities(db: &DatabaseConnection) -> Result<Vec<city::Model>> {
    City::find()
        .order_by_asc(city::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds a city by ID.
pub async fn get_city_by_id(db: &DatabaseConnection, city_id: i64) -> Result<Option<city::Model>> {
    City::find_by_id(city_id).one(db).await.map_err(Into::into)
}

/// Finds a city by exact name.
pub async fn get_city_by_name(db: &DatabaseConnection, name: &str) -> Result<Option<city::Model>> {
    City::find()
        .filter(city::Column::Name.eq(name))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Fails with [`Error::CityNotFound`] when `city_id` is set but no such city exists.
pub async fn ensure_city_exists<C>(db: &C, city_id: Option<i64>) -> Result<()>
where
    C: ConnectionTrait,
{
    if let Some(id) = city_id {
        City::find_by_id(id)
            .one(db)
            .await?
            .ok_or(Error::CityNotFound { id })?;
    }
    Ok(())
}

/// Creates a city with a unique, non-empty name.
pub async fn create_city(db: &DatabaseConnection, name: String, who_did: &str) -> Result<city::Model> {
    let name = name.trim().to_string();
    if name.is_empty() {
        return Err(Error::validation("Название города не может быть пустым"));
    }
    if get_city_by_name(db, &name).await?.is_some() {
        return Err(Error::validation(format!("Город «{name}» уже существует")));
    }

    let txn = db.begin().await?;
    let created = city::ActiveModel {
        name: Set(name),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    audit::record(
        &txn,
        who_did,
        &AuditEvent::RecordCreated {
            kind: RecordKind::City,
            id: created.id,
            name: created.name.clone(),
        },
    )
    .await?;

    txn.commit().await?;
    Ok(created)
}

/// Renames a city.
pub async fn rename_city(
    db: &DatabaseConnection,
    city_id: i64,
    new_name: String,
    who_did: &str,
) -> Result<city::Model> {
    let new_name = new_name.trim().to_string();
    if new_name.is_empty() {
        return Err(Error::validation("Название города не может быть пустым"));
    }

    let txn = db.begin().await?;
    let mut model: city::ActiveModel = City::find_by_id(city_id)
        .one(&txn)
        .await?
        .ok_or(Error::CityNotFound { id: city_id })?
        .into();
    model.name = Set(new_name);
    let updated = model.update(&txn).await?;

    audit::record(
        &txn,
        who_did,
        &AuditEvent::RecordUpdated {
            kind: RecordKind::City,
            id: updated.id,
            name: updated.name.clone(),
        },
    )
    .await?;

    txn.commit().await?;
    Ok(updated)
}

/// Deletes a city that no leaflet order, customer order, worker or distributor references.
pub async fn delete_city(db: &DatabaseConnection, city_id: i64, who_did: &str) -> Result<()> {
    let txn = db.begin().await?;

    let existing = City::find_by_id(city_id)
        .one(&txn)
        .await?
        .ok_or(Error::CityNotFound { id: city_id })?;

    let references = LeafletOrder::find()
        .filter(leaflet_order::Column::CityId.eq(city_id))
        .count(&txn)
        .await?
        + Order::find()
            .filter(order::Column::CityId.eq(city_id))
            .count(&txn)
            .await?
        + Worker::find()
            .filter(worker::Column::CityId.eq(city_id))
            .count(&txn)
            .await?
        + Distributor::find()
            .filter(distributor::Column::CityId.eq(city_id))
            .count(&txn)
            .await?;
    if references > 0 {
        return Err(Error::InUse {
            message: format!("город «{}» используется в {references} записях", existing.name),
        });
    }

    audit::record(
        &txn,
        who_did,
        &AuditEvent::RecordDeleted {
            kind: RecordKind::City,
            id: existing.id,
            name: existing.name.clone(),
        },
    )
    .await?;
    existing.delete(&txn).await?;

    txn.commit().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_create_city_trims_and_rejects_duplicates() -> Result<()> {
        let db = setup_test_db().await?;

        let city = create_city(&db, "  Казань ".to_string(), "admin").await?;
        assert_eq!(city.name, "Казань");

        let err = create_city(&db, "Казань".to_string(), "admin")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));

        let err = create_city(&db, " ".to_string(), "admin").await.unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));

        Ok(())
    }

    #[tokio::test]
    async fn test_list_and_rename() -> Result<()> {
        let db = setup_test_db().await?;
        create_city(&db, "Самара".to_string(), "admin").await?;
        let city = create_city(&db, "Астрахань".to_string(), "admin").await?;

        let all = get_all_cities(&db).await?;
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].name, "Астрахань");

        let renamed = rename_city(&db, city.id, "Уфа".to_string(), "admin").await?;
        assert_eq!(renamed.name, "Уфа");
        assert!(get_city_by_name(&db, "Уфа").await?.is_some());

        let err = rename_city(&db, 999, "X".to_string(), "admin")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::CityNotFound { id: 999 }));

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_city_refused_when_referenced() -> Result<()> {
        let fx = setup_lifecycle(50).await?;
        create_test_leaflet_order(&fx, 5).await?;

        let err = delete_city(&fx.db, fx.city.id, "admin").await.unwrap_err();
        assert!(matches!(err, Error::InUse { .. }));

        let empty = create_city(&fx.db, "Пустой".to_string(), "admin").await?;
        delete_city(&fx.db, empty.id, "admin").await?;
        assert!(get_city_by_id(&fx.db, empty.id).await?.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_city_refused_when_customer_order_references_it() -> Result<()> {
        let db = setup_test_db().await?;
        let city = create_test_city(&db, "Тверь").await?;
        let mut input = order_input(chrono::Utc::now());
        input.city_id = Some(city.id);
        crate::core::order::create_order(&db, input, "manager").await?;

        let err = delete_city(&db, city.id, "admin").await.unwrap_err();
        assert!(matches!(err, Error::InUse { .. }));
        assert!(get_city_by_id(&db, city.id).await?.is_some());

        Ok(())
    }

    #[tokio::test]
    async fn test_ensure_city_exists() -> Result<()> {
        let db = setup_test_db().await?;
        let city = create_test_city(&db, "Тула").await?;

        ensure_city_exists(&db, None).await?;
        ensure_city_exists(&db, Some(city.id)).await?;
        let err = ensure_city_exists(&db, Some(999)).await.unwrap_err();
        assert!(matches!(err, Error::CityNotFound { id: 999 }));

        Ok(())
    }
}
