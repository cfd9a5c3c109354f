//! Distributor business logic - the people who hand out leaflets.
//!
//! Distributors are never hard-deleted; deactivation hides them from pickers while
//! their orders keep pointing at them.

use crate::{
    core::{
        audit::{self, AuditEvent, RecordKind},
        city,
    },
    entities::{Distributor, distributor},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use serde::Deserialize;

/// Editable distributor fields.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributorInput {
    pub name: String,
    pub phone: String,
    pub city_id: Option<i64>,
}

/// Lists distributors by name; inactive ones only when `include_inactive` is set.
pub async fn get_distributors(
    db: &DatabaseConnection,
    include_inactive: bool,
) -> Result<Vec<distributor::Model>> {
    let mut query = Distributor::find();
    if !include_inactive {
        query = query.filter(distributor::Column::IsActive.eq(true));
    }
    query
        .order_by_asc(distributor::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds a distributor by ID.
pub async fn get_distributor_by_id(
    db: &DatabaseConnection,
    distributor_id: i64,
) -> Result<Option<distributor::Model>> {
    Distributor::find_by_id(distributor_id)
        .one(db)
        .await
        .map_err(Into::into)
}

fn validate(input: &DistributorInput) -> Result<()> {
    if input.name.trim().is_empty() {
        return Err(Error::validation("Имя распространителя не может быть пустым"));
    }
    Ok(())
}

/// Creates an active distributor.
pub async fn create_distributor(
    db: &DatabaseConnection,
    input: DistributorInput,
    who_did: &str,
) -> Result<distributor::Model> {
    validate(&input)?;

    let txn = db.begin().await?;
    city::ensure_city_exists(&txn, input.city_id).await?;
    let created = distributor::ActiveModel {
        name: Set(input.name.trim().to_string()),
        phone: Set(input.phone.trim().to_string()),
        city_id: Set(input.city_id),
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
            kind: RecordKind::Distributor,
            id: created.id,
            name: created.name.clone(),
        },
    )
    .await?;

    txn.commit().await?;
    Ok(created)
}

/// Updates a distributor's name, phone and city.
pub async fn update_distributor(
    db: &DatabaseConnection,
    distributor_id: i64,
    input: DistributorInput,
    who_did: &str,
) -> Result<distributor::Model> {
    validate(&input)?;

    let txn = db.begin().await?;
    city::ensure_city_exists(&txn, input.city_id).await?;
    let mut model: distributor::ActiveModel = Distributor::find_by_id(distributor_id)
        .one(&txn)
        .await?
        .ok_or(Error::DistributorNotFound { id: distributor_id })?
        .into();
    model.name = Set(input.name.trim().to_string());
    model.phone = Set(input.phone.trim().to_string());
    model.city_id = Set(input.city_id);
    let updated = model.update(&txn).await?;

    audit::record(
        &txn,
        who_did,
        &AuditEvent::RecordUpdated {
            kind: RecordKind::Distributor,
            id: updated.id,
            name: updated.name.clone(),
        },
    )
    .await?;

    txn.commit().await?;
    Ok(updated)
}

/// Marks a distributor inactive.
pub async fn deactivate_distributor(
    db: &DatabaseConnection,
    distributor_id: i64,
    who_did: &str,
) -> Result<distributor::Model> {
    let txn = db.begin().await?;
    let mut model: distributor::ActiveModel = Distributor::find_by_id(distributor_id)
        .one(&txn)
        .await?
        .ok_or(Error::DistributorNotFound { id: distributor_id })?
        .into();
    model.is_active = Set(false);
    let updated = model.update(&txn).await?;

    audit::record(
        &txn,
        who_did,
        &AuditEvent::RecordDeleted {
            kind: RecordKind::Distributor,
            id: updated.id,
            name: updated.name.clone(),
        },
    )
    .await?;

    txn.commit().await?;
    Ok(updated)
}
