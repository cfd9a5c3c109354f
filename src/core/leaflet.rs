//! Leaflet business logic - templates and their stock counter.
//!
//! Stock is only ever moved with single-statement `UPDATE`s (`value = value ± n`), and
//! decrements carry a `value >= n` guard so concurrent writers cannot drive it negative.

use crate::{
    core::audit::{self, AuditEvent, RecordKind},
    entities::{Leaflet, LeafletOrder, leaflet, leaflet_order},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*, sea_query::Expr};

/// Retrieves all leaflets ordered alphabetically by name.
pub async fn get_all_leaflets(db: &DatabaseConnection) -> Result<Vec<leaflet::Model>> {
    Leaflet::find()
        .order_by_asc(leaflet::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds a leaflet by its unique ID.
pub async fn get_leaflet_by_id<C>(db: &C, leaflet_id: i64) -> Result<Option<leaflet::Model>>
where
    C: ConnectionTrait,
{
    Leaflet::find_by_id(leaflet_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds a leaflet by exact name.
pub async fn get_leaflet_by_name(
    db: &DatabaseConnection,
    name: &str,
) -> Result<Option<leaflet::Model>> {
    Leaflet::find()
        .filter(leaflet::Column::Name.eq(name))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Creates a leaflet with an initial stock count.
///
/// # Errors
/// Returns an error if the name is blank, the stock is negative, or the insert fails.
pub async fn create_leaflet(
    db: &DatabaseConnection,
    name: String,
    initial_stock: i64,
    who_did: &str,
) -> Result<leaflet::Model> {
    if name.trim().is_empty() {
        return Err(Error::validation("Название листовки не может быть пустым"));
    }
    if initial_stock < 0 {
        return Err(Error::InvalidQuantity {
            quantity: initial_stock,
        });
    }

    let txn = db.begin().await?;

    let now = chrono::Utc::now();
    let created = leaflet::ActiveModel {
        name: Set(name.trim().to_string()),
        value: Set(initial_stock),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    audit::record(
        &txn,
        who_did,
        &AuditEvent::LeafletCreated {
            leaflet_id: created.id,
            name: created.name.clone(),
            stock: created.value,
        },
    )
    .await?;

    txn.commit().await?;
    Ok(created)
}

/// Renames a leaflet.
pub async fn rename_leaflet(
    db: &DatabaseConnection,
    leaflet_id: i64,
    new_name: String,
    who_did: &str,
) -> Result<leaflet::Model> {
    if new_name.trim().is_empty() {
        return Err(Error::validation("Название листовки не может быть пустым"));
    }

    let txn = db.begin().await?;

    let mut model: leaflet::ActiveModel = get_leaflet_by_id(&txn, leaflet_id)
        .await?
        .ok_or(Error::LeafletNotFound { id: leaflet_id })?
        .into();
    model.name = Set(new_name.trim().to_string());
    model.updated_at = Set(chrono::Utc::now());
    let updated = model.update(&txn).await?;

    audit::record(
        &txn,
        who_did,
        &AuditEvent::RecordUpdated {
            kind: RecordKind::Leaflet,
            id: updated.id,
            name: updated.name.clone(),
        },
    )
    .await?;

    txn.commit().await?;
    Ok(updated)
}

/// Adds freshly printed copies to a leaflet's stock.
///
/// # Errors
/// Returns [`Error::InvalidQuantity`] unless `amount` is positive.
pub async fn restock_leaflet(
    db: &DatabaseConnection,
    leaflet_id: i64,
    amount: i64,
    who_did: &str,
) -> Result<leaflet::Model> {
    if amount <= 0 {
        return Err(Error::InvalidQuantity { quantity: amount });
    }

    let txn = db.begin().await?;
    let updated = credit_stock(&txn, leaflet_id, amount).await?;

    audit::record(
        &txn,
        who_did,
        &AuditEvent::LeafletRestocked {
            leaflet_id,
            name: updated.name.clone(),
            added: amount,
            stock: updated.value,
        },
    )
    .await?;

    txn.commit().await?;
    Ok(updated)
}

/// Deletes a leaflet that no order references.
///
/// # Errors
/// Returns [`Error::InUse`] while leaflet orders still point at it.
pub async fn delete_leaflet(db: &DatabaseConnection, leaflet_id: i64, who_did: &str) -> Result<()> {
    let txn = db.begin().await?;

    let existing = get_leaflet_by_id(&txn, leaflet_id)
        .await?
        .ok_or(Error::LeafletNotFound { id: leaflet_id })?;

    let references = LeafletOrder::find()
        .filter(leaflet_order::Column::LeafletId.eq(leaflet_id))
        .count(&txn)
        .await?;
    if references > 0 {
        return Err(Error::InUse {
            message: format!("листовка «{}» используется в {references} заказах", existing.name),
        });
    }

    audit::record(
        &txn,
        who_did,
        &AuditEvent::RecordDeleted {
            kind: RecordKind::Leaflet,
            id: existing.id,
            name: existing.name.clone(),
        },
    )
    .await?;
    existing.delete(&txn).await?;

    txn.commit().await?;
    Ok(())
}

/// Removes `quantity` copies from stock if at least that many are on hand.
///
/// Runs as one conditional `UPDATE`; when no row matches, the leaflet is re-read to
/// tell a missing leaflet apart from insufficient stock. Returns the updated leaflet.
pub async fn take_stock<C>(db: &C, leaflet_id: i64, quantity: i64) -> Result<leaflet::Model>
where
    C: ConnectionTrait,
{
    let result = Leaflet::update_many()
        .col_expr(
            leaflet::Column::Value,
            Expr::col(leaflet::Column::Value).sub(quantity),
        )
        .col_expr(leaflet::Column::UpdatedAt, Expr::value(chrono::Utc::now()))
        .filter(leaflet::Column::Id.eq(leaflet_id))
        .filter(leaflet::Column::Value.gte(quantity))
        .exec(db)
        .await?;

    let current = get_leaflet_by_id(db, leaflet_id)
        .await?
        .ok_or(Error::LeafletNotFound { id: leaflet_id })?;

    if result.rows_affected == 0 {
        return Err(Error::InsufficientStock {
            available: current.value,
            requested: quantity,
        });
    }

    Ok(current)
}

/// Adds `quantity` copies back to stock. Returns the updated leaflet.
pub async fn credit_stock<C>(db: &C, leaflet_id: i64, quantity: i64) -> Result<leaflet::Model>
where
    C: ConnectionTrait,
{
    let result = Leaflet::update_many()
        .col_expr(
            leaflet::Column::Value,
            Expr::col(leaflet::Column::Value).add(quantity),
        )
        .col_expr(leaflet::Column::UpdatedAt, Expr::value(chrono::Utc::now()))
        .filter(leaflet::Column::Id.eq(leaflet_id))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        return Err(Error::LeafletNotFound { id: leaflet_id });
    }

    get_leaflet_by_id(db, leaflet_id)
        .await?
        .ok_or(Error::LeafletNotFound { id: leaflet_id })
}
