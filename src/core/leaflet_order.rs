//! Leaflet order lifecycle - assignment of leaflets to distributors and the stock
//! accounting around it.
//!
//! An order is created `IN_PROCESS` with its quantity taken out of stock, may move to
//! `FORPAYMENT`, and ends `DONE`, `DECLINED` or `CANCELLED`. Every stock movement runs in
//! the same database transaction as the order mutation and its audit row.

use crate::{
    core::{
        audit::{self, AuditEvent},
        leaflet,
        notify::Notifier,
        types::{LeafletOrderState, ProfitType},
    },
    entities::{City, Distributor, LeafletOrder, document, leaflet_order},
    errors::{Error, Result},
    storage::FileStore,
};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use serde::Deserialize;
use tracing::{info, instrument, warn};

/// Parameters for [`create_leaflet_order`].
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewLeafletOrder {
    pub profit_type: ProfitType,
    pub quantity: i64,
    pub leaflet_id: i64,
    pub city_id: i64,
    pub distributor_id: i64,
    pub square_number: String,
}

/// How a distribution assignment ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Every leaflet was distributed.
    Full,
    /// Some leaflets were distributed and some brought back.
    Partial { distributed: i64, returned: i64 },
    /// Nothing usable came back; no stock is returned.
    Decline,
    /// The whole quantity goes back to stock.
    Cancel,
}

impl Outcome {
    /// Maps the dashboard's completion form onto an outcome.
    ///
    /// `success` marks full distribution. Otherwise, explicit counts make a partial
    /// completion and their absence means the order was declined.
    pub fn from_form(
        success: bool,
        distributed: Option<i64>,
        returned: Option<i64>,
    ) -> Result<Self> {
        if success {
            return Ok(Self::Full);
        }
        match (distributed, returned) {
            (None, None) => Ok(Self::Decline),
            (Some(distributed), Some(returned)) => Ok(Self::Partial {
                distributed,
                returned,
            }),
            _ => Err(Error::validation(
                "Укажите и количество распространённых, и количество возвращённых листовок",
            )),
        }
    }
}

/// Optional filters for [`list_leaflet_orders`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeafletOrderFilter {
    pub state: Option<LeafletOrderState>,
    pub distributor_id: Option<i64>,
    pub city_id: Option<i64>,
}

/// Retrieves a leaflet order by ID.
pub async fn get_leaflet_order_by_id<C>(
    db: &C,
    order_id: i64,
) -> Result<Option<leaflet_order::Model>>
where
    C: ConnectionTrait,
{
    LeafletOrder::find_by_id(order_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Lists leaflet orders, newest first.
pub async fn list_leaflet_orders(
    db: &DatabaseConnection,
    filter: &LeafletOrderFilter,
) -> Result<Vec<leaflet_order::Model>> {
    let mut query = LeafletOrder::find();
    if let Some(state) = filter.state {
        query = query.filter(leaflet_order::Column::State.eq(state.as_str()));
    }
    if let Some(distributor_id) = filter.distributor_id {
        query = query.filter(leaflet_order::Column::DistributorId.eq(distributor_id));
    }
    if let Some(city_id) = filter.city_id {
        query = query.filter(leaflet_order::Column::CityId.eq(city_id));
    }
    query
        .order_by_desc(leaflet_order::Column::CreatedAt)
        .order_by_desc(leaflet_order::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Creates an order and takes its quantity out of stock.
///
/// # Errors
/// - [`Error::InvalidQuantity`] unless `quantity` is positive
/// - [`Error::LeafletNotFound`], [`Error::CityNotFound`], [`Error::DistributorNotFound`]
/// - [`Error::InsufficientStock`] when the leaflet has fewer than `quantity` copies;
///   stock is left untouched
#[instrument(skip(db, params), fields(leaflet_id = params.leaflet_id, quantity = params.quantity))]
pub async fn create_leaflet_order(
    db: &DatabaseConnection,
    params: NewLeafletOrder,
    who_did: &str,
) -> Result<leaflet_order::Model> {
    if params.quantity <= 0 {
        return Err(Error::InvalidQuantity {
            quantity: params.quantity,
        });
    }

    let txn = db.begin().await?;

    let sheet = leaflet::get_leaflet_by_id(&txn, params.leaflet_id)
        .await?
        .ok_or(Error::LeafletNotFound {
            id: params.leaflet_id,
        })?;
    City::find_by_id(params.city_id)
        .one(&txn)
        .await?
        .ok_or(Error::CityNotFound { id: params.city_id })?;
    let distributor = Distributor::find_by_id(params.distributor_id)
        .one(&txn)
        .await?
        .ok_or(Error::DistributorNotFound {
            id: params.distributor_id,
        })?;

    if sheet.value < params.quantity {
        return Err(Error::InsufficientStock {
            available: sheet.value,
            requested: params.quantity,
        });
    }
    let sheet = leaflet::take_stock(&txn, params.leaflet_id, params.quantity).await?;

    let created = leaflet_order::ActiveModel {
        profit_type: Set(params.profit_type.as_str().to_string()),
        quantity: Set(params.quantity),
        state: Set(LeafletOrderState::InProcess.as_str().to_string()),
        given: Set(None),
        returned: Set(None),
        distributor_profit: Set(0.0),
        square_number: Set(params.square_number),
        done_at: Set(None),
        city_id: Set(params.city_id),
        leaflet_id: Set(params.leaflet_id),
        distributor_id: Set(params.distributor_id),
        created_by: Set(who_did.to_string()),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    audit::record(
        &txn,
        who_did,
        &AuditEvent::LeafletOrderCreated {
            order_id: created.id,
            leaflet: sheet.name,
            quantity: created.quantity,
            distributor: distributor.name,
            stock_left: sheet.value,
        },
    )
    .await?;

    txn.commit().await?;
    info!(order_id = created.id, "leaflet order created");
    Ok(created)
}

/// Closes an open order with the given outcome.
///
/// | outcome | given | returned | profit | stock | state |
/// |---|---|---|---|---|---|
/// | `Full` | quantity | 0 | m × quantity | - | `DONE` |
/// | `Partial` | distributed | returned | m × distributed | + returned | `DONE` |
/// | `Decline` | - | - | 0 | - | `DECLINED` |
/// | `Cancel` | 0 | quantity | 0 | + quantity | `CANCELLED` |
///
/// # Errors
/// - [`Error::InvalidTransition`] unless the order is `IN_PROCESS` or `FORPAYMENT`
/// - [`Error::Validation`] when partial counts are negative or exceed the quantity
#[instrument(skip(db))]
pub async fn complete_leaflet_order(
    db: &DatabaseConnection,
    order_id: i64,
    outcome: Outcome,
    who_did: &str,
) -> Result<leaflet_order::Model> {
    let txn = db.begin().await?;

    let order = load_open_order(&txn, order_id, "complete").await?;
    let profit_type: ProfitType = order.profit_type.parse()?;

    let (state, given, returned, profit, credit, event) = match outcome {
        Outcome::Full => (
            LeafletOrderState::Done,
            Some(order.quantity),
            Some(0),
            profit_type.profit_for(order.quantity),
            0,
            AuditEvent::LeafletOrderCompleted {
                order_id,
                quantity: order.quantity,
                given: order.quantity,
                returned: 0,
                profit: profit_type.profit_for(order.quantity),
            },
        ),
        Outcome::Partial {
            distributed,
            returned,
        } => {
            validate_counts(order.quantity, distributed, returned)?;
            (
                LeafletOrderState::Done,
                Some(distributed),
                Some(returned),
                profit_type.profit_for(distributed),
                returned,
                AuditEvent::LeafletOrderCompleted {
                    order_id,
                    quantity: order.quantity,
                    given: distributed,
                    returned,
                    profit: profit_type.profit_for(distributed),
                },
            )
        }
        Outcome::Decline => (
            LeafletOrderState::Declined,
            None,
            None,
            0.0,
            0,
            AuditEvent::LeafletOrderDeclined { order_id },
        ),
        Outcome::Cancel => (
            LeafletOrderState::Cancelled,
            Some(0),
            Some(order.quantity),
            0.0,
            order.quantity,
            AuditEvent::LeafletOrderCancelled {
                order_id,
                returned: order.quantity,
            },
        ),
    };

    if credit > 0 {
        leaflet::credit_stock(&txn, order.leaflet_id, credit).await?;
    }

    let mut model: leaflet_order::ActiveModel = order.into();
    model.state = Set(state.as_str().to_string());
    model.given = Set(given);
    model.returned = Set(returned);
    model.distributor_profit = Set(profit);
    model.done_at = Set(Some(chrono::Utc::now()));
    let updated = model.update(&txn).await?;

    audit::record(&txn, who_did, &event).await?;

    txn.commit().await?;
    info!(order_id, state = %state, "leaflet order closed");
    Ok(updated)
}

/// Overwrites the requested quantity of an open order.
///
/// Stock is not reconciled: copies already taken at creation stay taken.
#[instrument(skip(db))]
pub async fn edit_leaflet_order_quantity(
    db: &DatabaseConnection,
    order_id: i64,
    new_quantity: i64,
    who_did: &str,
) -> Result<leaflet_order::Model> {
    if new_quantity <= 0 {
        return Err(Error::InvalidQuantity {
            quantity: new_quantity,
        });
    }

    let txn = db.begin().await?;

    let order = load_open_order(&txn, order_id, "edit_quantity").await?;
    let old_quantity = order.quantity;

    let mut model: leaflet_order::ActiveModel = order.into();
    model.quantity = Set(new_quantity);
    let updated = model.update(&txn).await?;

    audit::record(
        &txn,
        who_did,
        &AuditEvent::LeafletOrderQuantityEdited {
            order_id,
            old_quantity,
            new_quantity,
        },
    )
    .await?;

    txn.commit().await?;
    if old_quantity != new_quantity {
        warn!(
            order_id,
            old_quantity, new_quantity, "leaflet order quantity edited without stock adjustment"
        );
    }
    Ok(updated)
}

/// Moves an `IN_PROCESS` order to `FORPAYMENT`.
pub async fn submit_for_payment(
    db: &DatabaseConnection,
    order_id: i64,
    who_did: &str,
) -> Result<leaflet_order::Model> {
    let txn = db.begin().await?;

    let order = get_leaflet_order_by_id(&txn, order_id)
        .await?
        .ok_or(Error::LeafletOrderNotFound { id: order_id })?;
    if order.state != LeafletOrderState::InProcess.as_str() {
        return Err(Error::InvalidTransition {
            state: order.state,
            action: "submit_for_payment",
        });
    }

    let mut model: leaflet_order::ActiveModel = order.into();
    model.state = Set(LeafletOrderState::ForPayment.as_str().to_string());
    let updated = model.update(&txn).await?;

    audit::record(
        &txn,
        who_did,
        &AuditEvent::LeafletOrderSubmittedForPayment { order_id },
    )
    .await?;

    txn.commit().await?;
    Ok(updated)
}

/// An uploaded payment proof, before it is stored.
#[derive(Debug, Clone)]
pub struct PaymentProof {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Stores a payment proof, marks the order `DONE` and announces it.
///
/// Open orders carry no counts yet, so the order is closed as fully distributed. The file
/// is removed again if the order cannot be closed. The chat notification is sent after
/// commit; a failed notification is logged, not returned.
#[instrument(skip(db, store, notifier, proof), fields(file = %proof.file_name))]
pub async fn upload_payment_proof(
    db: &DatabaseConnection,
    store: &FileStore,
    notifier: &dyn Notifier,
    order_id: i64,
    proof: PaymentProof,
    who_did: &str,
) -> Result<(leaflet_order::Model, document::Model)> {
    if proof.bytes.is_empty() {
        return Err(Error::validation("Файл подтверждения пуст"));
    }

    // Validate before touching the file store
    load_open_order(db, order_id, "upload_payment_proof").await?;

    let storage_key = store.save(&proof.file_name, &proof.bytes).await?;
    let (updated, doc) =
        match record_payment_proof(db, order_id, &storage_key, proof, who_did).await {
            Ok(recorded) => recorded,
            Err(e) => {
                if let Err(remove_err) = store.remove(&storage_key).await {
                    warn!("Failed to remove orphaned proof {storage_key}: {remove_err}");
                }
                return Err(e);
            }
        };
    let given = updated.given.unwrap_or(updated.quantity);
    let profit = updated.distributor_profit;

    let message = format!(
        "💸 Оплата по заказу #{order_id} подтверждена: распространено {given} шт., к выплате {profit:.2}"
    );
    if let Err(e) = notifier.notify(&message).await {
        warn!("Failed to send payment notification for order {order_id}: {e}");
    }

    Ok((updated, doc))
}

/// Records the stored proof and closes the order as fully distributed.
async fn record_payment_proof(
    db: &DatabaseConnection,
    order_id: i64,
    storage_key: &str,
    proof: PaymentProof,
    who_did: &str,
) -> Result<(leaflet_order::Model, document::Model)> {
    let txn = db.begin().await?;
    let order = load_open_order(&txn, order_id, "upload_payment_proof").await?;
    let profit_type: ProfitType = order.profit_type.parse()?;
    let profit = profit_type.profit_for(order.quantity);

    #[allow(clippy::cast_possible_wrap)]
    let size = proof.bytes.len() as i64;
    let doc = document::ActiveModel {
        storage_key: Set(storage_key.to_string()),
        original_name: Set(proof.file_name.clone()),
        content_type: Set(proof.content_type),
        size: Set(size),
        leaflet_order_id: Set(Some(order_id)),
        uploaded_by: Set(who_did.to_string()),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    let quantity = order.quantity;
    let mut model: leaflet_order::ActiveModel = order.into();
    model.state = Set(LeafletOrderState::Done.as_str().to_string());
    model.given = Set(Some(quantity));
    model.returned = Set(Some(0));
    model.distributor_profit = Set(profit);
    model.done_at = Set(Some(chrono::Utc::now()));
    let updated = model.update(&txn).await?;

    audit::record(
        &txn,
        who_did,
        &AuditEvent::PaymentProofUploaded {
            order_id,
            document_id: doc.id,
            file_name: proof.file_name,
        },
    )
    .await?;

    txn.commit().await?;
    Ok((updated, doc))
}

async fn load_open_order<C>(
    db: &C,
    order_id: i64,
    action: &'static str,
) -> Result<leaflet_order::Model>
where
    C: ConnectionTrait,
{
    let order = get_leaflet_order_by_id(db, order_id)
        .await?
        .ok_or(Error::LeafletOrderNotFound { id: order_id })?;
    let state: LeafletOrderState = order.state.parse()?;
    if !state.is_open() {
        return Err(Error::InvalidTransition {
            state: order.state,
            action,
        });
    }
    Ok(order)
}

fn validate_counts(quantity: i64, distributed: i64, returned: i64) -> Result<()> {
    if distributed < 0 || returned < 0 {
        return Err(Error::validation("Количество не может быть отрицательным"));
    }
    if distributed + returned > quantity {
        return Err(Error::validation(format!(
            "Распространено ({distributed}) и возвращено ({returned}) больше, чем выдано ({quantity})"
        )));
    }
    Ok(())
}
