//! Leaflet order lifecycle endpoints.

use crate::{
    api::{
        auth::{CurrentUser, Permission},
        state::AppState,
    },
    core::leaflet_order::{self, LeafletOrderFilter, NewLeafletOrder, Outcome, PaymentProof},
    entities::{document, leaflet_order as leaflet_order_entity},
    errors::{Error, Result},
};
use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

/// Payment proof uploads above this size are refused.
pub const MAX_PROOF_BYTES: usize = 10 * 1024 * 1024;

/// Completion form: `cancel` wins, then `success`, then explicit counts.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteBody {
    #[serde(default)]
    pub cancel: bool,
    #[serde(default)]
    pub success: bool,
    pub distributed: Option<i64>,
    pub returned: Option<i64>,
}

impl CompleteBody {
    fn outcome(&self) -> Result<Outcome> {
        if self.cancel {
            return Ok(Outcome::Cancel);
        }
        Outcome::from_form(self.success, self.distributed, self.returned)
    }
}

#[derive(Deserialize)]
pub struct QuantityBody {
    pub quantity: i64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentProofResponse {
    pub order: leaflet_order_entity::Model,
    pub document: document::Model,
}

/// GET /api/v1/leaflet-orders?state=&distributorId=&cityId=
pub async fn list_leaflet_orders(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(filter): Query<LeafletOrderFilter>,
) -> Result<Json<Vec<leaflet_order_entity::Model>>> {
    user.require(&[Permission::LeafletOrders])?;
    Ok(Json(
        leaflet_order::list_leaflet_orders(&state.db, &filter).await?,
    ))
}

/// GET /api/v1/leaflet-orders/{id}
pub async fn get_leaflet_order(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<leaflet_order_entity::Model>> {
    user.require(&[Permission::LeafletOrders])?;
    leaflet_order::get_leaflet_order_by_id(&state.db, id)
        .await?
        .map(Json)
        .ok_or(Error::LeafletOrderNotFound { id })
}

/// POST /api/v1/leaflet-orders
pub async fn create_leaflet_order(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(params): Json<NewLeafletOrder>,
) -> Result<(StatusCode, Json<leaflet_order_entity::Model>)> {
    user.require(&[Permission::LeafletOrders])?;
    let created = leaflet_order::create_leaflet_order(&state.db, params, user.username()).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// POST /api/v1/leaflet-orders/{id}/complete
pub async fn complete_leaflet_order(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(body): Json<CompleteBody>,
) -> Result<Json<leaflet_order_entity::Model>> {
    user.require(&[Permission::LeafletOrders])?;
    Ok(Json(
        leaflet_order::complete_leaflet_order(&state.db, id, body.outcome()?, user.username())
            .await?,
    ))
}

/// PATCH /api/v1/leaflet-orders/{id}/quantity
pub async fn edit_quantity(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(body): Json<QuantityBody>,
) -> Result<Json<leaflet_order_entity::Model>> {
    user.require(&[Permission::LeafletOrders])?;
    Ok(Json(
        leaflet_order::edit_leaflet_order_quantity(&state.db, id, body.quantity, user.username())
            .await?,
    ))
}

/// POST /api/v1/leaflet-orders/{id}/submit
pub async fn submit_for_payment(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<leaflet_order_entity::Model>> {
    user.require(&[Permission::LeafletOrders])?;
    Ok(Json(
        leaflet_order::submit_for_payment(&state.db, id, user.username()).await?,
    ))
}

/// POST /api/v1/leaflet-orders/{id}/payment-proof (multipart, field `file`)
pub async fn upload_payment_proof(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    mut multipart: Multipart,
) -> Result<Json<PaymentProofResponse>> {
    user.require(&[Permission::LeafletOrders])?;

    let mut proof = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::validation(format!("Некорректная форма: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or("proof").to_string();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| Error::validation(format!("Не удалось прочитать файл: {e}")))?;
        proof = Some(PaymentProof {
            file_name,
            content_type,
            bytes: bytes.to_vec(),
        });
    }
    let proof = proof.ok_or_else(|| Error::validation("Файл подтверждения не передан"))?;

    let (order, document) = leaflet_order::upload_payment_proof(
        &state.db,
        &state.store,
        state.notifier.as_ref(),
        id,
        proof,
        user.username(),
    )
    .await?;

    Ok(Json(PaymentProofResponse { order, document }))
}
