use crate::{
    api::{
        auth::{CurrentUser, Permission},
        state::AppState,
    },
    core::{
        order::{self, OrderFilter, OrderInput},
        types::OrderState,
    },
    entities::order as order_entity,
    errors::{Error, Result},
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;

#[derive(Deserialize)]
pub struct StateBody {
    pub state: OrderState,
}

/// GET /api/v1/orders?state=&cityId=&workerId=
pub async fn list_orders(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(filter): Query<OrderFilter>,
) -> Result<Json<Vec<order_entity::Model>>> {
    user.require(&[Permission::Orders])?;
    Ok(Json(order::get_orders(&state.db, &filter).await?))
}

/// GET /api/v1/orders/{id}
pub async fn get_order(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<order_entity::Model>> {
    user.require(&[Permission::Orders])?;
    order::get_order_by_id(&state.db, id)
        .await?
        .map(Json)
        .ok_or(Error::OrderNotFound { id })
}

/// POST /api/v1/orders
pub async fn create_order(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(input): Json<OrderInput>,
) -> Result<(StatusCode, Json<order_entity::Model>)> {
    user.require(&[Permission::Orders])?;
    let created = order::create_order(&state.db, input, user.username()).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// PUT /api/v1/orders/{id}
pub async fn update_order(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(input): Json<OrderInput>,
) -> Result<Json<order_entity::Model>> {
    user.require(&[Permission::Orders])?;
    Ok(Json(
        order::update_order(&state.db, id, input, user.username()).await?,
    ))
}

/// PATCH /api/v1/orders/{id}/state
pub async fn change_state(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(body): Json<StateBody>,
) -> Result<Json<order_entity::Model>> {
    user.require(&[Permission::Orders])?;
    Ok(Json(
        order::change_order_state(&state.db, id, body.state, user.username()).await?,
    ))
}

/// DELETE /api/v1/orders/{id}
pub async fn delete_order(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<StatusCode> {
    user.require(&[Permission::Orders])?;
    order::delete_order(&state.db, id, user.username()).await?;
    Ok(StatusCode::NO_CONTENT)
}
