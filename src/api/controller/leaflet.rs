use crate::{
    api::{
        auth::{CurrentUser, Permission},
        state::AppState,
    },
    core::leaflet,
    entities::leaflet as leaflet_entity,
    errors::{Error, Result},
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;

#[derive(Deserialize)]
pub struct CreateLeafletBody {
    pub name: String,
    #[serde(default)]
    pub stock: i64,
}

#[derive(Deserialize)]
pub struct RenameLeafletBody {
    pub name: String,
}

#[derive(Deserialize)]
pub struct RestockBody {
    pub amount: i64,
}

/// GET /api/v1/leaflets
pub async fn list_leaflets(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Vec<leaflet_entity::Model>>> {
    user.require(&[Permission::Leaflets])?;
    Ok(Json(leaflet::get_all_leaflets(&state.db).await?))
}

/// GET /api/v1/leaflets/{id}
pub async fn get_leaflet(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<leaflet_entity::Model>> {
    user.require(&[Permission::Leaflets])?;
    leaflet::get_leaflet_by_id(&state.db, id)
        .await?
        .map(Json)
        .ok_or(Error::LeafletNotFound { id })
}

/// POST /api/v1/leaflets
pub async fn create_leaflet(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(body): Json<CreateLeafletBody>,
) -> Result<(StatusCode, Json<leaflet_entity::Model>)> {
    user.require(&[Permission::Leaflets])?;
    let created = leaflet::create_leaflet(&state.db, body.name, body.stock, user.username()).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// PUT /api/v1/leaflets/{id}
pub async fn rename_leaflet(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(body): Json<RenameLeafletBody>,
) -> Result<Json<leaflet_entity::Model>> {
    user.require(&[Permission::Leaflets])?;
    Ok(Json(
        leaflet::rename_leaflet(&state.db, id, body.name, user.username()).await?,
    ))
}

/// POST /api/v1/leaflets/{id}/restock
pub async fn restock_leaflet(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(body): Json<RestockBody>,
) -> Result<Json<leaflet_entity::Model>> {
    user.require(&[Permission::Leaflets])?;
    Ok(Json(
        leaflet::restock_leaflet(&state.db, id, body.amount, user.username()).await?,
    ))
}

/// DELETE /api/v1/leaflets/{id}
pub async fn delete_leaflet(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<StatusCode> {
    user.require(&[Permission::Leaflets])?;
    leaflet::delete_leaflet(&state.db, id, user.username()).await?;
    Ok(StatusCode::NO_CONTENT)
}
