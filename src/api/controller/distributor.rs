use crate::{
    api::{
        auth::{CurrentUser, Permission},
        state::AppState,
    },
    core::distributor::{self, DistributorInput},
    entities::distributor as distributor_entity,
    errors::{Error, Result},
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;

#[derive(Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    #[serde(default)]
    pub include_inactive: bool,
}

/// GET /api/v1/distributors?includeInactive=true
pub async fn list_distributors(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<distributor_entity::Model>>> {
    user.require(&[Permission::Distributors])?;
    Ok(Json(
        distributor::get_distributors(&state.db, query.include_inactive).await?,
    ))
}

/// GET /api/v1/distributors/{id}
pub async fn get_distributor(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<distributor_entity::Model>> {
    user.require(&[Permission::Distributors])?;
    distributor::get_distributor_by_id(&state.db, id)
        .await?
        .map(Json)
        .ok_or(Error::DistributorNotFound { id })
}

/// POST /api/v1/distributors
pub async fn create_distributor(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(input): Json<DistributorInput>,
) -> Result<(StatusCode, Json<distributor_entity::Model>)> {
    user.require(&[Permission::Distributors])?;
    let created = distributor::create_distributor(&state.db, input, user.username()).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// PUT /api/v1/distributors/{id}
pub async fn update_distributor(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(input): Json<DistributorInput>,
) -> Result<Json<distributor_entity::Model>> {
    user.require(&[Permission::Distributors])?;
    Ok(Json(
        distributor::update_distributor(&state.db, id, input, user.username()).await?,
    ))
}

/// DELETE /api/v1/distributors/{id}
///
/// Distributors keep their order history, so this only deactivates.
pub async fn deactivate_distributor(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<distributor_entity::Model>> {
    user.require(&[Permission::Distributors])?;
    Ok(Json(
        distributor::deactivate_distributor(&state.db, id, user.username()).await?,
    ))
}
