use crate::{
    api::{
        auth::{CurrentUser, Permission},
        state::AppState,
    },
    core::city,
    entities::city as city_entity,
    errors::{Error, Result},
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;

#[derive(Deserialize)]
pub struct CityBody {
    pub name: String,
}

/// GET /api/v1/cities
pub async fn list_cities(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Vec<city_entity::Model>>> {
    user.require(&[Permission::CitiesRead])?;
    Ok(Json(city::get_all_cities(&state.db).await?))
}

/// GET /api/v1/cities/{id}
pub async fn get_city(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<city_entity::Model>> {
    user.require(&[Permission::CitiesRead])?;
    city::get_city_by_id(&state.db, id)
        .await?
        .map(Json)
        .ok_or(Error::CityNotFound { id })
}

/// POST /api/v1/cities
pub async fn create_city(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(body): Json<CityBody>,
) -> Result<(StatusCode, Json<city_entity::Model>)> {
    user.require(&[Permission::CitiesWrite])?;
    let created = city::create_city(&state.db, body.name, user.username()).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// PUT /api/v1/cities/{id}
pub async fn rename_city(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(body): Json<CityBody>,
) -> Result<Json<city_entity::Model>> {
    user.require(&[Permission::CitiesWrite])?;
    Ok(Json(
        city::rename_city(&state.db, id, body.name, user.username()).await?,
    ))
}

/// DELETE /api/v1/cities/{id}
pub async fn delete_city(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<StatusCode> {
    user.require(&[Permission::CitiesWrite])?;
    city::delete_city(&state.db, id, user.username()).await?;
    Ok(StatusCode::NO_CONTENT)
}
