use crate::{
    api::{
        auth::{CurrentUser, Permission},
        controller::distributor::ListQuery,
        state::AppState,
    },
    core::worker::{self, WorkerInput},
    entities::worker as worker_entity,
    errors::{Error, Result},
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

/// GET /api/v1/workers?includeInactive=true
pub async fn list_workers(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<worker_entity::Model>>> {
    user.require(&[Permission::Workers])?;
    Ok(Json(
        worker::get_workers(&state.db, query.include_inactive).await?,
    ))
}

/// GET /api/v1/workers/{id}
pub async fn get_worker(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<worker_entity::Model>> {
    user.require(&[Permission::Workers])?;
    worker::get_worker_by_id(&state.db, id)
        .await?
        .map(Json)
        .ok_or(Error::WorkerNotFound { id })
}

/// POST /api/v1/workers
pub async fn create_worker(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(input): Json<WorkerInput>,
) -> Result<(StatusCode, Json<worker_entity::Model>)> {
    user.require(&[Permission::Workers])?;
    let created = worker::create_worker(&state.db, input, user.username()).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// PUT /api/v1/workers/{id}
pub async fn update_worker(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(input): Json<WorkerInput>,
) -> Result<Json<worker_entity::Model>> {
    user.require(&[Permission::Workers])?;
    Ok(Json(
        worker::update_worker(&state.db, id, input, user.username()).await?,
    ))
}

/// DELETE /api/v1/workers/{id}
pub async fn deactivate_worker(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<worker_entity::Model>> {
    user.require(&[Permission::Workers])?;
    Ok(Json(
        worker::deactivate_worker(&state.db, id, user.username()).await?,
    ))
}
