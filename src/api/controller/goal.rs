use crate::{
    api::{
        auth::{CurrentUser, Permission},
        state::AppState,
    },
    core::goal::{self, GoalInput},
    entities::goal as goal_entity,
    errors::{Error, Result},
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

/// GET /api/v1/goals
pub async fn list_goals(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Vec<goal_entity::Model>>> {
    user.require(&[Permission::Goals])?;
    Ok(Json(goal::get_goals(&state.db).await?))
}

/// GET /api/v1/goals/{id}
pub async fn get_goal(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<goal_entity::Model>> {
    user.require(&[Permission::Goals])?;
    goal::get_goal_by_id(&state.db, id)
        .await?
        .map(Json)
        .ok_or(Error::GoalNotFound { id })
}

/// POST /api/v1/goals
pub async fn create_goal(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(input): Json<GoalInput>,
) -> Result<(StatusCode, Json<goal_entity::Model>)> {
    user.require(&[Permission::Goals])?;
    let created = goal::create_goal(&state.db, input, user.username()).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// PUT /api/v1/goals/{id}
pub async fn update_goal(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(input): Json<GoalInput>,
) -> Result<Json<goal_entity::Model>> {
    user.require(&[Permission::Goals])?;
    Ok(Json(
        goal::update_goal(&state.db, id, input, user.username()).await?,
    ))
}

/// DELETE /api/v1/goals/{id}
pub async fn delete_goal(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<StatusCode> {
    user.require(&[Permission::Goals])?;
    goal::delete_goal(&state.db, id, user.username()).await?;
    Ok(StatusCode::NO_CONTENT)
}
