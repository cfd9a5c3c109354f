//! Account management, admin only.

use crate::{
    api::{
        auth::{CurrentUser, Permission},
        dto::UserInfo,
        state::AppState,
    },
    core::{types::Role, user},
    errors::{Error, Result},
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserBody {
    pub username: String,
    pub password: String,
    pub role: Role,
    #[serde(default)]
    pub display_name: String,
}

/// GET /api/v1/users
pub async fn list_users(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<Json<Vec<UserInfo>>> {
    current.require(&[Permission::Users])?;
    let users = user::get_all_users(&state.db).await?;
    Ok(Json(users.into_iter().map(UserInfo::from).collect()))
}

/// POST /api/v1/users
pub async fn create_user(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(body): Json<CreateUserBody>,
) -> Result<(StatusCode, Json<UserInfo>)> {
    current.require(&[Permission::Users])?;
    let created = user::create_user(
        &state.db,
        &body.username,
        &body.password,
        body.role,
        &body.display_name,
        current.username(),
    )
    .await?;
    Ok((StatusCode::CREATED, Json(created.into())))
}

/// DELETE /api/v1/users/{id}
pub async fn delete_user(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<i64>,
) -> Result<StatusCode> {
    let claims = current.require(&[Permission::Users])?;
    if claims.sub == id {
        return Err(Error::validation("Нельзя удалить собственную учётную запись"));
    }
    user::delete_user(&state.db, id, current.username()).await?;
    Ok(StatusCode::NO_CONTENT)
}
