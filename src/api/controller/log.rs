use crate::{
    api::{
        auth::{CurrentUser, Permission},
        state::AppState,
    },
    core::audit::{self, LogFilter},
    entities::log,
    errors::Result,
};
use axum::{
    Json,
    extract::{Query, State},
};

/// GET /api/v1/logs?category=&limit=&offset=
pub async fn list_logs(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(filter): Query<LogFilter>,
) -> Result<Json<Vec<log::Model>>> {
    user.require(&[Permission::Logs])?;
    Ok(Json(audit::list_entries(&state.db, &filter).await?))
}
