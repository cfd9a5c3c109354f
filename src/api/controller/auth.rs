//! Login, token refresh, logout and the current-user endpoint.

use crate::{
    api::{
        auth::{ACCESS_TOKEN_COOKIE, CurrentUser, USER_DATA_COOKIE},
        dto::{LoginRequest, LoginResponse, RefreshRequest, RefreshResponse, UserInfo},
        state::AppState,
    },
    core::{session, user},
    errors::{Error, Result},
};
use axum::{
    Json,
    extract::State,
    http::{StatusCode, header::SET_COOKIE},
    response::{AppendHeaders, IntoResponse},
};
use base64::{Engine, engine::general_purpose::STANDARD};
use tracing::info;

const COOKIE_MAX_AGE_SECS: i64 = 24 * 60 * 60;

fn access_cookie(token: &str) -> String {
    format!(
        "{ACCESS_TOKEN_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={COOKIE_MAX_AGE_SECS}"
    )
}

fn user_data_cookie(info: &UserInfo) -> Result<String> {
    let encoded = STANDARD.encode(serde_json::to_vec(info)?);
    Ok(format!(
        "{USER_DATA_COOKIE}={encoded}; Path=/; SameSite=Lax; Max-Age={COOKIE_MAX_AGE_SECS}"
    ))
}

fn expired_cookie(name: &str) -> String {
    format!("{name}=; Path=/; Max-Age=0")
}

/// POST /api/v1/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<impl IntoResponse> {
    let account = user::verify_credentials(&state.db, &request.username, &request.password).await?;

    let access_token = session::issue_access_token(&state.jwt_secret, &account)?;
    let refresh_token = session::issue_refresh_token(&state.db, account.id).await?;
    let info = UserInfo::from(account);

    let cookies = [
        (SET_COOKIE, access_cookie(&access_token)),
        (SET_COOKIE, user_data_cookie(&info)?),
    ];
    info!("User '{}' logged in", info.username);

    Ok((
        AppendHeaders(cookies),
        Json(LoginResponse {
            access_token,
            refresh_token,
            user: info,
        }),
    ))
}

/// POST /api/v1/auth/refresh
pub async fn refresh(
    State(state): State<AppState>,
    Json(request): Json<RefreshRequest>,
) -> Result<impl IntoResponse> {
    let account = session::redeem_refresh_token(&state.db, &request.refresh_token).await?;
    let access_token = session::issue_access_token(&state.jwt_secret, &account)?;

    Ok((
        AppendHeaders([(SET_COOKIE, access_cookie(&access_token))]),
        Json(RefreshResponse { access_token }),
    ))
}

/// POST /api/v1/auth/logout
pub async fn logout(
    State(state): State<AppState>,
    Json(request): Json<RefreshRequest>,
) -> Result<impl IntoResponse> {
    session::revoke_refresh_token(&state.db, &request.refresh_token).await?;

    Ok((
        StatusCode::NO_CONTENT,
        AppendHeaders([
            (SET_COOKIE, expired_cookie(ACCESS_TOKEN_COOKIE)),
            (SET_COOKIE, expired_cookie(USER_DATA_COOKIE)),
        ]),
    ))
}

/// GET /api/v1/auth/me
pub async fn me(State(state): State<AppState>, current: CurrentUser) -> Result<Json<UserInfo>> {
    let account = user::get_user_by_id(&state.db, current.0.sub)
        .await?
        .ok_or(Error::Unauthorized)?;
    Ok(Json(account.into()))
}
