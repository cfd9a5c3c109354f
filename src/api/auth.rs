//! Request authentication and role checks.
//!
//! The access token is read from `Authorization: Bearer <token>` or, for browser requests,
//! from the `access_token` cookie.

use crate::{
    api::state::AppState,
    core::{
        session::{self, Claims},
        types::Role,
    },
    errors::{Error, Result},
};
use axum::{
    extract::FromRequestParts,
    http::{
        HeaderMap,
        header::{AUTHORIZATION, COOKIE},
        request::Parts,
    },
};

/// Cookie carrying the access token.
pub const ACCESS_TOKEN_COOKIE: &str = "access_token";
/// Cookie carrying base64 JSON of the signed-in user.
pub const USER_DATA_COOKIE: &str = "user_data";

/// Areas of the API gated by role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Users,
    Leaflets,
    LeafletOrders,
    Distributors,
    CitiesRead,
    CitiesWrite,
    Orders,
    Workers,
    Goals,
    Notifications,
    Stats,
    Logs,
}

impl Permission {
    /// Whether `role` may use this area. Admins may use everything.
    #[must_use]
    pub const fn granted_to(self, role: Role) -> bool {
        match role {
            Role::Admin => true,
            Role::Manager => matches!(
                self,
                Self::Orders
                    | Self::Workers
                    | Self::CitiesRead
                    | Self::CitiesWrite
                    | Self::Goals
                    | Self::Notifications
                    | Self::Stats
            ),
            Role::Advertising => matches!(
                self,
                Self::Leaflets
                    | Self::LeafletOrders
                    | Self::Distributors
                    | Self::CitiesRead
                    | Self::Logs
                    | Self::Stats
            ),
        }
    }
}

/// The authenticated caller.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Claims);

impl CurrentUser {
    /// Fails with [`Error::Forbidden`] unless the caller holds every permission.
    pub fn require(&self, permissions: &[Permission]) -> Result<&Claims> {
        if permissions.iter().all(|p| p.granted_to(self.0.role)) {
            Ok(&self.0)
        } else {
            Err(Error::Forbidden)
        }
    }

    /// Name recorded in the audit log.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.0.username
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
}

/// Finds a cookie value by name across all `Cookie` headers.
pub fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Error;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> std::result::Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)
            .or_else(|| cookie_value(&parts.headers, ACCESS_TOKEN_COOKIE))
            .ok_or(Error::Unauthorized)?;

        session::validate_access_token(&state.jwt_secret, token).map(CurrentUser)
    }
}
