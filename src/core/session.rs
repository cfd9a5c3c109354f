//! Access and refresh tokens.
//!
//! Access tokens are short-lived HS256 JWTs carrying the user's role. Refresh tokens
//! are random UUIDs; only their SHA-256 hash is stored.

use crate::{
    core::types::Role,
    entities::{RefreshToken, refresh_token, user},
    errors::{Error, Result},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use sea_orm::{Set, prelude::*};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

const ACCESS_TOKEN_LIFETIME_HOURS: i64 = 24;
const REFRESH_TOKEN_LIFETIME_DAYS: i64 = 90;

/// Claims carried by an access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User ID
    pub sub: i64,
    pub username: String,
    pub role: Role,
    pub exp: usize,
    pub iat: usize,
}

/// Signs an access token for `user`.
pub fn issue_access_token(secret: &str, user: &user::Model) -> Result<String> {
    issue_access_token_with_lifetime(secret, user, Duration::hours(ACCESS_TOKEN_LIFETIME_HOURS))
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn issue_access_token_with_lifetime(
    secret: &str,
    user: &user::Model,
    lifetime: Duration,
) -> Result<String> {
    let now = Utc::now();
    let claims = Claims {
        sub: user.id,
        username: user.username.clone(),
        role: user.role.parse()?,
        exp: (now + lifetime).timestamp() as usize,
        iat: now.timestamp() as usize,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(Into::into)
}

/// Verifies an access token's signature and expiry.
///
/// # Errors
/// Returns [`Error::Unauthorized`] for any invalid or expired token.
pub fn validate_access_token(secret: &str, token: &str) -> Result<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| Error::Unauthorized)
}

fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Issues and stores a new refresh token for `user_id`.
pub async fn issue_refresh_token(db: &DatabaseConnection, user_id: i64) -> Result<String> {
    let token = uuid::Uuid::new_v4().to_string();
    let now = Utc::now();
    refresh_token::ActiveModel {
        user_id: Set(user_id),
        token_hash: Set(hash_token(&token)),
        expires_at: Set(now + Duration::days(REFRESH_TOKEN_LIFETIME_DAYS)),
        revoked_at: Set(None),
        created_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;
    Ok(token)
}

/// Resolves a refresh token to its owner.
///
/// # Errors
/// Returns [`Error::Unauthorized`] for unknown, expired or revoked tokens.
pub async fn redeem_refresh_token(db: &DatabaseConnection, token: &str) -> Result<user::Model> {
    let stored = RefreshToken::find()
        .filter(refresh_token::Column::TokenHash.eq(hash_token(token)))
        .filter(refresh_token::Column::RevokedAt.is_null())
        .filter(refresh_token::Column::ExpiresAt.gt(Utc::now()))
        .one(db)
        .await?
        .ok_or(Error::Unauthorized)?;

    stored
        .find_related(crate::entities::User)
        .one(db)
        .await?
        .ok_or(Error::Unauthorized)
}

/// Revokes a refresh token. Unknown tokens are ignored.
pub async fn revoke_refresh_token(db: &DatabaseConnection, token: &str) -> Result<()> {
    RefreshToken::update_many()
        .col_expr(
            refresh_token::Column::RevokedAt,
            sea_orm::sea_query::Expr::value(Some(Utc::now())),
        )
        .filter(refresh_token::Column::TokenHash.eq(hash_token(token)))
        .exec(db)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    const SECRET: &str = "test-secret";

    #[tokio::test]
    async fn test_access_token_round_trip() -> Result<()> {
        let db = setup_test_db().await?;
        let user = create_test_user(&db, "anna", Role::Advertising).await?;

        let token = issue_access_token(SECRET, &user)?;
        let claims = validate_access_token(SECRET, &token)?;
        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.role, Role::Advertising);

        let err = validate_access_token("other-secret", &token).unwrap_err();
        assert!(matches!(err, Error::Unauthorized));

        Ok(())
    }

    #[tokio::test]
    async fn test_expired_access_token_rejected() -> Result<()> {
        let db = setup_test_db().await?;
        let user = create_test_user(&db, "anna", Role::Manager).await?;

        // Well past the default 60s leeway
        let token = issue_access_token_with_lifetime(SECRET, &user, Duration::minutes(-5))?;
        let err = validate_access_token(SECRET, &token).unwrap_err();
        assert!(matches!(err, Error::Unauthorized));

        Ok(())
    }

    #[tokio::test]
    async fn test_refresh_token_lifecycle() -> Result<()> {
        let db = setup_test_db().await?;
        let user = create_test_user(&db, "anna", Role::Manager).await?;

        let token = issue_refresh_token(&db, user.id).await?;
        assert_eq!(redeem_refresh_token(&db, &token).await?.id, user.id);

        revoke_refresh_token(&db, &token).await?;
        let err = redeem_refresh_token(&db, &token).await.unwrap_err();
        assert!(matches!(err, Error::Unauthorized));

        let err = redeem_refresh_token(&db, "not-a-token").await.unwrap_err();
        assert!(matches!(err, Error::Unauthorized));

        Ok(())
    }
}
