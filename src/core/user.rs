//! Dashboard accounts and password handling.

use crate::{
    core::{
        audit::{self, AuditEvent, RecordKind},
        types::Role,
    },
    entities::{User, user},
    errors::{Error, Result},
};
use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use tracing::info;

const MIN_PASSWORD_LEN: usize = 8;

/// Hashes a password into an Argon2 PHC string.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| Error::PasswordHash {
            message: e.to_string(),
        })
}

/// Checks a password against a stored PHC string.
#[must_use]
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    PasswordHash::new(stored_hash).is_ok_and(|parsed| {
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    })
}

pub async fn get_all_users(db: &DatabaseConnection) -> Result<Vec<user::Model>> {
    User::find()
        .order_by_asc(user::Column::Username)
        .all(db)
        .await
        .map_err(Into::into)
}

pub async fn get_user_by_id(db: &DatabaseConnection, user_id: i64) -> Result<Option<user::Model>> {
    User::find_by_id(user_id).one(db).await.map_err(Into::into)
}

pub async fn get_user_by_username(
    db: &DatabaseConnection,
    username: &str,
) -> Result<Option<user::Model>> {
    User::find()
        .filter(user::Column::Username.eq(username))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Creates an account.
///
/// # Errors
/// Returns a validation error for a blank or taken username or a short password.
pub async fn create_user(
    db: &DatabaseConnection,
    username: &str,
    password: &str,
    role: Role,
    display_name: &str,
    who_did: &str,
) -> Result<user::Model> {
    let username = username.trim();
    if username.is_empty() {
        return Err(Error::validation("Логин не может быть пустым"));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(Error::validation(format!(
            "Пароль должен содержать не менее {MIN_PASSWORD_LEN} символов"
        )));
    }
    if get_user_by_username(db, username).await?.is_some() {
        return Err(Error::validation(format!("Логин «{username}» уже занят")));
    }

    let password_hash = hash_password(password)?;
    let display_name = if display_name.trim().is_empty() {
        username
    } else {
        display_name.trim()
    };

    let txn = db.begin().await?;
    let created = user::ActiveModel {
        username: Set(username.to_string()),
        password_hash: Set(password_hash),
        role: Set(role.as_str().to_string()),
        display_name: Set(display_name.to_string()),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    audit::record(
        &txn,
        who_did,
        &AuditEvent::RecordCreated {
            kind: RecordKind::User,
            id: created.id,
            name: created.username.clone(),
        },
    )
    .await?;

    txn.commit().await?;
    Ok(created)
}

pub async fn delete_user(db: &DatabaseConnection, user_id: i64, who_did: &str) -> Result<()> {
    let txn = db.begin().await?;
    let existing = User::find_by_id(user_id)
        .one(&txn)
        .await?
        .ok_or(Error::UserNotFound { id: user_id })?;

    crate::entities::RefreshToken::delete_many()
        .filter(crate::entities::refresh_token::Column::UserId.eq(user_id))
        .exec(&txn)
        .await?;

    audit::record(
        &txn,
        who_did,
        &AuditEvent::RecordDeleted {
            kind: RecordKind::User,
            id: existing.id,
            name: existing.username.clone(),
        },
    )
    .await?;
    existing.delete(&txn).await?;

    txn.commit().await?;
    Ok(())
}

/// Returns the user when the username and password match.
///
/// # Errors
/// Returns [`Error::InvalidCredentials`] for an unknown user or a wrong password alike.
pub async fn verify_credentials(
    db: &DatabaseConnection,
    username: &str,
    password: &str,
) -> Result<user::Model> {
    let user = get_user_by_username(db, username.trim())
        .await?
        .ok_or(Error::InvalidCredentials)?;
    if !verify_password(password, &user.password_hash) {
        return Err(Error::InvalidCredentials);
    }
    Ok(user)
}

/// Creates the bootstrap admin account unless the username already exists.
pub async fn ensure_admin(db: &DatabaseConnection, username: &str, password: &str) -> Result<()> {
    if get_user_by_username(db, username).await?.is_some() {
        return Ok(());
    }
    create_user(db, username, password, Role::Admin, "Администратор", "system").await?;
    info!("Created bootstrap admin account '{username}'");
    Ok(())
}
