//! Refresh token entity - Server-side record of issued refresh tokens.
//!
//! Only the SHA-256 hash of the token is stored.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Refresh token database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[sea_orm(table_name = "refresh_tokens")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owner of the token
    pub user_id: i64,
    /// Hex-encoded SHA-256 of the token
    #[sea_orm(unique)]
    pub token_hash: String,
    /// Token is rejected after this instant
    pub expires_at: DateTimeUtc,
    /// Set on logout
    pub revoked_at: Option<DateTimeUtc>,
    /// When the token was issued
    pub created_at: DateTimeUtc,
}

/// Defines relationships between `RefreshToken` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each token belongs to one user
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
