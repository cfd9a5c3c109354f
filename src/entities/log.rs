//! Log entity - Append-only audit trail of business mutations.
//!
//! Each row carries both a typed JSON payload (`event`) and the rendered
//! natural-language `description` shown in the dashboard.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Audit log database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[sea_orm(table_name = "logs")]
pub struct Model {
    /// Unique identifier for the entry
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Username of whoever performed the action
    pub who_did: String,
    /// Category tag (e.g., `"leaflet_order"`, `"order"`)
    pub category: String,
    /// Serialized [`crate::core::audit::AuditEvent`]
    pub event: String,
    /// Human-readable description
    pub description: String,
    /// When the action happened
    pub created_at: DateTimeUtc,
}

/// `Log` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
