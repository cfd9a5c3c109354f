//! Worker entity - A technician who carries out customer orders.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Worker database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[sea_orm(table_name = "workers")]
pub struct Model {
    /// Unique identifier for the worker
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Full name
    pub name: String,
    /// Contact phone number
    pub phone: String,
    /// City the worker serves, if assigned
    pub city_id: Option<i64>,
    /// Free-text specialty (e.g., "windows", "carpets")
    pub specialty: String,
    /// Inactive workers cannot be assigned new orders
    pub is_active: bool,
    /// When the worker was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Worker and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One worker has many customer orders
    #[sea_orm(has_many = "super::order::Entity")]
    Orders,
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Orders.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
