//! Leaflet entity - A printed advertisement template with a tracked stock count.
//!
//! `value` is the number of undistributed copies on hand. It is decremented when a
//! leaflet order is created and credited back on returns and cancellations.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Leaflet database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[sea_orm(table_name = "leaflets")]
pub struct Model {
    /// Unique identifier for the leaflet
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Human-readable name of the leaflet (e.g., "Windows cleaning A5")
    #[sea_orm(unique)]
    pub name: String,
    /// Current stock count, never negative
    pub value: i64,
    /// When the leaflet was created
    pub created_at: DateTimeUtc,
    /// When the leaflet was last modified
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Leaflet and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One leaflet has many distribution orders
    #[sea_orm(has_many = "super::leaflet_order::Entity")]
    LeafletOrders,
}

impl Related<super::leaflet_order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LeafletOrders.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
