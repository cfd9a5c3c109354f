//! Distributor entity - A person who physically hands out leaflets.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Distributor database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[sea_orm(table_name = "distributors")]
pub struct Model {
    /// Unique identifier for the distributor
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Full name
    pub name: String,
    /// Contact phone number
    pub phone: String,
    /// Home city, if assigned
    pub city_id: Option<i64>,
    /// Inactive distributors are hidden from pickers but keep their history
    pub is_active: bool,
    /// When the distributor was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Distributor and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One distributor has many leaflet orders
    #[sea_orm(has_many = "super::leaflet_order::Entity")]
    LeafletOrders,
}

impl Related<super::leaflet_order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LeafletOrders.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
