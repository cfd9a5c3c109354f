//! City entity - A service area that orders and distributors belong to.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// City database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[sea_orm(table_name = "cities")]
pub struct Model {
    /// Unique identifier for the city
    #[sea_orm(primary_key)]
    pub id: i64,
    /// City name
    #[sea_orm(unique)]
    pub name: String,
    /// When the city was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between City and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Leaflet orders placed in this city
    #[sea_orm(has_many = "super::leaflet_order::Entity")]
    LeafletOrders,
}

impl Related<super::leaflet_order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LeafletOrders.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
