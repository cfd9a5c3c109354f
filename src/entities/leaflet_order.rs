//! Leaflet order entity - One assignment of leaflets to a distributor.
//!
//! `profit_type` and `state` are stored as their wire strings (`"MKD"`, `"IN_PROCESS"`, ...);
//! the typed forms live in [`crate::core::types`].

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Leaflet order database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[sea_orm(table_name = "leaflet_orders")]
pub struct Model {
    /// Unique identifier for the order
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Pricing category: `"MKD"` or `"CHS"`
    pub profit_type: String,
    /// Number of leaflets handed out for distribution
    pub quantity: i64,
    /// Lifecycle state: `"IN_PROCESS"`, `"FORPAYMENT"`, `"DONE"`, `"DECLINED"` or `"CANCELLED"`
    pub state: String,
    /// Leaflets actually distributed, set on completion
    pub given: Option<i64>,
    /// Leaflets brought back to stock, set on completion
    pub returned: Option<i64>,
    /// Payout owed to the distributor
    pub distributor_profit: f64,
    /// Map square the distributor works
    pub square_number: String,
    /// When the order reached a terminal state
    pub done_at: Option<DateTimeUtc>,
    /// City the order is distributed in
    pub city_id: i64,
    /// Leaflet template being distributed
    pub leaflet_id: i64,
    /// Distributor fulfilling the order
    pub distributor_id: i64,
    /// Username of whoever created the order
    pub created_by: String,
    /// When the order was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between `LeafletOrder` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each order draws from one leaflet
    #[sea_orm(
        belongs_to = "super::leaflet::Entity",
        from = "Column::LeafletId",
        to = "super::leaflet::Column::Id"
    )]
    Leaflet,
    /// Each order is fulfilled by one distributor
    #[sea_orm(
        belongs_to = "super::distributor::Entity",
        from = "Column::DistributorId",
        to = "super::distributor::Column::Id"
    )]
    Distributor,
    /// Each order is placed in one city
    #[sea_orm(
        belongs_to = "super::city::Entity",
        from = "Column::CityId",
        to = "super::city::Column::Id"
    )]
    City,
    /// Payment proofs attached to the order
    #[sea_orm(has_many = "super::document::Entity")]
    Documents,
}

impl Related<super::leaflet::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Leaflet.def()
    }
}

impl Related<super::distributor::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Distributor.def()
    }
}

impl Related<super::city::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::City.def()
    }
}

impl Related<super::document::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Documents.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
