//! Order entity - A customer service order picked up by the notification bot.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Customer order database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[sea_orm(table_name = "orders")]
pub struct Model {
    /// Unique identifier for the order
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Customer name
    pub client_name: String,
    /// Customer phone number
    pub phone: String,
    /// Service address
    pub address: String,
    /// City of the address, if known
    pub city_id: Option<i64>,
    /// Assigned worker, if any
    pub worker_id: Option<i64>,
    /// When the visit is scheduled
    pub scheduled_at: DateTimeUtc,
    /// What the customer asked for
    pub description: String,
    /// Agreed price, once known
    pub price: Option<f64>,
    /// `"NEW"`, `"IN_WORK"`, `"DONE"` or `"CANCELLED"`
    pub state: String,
    /// Whether the bot has already announced this order
    pub notified: bool,
    /// When the order was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Order and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each order may be assigned to one worker
    #[sea_orm(
        belongs_to = "super::worker::Entity",
        from = "Column::WorkerId",
        to = "super::worker::Column::Id"
    )]
    Worker,
}

impl Related<super::worker::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Worker.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
