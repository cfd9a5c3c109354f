//! Goal entity - A monthly revenue target.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Goal database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[sea_orm(table_name = "goals")]
pub struct Model {
    /// Unique identifier for the goal
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Short title shown on the dashboard
    pub title: String,
    /// Month the goal applies to, formatted `YYYY-MM`
    pub period: String,
    /// Revenue target for the month
    pub target_amount: f64,
    /// When the goal was created
    pub created_at: DateTimeUtc,
}

/// `Goal` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
