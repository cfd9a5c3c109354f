//! Document entity - Metadata for an uploaded file such as a payment proof.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Document database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[sea_orm(table_name = "documents")]
pub struct Model {
    /// Unique identifier for the document
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Key of the stored file inside the file store
    pub storage_key: String,
    /// File name as uploaded
    pub original_name: String,
    /// MIME type reported by the uploader
    pub content_type: String,
    /// Size in bytes
    pub size: i64,
    /// Leaflet order this document belongs to, if any
    pub leaflet_order_id: Option<i64>,
    /// Username of the uploader
    pub uploaded_by: String,
    /// When the document was uploaded
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Document and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// A document may belong to one leaflet order
    #[sea_orm(
        belongs_to = "super::leaflet_order::Entity",
        from = "Column::LeafletOrderId",
        to = "super::leaflet_order::Column::Id"
    )]
    LeafletOrder,
}

impl Related<super::leaflet_order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LeafletOrder.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
