//! Audit log - append-only record of every business mutation.
//!
//! Events are a typed enum serialized into the `event` column; the natural-language
//! `description` shown in the dashboard is rendered from the same value, so the two
//! never drift apart.

use crate::{
    entities::{Log, log},
    errors::Result,
};
use sea_orm::{QueryOrder, QuerySelect, Set, prelude::*};
use serde::{Deserialize, Serialize};

/// A single auditable action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuditEvent {
    LeafletOrderCreated {
        order_id: i64,
        leaflet: String,
        quantity: i64,
        distributor: String,
        stock_left: i64,
    },
    LeafletOrderCompleted {
        order_id: i64,
        quantity: i64,
        given: i64,
        returned: i64,
        profit: f64,
    },
    LeafletOrderDeclined {
        order_id: i64,
    },
    LeafletOrderCancelled {
        order_id: i64,
        returned: i64,
    },
    LeafletOrderQuantityEdited {
        order_id: i64,
        old_quantity: i64,
        new_quantity: i64,
    },
    LeafletOrderSubmittedForPayment {
        order_id: i64,
    },
    PaymentProofUploaded {
        order_id: i64,
        document_id: i64,
        file_name: String,
    },
    LeafletCreated {
        leaflet_id: i64,
        name: String,
        stock: i64,
    },
    LeafletRestocked {
        leaflet_id: i64,
        name: String,
        added: i64,
        stock: i64,
    },
    RecordCreated {
        kind: RecordKind,
        id: i64,
        name: String,
    },
    RecordUpdated {
        kind: RecordKind,
        id: i64,
        name: String,
    },
    RecordDeleted {
        kind: RecordKind,
        id: i64,
        name: String,
    },
    OrderCreated {
        order_id: i64,
        client_name: String,
    },
    OrderStateChanged {
        order_id: i64,
        from: String,
        to: String,
    },
}

/// Reference-data tables that share the generic create/update/delete events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    City,
    Leaflet,
    Distributor,
    Worker,
    Order,
    Goal,
    User,
}

impl RecordKind {
    const fn label(self) -> &'static str {
        match self {
            Self::City => "город",
            Self::Leaflet => "листовку",
            Self::Distributor => "распространителя",
            Self::Worker => "работника",
            Self::Order => "заказ",
            Self::Goal => "цель",
            Self::User => "пользователя",
        }
    }

    const fn category(self) -> &'static str {
        match self {
            Self::City => "city",
            Self::Leaflet => "leaflet",
            Self::Distributor => "distributor",
            Self::Worker => "worker",
            Self::Order => "order",
            Self::Goal => "goal",
            Self::User => "user",
        }
    }
}

impl AuditEvent {
    /// Category tag stored alongside the event, used for filtering.
    #[must_use]
    pub const fn category(&self) -> &'static str {
        match self {
            Self::LeafletOrderCreated { .. }
            | Self::LeafletOrderCompleted { .. }
            | Self::LeafletOrderDeclined { .. }
            | Self::LeafletOrderCancelled { .. }
            | Self::LeafletOrderQuantityEdited { .. }
            | Self::LeafletOrderSubmittedForPayment { .. }
            | Self::PaymentProofUploaded { .. } => "leaflet_order",
            Self::LeafletCreated { .. } | Self::LeafletRestocked { .. } => "leaflet",
            Self::RecordCreated { kind, .. }
            | Self::RecordUpdated { kind, .. }
            | Self::RecordDeleted { kind, .. } => kind.category(),
            Self::OrderCreated { .. } | Self::OrderStateChanged { .. } => "order",
        }
    }

    /// Renders the dashboard description of the event.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::LeafletOrderCreated {
                order_id,
                leaflet,
                quantity,
                distributor,
                stock_left,
            } => format!(
                "Создан заказ #{order_id}: {quantity} шт. «{leaflet}» выдано распространителю {distributor}, на складе осталось {stock_left}"
            ),
            Self::LeafletOrderCompleted {
                order_id,
                quantity,
                given,
                returned,
                profit,
            } => {
                if given == quantity {
                    format!(
                        "Заказ #{order_id} выполнен полностью: распространено {given} шт., оплата {profit:.2}"
                    )
                } else {
                    format!(
                        "Заказ #{order_id} выполнен частично: распространено {given} из {quantity} шт., возвращено на склад {returned} шт., оплата {profit:.2}"
                    )
                }
            }
            Self::LeafletOrderDeclined { order_id } => {
                format!("Заказ #{order_id} не выполнен, листовки не возвращены")
            }
            Self::LeafletOrderCancelled { order_id, returned } => {
                format!("Заказ #{order_id} отменён, на склад возвращено {returned} шт.")
            }
            Self::LeafletOrderQuantityEdited {
                order_id,
                old_quantity,
                new_quantity,
            } => format!(
                "Количество в заказе #{order_id} изменено с {old_quantity} на {new_quantity}"
            ),
            Self::LeafletOrderSubmittedForPayment { order_id } => {
                format!("Заказ #{order_id} передан на оплату")
            }
            Self::PaymentProofUploaded {
                order_id,
                file_name,
                ..
            } => format!("Загружено подтверждение оплаты «{file_name}» для заказа #{order_id}"),
            Self::LeafletCreated { name, stock, .. } => {
                format!("Добавлена листовка «{name}», остаток {stock} шт.")
            }
            Self::LeafletRestocked {
                name, added, stock, ..
            } => format!("Склад листовки «{name}» пополнен на {added} шт., остаток {stock} шт."),
            Self::RecordCreated { kind, name, .. } => {
                format!("Добавлен(а) {} «{name}»", kind.label())
            }
            Self::RecordUpdated { kind, name, .. } => {
                format!("Изменён(а) {} «{name}»", kind.label())
            }
            Self::RecordDeleted { kind, name, .. } => {
                format!("Удалён(а) {} «{name}»", kind.label())
            }
            Self::OrderCreated {
                order_id,
                client_name,
            } => format!("Создан заказ #{order_id} для клиента {client_name}"),
            Self::OrderStateChanged { order_id, from, to } => {
                format!("Статус заказа #{order_id} изменён: {from} → {to}")
            }
        }
    }
}

/// Appends one audit row. Accepts a transaction so the entry commits together with
/// the mutation it describes.
pub async fn record<C>(db: &C, who_did: &str, event: &AuditEvent) -> Result<log::Model>
where
    C: ConnectionTrait,
{
    let entry = log::ActiveModel {
        who_did: Set(who_did.to_string()),
        category: Set(event.category().to_string()),
        event: Set(serde_json::to_string(event)?),
        description: Set(event.describe()),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };
    entry.insert(db).await.map_err(Into::into)
}

/// Filter for [`list_entries`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LogFilter {
    pub category: Option<String>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

/// Lists audit entries, newest first. Defaults to 100 rows.
pub async fn list_entries(db: &DatabaseConnection, filter: &LogFilter) -> Result<Vec<log::Model>> {
    let mut query = Log::find();
    if let Some(category) = &filter.category {
        query = query.filter(log::Column::Category.eq(category.as_str()));
    }
    query
        .order_by_desc(log::Column::CreatedAt)
        .order_by_desc(log::Column::Id)
        .limit(filter.limit.unwrap_or(100))
        .offset(filter.offset.unwrap_or(0))
        .all(db)
        .await
        .map_err(Into::into)
}

/// Decodes the typed payload of a stored entry.
pub fn decode(entry: &log::Model) -> Result<AuditEvent> {
    serde_json::from_str(&entry.event).map_err(Into::into)
}
