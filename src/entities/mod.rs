pub mod kitchen_event_log;
pub mod kitchen_order;
pub mod kitchen_order_item;
pub mod kitchen_station;
pub mod online_order;
pub mod order;
pub mod order_item;
pub mod product;
pub mod product_variant;
pub mod user;

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Logical record lifecycle. Rows are never hard-deleted; `remove` flips this
/// to `deleted` and later mutations are rejected with a conflict.
///
/// Kept separate from [`KitchenOrderStatus`]: a cancelled kitchen order is
/// still `active` until it is explicitly deleted.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum RecordStatus {
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "deleted")]
    Deleted,
}

/// Business status of a kitchen order.
///
/// The intended lifecycle is `pending -> started -> completed`, with `cancel`
/// reachable from `pending` and `started`. The store does not restrict
/// transitions; the workflow layer enforces the lifecycle and derives
/// `started_at`/`completed_at` from observed transitions.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum KitchenOrderStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "started")]
    Started,
    #[sea_orm(string_value = "completed")]
    Completed,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

impl KitchenOrderStatus {
    /// `completed` and `cancelled` are terminal in the intended lifecycle.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Started => "started",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

/// Closed set of kitchen workflow milestones recorded in the event log.
/// String values are kept exactly as the kitchen displays consume them.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum KitchenEventType {
    #[sea_orm(string_value = "inicio")]
    Inicio,
    #[sea_orm(string_value = "listo")]
    Listo,
    #[sea_orm(string_value = "servido")]
    Servido,
    #[sea_orm(string_value = "cancelado")]
    Cancelado,
}
