use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, Set};
use serde::{Deserialize, Serialize};

use super::{KitchenOrderStatus, RecordStatus};

/// Kitchen-facing aggregate created when a POS or online order is sent to the
/// kitchen. Links to at most one source order in practice, but the schema
/// keeps both foreign keys independently nullable (all-null is allowed).
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "kitchen_orders")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub merchant_id: i64,
    pub order_id: Option<i64>,
    pub online_order_id: Option<i64>,
    pub station_id: Option<i64>,
    /// Higher priority is served first by queue readers; ordering itself is a
    /// read-time concern.
    pub priority: i32,
    pub business_status: KitchenOrderStatus,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    #[sea_orm(column_type = "Text", nullable)]
    pub notes: Option<String>,
    pub status: RecordStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::kitchen_order_item::Entity")]
    KitchenOrderItems,
    #[sea_orm(has_many = "super::kitchen_event_log::Entity")]
    KitchenEventLogs,
    #[sea_orm(
        belongs_to = "super::kitchen_station::Entity",
        from = "Column::StationId",
        to = "super::kitchen_station::Column::Id"
    )]
    KitchenStation,
    #[sea_orm(
        belongs_to = "super::order::Entity",
        from = "Column::OrderId",
        to = "super::order::Column::Id"
    )]
    Order,
    #[sea_orm(
        belongs_to = "super::online_order::Entity",
        from = "Column::OnlineOrderId",
        to = "super::online_order::Column::Id"
    )]
    OnlineOrder,
}

impl Related<super::kitchen_order_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::KitchenOrderItems.def()
    }
}

impl Related<super::kitchen_event_log::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::KitchenEventLogs.def()
    }
}

impl Related<super::kitchen_station::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::KitchenStation.def()
    }
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Order.def()
    }
}

impl Related<super::online_order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OnlineOrder.def()
    }
}

#[async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C: ConnectionTrait>(self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let mut active_model = self;
        let now = Utc::now();

        if insert {
            if let ActiveValue::NotSet = active_model.created_at {
                active_model.created_at = Set(now);
            }
        }

        if let ActiveValue::NotSet = active_model.updated_at {
            active_model.updated_at = Set(Some(now));
        }

        Ok(active_model)
    }
}
