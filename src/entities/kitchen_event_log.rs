use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, Set};
use serde::{Deserialize, Serialize};

use super::{KitchenEventType, RecordStatus};

/// Append-only record asserting that a workflow milestone occurred.
///
/// All four references are independently nullable so a single event can carry
/// partial context (a station-level event with no specific item, for
/// example). This is why the log is not a strict child of any other entity.
/// Once written, the event-defining fields only change to correct a mistaken
/// entry; deletion is logical.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "kitchen_event_logs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub kitchen_order_id: Option<i64>,
    pub kitchen_order_item_id: Option<i64>,
    pub station_id: Option<i64>,
    pub user_id: Option<i64>,
    pub event_type: KitchenEventType,
    pub event_time: DateTime<Utc>,
    #[sea_orm(column_type = "Text", nullable)]
    pub message: Option<String>,
    pub status: RecordStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::kitchen_order::Entity",
        from = "Column::KitchenOrderId",
        to = "super::kitchen_order::Column::Id"
    )]
    KitchenOrder,
    #[sea_orm(
        belongs_to = "super::kitchen_order_item::Entity",
        from = "Column::KitchenOrderItemId",
        to = "super::kitchen_order_item::Column::Id"
    )]
    KitchenOrderItem,
    #[sea_orm(
        belongs_to = "super::kitchen_station::Entity",
        from = "Column::StationId",
        to = "super::kitchen_station::Column::Id"
    )]
    KitchenStation,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
}

impl Related<super::kitchen_order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::KitchenOrder.def()
    }
}

impl Related<super::kitchen_station::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::KitchenStation.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
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
