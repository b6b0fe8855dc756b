use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, JoinType, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, RelationTrait, Set,
};
use serde::{Deserialize, Serialize};
use tracing::{instrument, warn};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    auth::require_merchant,
    db::DbPool,
    entities::kitchen_event_log::{
        self, ActiveModel as KitchenEventLogActiveModel, Entity as KitchenEventLogEntity,
        Model as KitchenEventLogModel,
    },
    entities::kitchen_order::{self, Entity as KitchenOrderEntity},
    entities::kitchen_order_item::{self, Entity as KitchenOrderItemEntity},
    entities::kitchen_station::{self, Entity as KitchenStationEntity},
    entities::user::{self, Entity as UserEntity},
    entities::{KitchenEventType, RecordStatus},
    errors::ServiceError,
    events::{Event, EventSender},
    services::{day_bounds, IdSummary, NamedSummary, UserSummary},
    PageParams, PaginatedResponse, SortOrder,
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateKitchenEventRequest {
    pub kitchen_order_id: Option<i64>,
    pub kitchen_order_item_id: Option<i64>,
    pub station_id: Option<i64>,
    pub user_id: Option<i64>,
    pub event_type: KitchenEventType,
    /// Defaults to the server clock when omitted.
    pub event_time: Option<DateTime<Utc>>,
    #[validate(length(max = 1000))]
    pub message: Option<String>,
}

/// Correction of a mistaken entry. The log is otherwise append-only.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateKitchenEventRequest {
    pub kitchen_order_id: Option<i64>,
    pub kitchen_order_item_id: Option<i64>,
    pub station_id: Option<i64>,
    pub user_id: Option<i64>,
    pub event_type: Option<KitchenEventType>,
    pub event_time: Option<DateTime<Utc>>,
    #[validate(length(max = 1000))]
    pub message: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct KitchenEventResponse {
    pub id: i64,
    pub kitchen_order_id: Option<i64>,
    pub kitchen_order_item_id: Option<i64>,
    pub station_id: Option<i64>,
    pub user_id: Option<i64>,
    pub event_type: KitchenEventType,
    pub event_time: DateTime<Utc>,
    pub message: Option<String>,
    pub status: RecordStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub kitchen_order: Option<IdSummary>,
    pub kitchen_order_item: Option<IdSummary>,
    pub station: Option<NamedSummary>,
    pub user: Option<UserSummary>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KitchenEventSortBy {
    EventTime,
    CreatedAt,
}

impl FromStr for KitchenEventSortBy {
    type Err = ServiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "eventTime" | "event_time" => Ok(Self::EventTime),
            "createdAt" | "created_at" => Ok(Self::CreatedAt),
            other => Err(ServiceError::BadRequest(format!(
                "Unknown sort field: {other}"
            ))),
        }
    }
}

#[derive(Debug, Default)]
pub struct KitchenEventFilter {
    pub kitchen_order_id: Option<i64>,
    pub kitchen_order_item_id: Option<i64>,
    pub station_id: Option<i64>,
    pub user_id: Option<i64>,
    pub event_type: Option<KitchenEventType>,
    pub status: Option<RecordStatus>,
    pub event_from: Option<NaiveDate>,
    pub event_to: Option<NaiveDate>,
    pub created_from: Option<NaiveDate>,
    pub created_to: Option<NaiveDate>,
    pub sort_by: Option<KitchenEventSortBy>,
    pub sort_order: Option<SortOrder>,
}

/// Store for the kitchen event log.
///
/// Events linked to a kitchen order inherit that order's merchant scope.
/// Events with no order reference carry no merchant of their own and are
/// visible to any authenticated merchant user.
#[derive(Clone)]
pub struct KitchenEventLogService {
    db_pool: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
}

impl KitchenEventLogService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    #[instrument(skip(self, request), fields(merchant_id = ?caller_merchant_id))]
    pub async fn create(
        &self,
        caller_merchant_id: Option<i64>,
        request: CreateKitchenEventRequest,
    ) -> Result<KitchenEventResponse, ServiceError> {
        request.validate()?;
        let merchant_id = require_merchant(caller_merchant_id)?;

        self.validate_references(
            merchant_id,
            request.kitchen_order_id,
            request.kitchen_order_item_id,
            request.station_id,
            request.user_id,
        )
        .await?;

        let db = &*self.db_pool;
        let model = KitchenEventLogActiveModel {
            kitchen_order_id: Set(request.kitchen_order_id),
            kitchen_order_item_id: Set(request.kitchen_order_item_id),
            station_id: Set(request.station_id),
            user_id: Set(request.user_id),
            event_type: Set(request.event_type),
            event_time: Set(request.event_time.unwrap_or_else(Utc::now)),
            message: Set(request.message),
            status: Set(RecordStatus::Active),
            ..Default::default()
        }
        .insert(db)
        .await?;

        self.emit(Event::KitchenEventRecorded {
            event_log_id: model.id,
            event_type: model.event_type,
        })
        .await;

        self.response_with_summaries(model).await
    }

    /// Loads an event visible to the caller: either unlinked, or linked to a
    /// kitchen order the caller's merchant owns.
    pub async fn find_scoped(
        &self,
        caller_merchant_id: Option<i64>,
        id: i64,
    ) -> Result<KitchenEventLogModel, ServiceError> {
        let merchant_id = require_merchant(caller_merchant_id)?;
        let db = &*self.db_pool;

        let not_found = || {
            ServiceError::NotFound(
                "Kitchen event not found or you do not have access to it".to_string(),
            )
        };

        let event = KitchenEventLogEntity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(not_found)?;
        if let Some(kitchen_order_id) = event.kitchen_order_id {
            let parent = KitchenOrderEntity::find_by_id(kitchen_order_id)
                .one(db)
                .await?
                .ok_or_else(not_found)?;
            if parent.merchant_id != merchant_id {
                return Err(not_found());
            }
        }
        Ok(event)
    }

    #[instrument(skip(self), fields(merchant_id = ?caller_merchant_id))]
    pub async fn find_one(
        &self,
        caller_merchant_id: Option<i64>,
        id: i64,
    ) -> Result<KitchenEventResponse, ServiceError> {
        let model = self.find_scoped(caller_merchant_id, id).await?;
        if model.status == RecordStatus::Deleted {
            return Err(ServiceError::NotFound(
                "Kitchen event not found or you do not have access to it".to_string(),
            ));
        }
        self.response_with_summaries(model).await
    }

    #[instrument(skip(self, request), fields(merchant_id = ?caller_merchant_id, event_log_id = id))]
    pub async fn update(
        &self,
        caller_merchant_id: Option<i64>,
        id: i64,
        request: UpdateKitchenEventRequest,
    ) -> Result<KitchenEventResponse, ServiceError> {
        request.validate()?;
        let current = self.find_scoped(caller_merchant_id, id).await?;
        if current.status == RecordStatus::Deleted {
            return Err(ServiceError::Conflict(
                "Kitchen event is deleted and cannot be modified".to_string(),
            ));
        }
        let merchant_id = require_merchant(caller_merchant_id)?;

        self.validate_references(
            merchant_id,
            request
                .kitchen_order_id
                .filter(|v| current.kitchen_order_id != Some(*v)),
            request
                .kitchen_order_item_id
                .filter(|v| current.kitchen_order_item_id != Some(*v)),
            request
                .station_id
                .filter(|v| current.station_id != Some(*v)),
            request.user_id.filter(|v| current.user_id != Some(*v)),
        )
        .await?;

        let db = &*self.db_pool;
        let mut active: KitchenEventLogActiveModel = current.into();
        if let Some(kitchen_order_id) = request.kitchen_order_id {
            active.kitchen_order_id = Set(Some(kitchen_order_id));
        }
        if let Some(kitchen_order_item_id) = request.kitchen_order_item_id {
            active.kitchen_order_item_id = Set(Some(kitchen_order_item_id));
        }
        if let Some(station_id) = request.station_id {
            active.station_id = Set(Some(station_id));
        }
        if let Some(user_id) = request.user_id {
            active.user_id = Set(Some(user_id));
        }
        if let Some(event_type) = request.event_type {
            active.event_type = Set(event_type);
        }
        if let Some(event_time) = request.event_time {
            active.event_time = Set(event_time);
        }
        if let Some(message) = request.message {
            active.message = Set(Some(message));
        }
        active.updated_at = Set(Some(Utc::now()));

        let updated = active.update(db).await?;
        self.emit(Event::KitchenEventCorrected(updated.id)).await;

        self.response_with_summaries(updated).await
    }

    #[instrument(skip(self), fields(merchant_id = ?caller_merchant_id, event_log_id = id))]
    pub async fn remove(
        &self,
        caller_merchant_id: Option<i64>,
        id: i64,
    ) -> Result<(), ServiceError> {
        let current = self.find_scoped(caller_merchant_id, id).await?;
        if current.status == RecordStatus::Deleted {
            return Err(ServiceError::Conflict(
                "Kitchen event is already deleted".to_string(),
            ));
        }
        let db = &*self.db_pool;

        let mut active: KitchenEventLogActiveModel = current.into();
        active.status = Set(RecordStatus::Deleted);
        active.updated_at = Set(Some(Utc::now()));
        active.update(db).await?;

        self.emit(Event::KitchenEventDeleted(id)).await;
        Ok(())
    }

    #[instrument(skip(self, filter), fields(merchant_id = ?caller_merchant_id))]
    pub async fn find_all(
        &self,
        caller_merchant_id: Option<i64>,
        page: PageParams,
        filter: KitchenEventFilter,
    ) -> Result<PaginatedResponse<KitchenEventResponse>, ServiceError> {
        let page = page.validated()?;
        let merchant_id = require_merchant(caller_merchant_id)?;
        let db = &*self.db_pool;

        let mut query = KitchenEventLogEntity::find()
            .join(
                JoinType::LeftJoin,
                kitchen_event_log::Relation::KitchenOrder.def(),
            )
            .filter(
                Condition::any()
                    .add(kitchen_event_log::Column::KitchenOrderId.is_null())
                    .add(kitchen_order::Column::MerchantId.eq(merchant_id)),
            )
            .filter(
                kitchen_event_log::Column::Status.eq(filter.status.unwrap_or(RecordStatus::Active)),
            );

        if let Some(kitchen_order_id) = filter.kitchen_order_id {
            query = query.filter(kitchen_event_log::Column::KitchenOrderId.eq(kitchen_order_id));
        }
        if let Some(kitchen_order_item_id) = filter.kitchen_order_item_id {
            query = query
                .filter(kitchen_event_log::Column::KitchenOrderItemId.eq(kitchen_order_item_id));
        }
        if let Some(station_id) = filter.station_id {
            query = query.filter(kitchen_event_log::Column::StationId.eq(station_id));
        }
        if let Some(user_id) = filter.user_id {
            query = query.filter(kitchen_event_log::Column::UserId.eq(user_id));
        }
        if let Some(event_type) = filter.event_type {
            query = query.filter(kitchen_event_log::Column::EventType.eq(event_type));
        }
        if let Some(from) = filter.event_from {
            let (start, _) = day_bounds(from);
            query = query.filter(kitchen_event_log::Column::EventTime.gte(start));
        }
        if let Some(to) = filter.event_to {
            let (_, end) = day_bounds(to);
            query = query.filter(kitchen_event_log::Column::EventTime.lt(end));
        }
        if let Some(from) = filter.created_from {
            let (start, _) = day_bounds(from);
            query = query.filter(kitchen_event_log::Column::CreatedAt.gte(start));
        }
        if let Some(to) = filter.created_to {
            let (_, end) = day_bounds(to);
            query = query.filter(kitchen_event_log::Column::CreatedAt.lt(end));
        }

        let order = filter.sort_order.unwrap_or(SortOrder::Desc);
        query = match (filter.sort_by.unwrap_or(KitchenEventSortBy::EventTime), order) {
            (KitchenEventSortBy::EventTime, SortOrder::Asc) => {
                query.order_by_asc(kitchen_event_log::Column::EventTime)
            }
            (KitchenEventSortBy::EventTime, SortOrder::Desc) => {
                query.order_by_desc(kitchen_event_log::Column::EventTime)
            }
            (KitchenEventSortBy::CreatedAt, SortOrder::Asc) => {
                query.order_by_asc(kitchen_event_log::Column::CreatedAt)
            }
            (KitchenEventSortBy::CreatedAt, SortOrder::Desc) => {
                query.order_by_desc(kitchen_event_log::Column::CreatedAt)
            }
        };

        let paginator = query.paginate(db, page.limit);
        let total = paginator.num_items().await?;
        let models = paginator.fetch_page(page.page - 1).await?;

        let stations = self
            .load_station_summaries(models.iter().filter_map(|m| m.station_id).collect())
            .await?;
        let users = self
            .load_user_summaries(models.iter().filter_map(|m| m.user_id).collect())
            .await?;

        let data = models
            .into_iter()
            .map(|m| {
                let station = m.station_id.and_then(|id| stations.get(&id).cloned());
                let user = m.user_id.and_then(|id| users.get(&id).cloned());
                self.model_to_response(m, station, user)
            })
            .collect();

        Ok(PaginatedResponse::new(data, &page, total))
    }

    /// Validates whichever references are present. Pass `None` for a
    /// reference that is absent or unchanged. Every reference must resolve to
    /// an active record within the caller's merchant: the order and station
    /// directly, the item through its parent order, the user through its
    /// merchant membership field.
    pub(crate) async fn validate_references(
        &self,
        merchant_id: i64,
        kitchen_order_id: Option<i64>,
        kitchen_order_item_id: Option<i64>,
        station_id: Option<i64>,
        user_id: Option<i64>,
    ) -> Result<(), ServiceError> {
        let db = &*self.db_pool;

        if let Some(kitchen_order_id) = kitchen_order_id {
            KitchenOrderEntity::find_by_id(kitchen_order_id)
                .filter(kitchen_order::Column::MerchantId.eq(merchant_id))
                .filter(kitchen_order::Column::Status.eq(RecordStatus::Active))
                .one(db)
                .await?
                .ok_or_else(|| {
                    ServiceError::NotFound(
                        "Kitchen order not found or you do not have access to it".to_string(),
                    )
                })?;
        }
        if let Some(kitchen_order_item_id) = kitchen_order_item_id {
            let item_not_found = || {
                ServiceError::NotFound(
                    "Kitchen order item not found or you do not have access to it".to_string(),
                )
            };
            let item = KitchenOrderItemEntity::find_by_id(kitchen_order_item_id)
                .filter(kitchen_order_item::Column::Status.eq(RecordStatus::Active))
                .one(db)
                .await?
                .ok_or_else(item_not_found)?;
            let parent = KitchenOrderEntity::find_by_id(item.kitchen_order_id)
                .one(db)
                .await?
                .ok_or_else(item_not_found)?;
            if parent.merchant_id != merchant_id {
                return Err(item_not_found());
            }
        }
        if let Some(station_id) = station_id {
            KitchenStationEntity::find_by_id(station_id)
                .filter(kitchen_station::Column::MerchantId.eq(merchant_id))
                .filter(kitchen_station::Column::Status.eq(RecordStatus::Active))
                .one(db)
                .await?
                .ok_or_else(|| {
                    ServiceError::NotFound(
                        "Kitchen station not found or you do not have access to it".to_string(),
                    )
                })?;
        }
        if let Some(user_id) = user_id {
            let user_not_found = || {
                ServiceError::NotFound(
                    "User not found or you do not have access to it".to_string(),
                )
            };
            let user = UserEntity::find_by_id(user_id)
                .filter(user::Column::Status.eq(RecordStatus::Active))
                .one(db)
                .await?
                .ok_or_else(user_not_found)?;
            if user.merchant_id != Some(merchant_id) {
                return Err(user_not_found());
            }
        }
        Ok(())
    }

    async fn response_with_summaries(
        &self,
        model: KitchenEventLogModel,
    ) -> Result<KitchenEventResponse, ServiceError> {
        let db = &*self.db_pool;
        let station = match model.station_id {
            Some(station_id) => KitchenStationEntity::find_by_id(station_id)
                .one(db)
                .await?
                .map(|s| NamedSummary {
                    id: s.id,
                    name: s.name,
                }),
            None => None,
        };
        let user = match model.user_id {
            Some(user_id) => UserEntity::find_by_id(user_id)
                .one(db)
                .await?
                .map(|u| UserSummary {
                    id: u.id,
                    email: u.email,
                }),
            None => None,
        };
        Ok(self.model_to_response(model, station, user))
    }

    async fn load_station_summaries(
        &self,
        ids: Vec<i64>,
    ) -> Result<HashMap<i64, NamedSummary>, ServiceError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let db = &*self.db_pool;
        let stations = KitchenStationEntity::find()
            .filter(kitchen_station::Column::Id.is_in(ids))
            .all(db)
            .await?;
        Ok(stations
            .into_iter()
            .map(|s| {
                (
                    s.id,
                    NamedSummary {
                        id: s.id,
                        name: s.name,
                    },
                )
            })
            .collect())
    }

    async fn load_user_summaries(
        &self,
        ids: Vec<i64>,
    ) -> Result<HashMap<i64, UserSummary>, ServiceError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let db = &*self.db_pool;
        let users = UserEntity::find()
            .filter(user::Column::Id.is_in(ids))
            .all(db)
            .await?;
        Ok(users
            .into_iter()
            .map(|u| {
                (
                    u.id,
                    UserSummary {
                        id: u.id,
                        email: u.email,
                    },
                )
            })
            .collect())
    }

    async fn emit(&self, event: Event) {
        if let Some(sender) = &self.event_sender {
            if let Err(e) = sender.send(event).await {
                warn!(error = %e, "Failed to send domain event");
            }
        }
    }

    fn model_to_response(
        &self,
        model: KitchenEventLogModel,
        station: Option<NamedSummary>,
        user: Option<UserSummary>,
    ) -> KitchenEventResponse {
        KitchenEventResponse {
            id: model.id,
            kitchen_order: model.kitchen_order_id.map(|id| IdSummary { id }),
            kitchen_order_item: model.kitchen_order_item_id.map(|id| IdSummary { id }),
            kitchen_order_id: model.kitchen_order_id,
            kitchen_order_item_id: model.kitchen_order_item_id,
            station_id: model.station_id,
            user_id: model.user_id,
            event_type: model.event_type,
            event_time: model.event_time,
            message: model.message,
            status: model.status,
            created_at: model.created_at,
            updated_at: model.updated_at,
            station,
            user,
        }
    }
}
