use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use tracing::{instrument, warn};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    auth::{ensure_merchant_access, require_merchant},
    db::DbPool,
    entities::kitchen_order::{
        self, ActiveModel as KitchenOrderActiveModel, Entity as KitchenOrderEntity,
        Model as KitchenOrderModel,
    },
    entities::kitchen_station::{self, Entity as KitchenStationEntity},
    entities::online_order::{self, Entity as OnlineOrderEntity},
    entities::order::{self, Entity as OrderEntity},
    entities::{KitchenOrderStatus, RecordStatus},
    errors::ServiceError,
    events::{Event, EventSender},
    services::{day_bounds, IdSummary, NamedSummary},
    PageParams, PaginatedResponse, SortOrder,
};

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateKitchenOrderRequest {
    pub order_id: Option<i64>,
    pub online_order_id: Option<i64>,
    pub station_id: Option<i64>,
    /// Higher priority is served first. Defaults to 0.
    #[serde(default)]
    pub priority: i32,
    pub business_status: Option<KitchenOrderStatus>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateKitchenOrderRequest {
    pub order_id: Option<i64>,
    pub online_order_id: Option<i64>,
    pub station_id: Option<i64>,
    pub priority: Option<i32>,
    pub business_status: Option<KitchenOrderStatus>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct KitchenOrderResponse {
    pub id: i64,
    pub merchant_id: i64,
    pub order_id: Option<i64>,
    pub online_order_id: Option<i64>,
    pub station_id: Option<i64>,
    pub priority: i32,
    pub business_status: KitchenOrderStatus,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub status: RecordStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub order: Option<IdSummary>,
    pub online_order: Option<IdSummary>,
    pub station: Option<NamedSummary>,
}

/// Sortable columns for kitchen order listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KitchenOrderSortBy {
    CreatedAt,
    Priority,
}

impl FromStr for KitchenOrderSortBy {
    type Err = ServiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "createdAt" | "created_at" => Ok(Self::CreatedAt),
            "priority" => Ok(Self::Priority),
            other => Err(ServiceError::BadRequest(format!(
                "Unknown sort field: {other}"
            ))),
        }
    }
}

/// Filters for `find_all`. Dates are day-granularity bounds on `created_at`.
#[derive(Debug, Default)]
pub struct KitchenOrderFilter {
    pub order_id: Option<i64>,
    pub online_order_id: Option<i64>,
    pub station_id: Option<i64>,
    pub business_status: Option<KitchenOrderStatus>,
    pub status: Option<RecordStatus>,
    pub created_from: Option<NaiveDate>,
    pub created_to: Option<NaiveDate>,
    pub sort_by: Option<KitchenOrderSortBy>,
    pub sort_order: Option<SortOrder>,
}

/// Store for the kitchen order aggregate: merchant scoping, logical delete,
/// and reference validation. Lifecycle-timestamp derivation lives in the
/// workflow layer.
#[derive(Clone)]
pub struct KitchenOrderService {
    db_pool: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
}

impl KitchenOrderService {
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
        request: CreateKitchenOrderRequest,
    ) -> Result<KitchenOrderResponse, ServiceError> {
        request.validate()?;
        let merchant_id = require_merchant(caller_merchant_id)?;
        let db = &*self.db_pool;

        let station = match request.station_id {
            Some(station_id) => Some(self.resolve_station(merchant_id, station_id).await?),
            None => None,
        };
        if let Some(order_id) = request.order_id {
            self.resolve_order(order_id).await?;
        }
        if let Some(online_order_id) = request.online_order_id {
            self.resolve_online_order(online_order_id).await?;
        }

        let model = KitchenOrderActiveModel {
            merchant_id: Set(merchant_id),
            order_id: Set(request.order_id),
            online_order_id: Set(request.online_order_id),
            station_id: Set(request.station_id),
            priority: Set(request.priority),
            business_status: Set(request
                .business_status
                .unwrap_or(KitchenOrderStatus::Pending)),
            started_at: Set(request.started_at),
            completed_at: Set(request.completed_at),
            notes: Set(request.notes),
            status: Set(RecordStatus::Active),
            ..Default::default()
        }
        .insert(db)
        .await?;

        self.emit(Event::KitchenOrderCreated(model.id)).await;

        Ok(self.model_to_response(model, station))
    }

    /// Loads an order scoped to the caller's merchant, regardless of logical
    /// status. Callers decide how to treat deleted rows.
    pub async fn find_scoped(
        &self,
        caller_merchant_id: Option<i64>,
        id: i64,
    ) -> Result<KitchenOrderModel, ServiceError> {
        let merchant_id = require_merchant(caller_merchant_id)?;
        let db = &*self.db_pool;

        let model = KitchenOrderEntity::find_by_id(id)
            .filter(kitchen_order::Column::MerchantId.eq(merchant_id))
            .one(db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(
                    "Kitchen order not found or you do not have access to it".to_string(),
                )
            })?;
        Ok(model)
    }

    #[instrument(skip(self), fields(merchant_id = ?caller_merchant_id))]
    pub async fn find_one(
        &self,
        caller_merchant_id: Option<i64>,
        id: i64,
    ) -> Result<KitchenOrderResponse, ServiceError> {
        let model = self.find_scoped(caller_merchant_id, id).await?;
        if model.status == RecordStatus::Deleted {
            return Err(ServiceError::NotFound(
                "Kitchen order not found or you do not have access to it".to_string(),
            ));
        }

        let station = self.load_station_summary(model.station_id).await?;
        Ok(self.model_to_response(model, station))
    }

    #[instrument(skip(self, request), fields(merchant_id = ?caller_merchant_id, kitchen_order_id = id))]
    pub async fn update(
        &self,
        caller_merchant_id: Option<i64>,
        id: i64,
        request: UpdateKitchenOrderRequest,
    ) -> Result<KitchenOrderResponse, ServiceError> {
        request.validate()?;
        let current = self.find_scoped(caller_merchant_id, id).await?;
        if current.status == RecordStatus::Deleted {
            return Err(ServiceError::Conflict(
                "Kitchen order is deleted and cannot be modified".to_string(),
            ));
        }
        let merchant_id = current.merchant_id;
        let db = &*self.db_pool;

        // Re-validate any reference that is supplied with a new value.
        if let Some(station_id) = request.station_id {
            if current.station_id != Some(station_id) {
                self.resolve_station(merchant_id, station_id).await?;
            }
        }
        if let Some(order_id) = request.order_id {
            if current.order_id != Some(order_id) {
                self.resolve_order(order_id).await?;
            }
        }
        if let Some(online_order_id) = request.online_order_id {
            if current.online_order_id != Some(online_order_id) {
                self.resolve_online_order(online_order_id).await?;
            }
        }

        let old_status = current.business_status;
        let mut active: KitchenOrderActiveModel = current.into();
        if let Some(order_id) = request.order_id {
            active.order_id = Set(Some(order_id));
        }
        if let Some(online_order_id) = request.online_order_id {
            active.online_order_id = Set(Some(online_order_id));
        }
        if let Some(station_id) = request.station_id {
            active.station_id = Set(Some(station_id));
        }
        if let Some(priority) = request.priority {
            active.priority = Set(priority);
        }
        if let Some(business_status) = request.business_status {
            active.business_status = Set(business_status);
        }
        if let Some(started_at) = request.started_at {
            active.started_at = Set(Some(started_at));
        }
        if let Some(completed_at) = request.completed_at {
            active.completed_at = Set(Some(completed_at));
        }
        if let Some(notes) = request.notes {
            active.notes = Set(Some(notes));
        }
        active.updated_at = Set(Some(Utc::now()));

        let updated = active.update(db).await?;

        if let Some(new_status) = request.business_status {
            if new_status != old_status {
                self.emit(Event::KitchenOrderStatusChanged {
                    kitchen_order_id: updated.id,
                    old_status,
                    new_status,
                })
                .await;
            }
        }
        self.emit(Event::KitchenOrderUpdated(updated.id)).await;

        let station = self.load_station_summary(updated.station_id).await?;
        Ok(self.model_to_response(updated, station))
    }

    #[instrument(skip(self), fields(merchant_id = ?caller_merchant_id, kitchen_order_id = id))]
    pub async fn remove(
        &self,
        caller_merchant_id: Option<i64>,
        id: i64,
    ) -> Result<(), ServiceError> {
        let current = self.find_scoped(caller_merchant_id, id).await?;
        if current.status == RecordStatus::Deleted {
            return Err(ServiceError::Conflict(
                "Kitchen order is already deleted".to_string(),
            ));
        }
        let db = &*self.db_pool;

        let mut active: KitchenOrderActiveModel = current.into();
        active.status = Set(RecordStatus::Deleted);
        active.updated_at = Set(Some(Utc::now()));
        active.update(db).await?;

        self.emit(Event::KitchenOrderDeleted(id)).await;
        Ok(())
    }

    #[instrument(skip(self, filter), fields(merchant_id = ?caller_merchant_id))]
    pub async fn find_all(
        &self,
        caller_merchant_id: Option<i64>,
        page: PageParams,
        filter: KitchenOrderFilter,
    ) -> Result<PaginatedResponse<KitchenOrderResponse>, ServiceError> {
        let page = page.validated()?;
        let merchant_id = require_merchant(caller_merchant_id)?;
        let db = &*self.db_pool;

        let mut query = KitchenOrderEntity::find()
            .filter(kitchen_order::Column::MerchantId.eq(merchant_id))
            .filter(kitchen_order::Column::Status.eq(filter.status.unwrap_or(RecordStatus::Active)));

        if let Some(order_id) = filter.order_id {
            query = query.filter(kitchen_order::Column::OrderId.eq(order_id));
        }
        if let Some(online_order_id) = filter.online_order_id {
            query = query.filter(kitchen_order::Column::OnlineOrderId.eq(online_order_id));
        }
        if let Some(station_id) = filter.station_id {
            query = query.filter(kitchen_order::Column::StationId.eq(station_id));
        }
        if let Some(business_status) = filter.business_status {
            query = query.filter(kitchen_order::Column::BusinessStatus.eq(business_status));
        }
        if let Some(from) = filter.created_from {
            let (start, _) = day_bounds(from);
            query = query.filter(kitchen_order::Column::CreatedAt.gte(start));
        }
        if let Some(to) = filter.created_to {
            let (_, end) = day_bounds(to);
            query = query.filter(kitchen_order::Column::CreatedAt.lt(end));
        }

        let order = filter.sort_order.unwrap_or(SortOrder::Desc);
        query = match (filter.sort_by.unwrap_or(KitchenOrderSortBy::CreatedAt), order) {
            (KitchenOrderSortBy::CreatedAt, SortOrder::Asc) => {
                query.order_by_asc(kitchen_order::Column::CreatedAt)
            }
            (KitchenOrderSortBy::CreatedAt, SortOrder::Desc) => {
                query.order_by_desc(kitchen_order::Column::CreatedAt)
            }
            (KitchenOrderSortBy::Priority, SortOrder::Asc) => {
                query.order_by_asc(kitchen_order::Column::Priority)
            }
            (KitchenOrderSortBy::Priority, SortOrder::Desc) => {
                query.order_by_desc(kitchen_order::Column::Priority)
            }
        };

        let paginator = query.paginate(db, page.limit);
        let total = paginator.num_items().await?;
        let models = paginator.fetch_page(page.page - 1).await?;

        let stations = self
            .load_station_summaries(models.iter().filter_map(|m| m.station_id).collect())
            .await?;

        let data = models
            .into_iter()
            .map(|m| {
                let station = m.station_id.and_then(|id| stations.get(&id).cloned());
                self.model_to_response(m, station)
            })
            .collect();

        Ok(PaginatedResponse::new(data, &page, total))
    }

    async fn resolve_station(
        &self,
        merchant_id: i64,
        station_id: i64,
    ) -> Result<NamedSummary, ServiceError> {
        let db = &*self.db_pool;
        let station = KitchenStationEntity::find_by_id(station_id)
            .filter(kitchen_station::Column::Status.eq(RecordStatus::Active))
            .one(db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(
                    "Kitchen station not found or you do not have access to it".to_string(),
                )
            })?;
        ensure_merchant_access(Some(merchant_id), station.merchant_id).map_err(|_| {
            ServiceError::NotFound(
                "Kitchen station not found or you do not have access to it".to_string(),
            )
        })?;
        Ok(NamedSummary {
            id: station.id,
            name: station.name,
        })
    }

    async fn resolve_order(&self, order_id: i64) -> Result<(), ServiceError> {
        let db = &*self.db_pool;
        OrderEntity::find_by_id(order_id)
            .filter(order::Column::Status.eq(RecordStatus::Active))
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Order not found".to_string()))?;
        Ok(())
    }

    async fn resolve_online_order(&self, online_order_id: i64) -> Result<(), ServiceError> {
        let db = &*self.db_pool;
        OnlineOrderEntity::find_by_id(online_order_id)
            .filter(online_order::Column::Status.eq(RecordStatus::Active))
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Online order not found".to_string()))?;
        Ok(())
    }

    async fn load_station_summary(
        &self,
        station_id: Option<i64>,
    ) -> Result<Option<NamedSummary>, ServiceError> {
        let Some(station_id) = station_id else {
            return Ok(None);
        };
        let db = &*self.db_pool;
        Ok(KitchenStationEntity::find_by_id(station_id)
            .one(db)
            .await?
            .map(|s| NamedSummary {
                id: s.id,
                name: s.name,
            }))
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

    async fn emit(&self, event: Event) {
        if let Some(sender) = &self.event_sender {
            if let Err(e) = sender.send(event).await {
                warn!(error = %e, "Failed to send domain event");
            }
        }
    }

    fn model_to_response(
        &self,
        model: KitchenOrderModel,
        station: Option<NamedSummary>,
    ) -> KitchenOrderResponse {
        KitchenOrderResponse {
            id: model.id,
            merchant_id: model.merchant_id,
            order: model.order_id.map(|id| IdSummary { id }),
            online_order: model.online_order_id.map(|id| IdSummary { id }),
            order_id: model.order_id,
            online_order_id: model.online_order_id,
            station_id: model.station_id,
            priority: model.priority,
            business_status: model.business_status,
            started_at: model.started_at,
            completed_at: model.completed_at,
            notes: model.notes,
            status: model.status,
            created_at: model.created_at,
            updated_at: model.updated_at,
            station,
        }
    }
}
