use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, JoinType, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, RelationTrait, Set,
};
use serde::{Deserialize, Serialize};
use tracing::{instrument, warn};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    auth::require_merchant,
    db::DbPool,
    entities::kitchen_order::{self, Entity as KitchenOrderEntity},
    entities::kitchen_order_item::{
        self, ActiveModel as KitchenOrderItemActiveModel, Entity as KitchenOrderItemEntity,
        Model as KitchenOrderItemModel,
    },
    entities::order_item::{self, Entity as OrderItemEntity},
    entities::product::{self, Entity as ProductEntity},
    entities::product_variant::{self, Entity as ProductVariantEntity},
    entities::RecordStatus,
    errors::ServiceError,
    events::{Event, EventSender},
    services::{day_bounds, quantity::check_prepared_quantity, IdSummary, NamedSummary},
    PageParams, PaginatedResponse, SortOrder,
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateKitchenOrderItemRequest {
    pub kitchen_order_id: i64,
    pub order_item_id: Option<i64>,
    pub product_id: i64,
    pub variant_id: Option<i64>,
    pub quantity: i32,
    /// Defaults to 0 when omitted.
    pub prepared_quantity: Option<i32>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateKitchenOrderItemRequest {
    pub kitchen_order_id: Option<i64>,
    pub order_item_id: Option<i64>,
    pub product_id: Option<i64>,
    pub variant_id: Option<i64>,
    pub quantity: Option<i32>,
    pub prepared_quantity: Option<i32>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct KitchenOrderItemResponse {
    pub id: i64,
    pub kitchen_order_id: i64,
    pub order_item_id: Option<i64>,
    pub product_id: i64,
    pub variant_id: Option<i64>,
    pub quantity: i32,
    pub prepared_quantity: i32,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub status: RecordStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub kitchen_order: IdSummary,
    pub order_item: Option<IdSummary>,
    pub product: Option<NamedSummary>,
    pub variant: Option<NamedSummary>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KitchenOrderItemSortBy {
    CreatedAt,
    Quantity,
}

impl FromStr for KitchenOrderItemSortBy {
    type Err = ServiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "createdAt" | "created_at" => Ok(Self::CreatedAt),
            "quantity" => Ok(Self::Quantity),
            other => Err(ServiceError::BadRequest(format!(
                "Unknown sort field: {other}"
            ))),
        }
    }
}

#[derive(Debug, Default)]
pub struct KitchenOrderItemFilter {
    pub kitchen_order_id: Option<i64>,
    pub order_item_id: Option<i64>,
    pub product_id: Option<i64>,
    pub variant_id: Option<i64>,
    pub status: Option<RecordStatus>,
    pub created_from: Option<NaiveDate>,
    pub created_to: Option<NaiveDate>,
    pub sort_by: Option<KitchenOrderItemSortBy>,
    pub sort_order: Option<SortOrder>,
}

/// Store for kitchen order items. Items have no merchant column of their own;
/// every access resolves the parent kitchen order and scopes through it.
#[derive(Clone)]
pub struct KitchenOrderItemService {
    db_pool: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
}

impl KitchenOrderItemService {
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
        request: CreateKitchenOrderItemRequest,
    ) -> Result<KitchenOrderItemResponse, ServiceError> {
        request.validate()?;
        let merchant_id = require_merchant(caller_merchant_id)?;
        let db = &*self.db_pool;

        self.resolve_parent_order(merchant_id, request.kitchen_order_id)
            .await?;
        let product = self.resolve_product(request.product_id).await?;
        let variant = match request.variant_id {
            Some(variant_id) => Some(self.resolve_variant(request.product_id, variant_id).await?),
            None => None,
        };
        if let Some(order_item_id) = request.order_item_id {
            self.resolve_order_item(order_item_id).await?;
        }

        let prepared_quantity = request.prepared_quantity.unwrap_or(0);
        check_prepared_quantity(request.quantity, prepared_quantity)?;

        let model = KitchenOrderItemActiveModel {
            kitchen_order_id: Set(request.kitchen_order_id),
            order_item_id: Set(request.order_item_id),
            product_id: Set(request.product_id),
            variant_id: Set(request.variant_id),
            quantity: Set(request.quantity),
            prepared_quantity: Set(prepared_quantity),
            started_at: Set(request.started_at),
            completed_at: Set(request.completed_at),
            notes: Set(request.notes),
            status: Set(RecordStatus::Active),
            ..Default::default()
        }
        .insert(db)
        .await?;

        self.emit(Event::KitchenOrderItemCreated(model.id)).await;

        Ok(self.model_to_response(model, Some(product), variant))
    }

    /// Loads an item and verifies the caller's merchant owns its parent order.
    pub async fn find_scoped(
        &self,
        caller_merchant_id: Option<i64>,
        id: i64,
    ) -> Result<KitchenOrderItemModel, ServiceError> {
        let merchant_id = require_merchant(caller_merchant_id)?;
        let db = &*self.db_pool;

        let not_found = || {
            ServiceError::NotFound(
                "Kitchen order item not found or you do not have access to it".to_string(),
            )
        };

        let item = KitchenOrderItemEntity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(not_found)?;
        let parent = KitchenOrderEntity::find_by_id(item.kitchen_order_id)
            .one(db)
            .await?
            .ok_or_else(not_found)?;
        if parent.merchant_id != merchant_id {
            return Err(not_found());
        }
        Ok(item)
    }

    #[instrument(skip(self), fields(merchant_id = ?caller_merchant_id))]
    pub async fn find_one(
        &self,
        caller_merchant_id: Option<i64>,
        id: i64,
    ) -> Result<KitchenOrderItemResponse, ServiceError> {
        let model = self.find_scoped(caller_merchant_id, id).await?;
        if model.status == RecordStatus::Deleted {
            return Err(ServiceError::NotFound(
                "Kitchen order item not found or you do not have access to it".to_string(),
            ));
        }

        let product = self.load_product_summary(model.product_id).await?;
        let variant = self.load_variant_summary(model.variant_id).await?;
        Ok(self.model_to_response(model, product, variant))
    }

    #[instrument(skip(self, request), fields(merchant_id = ?caller_merchant_id, kitchen_order_item_id = id))]
    pub async fn update(
        &self,
        caller_merchant_id: Option<i64>,
        id: i64,
        request: UpdateKitchenOrderItemRequest,
    ) -> Result<KitchenOrderItemResponse, ServiceError> {
        request.validate()?;
        let current = self.find_scoped(caller_merchant_id, id).await?;
        if current.status == RecordStatus::Deleted {
            return Err(ServiceError::Conflict(
                "Kitchen order item is deleted and cannot be modified".to_string(),
            ));
        }
        let merchant_id = require_merchant(caller_merchant_id)?;
        let db = &*self.db_pool;

        if let Some(kitchen_order_id) = request.kitchen_order_id {
            if kitchen_order_id != current.kitchen_order_id {
                self.resolve_parent_order(merchant_id, kitchen_order_id)
                    .await?;
            }
        }
        let effective_product_id = request.product_id.unwrap_or(current.product_id);
        if let Some(product_id) = request.product_id {
            if product_id != current.product_id {
                self.resolve_product(product_id).await?;
            }
        }
        if let Some(variant_id) = request.variant_id {
            if request.product_id.is_some() || current.variant_id != Some(variant_id) {
                self.resolve_variant(effective_product_id, variant_id)
                    .await?;
            }
        }
        if let Some(order_item_id) = request.order_item_id {
            if current.order_item_id != Some(order_item_id) {
                self.resolve_order_item(order_item_id).await?;
            }
        }

        // The invariant is checked against the pair as it will be stored,
        // whichever side the request changed.
        let quantity = request.quantity.unwrap_or(current.quantity);
        let prepared_quantity = request.prepared_quantity.unwrap_or(current.prepared_quantity);
        check_prepared_quantity(quantity, prepared_quantity)?;

        let mut active: KitchenOrderItemActiveModel = current.into();
        if let Some(kitchen_order_id) = request.kitchen_order_id {
            active.kitchen_order_id = Set(kitchen_order_id);
        }
        if let Some(order_item_id) = request.order_item_id {
            active.order_item_id = Set(Some(order_item_id));
        }
        if let Some(product_id) = request.product_id {
            active.product_id = Set(product_id);
        }
        if let Some(variant_id) = request.variant_id {
            active.variant_id = Set(Some(variant_id));
        }
        active.quantity = Set(quantity);
        active.prepared_quantity = Set(prepared_quantity);
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
        self.emit(Event::KitchenOrderItemUpdated(updated.id)).await;

        let product = self.load_product_summary(updated.product_id).await?;
        let variant = self.load_variant_summary(updated.variant_id).await?;
        Ok(self.model_to_response(updated, product, variant))
    }

    #[instrument(skip(self), fields(merchant_id = ?caller_merchant_id, kitchen_order_item_id = id))]
    pub async fn remove(
        &self,
        caller_merchant_id: Option<i64>,
        id: i64,
    ) -> Result<(), ServiceError> {
        let current = self.find_scoped(caller_merchant_id, id).await?;
        if current.status == RecordStatus::Deleted {
            return Err(ServiceError::Conflict(
                "Kitchen order item is already deleted".to_string(),
            ));
        }
        let db = &*self.db_pool;

        let mut active: KitchenOrderItemActiveModel = current.into();
        active.status = Set(RecordStatus::Deleted);
        active.updated_at = Set(Some(Utc::now()));
        active.update(db).await?;

        self.emit(Event::KitchenOrderItemDeleted(id)).await;
        Ok(())
    }

    #[instrument(skip(self, filter), fields(merchant_id = ?caller_merchant_id))]
    pub async fn find_all(
        &self,
        caller_merchant_id: Option<i64>,
        page: PageParams,
        filter: KitchenOrderItemFilter,
    ) -> Result<PaginatedResponse<KitchenOrderItemResponse>, ServiceError> {
        let page = page.validated()?;
        let merchant_id = require_merchant(caller_merchant_id)?;
        let db = &*self.db_pool;

        let mut query = KitchenOrderItemEntity::find()
            .join(
                JoinType::InnerJoin,
                kitchen_order_item::Relation::KitchenOrder.def(),
            )
            .filter(kitchen_order::Column::MerchantId.eq(merchant_id))
            .filter(
                kitchen_order_item::Column::Status
                    .eq(filter.status.unwrap_or(RecordStatus::Active)),
            );

        if let Some(kitchen_order_id) = filter.kitchen_order_id {
            query = query.filter(kitchen_order_item::Column::KitchenOrderId.eq(kitchen_order_id));
        }
        if let Some(order_item_id) = filter.order_item_id {
            query = query.filter(kitchen_order_item::Column::OrderItemId.eq(order_item_id));
        }
        if let Some(product_id) = filter.product_id {
            query = query.filter(kitchen_order_item::Column::ProductId.eq(product_id));
        }
        if let Some(variant_id) = filter.variant_id {
            query = query.filter(kitchen_order_item::Column::VariantId.eq(variant_id));
        }
        if let Some(from) = filter.created_from {
            let (start, _) = day_bounds(from);
            query = query.filter(kitchen_order_item::Column::CreatedAt.gte(start));
        }
        if let Some(to) = filter.created_to {
            let (_, end) = day_bounds(to);
            query = query.filter(kitchen_order_item::Column::CreatedAt.lt(end));
        }

        let order = filter.sort_order.unwrap_or(SortOrder::Desc);
        query = match (
            filter.sort_by.unwrap_or(KitchenOrderItemSortBy::CreatedAt),
            order,
        ) {
            (KitchenOrderItemSortBy::CreatedAt, SortOrder::Asc) => {
                query.order_by_asc(kitchen_order_item::Column::CreatedAt)
            }
            (KitchenOrderItemSortBy::CreatedAt, SortOrder::Desc) => {
                query.order_by_desc(kitchen_order_item::Column::CreatedAt)
            }
            (KitchenOrderItemSortBy::Quantity, SortOrder::Asc) => {
                query.order_by_asc(kitchen_order_item::Column::Quantity)
            }
            (KitchenOrderItemSortBy::Quantity, SortOrder::Desc) => {
                query.order_by_desc(kitchen_order_item::Column::Quantity)
            }
        };

        let paginator = query.paginate(db, page.limit);
        let total = paginator.num_items().await?;
        let models = paginator.fetch_page(page.page - 1).await?;

        let products = self
            .load_product_summaries(models.iter().map(|m| m.product_id).collect())
            .await?;
        let variants = self
            .load_variant_summaries(models.iter().filter_map(|m| m.variant_id).collect())
            .await?;

        let data = models
            .into_iter()
            .map(|m| {
                let product = products.get(&m.product_id).cloned();
                let variant = m.variant_id.and_then(|id| variants.get(&id).cloned());
                self.model_to_response(m, product, variant)
            })
            .collect();

        Ok(PaginatedResponse::new(data, &page, total))
    }

    /// The parent must resolve to an active order of the caller's merchant.
    /// A deleted parent is indistinguishable from an absent one.
    async fn resolve_parent_order(
        &self,
        merchant_id: i64,
        kitchen_order_id: i64,
    ) -> Result<(), ServiceError> {
        let db = &*self.db_pool;
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
        Ok(())
    }

    async fn resolve_product(&self, product_id: i64) -> Result<NamedSummary, ServiceError> {
        let db = &*self.db_pool;
        let product = ProductEntity::find_by_id(product_id)
            .filter(product::Column::Status.eq(RecordStatus::Active))
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Product not found".to_string()))?;
        Ok(NamedSummary {
            id: product.id,
            name: product.name,
        })
    }

    async fn resolve_variant(
        &self,
        product_id: i64,
        variant_id: i64,
    ) -> Result<NamedSummary, ServiceError> {
        let db = &*self.db_pool;
        let variant = ProductVariantEntity::find_by_id(variant_id)
            .filter(product_variant::Column::Status.eq(RecordStatus::Active))
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Product variant not found".to_string()))?;
        if variant.product_id != product_id {
            return Err(ServiceError::BadRequest(
                "Variant does not belong to the specified product".to_string(),
            ));
        }
        Ok(NamedSummary {
            id: variant.id,
            name: variant.name,
        })
    }

    async fn resolve_order_item(&self, order_item_id: i64) -> Result<(), ServiceError> {
        let db = &*self.db_pool;
        OrderItemEntity::find_by_id(order_item_id)
            .filter(order_item::Column::Status.eq(RecordStatus::Active))
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Order item not found".to_string()))?;
        Ok(())
    }

    async fn load_product_summary(
        &self,
        product_id: i64,
    ) -> Result<Option<NamedSummary>, ServiceError> {
        let db = &*self.db_pool;
        Ok(ProductEntity::find_by_id(product_id)
            .one(db)
            .await?
            .map(|p| NamedSummary {
                id: p.id,
                name: p.name,
            }))
    }

    async fn load_variant_summary(
        &self,
        variant_id: Option<i64>,
    ) -> Result<Option<NamedSummary>, ServiceError> {
        let Some(variant_id) = variant_id else {
            return Ok(None);
        };
        let db = &*self.db_pool;
        Ok(ProductVariantEntity::find_by_id(variant_id)
            .one(db)
            .await?
            .map(|v| NamedSummary {
                id: v.id,
                name: v.name,
            }))
    }

    async fn load_product_summaries(
        &self,
        ids: Vec<i64>,
    ) -> Result<HashMap<i64, NamedSummary>, ServiceError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let db = &*self.db_pool;
        let products = ProductEntity::find()
            .filter(product::Column::Id.is_in(ids))
            .all(db)
            .await?;
        Ok(products
            .into_iter()
            .map(|p| {
                (
                    p.id,
                    NamedSummary {
                        id: p.id,
                        name: p.name,
                    },
                )
            })
            .collect())
    }

    async fn load_variant_summaries(
        &self,
        ids: Vec<i64>,
    ) -> Result<HashMap<i64, NamedSummary>, ServiceError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let db = &*self.db_pool;
        let variants = ProductVariantEntity::find()
            .filter(product_variant::Column::Id.is_in(ids))
            .all(db)
            .await?;
        Ok(variants
            .into_iter()
            .map(|v| {
                (
                    v.id,
                    NamedSummary {
                        id: v.id,
                        name: v.name,
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
        model: KitchenOrderItemModel,
        product: Option<NamedSummary>,
        variant: Option<NamedSummary>,
    ) -> KitchenOrderItemResponse {
        KitchenOrderItemResponse {
            id: model.id,
            kitchen_order: IdSummary {
                id: model.kitchen_order_id,
            },
            order_item: model.order_item_id.map(|id| IdSummary { id }),
            kitchen_order_id: model.kitchen_order_id,
            order_item_id: model.order_item_id,
            product_id: model.product_id,
            variant_id: model.variant_id,
            quantity: model.quantity,
            prepared_quantity: model.prepared_quantity,
            started_at: model.started_at,
            completed_at: model.completed_at,
            notes: model.notes,
            status: model.status,
            created_at: model.created_at,
            updated_at: model.updated_at,
            product,
            variant,
        }
    }
}
