use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::entities::RecordStatus;
use crate::errors::ServiceError;
use crate::handlers::common::{ensure_positive_id, parse_date_filter, parse_sort_param};
use crate::services::kitchen_order_items::{
    CreateKitchenOrderItemRequest, KitchenOrderItemFilter, UpdateKitchenOrderItemRequest,
};
use crate::{auth::AuthUser, AppState, PageParams};

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct KitchenOrderItemListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub kitchen_order_id: Option<i64>,
    pub order_item_id: Option<i64>,
    pub product_id: Option<i64>,
    pub variant_id: Option<i64>,
    pub status: Option<RecordStatus>,
    pub created_from: Option<String>,
    pub created_to: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

#[utoipa::path(
    post,
    path = "/api/v1/kitchen-order-items",
    request_body = CreateKitchenOrderItemRequest,
    responses(
        (status = 201, description = "Kitchen order item created", body = crate::services::kitchen_order_items::KitchenOrderItemResponse),
        (status = 400, description = "Invalid request or quantity invariant violation", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
        (status = 404, description = "Referenced entity not found", body = crate::errors::ErrorResponse)
    ),
    tag = "kitchen-order-items"
)]
pub async fn create_kitchen_order_item(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<CreateKitchenOrderItemRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let item = state
        .services
        .kitchen_order_items
        .create(user.merchant_id, request)
        .await?;
    Ok((StatusCode::CREATED, Json(item)))
}

#[utoipa::path(
    get,
    path = "/api/v1/kitchen-order-items/:id",
    params(("id" = i64, Path, description = "Kitchen order item id")),
    responses(
        (status = 200, description = "Kitchen order item returned", body = crate::services::kitchen_order_items::KitchenOrderItemResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    tag = "kitchen-order-items"
)]
pub async fn get_kitchen_order_item(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ServiceError> {
    let id = ensure_positive_id(id, "kitchen order item")?;
    let item = state
        .services
        .kitchen_order_items
        .find_one(user.merchant_id, id)
        .await?;
    Ok(Json(item))
}

#[utoipa::path(
    get,
    path = "/api/v1/kitchen-order-items",
    params(KitchenOrderItemListQuery),
    responses(
        (status = 200, description = "Paginated kitchen order items"),
        (status = 400, description = "Invalid pagination or filter", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse)
    ),
    tag = "kitchen-order-items"
)]
pub async fn list_kitchen_order_items(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<KitchenOrderItemListQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let page = PageParams {
        page: query.page,
        limit: query.limit,
    };
    let filter = KitchenOrderItemFilter {
        kitchen_order_id: query
            .kitchen_order_id
            .map(|id| ensure_positive_id(id, "kitchen order"))
            .transpose()?,
        order_item_id: query
            .order_item_id
            .map(|id| ensure_positive_id(id, "order item"))
            .transpose()?,
        product_id: query
            .product_id
            .map(|id| ensure_positive_id(id, "product"))
            .transpose()?,
        variant_id: query
            .variant_id
            .map(|id| ensure_positive_id(id, "product variant"))
            .transpose()?,
        status: query.status,
        created_from: parse_date_filter(query.created_from.as_deref(), "createdFrom")?,
        created_to: parse_date_filter(query.created_to.as_deref(), "createdTo")?,
        sort_by: parse_sort_param(query.sort_by.as_deref())?,
        sort_order: parse_sort_param(query.sort_order.as_deref())?,
    };

    let items = state
        .services
        .kitchen_order_items
        .find_all(user.merchant_id, page, filter)
        .await?;
    Ok(Json(items))
}

#[utoipa::path(
    put,
    path = "/api/v1/kitchen-order-items/:id",
    params(("id" = i64, Path, description = "Kitchen order item id")),
    request_body = UpdateKitchenOrderItemRequest,
    responses(
        (status = 200, description = "Kitchen order item updated", body = crate::services::kitchen_order_items::KitchenOrderItemResponse),
        (status = 400, description = "Invalid request or quantity invariant violation", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Already deleted", body = crate::errors::ErrorResponse)
    ),
    tag = "kitchen-order-items"
)]
pub async fn update_kitchen_order_item(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
    Json(request): Json<UpdateKitchenOrderItemRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let id = ensure_positive_id(id, "kitchen order item")?;
    let item = state
        .services
        .kitchen_order_items
        .update(user.merchant_id, id, request)
        .await?;
    Ok(Json(item))
}

#[utoipa::path(
    delete,
    path = "/api/v1/kitchen-order-items/:id",
    params(("id" = i64, Path, description = "Kitchen order item id")),
    responses(
        (status = 204, description = "Kitchen order item deleted"),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Already deleted", body = crate::errors::ErrorResponse)
    ),
    tag = "kitchen-order-items"
)]
pub async fn delete_kitchen_order_item(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ServiceError> {
    let id = ensure_positive_id(id, "kitchen order item")?;
    state
        .services
        .kitchen_order_items
        .remove(user.merchant_id, id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
