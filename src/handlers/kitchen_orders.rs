use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::entities::{KitchenOrderStatus, RecordStatus};
use crate::errors::ServiceError;
use crate::handlers::common::{ensure_positive_id, parse_date_filter, parse_sort_param};
use crate::services::kitchen_orders::{
    CreateKitchenOrderRequest, KitchenOrderFilter, UpdateKitchenOrderRequest,
};
use crate::services::workflow::{TransitionContext, WorkflowTransition};
use crate::{auth::AuthUser, AppState, PageParams};

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct KitchenOrderListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub order_id: Option<i64>,
    pub online_order_id: Option<i64>,
    pub station_id: Option<i64>,
    pub business_status: Option<KitchenOrderStatus>,
    pub status: Option<RecordStatus>,
    /// `YYYY-MM-DD`, inclusive lower bound on creation date.
    pub created_from: Option<String>,
    /// `YYYY-MM-DD`, inclusive upper bound on creation date.
    pub created_to: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

#[utoipa::path(
    post,
    path = "/api/v1/kitchen-orders",
    request_body = CreateKitchenOrderRequest,
    responses(
        (status = 201, description = "Kitchen order created", body = crate::services::kitchen_orders::KitchenOrderResponse),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
        (status = 404, description = "Referenced entity not found", body = crate::errors::ErrorResponse)
    ),
    tag = "kitchen-orders"
)]
pub async fn create_kitchen_order(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<CreateKitchenOrderRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let order = state
        .services
        .kitchen_orders
        .create(user.merchant_id, request)
        .await?;
    Ok((StatusCode::CREATED, Json(order)))
}

#[utoipa::path(
    get,
    path = "/api/v1/kitchen-orders/:id",
    params(("id" = i64, Path, description = "Kitchen order id")),
    responses(
        (status = 200, description = "Kitchen order returned", body = crate::services::kitchen_orders::KitchenOrderResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    tag = "kitchen-orders"
)]
pub async fn get_kitchen_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ServiceError> {
    let id = ensure_positive_id(id, "kitchen order")?;
    let order = state
        .services
        .kitchen_orders
        .find_one(user.merchant_id, id)
        .await?;
    Ok(Json(order))
}

#[utoipa::path(
    get,
    path = "/api/v1/kitchen-orders",
    params(KitchenOrderListQuery),
    responses(
        (status = 200, description = "Paginated kitchen orders"),
        (status = 400, description = "Invalid pagination or filter", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse)
    ),
    tag = "kitchen-orders"
)]
pub async fn list_kitchen_orders(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<KitchenOrderListQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let page = PageParams {
        page: query.page,
        limit: query.limit,
    };
    let filter = KitchenOrderFilter {
        order_id: query
            .order_id
            .map(|id| ensure_positive_id(id, "order"))
            .transpose()?,
        online_order_id: query
            .online_order_id
            .map(|id| ensure_positive_id(id, "online order"))
            .transpose()?,
        station_id: query
            .station_id
            .map(|id| ensure_positive_id(id, "kitchen station"))
            .transpose()?,
        business_status: query.business_status,
        status: query.status,
        created_from: parse_date_filter(query.created_from.as_deref(), "createdFrom")?,
        created_to: parse_date_filter(query.created_to.as_deref(), "createdTo")?,
        sort_by: parse_sort_param(query.sort_by.as_deref())?,
        sort_order: parse_sort_param(query.sort_order.as_deref())?,
    };

    let orders = state
        .services
        .kitchen_orders
        .find_all(user.merchant_id, page, filter)
        .await?;
    Ok(Json(orders))
}

#[utoipa::path(
    put,
    path = "/api/v1/kitchen-orders/:id",
    params(("id" = i64, Path, description = "Kitchen order id")),
    request_body = UpdateKitchenOrderRequest,
    responses(
        (status = 200, description = "Kitchen order updated", body = crate::services::kitchen_orders::KitchenOrderResponse),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Deleted or terminal", body = crate::errors::ErrorResponse)
    ),
    tag = "kitchen-orders"
)]
pub async fn update_kitchen_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
    Json(request): Json<UpdateKitchenOrderRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let id = ensure_positive_id(id, "kitchen order")?;
    let order = state
        .services
        .workflow
        .update_order(user.merchant_id, id, request)
        .await?;
    Ok(Json(order))
}

#[utoipa::path(
    delete,
    path = "/api/v1/kitchen-orders/:id",
    params(("id" = i64, Path, description = "Kitchen order id")),
    responses(
        (status = 204, description = "Kitchen order deleted"),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Already deleted", body = crate::errors::ErrorResponse)
    ),
    tag = "kitchen-orders"
)]
pub async fn delete_kitchen_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ServiceError> {
    let id = ensure_positive_id(id, "kitchen order")?;
    state
        .services
        .kitchen_orders
        .remove(user.merchant_id, id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/v1/kitchen-orders/:id/start",
    params(("id" = i64, Path, description = "Kitchen order id")),
    request_body = TransitionContext,
    responses(
        (status = 200, description = "Kitchen order started", body = crate::services::kitchen_orders::KitchenOrderResponse),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Lifecycle violation", body = crate::errors::ErrorResponse)
    ),
    tag = "kitchen-orders"
)]
pub async fn start_kitchen_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
    context: Option<Json<TransitionContext>>,
) -> Result<impl IntoResponse, ServiceError> {
    let context = context.map(|Json(c)| c).unwrap_or_default();
    transition(state, user, id, WorkflowTransition::Start, context).await
}

#[utoipa::path(
    post,
    path = "/api/v1/kitchen-orders/:id/complete",
    params(("id" = i64, Path, description = "Kitchen order id")),
    request_body = TransitionContext,
    responses(
        (status = 200, description = "Kitchen order completed", body = crate::services::kitchen_orders::KitchenOrderResponse),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Lifecycle violation", body = crate::errors::ErrorResponse)
    ),
    tag = "kitchen-orders"
)]
pub async fn complete_kitchen_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
    context: Option<Json<TransitionContext>>,
) -> Result<impl IntoResponse, ServiceError> {
    let context = context.map(|Json(c)| c).unwrap_or_default();
    transition(state, user, id, WorkflowTransition::Complete, context).await
}

#[utoipa::path(
    post,
    path = "/api/v1/kitchen-orders/:id/cancel",
    params(("id" = i64, Path, description = "Kitchen order id")),
    request_body = TransitionContext,
    responses(
        (status = 200, description = "Kitchen order cancelled", body = crate::services::kitchen_orders::KitchenOrderResponse),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Lifecycle violation", body = crate::errors::ErrorResponse)
    ),
    tag = "kitchen-orders"
)]
pub async fn cancel_kitchen_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
    context: Option<Json<TransitionContext>>,
) -> Result<impl IntoResponse, ServiceError> {
    let context = context.map(|Json(c)| c).unwrap_or_default();
    transition(state, user, id, WorkflowTransition::Cancel, context).await
}

async fn transition(
    state: AppState,
    user: AuthUser,
    id: i64,
    transition: WorkflowTransition,
    context: TransitionContext,
) -> Result<Json<crate::services::kitchen_orders::KitchenOrderResponse>, ServiceError> {
    let id = ensure_positive_id(id, "kitchen order")?;
    let order = state
        .services
        .workflow
        .transition(user.merchant_id, id, transition, context)
        .await?;
    Ok(Json(order))
}
