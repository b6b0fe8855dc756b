use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::entities::{KitchenEventType, RecordStatus};
use crate::errors::ServiceError;
use crate::handlers::common::{ensure_positive_id, parse_date_filter, parse_sort_param};
use crate::services::kitchen_event_logs::{
    CreateKitchenEventRequest, KitchenEventFilter, UpdateKitchenEventRequest,
};
use crate::{auth::AuthUser, AppState, PageParams};

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct KitchenEventListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub kitchen_order_id: Option<i64>,
    pub kitchen_order_item_id: Option<i64>,
    pub station_id: Option<i64>,
    pub user_id: Option<i64>,
    pub event_type: Option<KitchenEventType>,
    pub status: Option<RecordStatus>,
    /// `YYYY-MM-DD`, bound on the event timestamp.
    pub event_from: Option<String>,
    pub event_to: Option<String>,
    pub created_from: Option<String>,
    pub created_to: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

#[utoipa::path(
    post,
    path = "/api/v1/kitchen-events",
    request_body = CreateKitchenEventRequest,
    responses(
        (status = 201, description = "Kitchen event recorded", body = crate::services::kitchen_event_logs::KitchenEventResponse),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
        (status = 404, description = "Referenced entity not found", body = crate::errors::ErrorResponse)
    ),
    tag = "kitchen-events"
)]
pub async fn create_kitchen_event(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<CreateKitchenEventRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let event = state
        .services
        .kitchen_events
        .create(user.merchant_id, request)
        .await?;
    Ok((StatusCode::CREATED, Json(event)))
}

#[utoipa::path(
    get,
    path = "/api/v1/kitchen-events/:id",
    params(("id" = i64, Path, description = "Kitchen event id")),
    responses(
        (status = 200, description = "Kitchen event returned", body = crate::services::kitchen_event_logs::KitchenEventResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    tag = "kitchen-events"
)]
pub async fn get_kitchen_event(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ServiceError> {
    let id = ensure_positive_id(id, "kitchen event")?;
    let event = state
        .services
        .kitchen_events
        .find_one(user.merchant_id, id)
        .await?;
    Ok(Json(event))
}

#[utoipa::path(
    get,
    path = "/api/v1/kitchen-events",
    params(KitchenEventListQuery),
    responses(
        (status = 200, description = "Paginated kitchen events"),
        (status = 400, description = "Invalid pagination or filter", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse)
    ),
    tag = "kitchen-events"
)]
pub async fn list_kitchen_events(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<KitchenEventListQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let page = PageParams {
        page: query.page,
        limit: query.limit,
    };
    let filter = KitchenEventFilter {
        kitchen_order_id: query
            .kitchen_order_id
            .map(|id| ensure_positive_id(id, "kitchen order"))
            .transpose()?,
        kitchen_order_item_id: query
            .kitchen_order_item_id
            .map(|id| ensure_positive_id(id, "kitchen order item"))
            .transpose()?,
        station_id: query
            .station_id
            .map(|id| ensure_positive_id(id, "kitchen station"))
            .transpose()?,
        user_id: query
            .user_id
            .map(|id| ensure_positive_id(id, "user"))
            .transpose()?,
        event_type: query.event_type,
        status: query.status,
        event_from: parse_date_filter(query.event_from.as_deref(), "eventFrom")?,
        event_to: parse_date_filter(query.event_to.as_deref(), "eventTo")?,
        created_from: parse_date_filter(query.created_from.as_deref(), "createdFrom")?,
        created_to: parse_date_filter(query.created_to.as_deref(), "createdTo")?,
        sort_by: parse_sort_param(query.sort_by.as_deref())?,
        sort_order: parse_sort_param(query.sort_order.as_deref())?,
    };

    let events = state
        .services
        .kitchen_events
        .find_all(user.merchant_id, page, filter)
        .await?;
    Ok(Json(events))
}

#[utoipa::path(
    put,
    path = "/api/v1/kitchen-events/:id",
    params(("id" = i64, Path, description = "Kitchen event id")),
    request_body = UpdateKitchenEventRequest,
    responses(
        (status = 200, description = "Kitchen event corrected", body = crate::services::kitchen_event_logs::KitchenEventResponse),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Already deleted", body = crate::errors::ErrorResponse)
    ),
    tag = "kitchen-events"
)]
pub async fn update_kitchen_event(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
    Json(request): Json<UpdateKitchenEventRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let id = ensure_positive_id(id, "kitchen event")?;
    let event = state
        .services
        .kitchen_events
        .update(user.merchant_id, id, request)
        .await?;
    Ok(Json(event))
}

#[utoipa::path(
    delete,
    path = "/api/v1/kitchen-events/:id",
    params(("id" = i64, Path, description = "Kitchen event id")),
    responses(
        (status = 204, description = "Kitchen event deleted"),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Already deleted", body = crate::errors::ErrorResponse)
    ),
    tag = "kitchen-events"
)]
pub async fn delete_kitchen_event(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ServiceError> {
    let id = ensure_positive_id(id, "kitchen event")?;
    state
        .services
        .kitchen_events
        .remove(user.merchant_id, id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
