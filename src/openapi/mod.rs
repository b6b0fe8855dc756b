use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Kitchen Ops API",
        version = "1.0.0",
        description = r#"
# Kitchen Order Workflow API

Multi-tenant kitchen workflow service for restaurants: kitchen orders, their
preparation line items, and the kitchen event log.

## Authentication

All endpoints except `/health` and `/status` require a JWT bearer token:

```
Authorization: Bearer <your-jwt-token>
```

Every operation is scoped to the merchant carried in the token; a caller with
no merchant association is rejected.

## Pagination

List endpoints accept:
- `page`: page number (default 1)
- `limit`: items per page (default 10, max 100)
- `sortBy` / `sortOrder` (`ASC`/`DESC`)
- entity-specific id filters and `YYYY-MM-DD` date filters
        "#
    ),
    servers(
        (url = "http://localhost:8080/api/v1", description = "Local development")
    ),
    tags(
        (name = "kitchen-orders", description = "Kitchen order lifecycle"),
        (name = "kitchen-order-items", description = "Preparation line items"),
        (name = "kitchen-events", description = "Kitchen event log"),
        (name = "health", description = "Health check")
    ),
    paths(
        crate::handlers::kitchen_orders::create_kitchen_order,
        crate::handlers::kitchen_orders::get_kitchen_order,
        crate::handlers::kitchen_orders::list_kitchen_orders,
        crate::handlers::kitchen_orders::update_kitchen_order,
        crate::handlers::kitchen_orders::delete_kitchen_order,
        crate::handlers::kitchen_orders::start_kitchen_order,
        crate::handlers::kitchen_orders::complete_kitchen_order,
        crate::handlers::kitchen_orders::cancel_kitchen_order,
        crate::handlers::kitchen_order_items::create_kitchen_order_item,
        crate::handlers::kitchen_order_items::get_kitchen_order_item,
        crate::handlers::kitchen_order_items::list_kitchen_order_items,
        crate::handlers::kitchen_order_items::update_kitchen_order_item,
        crate::handlers::kitchen_order_items::delete_kitchen_order_item,
        crate::handlers::kitchen_event_logs::create_kitchen_event,
        crate::handlers::kitchen_event_logs::get_kitchen_event,
        crate::handlers::kitchen_event_logs::list_kitchen_events,
        crate::handlers::kitchen_event_logs::update_kitchen_event,
        crate::handlers::kitchen_event_logs::delete_kitchen_event,
        crate::handlers::health::health_check,
        crate::handlers::health::service_status,
    ),
    components(schemas(
        crate::entities::RecordStatus,
        crate::entities::KitchenOrderStatus,
        crate::entities::KitchenEventType,
        crate::errors::ErrorResponse,
        crate::services::IdSummary,
        crate::services::NamedSummary,
        crate::services::UserSummary,
        crate::services::kitchen_orders::CreateKitchenOrderRequest,
        crate::services::kitchen_orders::UpdateKitchenOrderRequest,
        crate::services::kitchen_orders::KitchenOrderResponse,
        crate::services::kitchen_order_items::CreateKitchenOrderItemRequest,
        crate::services::kitchen_order_items::UpdateKitchenOrderItemRequest,
        crate::services::kitchen_order_items::KitchenOrderItemResponse,
        crate::services::kitchen_event_logs::CreateKitchenEventRequest,
        crate::services::kitchen_event_logs::UpdateKitchenEventRequest,
        crate::services::kitchen_event_logs::KitchenEventResponse,
        crate::services::workflow::TransitionContext,
    ))
)]
pub struct ApiDoc;

/// Swagger UI router serving the generated document.
pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi())
}
