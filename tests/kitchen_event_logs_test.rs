mod common;

use assert_matches::assert_matches;
use chrono::{Duration, Utc};
use common::{
    seed_kitchen_order, seed_product, seed_station, seed_user, setup, MERCHANT_A, MERCHANT_B,
};
use kitchen_ops_api::entities::{self, KitchenEventType, RecordStatus};
use kitchen_ops_api::errors::ServiceError;
use kitchen_ops_api::services::kitchen_event_logs::{
    CreateKitchenEventRequest, KitchenEventFilter, UpdateKitchenEventRequest,
};
use kitchen_ops_api::services::kitchen_order_items::CreateKitchenOrderItemRequest;
use kitchen_ops_api::PageParams;
use sea_orm::{ActiveModelTrait, Set};

fn event_request(event_type: KitchenEventType) -> CreateKitchenEventRequest {
    CreateKitchenEventRequest {
        kitchen_order_id: None,
        kitchen_order_item_id: None,
        station_id: None,
        user_id: None,
        event_type,
        event_time: None,
        message: None,
    }
}

#[tokio::test]
async fn event_time_defaults_to_now() {
    let ctx = setup().await;
    let before = Utc::now();

    let event = ctx
        .services
        .kitchen_events
        .create(Some(MERCHANT_A), event_request(KitchenEventType::Inicio))
        .await
        .expect("create");

    let after = Utc::now();
    assert!(event.event_time >= before - Duration::seconds(1));
    assert!(event.event_time <= after + Duration::seconds(1));
}

#[tokio::test]
async fn create_validates_references_independently() {
    let ctx = setup().await;
    let kitchen_order = seed_kitchen_order(&ctx, MERCHANT_A).await;
    let station = seed_station(&ctx.db, MERCHANT_A, "Plancha").await;
    let user = seed_user(&ctx.db, Some(MERCHANT_A), "cocinero@example.com").await;

    let event = ctx
        .services
        .kitchen_events
        .create(
            Some(MERCHANT_A),
            CreateKitchenEventRequest {
                kitchen_order_id: Some(kitchen_order),
                station_id: Some(station),
                user_id: Some(user),
                message: Some("en la plancha".to_string()),
                ..event_request(KitchenEventType::Inicio)
            },
        )
        .await
        .expect("create");

    assert_eq!(event.kitchen_order.as_ref().map(|s| s.id), Some(kitchen_order));
    assert_eq!(event.station.as_ref().map(|s| s.name.as_str()), Some("Plancha"));
    assert_eq!(
        event.user.as_ref().map(|u| u.email.as_str()),
        Some("cocinero@example.com")
    );

    // Unknown references fail one by one.
    let err = ctx
        .services
        .kitchen_events
        .create(
            Some(MERCHANT_A),
            CreateKitchenEventRequest {
                station_id: Some(9999),
                ..event_request(KitchenEventType::Listo)
            },
        )
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::NotFound(_));

    // A kitchen order belonging to another merchant is out of scope.
    let foreign = seed_kitchen_order(&ctx, MERCHANT_B).await;
    let err = ctx
        .services
        .kitchen_events
        .create(
            Some(MERCHANT_A),
            CreateKitchenEventRequest {
                kitchen_order_id: Some(foreign),
                ..event_request(KitchenEventType::Listo)
            },
        )
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::NotFound(_));
}

#[tokio::test]
async fn references_must_be_active_and_within_the_merchant() {
    let ctx = setup().await;

    // Another merchant's user is out of reach even though the id exists.
    let foreign_user = seed_user(&ctx.db, Some(MERCHANT_B), "ajeno@example.com").await;
    let err = ctx
        .services
        .kitchen_events
        .create(
            Some(MERCHANT_A),
            CreateKitchenEventRequest {
                user_id: Some(foreign_user),
                ..event_request(KitchenEventType::Inicio)
            },
        )
        .await
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "User not found or you do not have access to it"
    );

    // Same for an item whose parent order belongs to the other merchant.
    let foreign_order = seed_kitchen_order(&ctx, MERCHANT_B).await;
    let product = seed_product(&ctx.db, "Mole").await;
    let foreign_item = ctx
        .services
        .kitchen_order_items
        .create(
            Some(MERCHANT_B),
            CreateKitchenOrderItemRequest {
                kitchen_order_id: foreign_order,
                order_item_id: None,
                product_id: product,
                variant_id: None,
                quantity: 1,
                prepared_quantity: None,
                started_at: None,
                completed_at: None,
                notes: None,
            },
        )
        .await
        .expect("foreign item");
    let err = ctx
        .services
        .kitchen_events
        .create(
            Some(MERCHANT_A),
            CreateKitchenEventRequest {
                kitchen_order_item_id: Some(foreign_item.id),
                ..event_request(KitchenEventType::Listo)
            },
        )
        .await
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Kitchen order item not found or you do not have access to it"
    );

    // A retired station no longer resolves.
    let station = seed_station(&ctx.db, MERCHANT_A, "Freidora").await;
    entities::kitchen_station::ActiveModel {
        id: Set(station),
        status: Set(RecordStatus::Deleted),
        ..Default::default()
    }
    .update(&*ctx.db)
    .await
    .expect("retire station");
    let err = ctx
        .services
        .kitchen_events
        .create(
            Some(MERCHANT_A),
            CreateKitchenEventRequest {
                station_id: Some(station),
                ..event_request(KitchenEventType::Servido)
            },
        )
        .await
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Kitchen station not found or you do not have access to it"
    );
}

#[tokio::test]
async fn order_linked_events_are_tenant_scoped() {
    let ctx = setup().await;
    let kitchen_order = seed_kitchen_order(&ctx, MERCHANT_A).await;

    let linked = ctx
        .services
        .kitchen_events
        .create(
            Some(MERCHANT_A),
            CreateKitchenEventRequest {
                kitchen_order_id: Some(kitchen_order),
                ..event_request(KitchenEventType::Servido)
            },
        )
        .await
        .expect("create linked");

    let err = ctx
        .services
        .kitchen_events
        .find_one(Some(MERCHANT_B), linked.id)
        .await
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Kitchen event not found or you do not have access to it"
    );

    // An unlinked event carries no merchant and is visible to both.
    let unlinked = ctx
        .services
        .kitchen_events
        .create(Some(MERCHANT_A), event_request(KitchenEventType::Inicio))
        .await
        .expect("create unlinked");
    ctx.services
        .kitchen_events
        .find_one(Some(MERCHANT_B), unlinked.id)
        .await
        .expect("unlinked event globally visible");
}

#[tokio::test]
async fn correction_rewrites_fields_and_conflicts_after_delete() {
    let ctx = setup().await;
    let event = ctx
        .services
        .kitchen_events
        .create(Some(MERCHANT_A), event_request(KitchenEventType::Inicio))
        .await
        .expect("create");

    let corrected = ctx
        .services
        .kitchen_events
        .update(
            Some(MERCHANT_A),
            event.id,
            UpdateKitchenEventRequest {
                event_type: Some(KitchenEventType::Cancelado),
                message: Some("entrada equivocada".to_string()),
                ..Default::default()
            },
        )
        .await
        .expect("update");
    assert_eq!(corrected.event_type, KitchenEventType::Cancelado);
    assert_eq!(corrected.message.as_deref(), Some("entrada equivocada"));

    ctx.services
        .kitchen_events
        .remove(Some(MERCHANT_A), event.id)
        .await
        .expect("remove");

    let err = ctx
        .services
        .kitchen_events
        .remove(Some(MERCHANT_A), event.id)
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Kitchen event is already deleted");

    let err = ctx
        .services
        .kitchen_events
        .update(
            Some(MERCHANT_A),
            event.id,
            UpdateKitchenEventRequest::default(),
        )
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::Conflict(_));
}

#[tokio::test]
async fn list_filters_by_event_type_sorted_by_event_time_desc() {
    let ctx = setup().await;
    let base = Utc::now();

    for (event_type, offset) in [
        (KitchenEventType::Listo, 10),
        (KitchenEventType::Inicio, 5),
        (KitchenEventType::Listo, 30),
        (KitchenEventType::Servido, 15),
        (KitchenEventType::Listo, 20),
    ] {
        ctx.services
            .kitchen_events
            .create(
                Some(MERCHANT_A),
                CreateKitchenEventRequest {
                    event_time: Some(base + Duration::seconds(offset)),
                    ..event_request(event_type)
                },
            )
            .await
            .expect("create");
    }

    let page = ctx
        .services
        .kitchen_events
        .find_all(
            Some(MERCHANT_A),
            PageParams::default(),
            KitchenEventFilter {
                event_type: Some(KitchenEventType::Listo),
                ..Default::default()
            },
        )
        .await
        .expect("find_all");

    assert_eq!(page.pagination_meta.total, 3);
    assert!(page
        .data
        .iter()
        .all(|e| e.event_type == KitchenEventType::Listo));
    let times: Vec<_> = page.data.iter().map(|e| e.event_time).collect();
    let mut sorted = times.clone();
    sorted.sort_by(|a, b| b.cmp(a));
    assert_eq!(times, sorted, "default sort is event time descending");
}

#[tokio::test]
async fn message_length_is_bounded() {
    let ctx = setup().await;
    let err = ctx
        .services
        .kitchen_events
        .create(
            Some(MERCHANT_A),
            CreateKitchenEventRequest {
                message: Some("x".repeat(1001)),
                ..event_request(KitchenEventType::Inicio)
            },
        )
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::ValidationError(_));
}
