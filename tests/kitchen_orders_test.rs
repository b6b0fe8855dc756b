mod common;

use assert_matches::assert_matches;
use common::{
    seed_kitchen_order, seed_online_order, seed_order, seed_station, setup, MERCHANT_A, MERCHANT_B,
};
use kitchen_ops_api::entities::{KitchenOrderStatus, RecordStatus};
use kitchen_ops_api::errors::ServiceError;
use kitchen_ops_api::services::kitchen_orders::{
    CreateKitchenOrderRequest, KitchenOrderFilter, KitchenOrderSortBy, UpdateKitchenOrderRequest,
};
use kitchen_ops_api::{PageParams, SortOrder};

#[tokio::test]
async fn create_applies_defaults_and_round_trips() {
    let ctx = setup().await;
    let station_id = seed_station(&ctx.db, MERCHANT_A, "Grill").await;
    let order_id = seed_order(&ctx.db, MERCHANT_A).await;

    let created = ctx
        .services
        .kitchen_orders
        .create(
            Some(MERCHANT_A),
            CreateKitchenOrderRequest {
                order_id: Some(order_id),
                station_id: Some(station_id),
                notes: Some("rush".to_string()),
                ..Default::default()
            },
        )
        .await
        .expect("create");

    assert_eq!(created.merchant_id, MERCHANT_A);
    assert_eq!(created.priority, 0);
    assert_eq!(created.business_status, KitchenOrderStatus::Pending);
    assert_eq!(created.status, RecordStatus::Active);
    assert!(created.started_at.is_none());

    let fetched = ctx
        .services
        .kitchen_orders
        .find_one(Some(MERCHANT_A), created.id)
        .await
        .expect("find_one");
    assert_eq!(fetched.id, created.id);
    assert_eq!(fetched.order_id, Some(order_id));
    assert_eq!(fetched.notes.as_deref(), Some("rush"));
    let station = fetched.station.expect("station summary");
    assert_eq!(station.id, station_id);
    assert_eq!(station.name, "Grill");
}

#[tokio::test]
async fn create_rejects_unknown_references() {
    let ctx = setup().await;

    let err = ctx
        .services
        .kitchen_orders
        .create(
            Some(MERCHANT_A),
            CreateKitchenOrderRequest {
                order_id: Some(9999),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::NotFound(_));

    // A station owned by another merchant is indistinguishable from absent.
    let foreign_station = seed_station(&ctx.db, MERCHANT_B, "Fry").await;
    let err = ctx
        .services
        .kitchen_orders
        .create(
            Some(MERCHANT_A),
            CreateKitchenOrderRequest {
                station_id: Some(foreign_station),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::NotFound(_));
}

#[tokio::test]
async fn caller_without_merchant_is_forbidden() {
    let ctx = setup().await;
    let err = ctx
        .services
        .kitchen_orders
        .create(None, CreateKitchenOrderRequest::default())
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::Forbidden(_));
}

#[tokio::test]
async fn cross_tenant_lookup_is_not_found() {
    let ctx = setup().await;
    let id = seed_kitchen_order(&ctx, MERCHANT_A).await;

    let err = ctx
        .services
        .kitchen_orders
        .find_one(Some(MERCHANT_B), id)
        .await
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Kitchen order not found or you do not have access to it"
    );

    let err = ctx
        .services
        .kitchen_orders
        .update(
            Some(MERCHANT_B),
            id,
            UpdateKitchenOrderRequest {
                priority: Some(5),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::NotFound(_));

    let err = ctx
        .services
        .kitchen_orders
        .remove(Some(MERCHANT_B), id)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::NotFound(_));
}

#[tokio::test]
async fn double_remove_conflicts() {
    let ctx = setup().await;
    let id = seed_kitchen_order(&ctx, MERCHANT_A).await;

    ctx.services
        .kitchen_orders
        .remove(Some(MERCHANT_A), id)
        .await
        .expect("first remove");

    let err = ctx
        .services
        .kitchen_orders
        .remove(Some(MERCHANT_A), id)
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Kitchen order is already deleted");

    // Deleted rows also reject field updates.
    let err = ctx
        .services
        .kitchen_orders
        .update(
            Some(MERCHANT_A),
            id,
            UpdateKitchenOrderRequest {
                priority: Some(3),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::Conflict(_));
}

#[tokio::test]
async fn pagination_bounds_are_rejected() {
    let ctx = setup().await;

    for (page, limit) in [(Some(0), None), (Some(-1), None), (None, Some(0)), (None, Some(101))] {
        let err = ctx
            .services
            .kitchen_orders
            .find_all(
                Some(MERCHANT_A),
                PageParams { page, limit },
                KitchenOrderFilter::default(),
            )
            .await
            .unwrap_err();
        assert_matches!(err, ServiceError::BadRequest(_), "page={page:?} limit={limit:?}");
    }
}

#[tokio::test]
async fn list_scopes_filters_and_sorts() {
    let ctx = setup().await;
    let online_order = seed_online_order(&ctx.db, MERCHANT_A).await;

    for priority in [1, 5, 3] {
        ctx.services
            .kitchen_orders
            .create(
                Some(MERCHANT_A),
                CreateKitchenOrderRequest {
                    online_order_id: Some(online_order),
                    priority,
                    ..Default::default()
                },
            )
            .await
            .expect("create");
    }
    // Another merchant's order must never appear.
    seed_kitchen_order(&ctx, MERCHANT_B).await;

    let page = ctx
        .services
        .kitchen_orders
        .find_all(
            Some(MERCHANT_A),
            PageParams::default(),
            KitchenOrderFilter {
                online_order_id: Some(online_order),
                sort_by: Some(KitchenOrderSortBy::Priority),
                sort_order: Some(SortOrder::Desc),
                ..Default::default()
            },
        )
        .await
        .expect("find_all");

    assert_eq!(page.pagination_meta.total, 3);
    let priorities: Vec<i32> = page.data.iter().map(|o| o.priority).collect();
    assert_eq!(priorities, vec![5, 3, 1]);
    assert!(page.data.iter().all(|o| o.merchant_id == MERCHANT_A));
}

#[tokio::test]
async fn removed_orders_leave_default_listing() {
    let ctx = setup().await;
    let keep = seed_kitchen_order(&ctx, MERCHANT_A).await;
    let gone = seed_kitchen_order(&ctx, MERCHANT_A).await;
    ctx.services
        .kitchen_orders
        .remove(Some(MERCHANT_A), gone)
        .await
        .expect("remove");

    let page = ctx
        .services
        .kitchen_orders
        .find_all(
            Some(MERCHANT_A),
            PageParams::default(),
            KitchenOrderFilter::default(),
        )
        .await
        .expect("find_all");
    let ids: Vec<i64> = page.data.iter().map(|o| o.id).collect();
    assert!(ids.contains(&keep));
    assert!(!ids.contains(&gone));

    // Deleted rows remain reachable through an explicit status filter.
    let deleted = ctx
        .services
        .kitchen_orders
        .find_all(
            Some(MERCHANT_A),
            PageParams::default(),
            KitchenOrderFilter {
                status: Some(RecordStatus::Deleted),
                ..Default::default()
            },
        )
        .await
        .expect("find_all deleted");
    assert_eq!(deleted.pagination_meta.total, 1);
    assert_eq!(deleted.data[0].id, gone);
}
