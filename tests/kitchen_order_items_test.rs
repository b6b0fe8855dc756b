mod common;

use assert_matches::assert_matches;
use common::{
    seed_kitchen_order, seed_order, seed_order_item, seed_product, seed_variant, setup, MERCHANT_A,
    MERCHANT_B,
};
use kitchen_ops_api::entities::RecordStatus;
use kitchen_ops_api::errors::ServiceError;
use kitchen_ops_api::services::kitchen_order_items::{
    CreateKitchenOrderItemRequest, KitchenOrderItemFilter, UpdateKitchenOrderItemRequest,
};
use kitchen_ops_api::PageParams;

fn create_request(kitchen_order_id: i64, product_id: i64) -> CreateKitchenOrderItemRequest {
    CreateKitchenOrderItemRequest {
        kitchen_order_id,
        order_item_id: None,
        product_id,
        variant_id: None,
        quantity: 1,
        prepared_quantity: None,
        started_at: None,
        completed_at: None,
        notes: None,
    }
}

#[tokio::test]
async fn create_defaults_prepared_quantity_and_round_trips() {
    let ctx = setup().await;
    let kitchen_order = seed_kitchen_order(&ctx, MERCHANT_A).await;
    let product = seed_product(&ctx.db, "Tacos al pastor").await;
    let variant = seed_variant(&ctx.db, product, "Orden grande").await;
    let pos_order = seed_order(&ctx.db, MERCHANT_A).await;
    let order_item = seed_order_item(&ctx.db, pos_order, Some(product)).await;

    let created = ctx
        .services
        .kitchen_order_items
        .create(
            Some(MERCHANT_A),
            CreateKitchenOrderItemRequest {
                quantity: 2,
                variant_id: Some(variant),
                order_item_id: Some(order_item),
                ..create_request(kitchen_order, product)
            },
        )
        .await
        .expect("create");

    assert_eq!(created.quantity, 2);
    assert_eq!(created.prepared_quantity, 0);
    assert_eq!(created.status, RecordStatus::Active);

    let fetched = ctx
        .services
        .kitchen_order_items
        .find_one(Some(MERCHANT_A), created.id)
        .await
        .expect("find_one");
    assert_eq!(fetched.kitchen_order.id, kitchen_order);
    assert_eq!(fetched.order_item.as_ref().map(|s| s.id), Some(order_item));
    let product_summary = fetched.product.expect("product summary");
    assert_eq!(product_summary.name, "Tacos al pastor");
    let variant_summary = fetched.variant.expect("variant summary");
    assert_eq!(variant_summary.id, variant);
}

#[tokio::test]
async fn quantity_invariant_holds_across_create_and_update() {
    let ctx = setup().await;
    let kitchen_order = seed_kitchen_order(&ctx, MERCHANT_A).await;
    let product = seed_product(&ctx.db, "Quesadilla").await;

    let err = ctx
        .services
        .kitchen_order_items
        .create(
            Some(MERCHANT_A),
            CreateKitchenOrderItemRequest {
                quantity: 2,
                prepared_quantity: Some(5),
                ..create_request(kitchen_order, product)
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Prepared quantity cannot exceed quantity");

    let item = ctx
        .services
        .kitchen_order_items
        .create(
            Some(MERCHANT_A),
            CreateKitchenOrderItemRequest {
                quantity: 5,
                prepared_quantity: Some(4),
                ..create_request(kitchen_order, product)
            },
        )
        .await
        .expect("create");

    // Lowering quantity below the stored prepared quantity is the same
    // violation, even though prepared was untouched in this call.
    let err = ctx
        .services
        .kitchen_order_items
        .update(
            Some(MERCHANT_A),
            item.id,
            UpdateKitchenOrderItemRequest {
                quantity: Some(2),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Prepared quantity cannot exceed quantity");

    let err = ctx
        .services
        .kitchen_order_items
        .update(
            Some(MERCHANT_A),
            item.id,
            UpdateKitchenOrderItemRequest {
                prepared_quantity: Some(-1),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Prepared quantity cannot be negative");

    // No partial write happened.
    let fetched = ctx
        .services
        .kitchen_order_items
        .find_one(Some(MERCHANT_A), item.id)
        .await
        .expect("find_one");
    assert_eq!(fetched.quantity, 5);
    assert_eq!(fetched.prepared_quantity, 4);
}

#[tokio::test]
async fn variant_must_belong_to_product() {
    let ctx = setup().await;
    let kitchen_order = seed_kitchen_order(&ctx, MERCHANT_A).await;
    let product = seed_product(&ctx.db, "Torta").await;
    let other_product = seed_product(&ctx.db, "Pozole").await;
    let foreign_variant = seed_variant(&ctx.db, other_product, "Chico").await;

    let err = ctx
        .services
        .kitchen_order_items
        .create(
            Some(MERCHANT_A),
            CreateKitchenOrderItemRequest {
                variant_id: Some(foreign_variant),
                ..create_request(kitchen_order, product)
            },
        )
        .await
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Variant does not belong to the specified product"
    );
}

#[tokio::test]
async fn items_are_scoped_through_the_parent_order() {
    let ctx = setup().await;
    let kitchen_order = seed_kitchen_order(&ctx, MERCHANT_A).await;
    let product = seed_product(&ctx.db, "Sopa").await;

    let item = ctx
        .services
        .kitchen_order_items
        .create(Some(MERCHANT_A), create_request(kitchen_order, product))
        .await
        .expect("create");

    let err = ctx
        .services
        .kitchen_order_items
        .find_one(Some(MERCHANT_B), item.id)
        .await
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Kitchen order item not found or you do not have access to it"
    );

    // Attaching an item to another merchant's kitchen order is also a miss.
    let foreign_order = seed_kitchen_order(&ctx, MERCHANT_B).await;
    let err = ctx
        .services
        .kitchen_order_items
        .create(Some(MERCHANT_A), create_request(foreign_order, product))
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::NotFound(_));
}

#[tokio::test]
async fn double_remove_conflicts_with_exact_message() {
    let ctx = setup().await;
    let kitchen_order = seed_kitchen_order(&ctx, MERCHANT_A).await;
    let product = seed_product(&ctx.db, "Flan").await;
    let item = ctx
        .services
        .kitchen_order_items
        .create(Some(MERCHANT_A), create_request(kitchen_order, product))
        .await
        .expect("create");

    ctx.services
        .kitchen_order_items
        .remove(Some(MERCHANT_A), item.id)
        .await
        .expect("first remove");

    let err = ctx
        .services
        .kitchen_order_items
        .remove(Some(MERCHANT_A), item.id)
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Kitchen order item is already deleted");
}

#[tokio::test]
async fn list_filters_by_parent_order() {
    let ctx = setup().await;
    let order_a = seed_kitchen_order(&ctx, MERCHANT_A).await;
    let order_b = seed_kitchen_order(&ctx, MERCHANT_A).await;
    let product = seed_product(&ctx.db, "Agua fresca").await;

    for order in [order_a, order_a, order_b] {
        ctx.services
            .kitchen_order_items
            .create(Some(MERCHANT_A), create_request(order, product))
            .await
            .expect("create");
    }

    let page = ctx
        .services
        .kitchen_order_items
        .find_all(
            Some(MERCHANT_A),
            PageParams::default(),
            KitchenOrderItemFilter {
                kitchen_order_id: Some(order_a),
                ..Default::default()
            },
        )
        .await
        .expect("find_all");
    assert_eq!(page.pagination_meta.total, 2);
    assert!(page.data.iter().all(|i| i.kitchen_order_id == order_a));

    // A different merchant sees none of them.
    let empty = ctx
        .services
        .kitchen_order_items
        .find_all(
            Some(MERCHANT_B),
            PageParams::default(),
            KitchenOrderItemFilter::default(),
        )
        .await
        .expect("find_all");
    assert_eq!(empty.pagination_meta.total, 0);
}

#[tokio::test]
async fn list_filters_by_source_item_and_variant() {
    let ctx = setup().await;
    let kitchen_order = seed_kitchen_order(&ctx, MERCHANT_A).await;
    let product = seed_product(&ctx.db, "Enchiladas").await;
    let variant = seed_variant(&ctx.db, product, "Verdes").await;
    let pos_order = seed_order(&ctx.db, MERCHANT_A).await;
    let order_item = seed_order_item(&ctx.db, pos_order, Some(product)).await;

    ctx.services
        .kitchen_order_items
        .create(
            Some(MERCHANT_A),
            CreateKitchenOrderItemRequest {
                variant_id: Some(variant),
                order_item_id: Some(order_item),
                ..create_request(kitchen_order, product)
            },
        )
        .await
        .expect("create with refs");
    ctx.services
        .kitchen_order_items
        .create(Some(MERCHANT_A), create_request(kitchen_order, product))
        .await
        .expect("create bare");

    let by_variant = ctx
        .services
        .kitchen_order_items
        .find_all(
            Some(MERCHANT_A),
            PageParams::default(),
            KitchenOrderItemFilter {
                variant_id: Some(variant),
                ..Default::default()
            },
        )
        .await
        .expect("find_all by variant");
    assert_eq!(by_variant.pagination_meta.total, 1);
    assert_eq!(by_variant.data[0].variant_id, Some(variant));

    let by_source = ctx
        .services
        .kitchen_order_items
        .find_all(
            Some(MERCHANT_A),
            PageParams::default(),
            KitchenOrderItemFilter {
                order_item_id: Some(order_item),
                ..Default::default()
            },
        )
        .await
        .expect("find_all by source item");
    assert_eq!(by_source.pagination_meta.total, 1);
    assert_eq!(by_source.data[0].order_item_id, Some(order_item));
}

#[tokio::test]
async fn attaching_to_deleted_parent_is_a_miss() {
    let ctx = setup().await;
    let kitchen_order = seed_kitchen_order(&ctx, MERCHANT_A).await;
    let product = seed_product(&ctx.db, "Tamal").await;

    ctx.services
        .kitchen_orders
        .remove(Some(MERCHANT_A), kitchen_order)
        .await
        .expect("remove parent");

    let err = ctx
        .services
        .kitchen_order_items
        .create(Some(MERCHANT_A), create_request(kitchen_order, product))
        .await
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Kitchen order not found or you do not have access to it"
    );
}
