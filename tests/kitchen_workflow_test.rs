mod common;

use assert_matches::assert_matches;
use common::{seed_kitchen_order, seed_station, seed_user, setup, MERCHANT_A, MERCHANT_B};
use kitchen_ops_api::entities::{KitchenEventType, KitchenOrderStatus};
use kitchen_ops_api::errors::ServiceError;
use kitchen_ops_api::services::kitchen_event_logs::KitchenEventFilter;
use kitchen_ops_api::services::kitchen_orders::UpdateKitchenOrderRequest;
use kitchen_ops_api::services::workflow::{TransitionContext, WorkflowTransition};
use kitchen_ops_api::PageParams;

#[tokio::test]
async fn start_then_complete_stamps_timestamps_and_records_events() {
    let ctx = setup().await;
    let id = seed_kitchen_order(&ctx, MERCHANT_A).await;
    let station = seed_station(&ctx.db, MERCHANT_A, "Horno").await;
    let user = seed_user(&ctx.db, Some(MERCHANT_A), "chef@example.com").await;

    let started = ctx
        .services
        .workflow
        .transition(
            Some(MERCHANT_A),
            id,
            WorkflowTransition::Start,
            TransitionContext {
                station_id: Some(station),
                user_id: Some(user),
                ..Default::default()
            },
        )
        .await
        .expect("start");
    assert_eq!(started.business_status, KitchenOrderStatus::Started);
    assert!(started.started_at.is_some());
    assert!(started.completed_at.is_none());

    let completed = ctx
        .services
        .workflow
        .transition(
            Some(MERCHANT_A),
            id,
            WorkflowTransition::Complete,
            TransitionContext::default(),
        )
        .await
        .expect("complete");
    assert_eq!(completed.business_status, KitchenOrderStatus::Completed);
    assert_eq!(completed.started_at, started.started_at);
    assert!(completed.completed_at.is_some());

    // Each transition appended an event for this order.
    let events = ctx
        .services
        .kitchen_events
        .find_all(
            Some(MERCHANT_A),
            PageParams::default(),
            KitchenEventFilter {
                kitchen_order_id: Some(id),
                ..Default::default()
            },
        )
        .await
        .expect("events");
    let mut types: Vec<KitchenEventType> = events.data.iter().map(|e| e.event_type).collect();
    types.sort_by_key(|t| format!("{t:?}"));
    assert_eq!(types, vec![KitchenEventType::Inicio, KitchenEventType::Listo]);
}

#[tokio::test]
async fn illegal_transitions_conflict() {
    let ctx = setup().await;
    let id = seed_kitchen_order(&ctx, MERCHANT_A).await;

    // Completing straight from pending skips the started state.
    let err = ctx
        .services
        .workflow
        .transition(
            Some(MERCHANT_A),
            id,
            WorkflowTransition::Complete,
            TransitionContext::default(),
        )
        .await
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Cannot complete a kitchen order in status pending"
    );

    ctx.services
        .workflow
        .transition(
            Some(MERCHANT_A),
            id,
            WorkflowTransition::Cancel,
            TransitionContext::default(),
        )
        .await
        .expect("cancel from pending");

    // Terminal states accept no further transitions.
    for transition in [
        WorkflowTransition::Start,
        WorkflowTransition::Complete,
        WorkflowTransition::Cancel,
    ] {
        let err = ctx
            .services
            .workflow
            .transition(
                Some(MERCHANT_A),
                id,
                transition,
                TransitionContext::default(),
            )
            .await
            .unwrap_err();
        assert_matches!(err, ServiceError::Conflict(_));
    }
}

#[tokio::test]
async fn cancellation_records_cancelado_event() {
    let ctx = setup().await;
    let id = seed_kitchen_order(&ctx, MERCHANT_A).await;

    ctx.services
        .workflow
        .transition(
            Some(MERCHANT_A),
            id,
            WorkflowTransition::Start,
            TransitionContext::default(),
        )
        .await
        .expect("start");
    let cancelled = ctx
        .services
        .workflow
        .transition(
            Some(MERCHANT_A),
            id,
            WorkflowTransition::Cancel,
            TransitionContext {
                message: Some("cliente se fue".to_string()),
                ..Default::default()
            },
        )
        .await
        .expect("cancel");
    assert_eq!(cancelled.business_status, KitchenOrderStatus::Cancelled);

    let events = ctx
        .services
        .kitchen_events
        .find_all(
            Some(MERCHANT_A),
            PageParams::default(),
            KitchenEventFilter {
                kitchen_order_id: Some(id),
                event_type: Some(KitchenEventType::Cancelado),
                ..Default::default()
            },
        )
        .await
        .expect("events");
    assert_eq!(events.pagination_meta.total, 1);
    assert_eq!(events.data[0].message.as_deref(), Some("cliente se fue"));
}

#[tokio::test]
async fn plain_update_derives_timestamps_on_status_change() {
    let ctx = setup().await;
    let id = seed_kitchen_order(&ctx, MERCHANT_A).await;

    let updated = ctx
        .services
        .workflow
        .update_order(
            Some(MERCHANT_A),
            id,
            UpdateKitchenOrderRequest {
                business_status: Some(KitchenOrderStatus::Started),
                priority: Some(9),
                ..Default::default()
            },
        )
        .await
        .expect("update");
    assert_eq!(updated.business_status, KitchenOrderStatus::Started);
    assert_eq!(updated.priority, 9);
    assert!(
        updated.started_at.is_some(),
        "leaving pending stamps started_at even on a plain update"
    );

    // A terminal order refuses further status changes through update too.
    ctx.services
        .workflow
        .transition(
            Some(MERCHANT_A),
            id,
            WorkflowTransition::Complete,
            TransitionContext::default(),
        )
        .await
        .expect("complete");
    let err = ctx
        .services
        .workflow
        .update_order(
            Some(MERCHANT_A),
            id,
            UpdateKitchenOrderRequest {
                business_status: Some(KitchenOrderStatus::Pending),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::Conflict(_));

    // Non-status fields are still editable on a terminal order.
    let renotes = ctx
        .services
        .workflow
        .update_order(
            Some(MERCHANT_A),
            id,
            UpdateKitchenOrderRequest {
                notes: Some("sin cebolla".to_string()),
                ..Default::default()
            },
        )
        .await
        .expect("notes update");
    assert_eq!(renotes.notes.as_deref(), Some("sin cebolla"));
}

#[tokio::test]
async fn bad_context_reference_leaves_the_order_untouched() {
    let ctx = setup().await;
    let id = seed_kitchen_order(&ctx, MERCHANT_A).await;

    let err = ctx
        .services
        .workflow
        .transition(
            Some(MERCHANT_A),
            id,
            WorkflowTransition::Start,
            TransitionContext {
                station_id: Some(9999),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::NotFound(_));

    // The order did not move, so a corrected retry still starts it.
    let current = ctx
        .services
        .kitchen_orders
        .find_one(Some(MERCHANT_A), id)
        .await
        .expect("find_one");
    assert_eq!(current.business_status, KitchenOrderStatus::Pending);
    assert!(current.started_at.is_none());

    let started = ctx
        .services
        .workflow
        .transition(
            Some(MERCHANT_A),
            id,
            WorkflowTransition::Start,
            TransitionContext::default(),
        )
        .await
        .expect("retry start");
    assert_eq!(started.business_status, KitchenOrderStatus::Started);
}

#[tokio::test]
async fn transitions_are_tenant_scoped() {
    let ctx = setup().await;
    let id = seed_kitchen_order(&ctx, MERCHANT_A).await;

    let err = ctx
        .services
        .workflow
        .transition(
            Some(MERCHANT_B),
            id,
            WorkflowTransition::Start,
            TransitionContext::default(),
        )
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::NotFound(_));
}
