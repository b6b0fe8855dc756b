use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::instrument;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    auth::require_merchant,
    entities::{KitchenEventType, KitchenOrderStatus},
    errors::ServiceError,
    services::kitchen_event_logs::{CreateKitchenEventRequest, KitchenEventLogService},
    services::kitchen_orders::{
        KitchenOrderResponse, KitchenOrderService, UpdateKitchenOrderRequest,
    },
};

/// Lifecycle transitions driven through the workflow layer. Each one moves
/// `business_status`, derives the matching timestamp, and records an event
/// log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowTransition {
    Start,
    Complete,
    Cancel,
}

impl WorkflowTransition {
    pub fn target_status(self) -> KitchenOrderStatus {
        match self {
            Self::Start => KitchenOrderStatus::Started,
            Self::Complete => KitchenOrderStatus::Completed,
            Self::Cancel => KitchenOrderStatus::Cancelled,
        }
    }

    pub fn event_type(self) -> KitchenEventType {
        match self {
            Self::Start => KitchenEventType::Inicio,
            Self::Complete => KitchenEventType::Listo,
            Self::Cancel => KitchenEventType::Cancelado,
        }
    }

    fn verb(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Complete => "complete",
            Self::Cancel => "cancel",
        }
    }
}

/// Optional context attached to the event log entry a transition writes.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransitionContext {
    pub station_id: Option<i64>,
    pub user_id: Option<i64>,
    pub event_time: Option<DateTime<Utc>>,
    #[validate(length(max = 1000))]
    pub message: Option<String>,
}

/// Whether `from -> to` is an edge of the intended lifecycle.
pub fn transition_allowed(from: KitchenOrderStatus, to: KitchenOrderStatus) -> bool {
    use KitchenOrderStatus::*;
    matches!(
        (from, to),
        (Pending, Started) | (Started, Completed) | (Pending, Cancelled) | (Started, Cancelled)
    )
}

/// Derives the lifecycle timestamps implied by a business-status change.
///
/// `started_at` is stamped the first time an order leaves `pending`;
/// `completed_at` is stamped when it becomes `completed`. A timestamp the
/// caller supplies explicitly always wins over the derived one. Returns
/// `(started_at, completed_at)` values to apply, `None` meaning leave as is.
pub fn derive_lifecycle_timestamps(
    old_status: KitchenOrderStatus,
    new_status: KitchenOrderStatus,
    explicit_started_at: Option<DateTime<Utc>>,
    explicit_completed_at: Option<DateTime<Utc>>,
    existing_started_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> (Option<DateTime<Utc>>, Option<DateTime<Utc>>) {
    let started_at = explicit_started_at.or({
        if old_status == KitchenOrderStatus::Pending
            && new_status != KitchenOrderStatus::Pending
            && existing_started_at.is_none()
        {
            Some(now)
        } else {
            None
        }
    });
    let completed_at = explicit_completed_at.or({
        if new_status == KitchenOrderStatus::Completed && old_status != KitchenOrderStatus::Completed
        {
            Some(now)
        } else {
            None
        }
    });
    (started_at, completed_at)
}

/// Composition point for kitchen order lifecycle operations: consults the
/// order store for scoped state, enforces the transition model, and appends
/// the matching event log entry.
#[derive(Clone)]
pub struct KitchenWorkflowService {
    orders: KitchenOrderService,
    event_logs: KitchenEventLogService,
}

impl KitchenWorkflowService {
    pub fn new(orders: KitchenOrderService, event_logs: KitchenEventLogService) -> Self {
        Self { orders, event_logs }
    }

    /// Applies a lifecycle transition to a kitchen order and records the
    /// corresponding event. Rejects edges outside the lifecycle model with
    /// `Conflict`.
    #[instrument(skip(self, context), fields(merchant_id = ?caller_merchant_id, kitchen_order_id = id, transition = ?transition))]
    pub async fn transition(
        &self,
        caller_merchant_id: Option<i64>,
        id: i64,
        transition: WorkflowTransition,
        context: TransitionContext,
    ) -> Result<KitchenOrderResponse, ServiceError> {
        context.validate()?;
        let merchant_id = require_merchant(caller_merchant_id)?;
        let current = self.orders.find_scoped(caller_merchant_id, id).await?;
        let target = transition.target_status();

        if !transition_allowed(current.business_status, target) {
            return Err(ServiceError::Conflict(format!(
                "Cannot {} a kitchen order in status {}",
                transition.verb(),
                current.business_status.as_str()
            )));
        }

        // Bad context references must not leave the order half-transitioned.
        self.event_logs
            .validate_references(merchant_id, None, None, context.station_id, context.user_id)
            .await?;

        let now = Utc::now();
        let (started_at, completed_at) = derive_lifecycle_timestamps(
            current.business_status,
            target,
            None,
            None,
            current.started_at,
            now,
        );

        let updated = self
            .orders
            .update(
                caller_merchant_id,
                id,
                UpdateKitchenOrderRequest {
                    business_status: Some(target),
                    started_at,
                    completed_at,
                    ..Default::default()
                },
            )
            .await?;

        self.event_logs
            .create(
                caller_merchant_id,
                CreateKitchenEventRequest {
                    kitchen_order_id: Some(id),
                    kitchen_order_item_id: None,
                    station_id: context.station_id,
                    user_id: context.user_id,
                    event_type: transition.event_type(),
                    event_time: context.event_time,
                    message: context.message,
                },
            )
            .await?;

        Ok(updated)
    }

    /// Plain field update that keeps the lifecycle timestamps consistent when
    /// the request moves `business_status` without supplying them.
    #[instrument(skip(self, request), fields(merchant_id = ?caller_merchant_id, kitchen_order_id = id))]
    pub async fn update_order(
        &self,
        caller_merchant_id: Option<i64>,
        id: i64,
        mut request: UpdateKitchenOrderRequest,
    ) -> Result<KitchenOrderResponse, ServiceError> {
        if let Some(new_status) = request.business_status {
            let current = self.orders.find_scoped(caller_merchant_id, id).await?;
            if new_status != current.business_status {
                if current.business_status.is_terminal() {
                    return Err(ServiceError::Conflict(format!(
                        "Kitchen order in status {} cannot change status",
                        current.business_status.as_str()
                    )));
                }
                let (started_at, completed_at) = derive_lifecycle_timestamps(
                    current.business_status,
                    new_status,
                    request.started_at,
                    request.completed_at,
                    current.started_at,
                    Utc::now(),
                );
                request.started_at = started_at;
                request.completed_at = completed_at;
            }
        }
        self.orders.update(caller_merchant_id, id, request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;

    fn t(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[rstest]
    #[case(KitchenOrderStatus::Pending, KitchenOrderStatus::Started, true)]
    #[case(KitchenOrderStatus::Pending, KitchenOrderStatus::Cancelled, true)]
    #[case(KitchenOrderStatus::Started, KitchenOrderStatus::Completed, true)]
    #[case(KitchenOrderStatus::Started, KitchenOrderStatus::Cancelled, true)]
    #[case(KitchenOrderStatus::Pending, KitchenOrderStatus::Completed, false)]
    #[case(KitchenOrderStatus::Completed, KitchenOrderStatus::Started, false)]
    #[case(KitchenOrderStatus::Cancelled, KitchenOrderStatus::Started, false)]
    #[case(KitchenOrderStatus::Completed, KitchenOrderStatus::Cancelled, false)]
    fn lifecycle_edges(
        #[case] from: KitchenOrderStatus,
        #[case] to: KitchenOrderStatus,
        #[case] allowed: bool,
    ) {
        assert_eq!(transition_allowed(from, to), allowed);
    }

    #[test]
    fn leaving_pending_stamps_started_at() {
        let now = t(1_000);
        let (started, completed) = derive_lifecycle_timestamps(
            KitchenOrderStatus::Pending,
            KitchenOrderStatus::Started,
            None,
            None,
            None,
            now,
        );
        assert_eq!(started, Some(now));
        assert_eq!(completed, None);
    }

    #[test]
    fn completing_stamps_completed_at() {
        let now = t(2_000);
        let (started, completed) = derive_lifecycle_timestamps(
            KitchenOrderStatus::Started,
            KitchenOrderStatus::Completed,
            None,
            None,
            Some(t(1_000)),
            now,
        );
        assert_eq!(started, None);
        assert_eq!(completed, Some(now));
    }

    #[test]
    fn explicit_timestamps_win_over_derived() {
        let explicit = t(500);
        let (started, completed) = derive_lifecycle_timestamps(
            KitchenOrderStatus::Pending,
            KitchenOrderStatus::Completed,
            Some(explicit),
            Some(explicit),
            None,
            t(9_000),
        );
        assert_eq!(started, Some(explicit));
        assert_eq!(completed, Some(explicit));
    }

    #[test]
    fn existing_started_at_is_not_overwritten() {
        let (started, _) = derive_lifecycle_timestamps(
            KitchenOrderStatus::Pending,
            KitchenOrderStatus::Started,
            None,
            None,
            Some(t(100)),
            t(5_000),
        );
        assert_eq!(started, None);
    }

    #[test]
    fn cancelling_from_pending_stamps_started_but_not_completed() {
        let now = t(3_000);
        let (started, completed) = derive_lifecycle_timestamps(
            KitchenOrderStatus::Pending,
            KitchenOrderStatus::Cancelled,
            None,
            None,
            None,
            now,
        );
        assert_eq!(started, Some(now));
        assert_eq!(completed, None);
    }
}
