use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::entities::{KitchenEventType, KitchenOrderStatus};

/// Domain events emitted after successful workflow mutations.
///
/// These are in-process only: a logging consumer drains the channel. Kitchen
/// display notification delivery is explicitly out of scope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    KitchenOrderCreated(i64),
    KitchenOrderUpdated(i64),
    KitchenOrderDeleted(i64),
    KitchenOrderStatusChanged {
        kitchen_order_id: i64,
        old_status: KitchenOrderStatus,
        new_status: KitchenOrderStatus,
    },
    KitchenOrderItemCreated(i64),
    KitchenOrderItemUpdated(i64),
    KitchenOrderItemDeleted(i64),
    KitchenEventRecorded {
        event_log_id: i64,
        event_type: KitchenEventType,
    },
    KitchenEventCorrected(i64),
    KitchenEventDeleted(i64),
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event; failures are reported, not raised. An event that
    /// cannot be delivered must never fail the mutation that produced it.
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }
}

/// Drains the event channel, logging each event. Runs until every sender is
/// dropped.
pub async fn process_events(mut receiver: mpsc::Receiver<Event>) {
    info!("Event processor started");
    while let Some(event) = receiver.recv().await {
        match &event {
            Event::KitchenOrderStatusChanged {
                kitchen_order_id,
                old_status,
                new_status,
            } => info!(
                kitchen_order_id,
                ?old_status,
                ?new_status,
                "kitchen order status changed"
            ),
            Event::KitchenEventRecorded {
                event_log_id,
                event_type,
            } => info!(event_log_id, ?event_type, "kitchen event recorded"),
            other => info!(event = ?other, "domain event"),
        }
    }
    warn!("Event processor stopped: all senders dropped");
}
