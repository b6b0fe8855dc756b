pub mod common;
pub mod health;
pub mod kitchen_event_logs;
pub mod kitchen_order_items;
pub mod kitchen_orders;

use std::sync::Arc;

use crate::db::DbPool;
use crate::events::EventSender;
use crate::services::{
    kitchen_event_logs::KitchenEventLogService, kitchen_order_items::KitchenOrderItemService,
    kitchen_orders::KitchenOrderService, workflow::KitchenWorkflowService,
};

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub kitchen_orders: Arc<KitchenOrderService>,
    pub kitchen_order_items: Arc<KitchenOrderItemService>,
    pub kitchen_events: Arc<KitchenEventLogService>,
    pub workflow: Arc<KitchenWorkflowService>,
}

impl AppServices {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Option<Arc<EventSender>>) -> Self {
        let kitchen_orders = KitchenOrderService::new(db_pool.clone(), event_sender.clone());
        let kitchen_order_items =
            KitchenOrderItemService::new(db_pool.clone(), event_sender.clone());
        let kitchen_events = KitchenEventLogService::new(db_pool, event_sender);
        let workflow = Arc::new(KitchenWorkflowService::new(
            kitchen_orders.clone(),
            kitchen_events.clone(),
        ));

        Self {
            kitchen_orders: Arc::new(kitchen_orders),
            kitchen_order_items: Arc::new(kitchen_order_items),
            kitchen_events: Arc::new(kitchen_events),
            workflow,
        }
    }
}
