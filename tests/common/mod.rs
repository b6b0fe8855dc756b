#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use sea_orm::{ActiveModelTrait, ConnectOptions, Database, Set};
use sea_orm_migration::MigratorTrait;

use kitchen_ops_api::db::DbPool;
use kitchen_ops_api::entities::{
    self, KitchenOrderStatus, RecordStatus,
};
use kitchen_ops_api::events::EventSender;
use kitchen_ops_api::handlers::AppServices;
use kitchen_ops_api::migrator::Migrator;
use kitchen_ops_api::services::kitchen_orders::CreateKitchenOrderRequest;

pub const MERCHANT_A: i64 = 101;
pub const MERCHANT_B: i64 = 202;

/// Service-level test harness over a fresh in-memory SQLite database.
pub struct TestCtx {
    pub db: Arc<DbPool>,
    pub services: AppServices,
    _event_task: tokio::task::JoinHandle<()>,
}

pub async fn setup() -> TestCtx {
    // Single connection so the shared in-memory database survives the pool.
    let mut opt = ConnectOptions::new("sqlite::memory:".to_string());
    opt.max_connections(1)
        .min_connections(1)
        .connect_timeout(Duration::from_secs(5))
        .sqlx_logging(false);
    let db = Database::connect(opt).await.expect("sqlite connection");
    Migrator::up(&db, None).await.expect("migrations");

    let db = Arc::new(db);
    let (tx, rx) = tokio::sync::mpsc::channel(64);
    let event_task = tokio::spawn(kitchen_ops_api::events::process_events(rx));
    let services = AppServices::new(db.clone(), Some(Arc::new(EventSender::new(tx))));

    TestCtx {
        db,
        services,
        _event_task: event_task,
    }
}

pub async fn seed_station(db: &DbPool, merchant_id: i64, name: &str) -> i64 {
    entities::kitchen_station::ActiveModel {
        merchant_id: Set(merchant_id),
        name: Set(name.to_string()),
        status: Set(RecordStatus::Active),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("seed station")
    .id
}

pub async fn seed_order(db: &DbPool, merchant_id: i64) -> i64 {
    entities::order::ActiveModel {
        merchant_id: Set(merchant_id),
        status: Set(RecordStatus::Active),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("seed order")
    .id
}

pub async fn seed_online_order(db: &DbPool, merchant_id: i64) -> i64 {
    entities::online_order::ActiveModel {
        merchant_id: Set(merchant_id),
        status: Set(RecordStatus::Active),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("seed online order")
    .id
}

pub async fn seed_product(db: &DbPool, name: &str) -> i64 {
    entities::product::ActiveModel {
        name: Set(name.to_string()),
        status: Set(RecordStatus::Active),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("seed product")
    .id
}

pub async fn seed_variant(db: &DbPool, product_id: i64, name: &str) -> i64 {
    entities::product_variant::ActiveModel {
        product_id: Set(product_id),
        name: Set(name.to_string()),
        status: Set(RecordStatus::Active),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("seed variant")
    .id
}

pub async fn seed_order_item(db: &DbPool, order_id: i64, product_id: Option<i64>) -> i64 {
    entities::order_item::ActiveModel {
        order_id: Set(order_id),
        product_id: Set(product_id),
        status: Set(RecordStatus::Active),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("seed order item")
    .id
}

pub async fn seed_user(db: &DbPool, merchant_id: Option<i64>, email: &str) -> i64 {
    entities::user::ActiveModel {
        merchant_id: Set(merchant_id),
        email: Set(email.to_string()),
        status: Set(RecordStatus::Active),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("seed user")
    .id
}

/// Creates a pending kitchen order for the merchant through the service layer.
pub async fn seed_kitchen_order(ctx: &TestCtx, merchant_id: i64) -> i64 {
    ctx.services
        .kitchen_orders
        .create(
            Some(merchant_id),
            CreateKitchenOrderRequest {
                business_status: Some(KitchenOrderStatus::Pending),
                ..Default::default()
            },
        )
        .await
        .expect("seed kitchen order")
        .id
}
