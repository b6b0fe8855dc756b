//! Kitchen Ops API Library
//!
//! Multi-tenant kitchen order workflow service: kitchen orders, their
//! preparation line items, and the kitchen event log.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod auth;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod middleware_helpers;
pub mod migrator;
pub mod openapi;
pub mod services;

use std::str::FromStr;
use std::sync::Arc;

use axum::{routing::get, routing::post, Router};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::errors::ServiceError;

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: Arc<config::AppConfig>,
    pub event_sender: Option<Arc<events::EventSender>>,
    pub services: handlers::AppServices,
}

impl AppState {
    pub fn new(
        db: Arc<DatabaseConnection>,
        config: Arc<config::AppConfig>,
        event_sender: Option<Arc<events::EventSender>>,
    ) -> Self {
        let services = handlers::AppServices::new(db.clone(), event_sender.clone());
        Self {
            db,
            config,
            event_sender,
            services,
        }
    }
}

/// Common query parameters for list endpoints. Raw values; `validated`
/// applies defaults and rejects out-of-range input before any storage access.
#[derive(Debug, Clone, Copy, Default, Deserialize, ToSchema)]
pub struct PageParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl PageParams {
    pub fn validated(self) -> Result<ValidatedPage, ServiceError> {
        let page = self.page.unwrap_or(1);
        if page < 1 {
            return Err(ServiceError::BadRequest(
                "Page must be at least 1".to_string(),
            ));
        }
        let limit = self.limit.unwrap_or(10);
        if !(1..=100).contains(&limit) {
            return Err(ServiceError::BadRequest(
                "Limit must be between 1 and 100".to_string(),
            ));
        }
        Ok(ValidatedPage {
            page: page as u64,
            limit: limit as u64,
        })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ValidatedPage {
    pub page: u64,
    pub limit: u64,
}

/// Sort direction accepted by list endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum SortOrder {
    #[serde(rename = "ASC", alias = "asc")]
    Asc,
    #[serde(rename = "DESC", alias = "desc")]
    Desc,
}

impl FromStr for SortOrder {
    type Err = ServiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ASC" | "asc" => Ok(Self::Asc),
            "DESC" | "desc" => Ok(Self::Desc),
            _ => Err(ServiceError::BadRequest(
                "Sort order must be ASC or DESC".to_string(),
            )),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMeta {
    pub page: u64,
    pub limit: u64,
    pub total: u64,
    pub total_pages: u64,
    pub has_next: bool,
    pub has_prev: bool,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub pagination_meta: PaginationMeta,
}

impl<T> PaginatedResponse<T> {
    pub fn new(data: Vec<T>, page: &ValidatedPage, total: u64) -> Self {
        let total_pages = total.div_ceil(page.limit);
        Self {
            data,
            pagination_meta: PaginationMeta {
                page: page.page,
                limit: page.limit,
                total,
                total_pages,
                has_next: page.page < total_pages,
                has_prev: page.page > 1,
            },
        }
    }
}

pub fn api_v1_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/kitchen-orders",
            post(handlers::kitchen_orders::create_kitchen_order)
                .get(handlers::kitchen_orders::list_kitchen_orders),
        )
        .route(
            "/kitchen-orders/:id",
            get(handlers::kitchen_orders::get_kitchen_order)
                .put(handlers::kitchen_orders::update_kitchen_order)
                .delete(handlers::kitchen_orders::delete_kitchen_order),
        )
        .route(
            "/kitchen-orders/:id/start",
            post(handlers::kitchen_orders::start_kitchen_order),
        )
        .route(
            "/kitchen-orders/:id/complete",
            post(handlers::kitchen_orders::complete_kitchen_order),
        )
        .route(
            "/kitchen-orders/:id/cancel",
            post(handlers::kitchen_orders::cancel_kitchen_order),
        )
        .route(
            "/kitchen-order-items",
            post(handlers::kitchen_order_items::create_kitchen_order_item)
                .get(handlers::kitchen_order_items::list_kitchen_order_items),
        )
        .route(
            "/kitchen-order-items/:id",
            get(handlers::kitchen_order_items::get_kitchen_order_item)
                .put(handlers::kitchen_order_items::update_kitchen_order_item)
                .delete(handlers::kitchen_order_items::delete_kitchen_order_item),
        )
        .route(
            "/kitchen-events",
            post(handlers::kitchen_event_logs::create_kitchen_event)
                .get(handlers::kitchen_event_logs::list_kitchen_events),
        )
        .route(
            "/kitchen-events/:id",
            get(handlers::kitchen_event_logs::get_kitchen_event)
                .put(handlers::kitchen_event_logs::update_kitchen_event)
                .delete(handlers::kitchen_event_logs::delete_kitchen_event),
        )
        .route("/health", get(handlers::health::health_check))
        .route("/status", get(handlers::health::service_status))
}
