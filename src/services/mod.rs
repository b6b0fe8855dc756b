pub mod kitchen_event_logs;
pub mod kitchen_order_items;
pub mod kitchen_orders;
pub mod quantity;
pub mod workflow;

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::Serialize;
use utoipa::ToSchema;

/// Half-open UTC interval `[start of day, start of next day)` for
/// day-granularity date filters.
pub(crate) fn day_bounds(date: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN));
    (start, start + Duration::days(1))
}

/// Bare id reference embedded in responses for linked entities.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct IdSummary {
    pub id: i64,
}

/// Id + display name summary (products, variants, stations).
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct NamedSummary {
    pub id: i64,
    pub name: String,
}

/// Id + email summary for acting users.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserSummary {
    pub id: i64,
    pub email: String,
}
