use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// One server qualifying for scheduler-initiated renewal: active
/// subscription, not deleted, expiring within the scan window, and no
/// pending payment created in the last day.
#[derive(Debug, Clone, Queryable)]
pub struct RenewalCandidate {
    pub server_id: i64,
    pub customer_id: i64,
    pub plan_id: i64,
    pub expires_at: DateTime<Utc>,
    pub price_minor: i32,
}
