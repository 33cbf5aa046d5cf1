use chrono::{DateTime, Utc};
use diesel::prelude::*;

use crate::infra::db::postgres::schema::payments;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = payments)]
pub struct PaymentEntity {
    pub id: i64,
    pub user_id: i64,
    pub server_id: i64,
    pub plan_id: i64,
    pub amount_minor: i32,
    pub status: String,
    pub utr: Option<String>,
    pub rejection_reason: Option<String>,
    pub approved_by: Option<i64>,
    pub approved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = payments)]
pub struct InsertPaymentEntity {
    pub user_id: i64,
    pub server_id: i64,
    pub plan_id: i64,
    pub amount_minor: i32,
    pub status: String,
}
