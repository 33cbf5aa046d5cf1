use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;

use crate::infra::db::postgres::schema::audit_logs;

#[derive(Debug, Clone, Serialize, Identifiable, Selectable, Queryable)]
#[diesel(table_name = audit_logs)]
pub struct AuditLogEntity {
    pub id: i64,
    pub user_id: Option<i64>,
    pub action: String,
    pub resource: String,
    pub resource_id: i64,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = audit_logs)]
pub struct InsertAuditLogEntity {
    pub user_id: Option<i64>,
    pub action: String,
    pub resource: String,
    pub resource_id: i64,
    pub status: String,
}
