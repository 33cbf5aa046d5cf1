use chrono::{DateTime, Utc};
use diesel::prelude::*;

use crate::infra::db::postgres::schema::servers;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = servers)]
pub struct ServerEntity {
    pub id: i64,
    pub user_id: i64,
    pub plan_id: i64,
    pub server_name: String,
    pub status: String,
    pub subscription_status: String,
    pub server_username: Option<String>,
    pub server_password: Option<String>,
    pub provisioning_id: Option<String>,
    pub is_deleted: bool,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = servers)]
pub struct InsertServerEntity {
    pub user_id: i64,
    pub plan_id: i64,
    pub server_name: String,
    pub status: String,
    pub subscription_status: String,
    pub expires_at: DateTime<Utc>,
}
