use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct PurchaseServerModel {
    pub plan_id: i64,
    pub server_name: Option<String>,
}

/// Purchase command with the amount and expiry already resolved from the
/// plan; the repository only persists it.
#[derive(Debug, Clone)]
pub struct PurchaseServer {
    pub customer_id: i64,
    pub plan_id: i64,
    pub server_name: String,
    pub amount_minor: i32,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PurchasedServerDto {
    pub id: i64,
    pub server_name: String,
    pub status: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PurchasedPaymentDto {
    pub id: i64,
    pub amount_minor: i32,
    pub status: String,
}

/// Server + payment pair created atomically at purchase time.
#[derive(Debug, Clone, Serialize)]
pub struct PurchaseReceipt {
    pub server: PurchasedServerDto,
    pub payment: PurchasedPaymentDto,
}

#[derive(Debug, Clone, Serialize, Queryable)]
pub struct RenewalReceipt {
    pub id: i64,
    pub server_name: String,
    pub expires_at: DateTime<Utc>,
    pub subscription_status: String,
}

#[derive(Debug, Clone)]
pub enum RenewOutcome {
    Renewed(RenewalReceipt),
    ServerNotFound,
    PlanNotFound,
}

#[derive(Debug, Clone, Serialize, Queryable)]
pub struct ServerSummary {
    pub id: i64,
    pub server_name: String,
    pub status: String,
    pub subscription_status: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub plan_name: String,
    pub plan_price_minor: i32,
    pub duration_days: i32,
}

#[derive(Debug, Clone, Serialize, Queryable)]
pub struct ServerDetail {
    pub id: i64,
    pub server_name: String,
    pub status: String,
    pub subscription_status: String,
    pub server_username: Option<String>,
    pub server_password: Option<String>,
    pub provisioning_id: Option<String>,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub plan_id: i64,
    pub plan_name: String,
    pub plan_price_minor: i32,
    pub cpu_cores: i32,
    pub ram_gb: i32,
    pub storage_gb: i32,
    pub max_players: i32,
}

/// Raw credential columns; the usecase gates on server status before
/// exposing them.
#[derive(Debug, Clone, Queryable)]
pub struct CredentialsRow {
    pub server_username: Option<String>,
    pub server_password: Option<String>,
    pub status: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CredentialsView {
    pub username: String,
    pub password: String,
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Queryable)]
pub struct AdminServerRow {
    pub id: i64,
    pub user_id: i64,
    pub server_name: String,
    pub status: String,
    pub subscription_status: String,
    pub expires_at: DateTime<Utc>,
    pub username: String,
    pub email: String,
    pub plan_name: String,
}
