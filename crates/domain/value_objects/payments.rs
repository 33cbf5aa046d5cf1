use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use super::credentials::ServerCredentials;

/// Admin review queue row: pending payments joined with customer, server and
/// plan, oldest first.
#[derive(Debug, Clone, Serialize, Queryable)]
pub struct PendingPaymentSummary {
    pub id: i64,
    pub amount_minor: i32,
    pub status: String,
    pub utr: Option<String>,
    pub created_at: DateTime<Utc>,
    pub username: String,
    pub email: String,
    pub server_id: i64,
    pub server_name: String,
    pub plan_name: String,
    pub plan_price_minor: i32,
}

#[derive(Debug, Clone, Serialize, Queryable)]
pub struct PaymentDetail {
    pub id: i64,
    pub amount_minor: i32,
    pub status: String,
    pub utr: Option<String>,
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub user_id: i64,
    pub username: String,
    pub email: String,
    pub server_id: i64,
    pub server_name: String,
    pub plan_name: String,
    pub plan_price_minor: i32,
}

/// Minimal pending-row reference read before approval so credentials can be
/// generated for the right server.
#[derive(Debug, Clone, Queryable)]
pub struct PendingPaymentRef {
    pub id: i64,
    pub server_id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApprovePaymentModel {
    pub utr: Option<String>,
    pub provisioning_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RejectPaymentModel {
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadProofModel {
    pub utr: Option<String>,
}

/// The approval effects applied in one transaction: payment flip, server
/// activation with credentials, audit entry.
#[derive(Debug, Clone)]
pub struct ApprovePayment {
    pub payment_id: i64,
    pub utr: String,
    pub provisioning_id: String,
    pub admin_id: i64,
    pub credentials: ServerCredentials,
}

#[derive(Debug, Clone)]
pub struct RejectPayment {
    pub payment_id: i64,
    pub reason: String,
    pub admin_id: i64,
}

/// Row data the post-commit notifications need, captured inside the
/// transaction so no second read races the commit.
#[derive(Debug, Clone)]
pub struct PaymentResolution {
    pub payment_id: i64,
    pub server_id: i64,
    pub customer_id: i64,
    pub customer_email: String,
    pub server_name: String,
    pub amount_minor: i32,
}

#[derive(Debug, Clone)]
pub enum ProofUploadOutcome {
    Updated(PaymentResolution),
    NotOwner,
    NotPending,
    NotFound,
}

#[derive(Debug, Clone, Serialize)]
pub struct ApprovedPaymentDto {
    pub payment: ResolvedPaymentDto,
    pub server: ActivatedServerDto,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResolvedPaymentDto {
    pub id: i64,
    pub status: String,
    pub utr: Option<String>,
    pub rejection_reason: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ActivatedServerDto {
    pub id: i64,
    pub status: String,
    pub credentials: ServerCredentials,
}
