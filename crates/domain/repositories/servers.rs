use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;

use crate::domain::value_objects::servers::{
    AdminServerRow, CredentialsRow, PurchaseReceipt, PurchaseServer, RenewOutcome, ServerDetail,
    ServerSummary,
};

#[async_trait]
#[automock]
pub trait ServerRepository {
    /// Creates the server (pending) and its pending payment in one
    /// transaction.
    async fn create_with_pending_payment(
        &self,
        command: PurchaseServer,
    ) -> Result<PurchaseReceipt>;

    /// Extends `expires_at` from its current value by the plan duration and
    /// opens a new pending payment, all in one transaction.
    async fn renew(&self, server_id: i64, customer_id: i64) -> Result<RenewOutcome>;

    async fn list_for_customer(&self, customer_id: i64) -> Result<Vec<ServerSummary>>;
    async fn find_for_customer(
        &self,
        server_id: i64,
        customer_id: i64,
    ) -> Result<Option<ServerDetail>>;
    async fn credentials_for_customer(
        &self,
        server_id: i64,
        customer_id: i64,
    ) -> Result<Option<CredentialsRow>>;
    async fn list_all(&self) -> Result<Vec<AdminServerRow>>;
}
