use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;

use crate::domain::value_objects::payments::{
    ApprovePayment, PaymentDetail, PaymentResolution, PendingPaymentRef, PendingPaymentSummary,
    ProofUploadOutcome, RejectPayment,
};

/// Payment lifecycle persistence. The mutating methods each run as exactly
/// one transaction; the conditional update on the pending row is the arbiter
/// for concurrent resolution attempts (`None` means no pending row was left
/// to flip).
#[async_trait]
#[automock]
pub trait PaymentRepository {
    async fn list_pending(&self) -> Result<Vec<PendingPaymentSummary>>;
    async fn find_detail(&self, payment_id: i64) -> Result<Option<PaymentDetail>>;
    async fn find_pending(&self, payment_id: i64) -> Result<Option<PendingPaymentRef>>;
    async fn approve_pending(&self, command: ApprovePayment)
    -> Result<Option<PaymentResolution>>;
    async fn reject_pending(&self, command: RejectPayment) -> Result<Option<PaymentResolution>>;
    async fn attach_proof(
        &self,
        payment_id: i64,
        customer_id: i64,
        utr: String,
    ) -> Result<ProofUploadOutcome>;
}
