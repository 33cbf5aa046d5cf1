use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;

use crate::domain::value_objects::renewals::RenewalCandidate;

#[async_trait]
#[automock]
pub trait RenewalSweepRepository {
    /// Servers with an active subscription, not deleted, expiring within the
    /// next 24 hours and without a pending payment created in the last day.
    async fn list_renewal_candidates(&self) -> Result<Vec<RenewalCandidate>>;

    /// One transaction per candidate: pending renewal payment plus a
    /// `pending`-outcome audit entry. Server state is untouched; activation
    /// still requires admin approval. Returns the payment id.
    async fn initiate_auto_renewal(&self, candidate: RenewalCandidate) -> Result<i64>;

    /// Flips overdue active servers to expired and returns their ids.
    async fn mark_expired_servers(&self) -> Result<Vec<i64>>;

    /// Retention sweep: hard-deletes soft-deleted servers older than the
    /// given number of days. Returns how many rows went away.
    async fn purge_deleted_servers(&self, older_than_days: i64) -> Result<usize>;
}
