use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;

use crate::domain::entities::audit_logs::AuditLogEntity;

/// Read side of the audit trail. Entries are only ever written inside the
/// workflow transactions, never through a standalone insert path.
#[async_trait]
#[automock]
pub trait AuditLogRepository {
    async fn list_recent(&self, limit: i64) -> Result<Vec<AuditLogEntity>>;
}
