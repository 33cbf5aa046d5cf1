use std::sync::Arc;

use anyhow::Result;
use crates::domain::repositories::{
    leader_lock::LeaderLock, realtime::RealtimeNotifier,
    renewal_sweep::RenewalSweepRepository,
};
use serde_json::json;
use tracing::{error, info};

/// Soft-deleted servers older than this are hard-deleted during the pass.
const RETENTION_DAYS: i64 = 90;

/// One scheduler pass: under the shared leader lock, flip overdue active
/// servers to expired and run the retention sweep. Emits one aggregated
/// `servers:expired` event when anything expired.
pub struct ExpirationUseCase<R, L>
where
    R: RenewalSweepRepository + Send + Sync + 'static,
    L: LeaderLock + Send + Sync + 'static,
{
    sweep_repo: Arc<R>,
    leader_lock: Arc<L>,
    notifier: Arc<dyn RealtimeNotifier + Send + Sync>,
}

impl<R, L> ExpirationUseCase<R, L>
where
    R: RenewalSweepRepository + Send + Sync + 'static,
    L: LeaderLock + Send + Sync + 'static,
{
    pub fn new(
        sweep_repo: Arc<R>,
        leader_lock: Arc<L>,
        notifier: Arc<dyn RealtimeNotifier + Send + Sync>,
    ) -> Self {
        Self {
            sweep_repo,
            leader_lock,
            notifier,
        }
    }

    /// Returns how many servers expired; `None` when this instance was not
    /// leader for the tick.
    pub async fn run_pass(&self) -> Result<Option<usize>> {
        if !self.leader_lock.try_acquire().await? {
            info!("expiration: not leader this tick, skipping");
            return Ok(None);
        }

        let result = self.sweep().await;

        if let Err(err) = self.leader_lock.release().await {
            error!(lock_error = ?err, "expiration: failed to release leader lock");
        }

        result.map(Some)
    }

    async fn sweep(&self) -> Result<usize> {
        let expired_ids = self.sweep_repo.mark_expired_servers().await?;

        if expired_ids.is_empty() {
            info!("expiration: no servers overdue");
        } else {
            info!(
                expired_count = expired_ids.len(),
                "expiration: servers marked expired"
            );

            self.notifier.emit_to_admins(
                "servers:expired",
                json!({
                    "count": expired_ids.len(),
                    "servers": expired_ids,
                }),
            );
        }

        match self.sweep_repo.purge_deleted_servers(RETENTION_DAYS).await {
            Ok(0) => {}
            Ok(purged) => info!(purged, "expiration: retention sweep removed servers"),
            Err(err) => {
                // Retention is housekeeping; a failure must not fail the
                // expiration pass that already committed.
                error!(db_error = ?err, "expiration: retention sweep failed");
            }
        }

        Ok(expired_ids.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crates::domain::repositories::{
        leader_lock::MockLeaderLock, realtime::MockRealtimeNotifier,
        renewal_sweep::MockRenewalSweepRepository,
    };
    use mockall::predicate::eq;

    #[tokio::test]
    async fn non_leader_tick_touches_nothing() {
        let mut sweep_repo = MockRenewalSweepRepository::new();
        sweep_repo.expect_mark_expired_servers().never();
        sweep_repo.expect_purge_deleted_servers().never();

        let mut lock = MockLeaderLock::new();
        lock.expect_try_acquire()
            .returning(|| Box::pin(async { Ok(false) }));
        lock.expect_release().never();

        let notifier = Arc::new(MockRealtimeNotifier::new());

        let usecase = ExpirationUseCase::new(Arc::new(sweep_repo), Arc::new(lock), notifier);

        let outcome = usecase.run_pass().await.unwrap();
        assert_eq!(outcome, None);
    }

    #[tokio::test]
    async fn expired_servers_produce_one_aggregated_event() {
        let mut sweep_repo = MockRenewalSweepRepository::new();
        sweep_repo
            .expect_mark_expired_servers()
            .returning(|| Box::pin(async { Ok(vec![11, 12]) }));
        sweep_repo
            .expect_purge_deleted_servers()
            .with(eq(RETENTION_DAYS))
            .returning(|_| Box::pin(async { Ok(0) }));

        let mut lock = MockLeaderLock::new();
        lock.expect_try_acquire()
            .returning(|| Box::pin(async { Ok(true) }));
        lock.expect_release()
            .times(1)
            .returning(|| Box::pin(async { Ok(()) }));

        let mut notifier = MockRealtimeNotifier::new();
        notifier
            .expect_emit_to_admins()
            .times(1)
            .withf(|event, payload| {
                event == "servers:expired"
                    && payload["count"] == 2
                    && payload["servers"] == serde_json::json!([11, 12])
            })
            .returning(|_, _| ());

        let usecase =
            ExpirationUseCase::new(Arc::new(sweep_repo), Arc::new(lock), Arc::new(notifier));

        let outcome = usecase.run_pass().await.unwrap();
        assert_eq!(outcome, Some(2));
    }

    #[tokio::test]
    async fn no_event_when_nothing_expired() {
        let mut sweep_repo = MockRenewalSweepRepository::new();
        sweep_repo
            .expect_mark_expired_servers()
            .returning(|| Box::pin(async { Ok(vec![]) }));
        sweep_repo
            .expect_purge_deleted_servers()
            .returning(|_| Box::pin(async { Ok(3) }));

        let mut lock = MockLeaderLock::new();
        lock.expect_try_acquire()
            .returning(|| Box::pin(async { Ok(true) }));
        lock.expect_release()
            .returning(|| Box::pin(async { Ok(()) }));

        let mut notifier = MockRealtimeNotifier::new();
        notifier.expect_emit_to_admins().never();

        let usecase =
            ExpirationUseCase::new(Arc::new(sweep_repo), Arc::new(lock), Arc::new(notifier));

        let outcome = usecase.run_pass().await.unwrap();
        assert_eq!(outcome, Some(0));
    }
}
