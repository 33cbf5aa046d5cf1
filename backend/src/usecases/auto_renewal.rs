use std::sync::Arc;

use anyhow::Result;
use crates::domain::repositories::{
    leader_lock::LeaderLock, renewal_sweep::RenewalSweepRepository,
};
use tracing::{error, info};

/// One scheduler pass: under the shared leader lock, open a pending renewal
/// payment for every server expiring within the scan window. The server
/// itself is not touched; activation waits for admin approval of that
/// payment.
pub struct AutoRenewalUseCase<R, L>
where
    R: RenewalSweepRepository + Send + Sync + 'static,
    L: LeaderLock + Send + Sync + 'static,
{
    sweep_repo: Arc<R>,
    leader_lock: Arc<L>,
}

impl<R, L> AutoRenewalUseCase<R, L>
where
    R: RenewalSweepRepository + Send + Sync + 'static,
    L: LeaderLock + Send + Sync + 'static,
{
    pub fn new(sweep_repo: Arc<R>, leader_lock: Arc<L>) -> Self {
        Self {
            sweep_repo,
            leader_lock,
        }
    }

    /// Returns how many renewals were initiated; `None` when this instance
    /// was not leader for the tick.
    pub async fn run_pass(&self) -> Result<Option<usize>> {
        if !self.leader_lock.try_acquire().await? {
            info!("auto_renewal: not leader this tick, skipping");
            return Ok(None);
        }

        let result = self.sweep().await;

        // The lock is released no matter how the sweep went; a leaked lock
        // starves every instance until the holding connection dies.
        if let Err(err) = self.leader_lock.release().await {
            error!(lock_error = ?err, "auto_renewal: failed to release leader lock");
        }

        result.map(Some)
    }

    async fn sweep(&self) -> Result<usize> {
        let candidates = self.sweep_repo.list_renewal_candidates().await?;

        if candidates.is_empty() {
            info!("auto_renewal: no servers due for renewal");
            return Ok(0);
        }

        info!(
            candidate_count = candidates.len(),
            "auto_renewal: initiating renewals"
        );

        let mut initiated = 0usize;
        for candidate in candidates {
            let server_id = candidate.server_id;

            // One failed server must not abort the rest of the pass.
            match self.sweep_repo.initiate_auto_renewal(candidate).await {
                Ok(payment_id) => {
                    info!(%server_id, %payment_id, "auto_renewal: renewal payment opened");
                    initiated += 1;
                }
                Err(err) => {
                    error!(%server_id, db_error = ?err, "auto_renewal: failed to initiate renewal");
                }
            }
        }

        Ok(initiated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use crates::domain::{
        repositories::{
            leader_lock::MockLeaderLock, renewal_sweep::MockRenewalSweepRepository,
        },
        value_objects::renewals::RenewalCandidate,
    };

    fn candidate(server_id: i64) -> RenewalCandidate {
        RenewalCandidate {
            server_id,
            customer_id: 9,
            plan_id: 3,
            expires_at: Utc::now() + Duration::hours(12),
            price_minor: 1000,
        }
    }

    #[tokio::test]
    async fn non_leader_tick_touches_nothing() {
        let mut sweep_repo = MockRenewalSweepRepository::new();
        sweep_repo.expect_list_renewal_candidates().never();
        sweep_repo.expect_initiate_auto_renewal().never();

        let mut lock = MockLeaderLock::new();
        lock.expect_try_acquire()
            .returning(|| Box::pin(async { Ok(false) }));
        lock.expect_release().never();

        let usecase = AutoRenewalUseCase::new(Arc::new(sweep_repo), Arc::new(lock));

        let outcome = usecase.run_pass().await.unwrap();
        assert_eq!(outcome, None);
    }

    #[tokio::test]
    async fn one_failed_candidate_does_not_abort_the_pass() {
        let mut sweep_repo = MockRenewalSweepRepository::new();
        sweep_repo.expect_list_renewal_candidates().returning(|| {
            Box::pin(async { Ok(vec![candidate(11), candidate(12), candidate(13)]) })
        });
        sweep_repo
            .expect_initiate_auto_renewal()
            .times(3)
            .returning(|candidate| {
                Box::pin(async move {
                    if candidate.server_id == 12 {
                        anyhow::bail!("constraint violation")
                    }
                    Ok(candidate.server_id * 100)
                })
            });

        let mut lock = MockLeaderLock::new();
        lock.expect_try_acquire()
            .returning(|| Box::pin(async { Ok(true) }));
        lock.expect_release()
            .times(1)
            .returning(|| Box::pin(async { Ok(()) }));

        let usecase = AutoRenewalUseCase::new(Arc::new(sweep_repo), Arc::new(lock));

        let outcome = usecase.run_pass().await.unwrap();
        assert_eq!(outcome, Some(2));
    }

    #[tokio::test]
    async fn lock_is_released_even_when_the_scan_fails() {
        let mut sweep_repo = MockRenewalSweepRepository::new();
        sweep_repo
            .expect_list_renewal_candidates()
            .returning(|| Box::pin(async { anyhow::bail!("db gone") }));

        let mut lock = MockLeaderLock::new();
        lock.expect_try_acquire()
            .returning(|| Box::pin(async { Ok(true) }));
        lock.expect_release()
            .times(1)
            .returning(|| Box::pin(async { Ok(()) }));

        let usecase = AutoRenewalUseCase::new(Arc::new(sweep_repo), Arc::new(lock));

        assert!(usecase.run_pass().await.is_err());
    }
}
