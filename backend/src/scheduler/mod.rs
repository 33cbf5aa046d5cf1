use std::{sync::Arc, time::Duration};

use crates::domain::repositories::{
    leader_lock::LeaderLock, renewal_sweep::RenewalSweepRepository,
};
use tracing::{error, info};

use crate::usecases::{auto_renewal::AutoRenewalUseCase, expiration::ExpirationUseCase};

pub const AUTO_RENEWAL_INTERVAL: Duration = Duration::from_secs(6 * 60 * 60);
pub const EXPIRATION_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

/// Runs forever. The first pass happens immediately; a failed pass only
/// logs, the next tick re-scans the same qualifying condition.
pub async fn run_auto_renewal_loop<R, L>(usecase: Arc<AutoRenewalUseCase<R, L>>)
where
    R: RenewalSweepRepository + Send + Sync + 'static,
    L: LeaderLock + Send + Sync + 'static,
{
    info!("Starting auto-renewal scheduler loop");
    loop {
        match usecase.run_pass().await {
            Ok(Some(initiated)) => {
                info!(initiated, "auto_renewal: pass completed");
            }
            Ok(None) => {}
            Err(err) => {
                error!(pass_error = ?err, "auto_renewal: pass failed");
            }
        }

        tokio::time::sleep(AUTO_RENEWAL_INTERVAL).await;
    }
}

pub async fn run_expiration_loop<R, L>(usecase: Arc<ExpirationUseCase<R, L>>)
where
    R: RenewalSweepRepository + Send + Sync + 'static,
    L: LeaderLock + Send + Sync + 'static,
{
    info!("Starting expiration scheduler loop");
    loop {
        match usecase.run_pass().await {
            Ok(Some(expired)) => {
                info!(expired, "expiration: pass completed");
            }
            Ok(None) => {}
            Err(err) => {
                error!(pass_error = ?err, "expiration: pass failed");
            }
        }

        tokio::time::sleep(EXPIRATION_INTERVAL).await;
    }
}
