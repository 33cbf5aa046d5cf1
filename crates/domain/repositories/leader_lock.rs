use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;

/// Fencing-free mutual exclusion for the scheduler passes. `try_acquire`
/// must never block: a `false` return means another instance (or the other
/// scheduled task) is leader for this tick, which is not an error.
#[async_trait]
#[automock]
pub trait LeaderLock {
    async fn try_acquire(&self) -> Result<bool>;
    async fn release(&self) -> Result<()>;
}
