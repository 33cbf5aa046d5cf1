use anyhow::Result;
use async_trait::async_trait;
use diesel::{PgConnection, prelude::*, select};
use tokio::{sync::Mutex, task};
use tracing::warn;

use crate::domain::repositories::leader_lock::LeaderLock;

/// Session-scoped Postgres advisory lock. All scheduler passes across all
/// backend instances contend on this one key.
pub const SCHEDULER_LOCK_KEY: i64 = 1_234_567_890;

diesel::define_sql_function! {
    fn pg_try_advisory_lock(key: diesel::sql_types::BigInt) -> diesel::sql_types::Bool;
}

diesel::define_sql_function! {
    fn pg_advisory_unlock(key: diesel::sql_types::BigInt) -> diesel::sql_types::Bool;
}

/// Advisory locks belong to the session that took them, so the holder keeps
/// a dedicated non-pooled connection for the lock's whole lifetime. Dropping
/// that connection releases the lock even when `release` never runs, which
/// is what makes a crashed leader recoverable without a lease TTL.
pub struct PgAdvisoryLock {
    database_url: String,
    holder: Mutex<Option<PgConnection>>,
}

impl PgAdvisoryLock {
    pub fn new(database_url: String) -> Self {
        Self {
            database_url,
            holder: Mutex::new(None),
        }
    }
}

#[async_trait]
impl LeaderLock for PgAdvisoryLock {
    async fn try_acquire(&self) -> Result<bool> {
        let database_url = self.database_url.clone();

        let acquired = task::spawn_blocking(move || -> Result<Option<PgConnection>> {
            let mut conn = PgConnection::establish(&database_url)?;

            let locked: bool =
                select(pg_try_advisory_lock(SCHEDULER_LOCK_KEY)).get_result(&mut conn)?;

            // Losing the race closes the connection right away; only the
            // winner keeps its session alive.
            Ok(locked.then_some(conn))
        })
        .await??;

        match acquired {
            Some(conn) => {
                *self.holder.lock().await = Some(conn);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn release(&self) -> Result<()> {
        let Some(mut conn) = self.holder.lock().await.take() else {
            return Ok(());
        };

        task::spawn_blocking(move || {
            let unlocked: QueryResult<bool> =
                select(pg_advisory_unlock(SCHEDULER_LOCK_KEY)).get_result(&mut conn);

            // Dropping `conn` here closes the session, which releases the
            // lock server-side even when the unlock statement failed.
            if let Err(err) = unlocked {
                warn!(db_error = ?err, "advisory unlock failed, relying on session close");
            }
        })
        .await?;

        Ok(())
    }
}
