use anyhow::Result;
use async_trait::async_trait;
use chrono::{Duration, Utc};
use diesel::{
    Connection, RunQueryDsl, delete,
    dsl::{exists, not},
    insert_into,
    prelude::*,
    update,
};
use std::sync::Arc;
use tokio::task;

use super::audit_logs::append_audit_entry;
use crate::{
    domain::{
        entities::{audit_logs::InsertAuditLogEntity, payments::InsertPaymentEntity},
        repositories::renewal_sweep::RenewalSweepRepository,
        value_objects::{
            enums::{
                payment_statuses::PaymentStatus, server_statuses::ServerStatus,
                subscription_statuses::SubscriptionStatus,
            },
            renewals::RenewalCandidate,
        },
    },
    infra::db::postgres::{
        postgres_connection::PgPoolSquad,
        schema::{payments, plans, servers},
    },
};

/// Bounds for the renewal candidate scan: strictly after `now` (anything at
/// or before it is the expiration pass's job) up to 24 hours ahead.
fn renewal_scan_window(
    now: chrono::DateTime<Utc>,
) -> (chrono::DateTime<Utc>, chrono::DateTime<Utc>) {
    (now, now + Duration::hours(24))
}

pub struct RenewalSweepPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl RenewalSweepPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl RenewalSweepRepository for RenewalSweepPostgres {
    async fn list_renewal_candidates(&self) -> Result<Vec<RenewalCandidate>> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(
            task::spawn_blocking(move || -> Result<Vec<RenewalCandidate>> {
                let mut conn = db_pool.get()?;

                let now = Utc::now();
                let (window_start, window_end) = renewal_scan_window(now);
                let dedup_floor = now - Duration::hours(24);

                // The lower bound keeps servers already past expiry out of the
                // scan; those belong to the expiration pass, not renewal. The
                // NOT EXISTS keeps a crashed-and-restarted scheduler from
                // stacking a second pending renewal payment onto a server.
                let rows = servers::table
                    .inner_join(plans::table)
                    .filter(
                        servers::subscription_status
                            .eq(SubscriptionStatus::Active.to_string()),
                    )
                    .filter(servers::is_deleted.eq(false))
                    .filter(servers::expires_at.gt(window_start))
                    .filter(servers::expires_at.le(window_end))
                    .filter(not(exists(
                        payments::table
                            .filter(payments::server_id.eq(servers::id))
                            .filter(payments::status.eq(PaymentStatus::Pending.to_string()))
                            .filter(payments::created_at.gt(dedup_floor)),
                    )))
                    .select((
                        servers::id,
                        servers::user_id,
                        servers::plan_id,
                        servers::expires_at,
                        plans::price_minor,
                    ))
                    .load::<RenewalCandidate>(&mut conn)?;

                Ok(rows)
            })
            .await??,
        )
    }

    async fn initiate_auto_renewal(&self, candidate: RenewalCandidate) -> Result<i64> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> Result<i64> {
            let mut conn = db_pool.get()?;

            conn.transaction::<_, anyhow::Error, _>(|conn| {
                let payment_id = insert_into(payments::table)
                    .values(&InsertPaymentEntity {
                        user_id: candidate.customer_id,
                        server_id: candidate.server_id,
                        plan_id: candidate.plan_id,
                        amount_minor: candidate.price_minor,
                        status: PaymentStatus::Pending.to_string(),
                    })
                    .returning(payments::id)
                    .get_result::<i64>(conn)?;

                // System-initiated, so no acting user on the audit row.
                append_audit_entry(
                    conn,
                    InsertAuditLogEntity {
                        user_id: None,
                        action: "server_auto_renew_initiated".to_string(),
                        resource: "server".to_string(),
                        resource_id: candidate.server_id,
                        status: "pending".to_string(),
                    },
                )?;

                Ok(payment_id)
            })
        })
        .await??)
    }

    async fn mark_expired_servers(&self) -> Result<Vec<i64>> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> Result<Vec<i64>> {
            let mut conn = db_pool.get()?;

            let ids = update(
                servers::table
                    .filter(
                        servers::subscription_status
                            .eq(SubscriptionStatus::Active.to_string()),
                    )
                    .filter(servers::is_deleted.eq(false))
                    .filter(servers::expires_at.le(Utc::now())),
            )
            .set((
                servers::subscription_status.eq(SubscriptionStatus::Expired.to_string()),
                servers::status.eq(ServerStatus::Expired.to_string()),
            ))
            .returning(servers::id)
            .get_results::<i64>(&mut conn)?;

            Ok(ids)
        })
        .await??)
    }

    async fn purge_deleted_servers(&self, older_than_days: i64) -> Result<usize> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> Result<usize> {
            let mut conn = db_pool.get()?;

            let cutoff = Utc::now() - Duration::days(older_than_days);

            let affected = delete(
                servers::table
                    .filter(servers::is_deleted.eq(true))
                    .filter(servers::created_at.lt(cutoff)),
            )
            .execute(&mut conn)?;

            Ok(affected)
        })
        .await??)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // The scan filters on `expires_at > start` and `expires_at <= end`;
    // these assertions pin the same comparisons at the boundaries.
    #[test]
    fn already_expired_server_is_outside_the_renewal_window() {
        let now = Utc::now();
        let (start, end) = renewal_scan_window(now);

        let expired_an_hour_ago = now - Duration::hours(1);
        assert!(!(expired_an_hour_ago > start && expired_an_hour_ago <= end));
    }

    #[test]
    fn expiry_exactly_now_belongs_to_the_expiration_pass() {
        let now = Utc::now();
        let (start, end) = renewal_scan_window(now);

        assert!(!(now > start && now <= end));
    }

    #[test]
    fn expiry_within_the_next_day_is_in_the_window() {
        let now = Utc::now();
        let (start, end) = renewal_scan_window(now);

        let expiring_soon = now + Duration::hours(6);
        assert!(expiring_soon > start && expiring_soon <= end);

        let at_the_edge = now + Duration::hours(24);
        assert!(at_the_edge > start && at_the_edge <= end);

        let beyond = now + Duration::hours(25);
        assert!(!(beyond > start && beyond <= end));
    }
}
