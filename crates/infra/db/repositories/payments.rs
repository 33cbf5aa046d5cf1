use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use diesel::{Connection, RunQueryDsl, prelude::*, update};
use std::sync::Arc;
use tokio::task;

use crate::{
    domain::{
        entities::audit_logs::InsertAuditLogEntity,
        repositories::payments::PaymentRepository,
        value_objects::{
            enums::{payment_statuses::PaymentStatus, server_statuses::ServerStatus},
            payments::{
                ApprovePayment, PaymentDetail, PaymentResolution, PendingPaymentRef,
                PendingPaymentSummary, ProofUploadOutcome, RejectPayment,
            },
        },
    },
    infra::db::{
        postgres::{
            postgres_connection::PgPoolSquad,
            schema::{payments, plans, servers, users},
        },
        repositories::audit_logs::append_audit_entry,
    },
};

pub struct PaymentPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl PaymentPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl PaymentRepository for PaymentPostgres {
    async fn list_pending(&self) -> Result<Vec<PendingPaymentSummary>> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(
            task::spawn_blocking(move || -> Result<Vec<PendingPaymentSummary>> {
                let mut conn = db_pool.get()?;

                let rows = payments::table
                    .inner_join(users::table)
                    .inner_join(servers::table)
                    .inner_join(plans::table)
                    .filter(payments::status.eq(PaymentStatus::Pending.to_string()))
                    .order(payments::created_at.asc())
                    .select((
                        payments::id,
                        payments::amount_minor,
                        payments::status,
                        payments::utr,
                        payments::created_at,
                        users::username,
                        users::email,
                        servers::id,
                        servers::server_name,
                        plans::name,
                        plans::price_minor,
                    ))
                    .load::<PendingPaymentSummary>(&mut conn)?;

                Ok(rows)
            })
            .await??,
        )
    }

    async fn find_detail(&self, payment_id: i64) -> Result<Option<PaymentDetail>> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> Result<Option<PaymentDetail>> {
            let mut conn = db_pool.get()?;

            let row = payments::table
                .inner_join(users::table)
                .inner_join(servers::table)
                .inner_join(plans::table)
                .filter(payments::id.eq(payment_id))
                .select((
                    payments::id,
                    payments::amount_minor,
                    payments::status,
                    payments::utr,
                    payments::rejection_reason,
                    payments::created_at,
                    users::id,
                    users::username,
                    users::email,
                    servers::id,
                    servers::server_name,
                    plans::name,
                    plans::price_minor,
                ))
                .first::<PaymentDetail>(&mut conn)
                .optional()?;

            Ok(row)
        })
        .await??)
    }

    async fn find_pending(&self, payment_id: i64) -> Result<Option<PendingPaymentRef>> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(
            task::spawn_blocking(move || -> Result<Option<PendingPaymentRef>> {
                let mut conn = db_pool.get()?;

                let row = payments::table
                    .filter(payments::id.eq(payment_id))
                    .filter(payments::status.eq(PaymentStatus::Pending.to_string()))
                    .select((payments::id, payments::server_id))
                    .first::<PendingPaymentRef>(&mut conn)
                    .optional()?;

                Ok(row)
            })
            .await??,
        )
    }

    async fn approve_pending(
        &self,
        command: ApprovePayment,
    ) -> Result<Option<PaymentResolution>> {
        let db_pool = Arc::clone(&self.db_pool);
        let now = Utc::now();

        Ok(
            task::spawn_blocking(move || -> Result<Option<PaymentResolution>> {
                let mut conn = db_pool.get()?;

                conn.transaction::<_, anyhow::Error, _>(|conn| {
                    // Conditional update is the arbiter for concurrent
                    // resolution: the loser matches zero rows and surfaces
                    // NotFound upstream.
                    let resolved = update(
                        payments::table
                            .filter(payments::id.eq(command.payment_id))
                            .filter(payments::status.eq(PaymentStatus::Pending.to_string())),
                    )
                    .set((
                        payments::status.eq(PaymentStatus::Approved.to_string()),
                        payments::utr.eq(command.utr.clone()),
                        payments::approved_by.eq(command.admin_id),
                        payments::approved_at.eq(now),
                    ))
                    .returning((payments::server_id, payments::user_id, payments::amount_minor))
                    .get_result::<(i64, i64, i32)>(conn)
                    .optional()?;

                    let Some((server_id, customer_id, amount_minor)) = resolved else {
                        return Ok(None);
                    };

                    let server_name = update(servers::table.filter(servers::id.eq(server_id)))
                        .set((
                            servers::status.eq(ServerStatus::Active.to_string()),
                            servers::server_username.eq(command.credentials.username.clone()),
                            servers::server_password.eq(command.credentials.password.clone()),
                            servers::provisioning_id.eq(command.provisioning_id.clone()),
                        ))
                        .returning(servers::server_name)
                        .get_result::<String>(conn)?;

                    let customer_email = users::table
                        .filter(users::id.eq(customer_id))
                        .select(users::email)
                        .get_result::<String>(conn)?;

                    append_audit_entry(
                        conn,
                        InsertAuditLogEntity {
                            user_id: Some(command.admin_id),
                            action: "payment_approved".to_string(),
                            resource: "payment".to_string(),
                            resource_id: command.payment_id,
                            status: "success".to_string(),
                        },
                    )?;

                    Ok(Some(PaymentResolution {
                        payment_id: command.payment_id,
                        server_id,
                        customer_id,
                        customer_email,
                        server_name,
                        amount_minor,
                    }))
                })
            })
            .await??,
        )
    }

    async fn reject_pending(&self, command: RejectPayment) -> Result<Option<PaymentResolution>> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(
            task::spawn_blocking(move || -> Result<Option<PaymentResolution>> {
                let mut conn = db_pool.get()?;

                conn.transaction::<_, anyhow::Error, _>(|conn| {
                    let resolved = update(
                        payments::table
                            .filter(payments::id.eq(command.payment_id))
                            .filter(payments::status.eq(PaymentStatus::Pending.to_string())),
                    )
                    .set((
                        payments::status.eq(PaymentStatus::Rejected.to_string()),
                        payments::rejection_reason.eq(command.reason.clone()),
                    ))
                    .returning((payments::server_id, payments::user_id, payments::amount_minor))
                    .get_result::<(i64, i64, i32)>(conn)
                    .optional()?;

                    let Some((server_id, customer_id, amount_minor)) = resolved else {
                        return Ok(None);
                    };

                    // A rejected purchase never activates; the server is
                    // soft-deleted so it drops out of customer queries.
                    let server_name = update(servers::table.filter(servers::id.eq(server_id)))
                        .set(servers::is_deleted.eq(true))
                        .returning(servers::server_name)
                        .get_result::<String>(conn)?;

                    let customer_email = users::table
                        .filter(users::id.eq(customer_id))
                        .select(users::email)
                        .get_result::<String>(conn)?;

                    append_audit_entry(
                        conn,
                        InsertAuditLogEntity {
                            user_id: Some(command.admin_id),
                            action: "payment_rejected".to_string(),
                            resource: "payment".to_string(),
                            resource_id: command.payment_id,
                            status: "success".to_string(),
                        },
                    )?;

                    Ok(Some(PaymentResolution {
                        payment_id: command.payment_id,
                        server_id,
                        customer_id,
                        customer_email,
                        server_name,
                        amount_minor,
                    }))
                })
            })
            .await??,
        )
    }

    async fn attach_proof(
        &self,
        payment_id: i64,
        customer_id: i64,
        utr: String,
    ) -> Result<ProofUploadOutcome> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> Result<ProofUploadOutcome> {
            let mut conn = db_pool.get()?;

            conn.transaction::<_, anyhow::Error, _>(|conn| {
                let row = payments::table
                    .filter(payments::id.eq(payment_id))
                    .select((
                        payments::user_id,
                        payments::server_id,
                        payments::amount_minor,
                        payments::status,
                    ))
                    .first::<(i64, i64, i32, String)>(conn)
                    .optional()?;

                let Some((owner_id, server_id, amount_minor, status)) = row else {
                    return Ok(ProofUploadOutcome::NotFound);
                };

                if owner_id != customer_id {
                    return Ok(ProofUploadOutcome::NotOwner);
                }
                if status != PaymentStatus::Pending.to_string() {
                    return Ok(ProofUploadOutcome::NotPending);
                }

                update(payments::table.filter(payments::id.eq(payment_id)))
                    .set(payments::utr.eq(utr.clone()))
                    .execute(conn)?;

                let (server_name, customer_email) = servers::table
                    .inner_join(users::table)
                    .filter(servers::id.eq(server_id))
                    .select((servers::server_name, users::email))
                    .get_result::<(String, String)>(conn)?;

                append_audit_entry(
                    conn,
                    InsertAuditLogEntity {
                        user_id: Some(customer_id),
                        action: "payment_proof_submitted".to_string(),
                        resource: "payment".to_string(),
                        resource_id: payment_id,
                        status: "pending".to_string(),
                    },
                )?;

                Ok(ProofUploadOutcome::Updated(PaymentResolution {
                    payment_id,
                    server_id,
                    customer_id,
                    customer_email,
                    server_name,
                    amount_minor,
                }))
            })
        })
        .await??)
    }
}
