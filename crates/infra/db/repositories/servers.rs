use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use diesel::{Connection, RunQueryDsl, insert_into, prelude::*, update};
use std::sync::Arc;
use tokio::task;

use crate::{
    domain::{
        entities::{
            payments::{InsertPaymentEntity, PaymentEntity},
            servers::{InsertServerEntity, ServerEntity},
        },
        repositories::servers::ServerRepository,
        value_objects::{
            enums::{
                payment_statuses::PaymentStatus, server_statuses::ServerStatus,
                subscription_statuses::SubscriptionStatus,
            },
            servers::{
                AdminServerRow, CredentialsRow, PurchaseReceipt, PurchaseServer,
                PurchasedPaymentDto, PurchasedServerDto, RenewOutcome, RenewalReceipt,
                ServerDetail, ServerSummary,
            },
        },
    },
    infra::db::postgres::{
        postgres_connection::PgPoolSquad,
        schema::{payments, plans, servers, users},
    },
};

pub struct ServerPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl ServerPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl ServerRepository for ServerPostgres {
    async fn create_with_pending_payment(
        &self,
        command: PurchaseServer,
    ) -> Result<PurchaseReceipt> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> Result<PurchaseReceipt> {
            let mut conn = db_pool.get()?;

            conn.transaction::<_, anyhow::Error, _>(|conn| {
                let server = insert_into(servers::table)
                    .values(&InsertServerEntity {
                        user_id: command.customer_id,
                        plan_id: command.plan_id,
                        server_name: command.server_name.clone(),
                        status: ServerStatus::Pending.to_string(),
                        subscription_status: SubscriptionStatus::Active.to_string(),
                        expires_at: command.expires_at,
                    })
                    .returning(ServerEntity::as_returning())
                    .get_result::<ServerEntity>(conn)?;

                let payment = insert_into(payments::table)
                    .values(&InsertPaymentEntity {
                        user_id: command.customer_id,
                        server_id: server.id,
                        plan_id: command.plan_id,
                        amount_minor: command.amount_minor,
                        status: PaymentStatus::Pending.to_string(),
                    })
                    .returning(PaymentEntity::as_returning())
                    .get_result::<PaymentEntity>(conn)?;

                Ok(PurchaseReceipt {
                    server: PurchasedServerDto {
                        id: server.id,
                        server_name: server.server_name,
                        status: server.status,
                        expires_at: server.expires_at,
                        created_at: server.created_at,
                    },
                    payment: PurchasedPaymentDto {
                        id: payment.id,
                        amount_minor: payment.amount_minor,
                        status: payment.status,
                    },
                })
            })
        })
        .await??)
    }

    async fn renew(&self, server_id: i64, customer_id: i64) -> Result<RenewOutcome> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> Result<RenewOutcome> {
            let mut conn = db_pool.get()?;

            conn.transaction::<_, anyhow::Error, _>(|conn| {
                let server = servers::table
                    .filter(servers::id.eq(server_id))
                    .filter(servers::user_id.eq(customer_id))
                    .filter(servers::is_deleted.eq(false))
                    .select((servers::plan_id, servers::expires_at))
                    .first::<(i64, DateTime<Utc>)>(conn)
                    .optional()?;

                let Some((plan_id, expires_at)) = server else {
                    return Ok(RenewOutcome::ServerNotFound);
                };

                let plan = plans::table
                    .filter(plans::id.eq(plan_id))
                    .filter(plans::is_active.eq(true))
                    .select((plans::duration_days, plans::price_minor))
                    .first::<(i32, i32)>(conn)
                    .optional()?;

                let Some((duration_days, price_minor)) = plan else {
                    return Ok(RenewOutcome::PlanNotFound);
                };

                // The extension stacks on the current expiry, not on "now",
                // so renewing early never costs remaining paid time.
                let new_expires_at = expires_at + Duration::days(duration_days.into());

                let receipt = update(servers::table.filter(servers::id.eq(server_id)))
                    .set((
                        servers::expires_at.eq(new_expires_at),
                        servers::subscription_status
                            .eq(SubscriptionStatus::Active.to_string()),
                    ))
                    .returning((
                        servers::id,
                        servers::server_name,
                        servers::expires_at,
                        servers::subscription_status,
                    ))
                    .get_result::<RenewalReceipt>(conn)?;

                insert_into(payments::table)
                    .values(&InsertPaymentEntity {
                        user_id: customer_id,
                        server_id,
                        plan_id,
                        amount_minor: price_minor,
                        status: PaymentStatus::Pending.to_string(),
                    })
                    .execute(conn)?;

                Ok(RenewOutcome::Renewed(receipt))
            })
        })
        .await??)
    }

    async fn list_for_customer(&self, customer_id: i64) -> Result<Vec<ServerSummary>> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> Result<Vec<ServerSummary>> {
            let mut conn = db_pool.get()?;

            let rows = servers::table
                .inner_join(plans::table)
                .filter(servers::user_id.eq(customer_id))
                .filter(servers::is_deleted.eq(false))
                .order(servers::created_at.desc())
                .select((
                    servers::id,
                    servers::server_name,
                    servers::status,
                    servers::subscription_status,
                    servers::expires_at,
                    servers::created_at,
                    plans::name,
                    plans::price_minor,
                    plans::duration_days,
                ))
                .load::<ServerSummary>(&mut conn)?;

            Ok(rows)
        })
        .await??)
    }

    async fn find_for_customer(
        &self,
        server_id: i64,
        customer_id: i64,
    ) -> Result<Option<ServerDetail>> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> Result<Option<ServerDetail>> {
            let mut conn = db_pool.get()?;

            let row = servers::table
                .inner_join(plans::table)
                .filter(servers::id.eq(server_id))
                .filter(servers::user_id.eq(customer_id))
                .filter(servers::is_deleted.eq(false))
                .select((
                    servers::id,
                    servers::server_name,
                    servers::status,
                    servers::subscription_status,
                    servers::server_username,
                    servers::server_password,
                    servers::provisioning_id,
                    servers::expires_at,
                    servers::created_at,
                    plans::id,
                    plans::name,
                    plans::price_minor,
                    plans::cpu_cores,
                    plans::ram_gb,
                    plans::storage_gb,
                    plans::max_players,
                ))
                .first::<ServerDetail>(&mut conn)
                .optional()?;

            Ok(row)
        })
        .await??)
    }

    async fn credentials_for_customer(
        &self,
        server_id: i64,
        customer_id: i64,
    ) -> Result<Option<CredentialsRow>> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(
            task::spawn_blocking(move || -> Result<Option<CredentialsRow>> {
                let mut conn = db_pool.get()?;

                let row = servers::table
                    .filter(servers::id.eq(server_id))
                    .filter(servers::user_id.eq(customer_id))
                    .filter(servers::is_deleted.eq(false))
                    .select((
                        servers::server_username,
                        servers::server_password,
                        servers::status,
                    ))
                    .first::<CredentialsRow>(&mut conn)
                    .optional()?;

                Ok(row)
            })
            .await??,
        )
    }

    async fn list_all(&self) -> Result<Vec<AdminServerRow>> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> Result<Vec<AdminServerRow>> {
            let mut conn = db_pool.get()?;

            let rows = servers::table
                .inner_join(users::table)
                .inner_join(plans::table)
                .filter(servers::is_deleted.eq(false))
                .order(servers::expires_at.asc())
                .select((
                    servers::id,
                    servers::user_id,
                    servers::server_name,
                    servers::status,
                    servers::subscription_status,
                    servers::expires_at,
                    users::username,
                    users::email,
                    plans::name,
                ))
                .load::<AdminServerRow>(&mut conn)?;

            Ok(rows)
        })
        .await??)
    }
}
