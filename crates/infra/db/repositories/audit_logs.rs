use anyhow::Result;
use async_trait::async_trait;
use diesel::{PgConnection, QueryResult, RunQueryDsl, insert_into, prelude::*};
use std::sync::Arc;
use tokio::task;

use crate::{
    domain::{
        entities::audit_logs::{AuditLogEntity, InsertAuditLogEntity},
        repositories::audit_logs::AuditLogRepository,
    },
    infra::db::postgres::{postgres_connection::PgPoolSquad, schema::audit_logs},
};

/// Appends inside the caller's transaction so the audit entry commits or
/// rolls back together with the state change it documents.
pub(crate) fn append_audit_entry(
    conn: &mut PgConnection,
    entry: InsertAuditLogEntity,
) -> QueryResult<()> {
    insert_into(audit_logs::table).values(&entry).execute(conn)?;
    Ok(())
}

pub struct AuditLogPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl AuditLogPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl AuditLogRepository for AuditLogPostgres {
    async fn list_recent(&self, limit: i64) -> Result<Vec<AuditLogEntity>> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> Result<Vec<AuditLogEntity>> {
            let mut conn = db_pool.get()?;

            let entries = audit_logs::table
                .select(AuditLogEntity::as_select())
                .order(audit_logs::created_at.desc())
                .limit(limit)
                .load::<AuditLogEntity>(&mut conn)?;

            Ok(entries)
        })
        .await??)
    }
}
