use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use diesel::{RunQueryDsl, insert_into, prelude::*, update};
use std::sync::Arc;
use tokio::task;

use crate::{
    domain::{
        entities::plans::{InsertPlanEntity, PlanEntity, UpdatePlanEntity},
        repositories::plans::PlanRepository,
    },
    infra::db::postgres::{postgres_connection::PgPoolSquad, schema::plans},
};

pub struct PlanPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl PlanPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl PlanRepository for PlanPostgres {
    async fn list_active(&self) -> Result<Vec<PlanEntity>> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> Result<Vec<PlanEntity>> {
            let mut conn = db_pool.get()?;

            let rows = plans::table
                .filter(plans::is_active.eq(true))
                .order(plans::price_minor.asc())
                .select(PlanEntity::as_select())
                .load::<PlanEntity>(&mut conn)?;

            Ok(rows)
        })
        .await??)
    }

    async fn find_active_by_id(&self, plan_id: i64) -> Result<Option<PlanEntity>> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> Result<Option<PlanEntity>> {
            let mut conn = db_pool.get()?;

            let row = plans::table
                .filter(plans::id.eq(plan_id))
                .filter(plans::is_active.eq(true))
                .select(PlanEntity::as_select())
                .first::<PlanEntity>(&mut conn)
                .optional()?;

            Ok(row)
        })
        .await??)
    }

    async fn create(&self, insert_plan_entity: InsertPlanEntity) -> Result<PlanEntity> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> Result<PlanEntity> {
            let mut conn = db_pool.get()?;

            let row = insert_into(plans::table)
                .values(&insert_plan_entity)
                .returning(PlanEntity::as_returning())
                .get_result::<PlanEntity>(&mut conn)?;

            Ok(row)
        })
        .await??)
    }

    async fn update(
        &self,
        plan_id: i64,
        changes: UpdatePlanEntity,
    ) -> Result<Option<PlanEntity>> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> Result<Option<PlanEntity>> {
            let mut conn = db_pool.get()?;

            let row = update(plans::table.filter(plans::id.eq(plan_id)))
                .set((&changes, plans::updated_at.eq(Utc::now())))
                .returning(PlanEntity::as_returning())
                .get_result::<PlanEntity>(&mut conn)
                .optional()?;

            Ok(row)
        })
        .await??)
    }

    async fn deactivate(&self, plan_id: i64) -> Result<Option<i64>> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> Result<Option<i64>> {
            let mut conn = db_pool.get()?;

            let id = update(plans::table.filter(plans::id.eq(plan_id)))
                .set((
                    plans::is_active.eq(false),
                    plans::updated_at.eq(Utc::now()),
                ))
                .returning(plans::id)
                .get_result::<i64>(&mut conn)
                .optional()?;

            Ok(id)
        })
        .await??)
    }
}
