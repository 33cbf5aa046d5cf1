use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;

use crate::domain::entities::plans::{InsertPlanEntity, PlanEntity, UpdatePlanEntity};

#[async_trait]
#[automock]
pub trait PlanRepository {
    async fn list_active(&self) -> Result<Vec<PlanEntity>>;
    async fn find_active_by_id(&self, plan_id: i64) -> Result<Option<PlanEntity>>;
    async fn create(&self, plan: InsertPlanEntity) -> Result<PlanEntity>;
    async fn update(&self, plan_id: i64, changes: UpdatePlanEntity)
    -> Result<Option<PlanEntity>>;
    async fn deactivate(&self, plan_id: i64) -> Result<Option<i64>>;
}
