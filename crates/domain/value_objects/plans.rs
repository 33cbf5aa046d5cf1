use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entities::plans::PlanEntity;

#[derive(Debug, Clone, Serialize)]
pub struct PlanDto {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub price_minor: i32,
    pub duration_days: i32,
    pub cpu_cores: i32,
    pub ram_gb: i32,
    pub storage_gb: i32,
    pub max_players: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<PlanEntity> for PlanDto {
    fn from(plan: PlanEntity) -> Self {
        Self {
            id: plan.id,
            name: plan.name,
            description: plan.description,
            price_minor: plan.price_minor,
            duration_days: plan.duration_days,
            cpu_cores: plan.cpu_cores,
            ram_gb: plan.ram_gb,
            storage_gb: plan.storage_gb,
            max_players: plan.max_players,
            is_active: plan.is_active,
            created_at: plan.created_at,
            updated_at: plan.updated_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatePlanModel {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price_minor: Option<i32>,
    pub duration_days: Option<i32>,
    pub cpu_cores: Option<i32>,
    pub ram_gb: Option<i32>,
    pub storage_gb: Option<i32>,
    pub max_players: Option<i32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdatePlanModel {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price_minor: Option<i32>,
    pub duration_days: Option<i32>,
    pub cpu_cores: Option<i32>,
    pub ram_gb: Option<i32>,
    pub storage_gb: Option<i32>,
    pub max_players: Option<i32>,
    pub is_active: Option<bool>,
}
