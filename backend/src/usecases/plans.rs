use std::sync::Arc;

use crates::domain::{
    entities::plans::{InsertPlanEntity, UpdatePlanEntity},
    repositories::plans::PlanRepository,
    value_objects::plans::{CreatePlanModel, PlanDto, UpdatePlanModel},
};
use thiserror::Error;
use tracing::{error, info, warn};

const DEFAULT_CPU_CORES: i32 = 1;
const DEFAULT_RAM_GB: i32 = 2;
const DEFAULT_STORAGE_GB: i32 = 10;
const DEFAULT_MAX_PLAYERS: i32 = 10;

#[derive(Debug, Error)]
pub enum PlanError {
    #[error("plan not found")]
    NotFound,
    #[error("missing required field: {0}")]
    MissingField(&'static str),
    #[error("invalid field: {0}")]
    InvalidField(&'static str),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl PlanError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            PlanError::NotFound => StatusCode::NOT_FOUND,
            PlanError::MissingField(_) | PlanError::InvalidField(_) => StatusCode::BAD_REQUEST,
            PlanError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            PlanError::NotFound => "plan_not_found",
            PlanError::MissingField(_) => "missing_field",
            PlanError::InvalidField(_) => "invalid_field",
            PlanError::Internal(_) => "internal_error",
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, PlanError>;

pub struct PlanUseCase<P>
where
    P: PlanRepository + Send + Sync + 'static,
{
    plan_repo: Arc<P>,
}

impl<P> PlanUseCase<P>
where
    P: PlanRepository + Send + Sync + 'static,
{
    pub fn new(plan_repo: Arc<P>) -> Self {
        Self { plan_repo }
    }

    pub async fn list_plans(&self) -> UseCaseResult<Vec<PlanDto>> {
        let plans = self.plan_repo.list_active().await.map_err(|err| {
            error!(db_error = ?err, "plans: failed to list active plans");
            PlanError::Internal(err)
        })?;

        Ok(plans.into_iter().map(PlanDto::from).collect())
    }

    pub async fn get_plan(&self, plan_id: i64) -> UseCaseResult<PlanDto> {
        self.plan_repo
            .find_active_by_id(plan_id)
            .await
            .map_err(|err| {
                error!(%plan_id, db_error = ?err, "plans: failed to load plan");
                PlanError::Internal(err)
            })?
            .map(PlanDto::from)
            .ok_or(PlanError::NotFound)
    }

    pub async fn create_plan(&self, model: CreatePlanModel) -> UseCaseResult<PlanDto> {
        let name = model
            .name
            .filter(|value| !value.trim().is_empty())
            .ok_or(PlanError::MissingField("name"))?;
        let price_minor = model.price_minor.ok_or(PlanError::MissingField("price_minor"))?;
        let duration_days = model
            .duration_days
            .ok_or(PlanError::MissingField("duration_days"))?;

        if price_minor < 0 {
            return Err(PlanError::InvalidField("price_minor"));
        }
        if duration_days <= 0 {
            return Err(PlanError::InvalidField("duration_days"));
        }

        let plan = self
            .plan_repo
            .create(InsertPlanEntity {
                name,
                description: model.description,
                price_minor,
                duration_days,
                cpu_cores: model.cpu_cores.unwrap_or(DEFAULT_CPU_CORES),
                ram_gb: model.ram_gb.unwrap_or(DEFAULT_RAM_GB),
                storage_gb: model.storage_gb.unwrap_or(DEFAULT_STORAGE_GB),
                max_players: model.max_players.unwrap_or(DEFAULT_MAX_PLAYERS),
            })
            .await
            .map_err(|err| {
                error!(db_error = ?err, "plans: failed to create plan");
                PlanError::Internal(err)
            })?;

        info!(plan_id = plan.id, "plans: plan created");
        Ok(PlanDto::from(plan))
    }

    pub async fn update_plan(
        &self,
        plan_id: i64,
        model: UpdatePlanModel,
    ) -> UseCaseResult<PlanDto> {
        if let Some(price_minor) = model.price_minor {
            if price_minor < 0 {
                return Err(PlanError::InvalidField("price_minor"));
            }
        }
        if let Some(duration_days) = model.duration_days {
            if duration_days <= 0 {
                return Err(PlanError::InvalidField("duration_days"));
            }
        }

        let changes = UpdatePlanEntity {
            name: model.name,
            description: model.description,
            price_minor: model.price_minor,
            duration_days: model.duration_days,
            cpu_cores: model.cpu_cores,
            ram_gb: model.ram_gb,
            storage_gb: model.storage_gb,
            max_players: model.max_players,
            is_active: model.is_active,
        };

        let plan = self
            .plan_repo
            .update(plan_id, changes)
            .await
            .map_err(|err| {
                error!(%plan_id, db_error = ?err, "plans: failed to update plan");
                PlanError::Internal(err)
            })?
            .ok_or(PlanError::NotFound)?;

        info!(%plan_id, "plans: plan updated");
        Ok(PlanDto::from(plan))
    }

    pub async fn deactivate_plan(&self, plan_id: i64) -> UseCaseResult<()> {
        let deactivated = self.plan_repo.deactivate(plan_id).await.map_err(|err| {
            error!(%plan_id, db_error = ?err, "plans: failed to deactivate plan");
            PlanError::Internal(err)
        })?;

        match deactivated {
            Some(_) => {
                info!(%plan_id, "plans: plan deactivated");
                Ok(())
            }
            None => {
                warn!(%plan_id, "plans: deactivate on unknown plan");
                Err(PlanError::NotFound)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use crates::domain::{entities::plans::PlanEntity, repositories::plans::MockPlanRepository};

    fn sample_plan(id: i64) -> PlanEntity {
        let now = Utc::now();
        PlanEntity {
            id,
            name: "Iron".to_string(),
            description: Some("entry tier".to_string()),
            price_minor: 1000,
            duration_days: 30,
            cpu_cores: 2,
            ram_gb: 4,
            storage_gb: 20,
            max_players: 20,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn create_plan_requires_name_price_and_duration() {
        let mut plan_repo = MockPlanRepository::new();
        plan_repo.expect_create().never();

        let usecase = PlanUseCase::new(Arc::new(plan_repo));

        let err = usecase
            .create_plan(CreatePlanModel {
                name: None,
                description: None,
                price_minor: Some(1000),
                duration_days: Some(30),
                cpu_cores: None,
                ram_gb: None,
                storage_gb: None,
                max_players: None,
            })
            .await
            .unwrap_err();

        assert!(matches!(err, PlanError::MissingField("name")));
    }

    #[tokio::test]
    async fn create_plan_fills_resource_defaults() {
        let mut plan_repo = MockPlanRepository::new();
        plan_repo.expect_create().returning(|insert| {
            assert_eq!(insert.cpu_cores, DEFAULT_CPU_CORES);
            assert_eq!(insert.max_players, DEFAULT_MAX_PLAYERS);
            Box::pin(async { Ok(sample_plan(3)) })
        });

        let usecase = PlanUseCase::new(Arc::new(plan_repo));

        let plan = usecase
            .create_plan(CreatePlanModel {
                name: Some("Iron".to_string()),
                description: None,
                price_minor: Some(1000),
                duration_days: Some(30),
                cpu_cores: None,
                ram_gb: None,
                storage_gb: None,
                max_players: None,
            })
            .await
            .unwrap();

        assert_eq!(plan.id, 3);
    }

    #[tokio::test]
    async fn update_rejects_non_positive_duration() {
        let mut plan_repo = MockPlanRepository::new();
        plan_repo.expect_update().never();

        let usecase = PlanUseCase::new(Arc::new(plan_repo));

        let err = usecase
            .update_plan(
                3,
                UpdatePlanModel {
                    name: None,
                    description: None,
                    price_minor: None,
                    duration_days: Some(0),
                    cpu_cores: None,
                    ram_gb: None,
                    storage_gb: None,
                    max_players: None,
                    is_active: None,
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, PlanError::InvalidField("duration_days")));
    }

    #[tokio::test]
    async fn deactivate_unknown_plan_is_not_found() {
        let mut plan_repo = MockPlanRepository::new();
        plan_repo
            .expect_deactivate()
            .returning(|_| Box::pin(async { Ok(None) }));

        let usecase = PlanUseCase::new(Arc::new(plan_repo));

        let err = usecase.deactivate_plan(404).await.unwrap_err();
        assert!(matches!(err, PlanError::NotFound));
    }
}
