use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    response::IntoResponse,
    routing::get,
};
use crates::{
    domain::{
        repositories::plans::PlanRepository,
        value_objects::plans::{CreatePlanModel, UpdatePlanModel},
    },
    infra::db::{
        postgres::postgres_connection::PgPoolSquad, repositories::plans::PlanPostgres,
    },
};

use crate::{
    auth::{AuthAdmin, AuthUser},
    axum_http::error_responses::error_response,
    usecases::plans::PlanUseCase,
};

pub fn routes(db_pool: Arc<PgPoolSquad>) -> Router {
    let plan_repository = PlanPostgres::new(Arc::clone(&db_pool));
    let plan_usecase = PlanUseCase::new(Arc::new(plan_repository));

    Router::new()
        .route("/", get(list_plans).post(create_plan))
        .route(
            "/:plan_id",
            get(get_plan).put(update_plan).delete(deactivate_plan),
        )
        .with_state(Arc::new(plan_usecase))
}

pub async fn list_plans<P>(
    State(plan_usecase): State<Arc<PlanUseCase<P>>>,
    _auth: AuthUser,
) -> impl IntoResponse
where
    P: PlanRepository + Send + Sync + 'static,
{
    match plan_usecase.list_plans().await {
        Ok(plans) => Json(plans).into_response(),
        Err(err) => error_response(err.status_code(), err.error_code(), err.to_string()),
    }
}

pub async fn get_plan<P>(
    State(plan_usecase): State<Arc<PlanUseCase<P>>>,
    _auth: AuthUser,
    Path(plan_id): Path<i64>,
) -> impl IntoResponse
where
    P: PlanRepository + Send + Sync + 'static,
{
    match plan_usecase.get_plan(plan_id).await {
        Ok(plan) => Json(plan).into_response(),
        Err(err) => error_response(err.status_code(), err.error_code(), err.to_string()),
    }
}

pub async fn create_plan<P>(
    State(plan_usecase): State<Arc<PlanUseCase<P>>>,
    _admin: AuthAdmin,
    Json(create_plan_model): Json<CreatePlanModel>,
) -> impl IntoResponse
where
    P: PlanRepository + Send + Sync + 'static,
{
    match plan_usecase.create_plan(create_plan_model).await {
        Ok(plan) => Json(plan).into_response(),
        Err(err) => error_response(err.status_code(), err.error_code(), err.to_string()),
    }
}

pub async fn update_plan<P>(
    State(plan_usecase): State<Arc<PlanUseCase<P>>>,
    _admin: AuthAdmin,
    Path(plan_id): Path<i64>,
    Json(update_plan_model): Json<UpdatePlanModel>,
) -> impl IntoResponse
where
    P: PlanRepository + Send + Sync + 'static,
{
    match plan_usecase.update_plan(plan_id, update_plan_model).await {
        Ok(plan) => Json(plan).into_response(),
        Err(err) => error_response(err.status_code(), err.error_code(), err.to_string()),
    }
}

pub async fn deactivate_plan<P>(
    State(plan_usecase): State<Arc<PlanUseCase<P>>>,
    _admin: AuthAdmin,
    Path(plan_id): Path<i64>,
) -> impl IntoResponse
where
    P: PlanRepository + Send + Sync + 'static,
{
    match plan_usecase.deactivate_plan(plan_id).await {
        Ok(()) => Json(serde_json::json!({ "deactivated": plan_id })).into_response(),
        Err(err) => error_response(err.status_code(), err.error_code(), err.to_string()),
    }
}
