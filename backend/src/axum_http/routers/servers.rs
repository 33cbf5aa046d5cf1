use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    response::IntoResponse,
    routing::{get, post},
};
use crates::{
    domain::{
        repositories::{plans::PlanRepository, servers::ServerRepository},
        value_objects::servers::PurchaseServerModel,
    },
    infra::db::{
        postgres::postgres_connection::PgPoolSquad,
        repositories::{plans::PlanPostgres, servers::ServerPostgres},
    },
};

use crate::{
    auth::{AuthAdmin, AuthCustomer},
    axum_http::error_responses::error_response,
    config::config_model::Sftp,
    usecases::servers::ServerUseCase,
};

pub fn routes(db_pool: Arc<PgPoolSquad>, sftp: Sftp) -> Router {
    let server_repository = ServerPostgres::new(Arc::clone(&db_pool));
    let plan_repository = PlanPostgres::new(Arc::clone(&db_pool));
    let server_usecase =
        ServerUseCase::new(Arc::new(server_repository), Arc::new(plan_repository), sftp);

    Router::new()
        .route("/", get(list_my_servers).post(purchase))
        .route("/all", get(list_all))
        .route("/:server_id", get(get_my_server))
        .route("/:server_id/renew", post(renew))
        .route("/:server_id/credentials", get(credentials))
        .with_state(Arc::new(server_usecase))
}

pub async fn purchase<S, P>(
    State(server_usecase): State<Arc<ServerUseCase<S, P>>>,
    AuthCustomer { customer_id }: AuthCustomer,
    Json(purchase_server_model): Json<PurchaseServerModel>,
) -> impl IntoResponse
where
    S: ServerRepository + Send + Sync + 'static,
    P: PlanRepository + Send + Sync + 'static,
{
    match server_usecase
        .purchase(customer_id, purchase_server_model)
        .await
    {
        Ok(receipt) => Json(receipt).into_response(),
        Err(err) => error_response(err.status_code(), err.error_code(), err.to_string()),
    }
}

pub async fn renew<S, P>(
    State(server_usecase): State<Arc<ServerUseCase<S, P>>>,
    AuthCustomer { customer_id }: AuthCustomer,
    Path(server_id): Path<i64>,
) -> impl IntoResponse
where
    S: ServerRepository + Send + Sync + 'static,
    P: PlanRepository + Send + Sync + 'static,
{
    match server_usecase.renew(server_id, customer_id).await {
        Ok(receipt) => Json(receipt).into_response(),
        Err(err) => error_response(err.status_code(), err.error_code(), err.to_string()),
    }
}

pub async fn list_my_servers<S, P>(
    State(server_usecase): State<Arc<ServerUseCase<S, P>>>,
    AuthCustomer { customer_id }: AuthCustomer,
) -> impl IntoResponse
where
    S: ServerRepository + Send + Sync + 'static,
    P: PlanRepository + Send + Sync + 'static,
{
    match server_usecase.list_my_servers(customer_id).await {
        Ok(servers) => Json(servers).into_response(),
        Err(err) => error_response(err.status_code(), err.error_code(), err.to_string()),
    }
}

pub async fn get_my_server<S, P>(
    State(server_usecase): State<Arc<ServerUseCase<S, P>>>,
    AuthCustomer { customer_id }: AuthCustomer,
    Path(server_id): Path<i64>,
) -> impl IntoResponse
where
    S: ServerRepository + Send + Sync + 'static,
    P: PlanRepository + Send + Sync + 'static,
{
    match server_usecase.get_my_server(server_id, customer_id).await {
        Ok(server) => Json(server).into_response(),
        Err(err) => error_response(err.status_code(), err.error_code(), err.to_string()),
    }
}

pub async fn credentials<S, P>(
    State(server_usecase): State<Arc<ServerUseCase<S, P>>>,
    AuthCustomer { customer_id }: AuthCustomer,
    Path(server_id): Path<i64>,
) -> impl IntoResponse
where
    S: ServerRepository + Send + Sync + 'static,
    P: PlanRepository + Send + Sync + 'static,
{
    match server_usecase.credentials(server_id, customer_id).await {
        Ok(view) => Json(view).into_response(),
        Err(err) => error_response(err.status_code(), err.error_code(), err.to_string()),
    }
}

pub async fn list_all<S, P>(
    State(server_usecase): State<Arc<ServerUseCase<S, P>>>,
    _admin: AuthAdmin,
) -> impl IntoResponse
where
    S: ServerRepository + Send + Sync + 'static,
    P: PlanRepository + Send + Sync + 'static,
{
    match server_usecase.list_all().await {
        Ok(servers) => Json(servers).into_response(),
        Err(err) => error_response(err.status_code(), err.error_code(), err.to_string()),
    }
}
