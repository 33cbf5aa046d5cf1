use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    response::IntoResponse,
    routing::{get, post},
};
use crates::{
    domain::{
        repositories::{mailer::Mailer, payments::PaymentRepository, realtime::RealtimeNotifier},
        value_objects::payments::{ApprovePaymentModel, RejectPaymentModel, UploadProofModel},
    },
    infra::db::{
        postgres::postgres_connection::PgPoolSquad, repositories::payments::PaymentPostgres,
    },
};

use crate::{
    auth::{AuthAdmin, AuthCustomer},
    axum_http::error_responses::error_response,
    config::config_model::Sftp,
    usecases::payments::PaymentUseCase,
};

pub fn routes(
    db_pool: Arc<PgPoolSquad>,
    mailer: Arc<dyn Mailer + Send + Sync>,
    notifier: Arc<dyn RealtimeNotifier + Send + Sync>,
    sftp: Sftp,
) -> Router {
    let payment_repository = PaymentPostgres::new(Arc::clone(&db_pool));
    let payment_usecase =
        PaymentUseCase::new(Arc::new(payment_repository), mailer, notifier, sftp);

    Router::new()
        .route("/pending", get(list_pending))
        .route("/:payment_id", get(get_payment))
        .route("/:payment_id/approve", post(approve))
        .route("/:payment_id/reject", post(reject))
        .route("/:payment_id/proof", post(upload_proof))
        .with_state(Arc::new(payment_usecase))
}

pub async fn list_pending<P>(
    State(payment_usecase): State<Arc<PaymentUseCase<P>>>,
    _admin: AuthAdmin,
) -> impl IntoResponse
where
    P: PaymentRepository + Send + Sync + 'static,
{
    match payment_usecase.list_pending().await {
        Ok(payments) => Json(payments).into_response(),
        Err(err) => error_response(err.status_code(), err.error_code(), err.to_string()),
    }
}

pub async fn get_payment<P>(
    State(payment_usecase): State<Arc<PaymentUseCase<P>>>,
    _admin: AuthAdmin,
    Path(payment_id): Path<i64>,
) -> impl IntoResponse
where
    P: PaymentRepository + Send + Sync + 'static,
{
    match payment_usecase.get_payment(payment_id).await {
        Ok(payment) => Json(payment).into_response(),
        Err(err) => error_response(err.status_code(), err.error_code(), err.to_string()),
    }
}

pub async fn approve<P>(
    State(payment_usecase): State<Arc<PaymentUseCase<P>>>,
    AuthAdmin { admin_id }: AuthAdmin,
    Path(payment_id): Path<i64>,
    Json(approve_payment_model): Json<ApprovePaymentModel>,
) -> impl IntoResponse
where
    P: PaymentRepository + Send + Sync + 'static,
{
    match payment_usecase
        .approve(payment_id, approve_payment_model, admin_id)
        .await
    {
        Ok(approved) => Json(approved).into_response(),
        Err(err) => error_response(err.status_code(), err.error_code(), err.to_string()),
    }
}

pub async fn reject<P>(
    State(payment_usecase): State<Arc<PaymentUseCase<P>>>,
    AuthAdmin { admin_id }: AuthAdmin,
    Path(payment_id): Path<i64>,
    Json(reject_payment_model): Json<RejectPaymentModel>,
) -> impl IntoResponse
where
    P: PaymentRepository + Send + Sync + 'static,
{
    match payment_usecase
        .reject(payment_id, reject_payment_model, admin_id)
        .await
    {
        Ok(rejected) => Json(rejected).into_response(),
        Err(err) => error_response(err.status_code(), err.error_code(), err.to_string()),
    }
}

pub async fn upload_proof<P>(
    State(payment_usecase): State<Arc<PaymentUseCase<P>>>,
    AuthCustomer { customer_id }: AuthCustomer,
    Path(payment_id): Path<i64>,
    Json(upload_proof_model): Json<UploadProofModel>,
) -> impl IntoResponse
where
    P: PaymentRepository + Send + Sync + 'static,
{
    match payment_usecase
        .upload_proof(payment_id, customer_id, upload_proof_model)
        .await
    {
        Ok(submitted) => Json(submitted).into_response(),
        Err(err) => error_response(err.status_code(), err.error_code(), err.to_string()),
    }
}
