use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    response::IntoResponse,
    routing::post,
};
use crates::{
    domain::repositories::users::UserRepository,
    infra::db::{
        postgres::postgres_connection::PgPoolSquad, repositories::users::UserPostgres,
    },
};

use crate::{
    axum_http::error_responses::error_response,
    usecases::auth::{AuthUseCase, LoginModel},
};

pub fn routes(db_pool: Arc<PgPoolSquad>) -> Router {
    let user_repository = UserPostgres::new(Arc::clone(&db_pool));
    let auth_usecase = AuthUseCase::new(Arc::new(user_repository));

    Router::new()
        .route("/login", post(login))
        .with_state(Arc::new(auth_usecase))
}

pub async fn login<U>(
    State(auth_usecase): State<Arc<AuthUseCase<U>>>,
    Json(login_model): Json<LoginModel>,
) -> impl IntoResponse
where
    U: UserRepository + Send + Sync + 'static,
{
    match auth_usecase.login(login_model).await {
        Ok(response) => Json(response).into_response(),
        Err(err) => error_response(err.status_code(), err.error_code(), err.to_string()),
    }
}
