use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use crates::{
    domain::repositories::audit_logs::AuditLogRepository,
    infra::db::{
        postgres::postgres_connection::PgPoolSquad,
        repositories::audit_logs::AuditLogPostgres,
    },
};
use serde::Deserialize;
use tracing::error;

use crate::auth::AuthAdmin;

const DEFAULT_LIMIT: i64 = 100;
const MAX_LIMIT: i64 = 500;

#[derive(Debug, Deserialize)]
pub struct AuditLogQuery {
    limit: Option<i64>,
}

pub fn routes(db_pool: Arc<PgPoolSquad>) -> Router {
    let audit_log_repository = AuditLogPostgres::new(Arc::clone(&db_pool));

    Router::new()
        .route("/", get(list_recent))
        .with_state(Arc::new(audit_log_repository))
}

pub async fn list_recent<A>(
    State(audit_log_repository): State<Arc<A>>,
    _admin: AuthAdmin,
    Query(query): Query<AuditLogQuery>,
) -> impl IntoResponse
where
    A: AuditLogRepository + Send + Sync + 'static,
{
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT);
    if limit <= 0 || limit > MAX_LIMIT {
        return (
            StatusCode::BAD_REQUEST,
            format!("limit must be between 1 and {}", MAX_LIMIT),
        )
            .into_response();
    }

    match audit_log_repository.list_recent(limit).await {
        Ok(entries) => Json(entries).into_response(),
        Err(err) => {
            error!(db_error = ?err, "audit_logs: failed to list entries");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to load audit log".to_string(),
            )
                .into_response()
        }
    }
}
