use crate::{axum_http::default_routers, axum_http::routers, config::config_model::DotEnvyConfig};
use anyhow::Result;
use axum::{
    Router,
    http::{
        Method,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
    routing::get,
};
use crates::{
    domain::repositories::{mailer::Mailer, realtime::RealtimeNotifier},
    infra::{db::postgres::postgres_connection::PgPoolSquad, realtime::BroadcastNotifier},
};
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;

pub async fn start(
    config: Arc<DotEnvyConfig>,
    db_pool: Arc<PgPoolSquad>,
    mailer: Arc<dyn Mailer + Send + Sync>,
    notifier: Arc<BroadcastNotifier>,
) -> Result<()> {
    let realtime: Arc<dyn RealtimeNotifier + Send + Sync> = Arc::clone(&notifier) as _;

    let app = Router::new()
        .fallback(default_routers::not_found)
        .nest("/api/v1/auth", routers::auth::routes(Arc::clone(&db_pool)))
        .nest(
            "/api/v1/plans",
            routers::plans::routes(Arc::clone(&db_pool)),
        )
        .nest(
            "/api/v1/servers",
            routers::servers::routes(Arc::clone(&db_pool), config.sftp.clone()),
        )
        .nest(
            "/api/v1/payments",
            routers::payments::routes(
                Arc::clone(&db_pool),
                Arc::clone(&mailer),
                realtime,
                config.sftp.clone(),
            ),
        )
        .nest(
            "/api/v1/audit-logs",
            routers::audit_logs::routes(Arc::clone(&db_pool)),
        )
        .nest(
            "/api/v1/admin/events",
            routers::admin_events::routes(Arc::clone(&notifier)),
        )
        .route("/api/v1/health-check", get(default_routers::health_check))
        .layer(TimeoutLayer::new(Duration::from_secs(config.server.timeout)))
        .layer(RequestBodyLimitLayer::new(
            (config.server.body_limit * 1024 * 1024).try_into()?,
        ))
        .layer(
            CorsLayer::new()
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PATCH,
                    Method::PUT,
                    Method::DELETE,
                ])
                .allow_headers([AUTHORIZATION, CONTENT_TYPE])
                .allow_origin(Any), // TODO Add the domain later
        )
        .layer(TraceLayer::new_for_http());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    let listener = TcpListener::bind(addr).await?;

    info!("Server is running on port {}", config.server.port);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install CTRL+C signal handler");
    };

    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received ctrl+C signal"),
        _ = terminate => info!("Received terminate signal"),
    }
}
