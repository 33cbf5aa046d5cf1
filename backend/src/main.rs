use anyhow::Result;
use backend::axum_http::http_serve;
use backend::config::config_loader;
use backend::scheduler;
use backend::usecases::{auto_renewal::AutoRenewalUseCase, expiration::ExpirationUseCase};
use crates::domain::repositories::realtime::RealtimeNotifier;
use crates::infra::{
    db::{
        postgres::postgres_connection,
        repositories::{leader_lock::PgAdvisoryLock, renewal_sweep::RenewalSweepPostgres},
    },
    mailer::{MailerSettings, mailer_from_settings},
    realtime::BroadcastNotifier,
};
use std::sync::Arc;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        error!("Backend exited with error: {}", error);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    dotenvy::dotenv().ok();
    crates::observability::init_observability("backend")?;

    let dotenvy_env = Arc::new(config_loader::load()?);
    info!("ENV has been loaded");

    let postgres_pool = postgres_connection::establish_connection(&dotenvy_env.database.url)?;
    info!("Postgres connection has been established");

    let db_pool = Arc::new(postgres_pool);

    let mailer = mailer_from_settings(MailerSettings {
        relay_url: dotenvy_env.mail.relay_url.clone(),
        from_email: dotenvy_env.mail.from_email.clone(),
        admin_email: dotenvy_env.mail.admin_email.clone(),
        log_dir: dotenvy_env.mail.log_dir.clone(),
    });

    let notifier = Arc::new(BroadcastNotifier::new());

    // Each scheduler task holds its own lock handle; both contend on the
    // same advisory key, so the two tasks also exclude each other.
    let auto_renewal_usecase = Arc::new(AutoRenewalUseCase::new(
        Arc::new(RenewalSweepPostgres::new(Arc::clone(&db_pool))),
        Arc::new(PgAdvisoryLock::new(dotenvy_env.database.url.clone())),
    ));
    tokio::spawn(scheduler::run_auto_renewal_loop(auto_renewal_usecase));

    let expiration_usecase = Arc::new(ExpirationUseCase::new(
        Arc::new(RenewalSweepPostgres::new(Arc::clone(&db_pool))),
        Arc::new(PgAdvisoryLock::new(dotenvy_env.database.url.clone())),
        Arc::clone(&notifier) as Arc<dyn RealtimeNotifier + Send + Sync>,
    ));
    tokio::spawn(scheduler::run_expiration_loop(expiration_usecase));

    http_serve::start(Arc::clone(&dotenvy_env), db_pool, mailer, notifier).await?;

    Ok(())
}
