use std::sync::Arc;

use chrono::{Duration, Utc};
use crates::domain::{
    repositories::{plans::PlanRepository, servers::ServerRepository},
    value_objects::{
        enums::server_statuses::ServerStatus,
        servers::{
            AdminServerRow, CredentialsView, PurchaseReceipt, PurchaseServer,
            PurchaseServerModel, RenewOutcome, RenewalReceipt, ServerDetail, ServerSummary,
        },
    },
};
use thiserror::Error;
use tracing::{error, info, warn};

use crate::config::config_model::Sftp;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("server not found")]
    NotFound,
    #[error("plan not found")]
    PlanNotFound,
    #[error("missing required field: {0}")]
    MissingField(&'static str),
    #[error("server has no issued credentials")]
    CredentialsNotIssued,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ServerError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            ServerError::NotFound | ServerError::PlanNotFound => StatusCode::NOT_FOUND,
            ServerError::MissingField(_) => StatusCode::BAD_REQUEST,
            ServerError::CredentialsNotIssued => StatusCode::CONFLICT,
            ServerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            ServerError::NotFound => "server_not_found",
            ServerError::PlanNotFound => "plan_not_found",
            ServerError::MissingField(_) => "missing_field",
            ServerError::CredentialsNotIssued => "credentials_not_issued",
            ServerError::Internal(_) => "internal_error",
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, ServerError>;

pub struct ServerUseCase<S, P>
where
    S: ServerRepository + Send + Sync + 'static,
    P: PlanRepository + Send + Sync + 'static,
{
    server_repo: Arc<S>,
    plan_repo: Arc<P>,
    sftp: Sftp,
}

impl<S, P> ServerUseCase<S, P>
where
    S: ServerRepository + Send + Sync + 'static,
    P: PlanRepository + Send + Sync + 'static,
{
    pub fn new(server_repo: Arc<S>, plan_repo: Arc<P>, sftp: Sftp) -> Self {
        Self {
            server_repo,
            plan_repo,
            sftp,
        }
    }

    /// Creates the server and its pending payment together. The amount and
    /// expiry are resolved from the plan here so the repository transaction
    /// only persists.
    pub async fn purchase(
        &self,
        customer_id: i64,
        model: PurchaseServerModel,
    ) -> UseCaseResult<PurchaseReceipt> {
        let server_name = match model
            .server_name
            .filter(|value| !value.trim().is_empty())
        {
            Some(value) => value,
            None => {
                let err = ServerError::MissingField("server_name");
                warn!(
                    %customer_id,
                    status = err.status_code().as_u16(),
                    "servers: purchase without server name"
                );
                return Err(err);
            }
        };

        let plan = self
            .plan_repo
            .find_active_by_id(model.plan_id)
            .await
            .map_err(|err| {
                error!(plan_id = model.plan_id, db_error = ?err, "servers: failed to load plan");
                ServerError::Internal(err)
            })?
            .ok_or(ServerError::PlanNotFound)?;

        let expires_at = Utc::now() + Duration::days(plan.duration_days.into());

        let receipt = self
            .server_repo
            .create_with_pending_payment(PurchaseServer {
                customer_id,
                plan_id: plan.id,
                server_name,
                amount_minor: plan.price_minor,
                expires_at,
            })
            .await
            .map_err(|err| {
                error!(%customer_id, plan_id = plan.id, db_error = ?err, "servers: purchase transaction failed");
                ServerError::Internal(err)
            })?;

        info!(
            %customer_id,
            server_id = receipt.server.id,
            payment_id = receipt.payment.id,
            "servers: server purchased"
        );

        Ok(receipt)
    }

    /// Customer-initiated renewal: extends the expiry from its current value
    /// and opens a pending payment for the extension.
    pub async fn renew(
        &self,
        server_id: i64,
        customer_id: i64,
    ) -> UseCaseResult<RenewalReceipt> {
        let outcome = self
            .server_repo
            .renew(server_id, customer_id)
            .await
            .map_err(|err| {
                error!(%server_id, %customer_id, db_error = ?err, "servers: renew transaction failed");
                ServerError::Internal(err)
            })?;

        match outcome {
            RenewOutcome::Renewed(receipt) => {
                info!(%server_id, %customer_id, "servers: server renewed");
                Ok(receipt)
            }
            RenewOutcome::ServerNotFound => Err(ServerError::NotFound),
            RenewOutcome::PlanNotFound => Err(ServerError::PlanNotFound),
        }
    }

    pub async fn list_my_servers(&self, customer_id: i64) -> UseCaseResult<Vec<ServerSummary>> {
        self.server_repo
            .list_for_customer(customer_id)
            .await
            .map_err(|err| {
                error!(%customer_id, db_error = ?err, "servers: failed to list servers");
                ServerError::Internal(err)
            })
    }

    pub async fn get_my_server(
        &self,
        server_id: i64,
        customer_id: i64,
    ) -> UseCaseResult<ServerDetail> {
        self.server_repo
            .find_for_customer(server_id, customer_id)
            .await
            .map_err(|err| {
                error!(%server_id, %customer_id, db_error = ?err, "servers: failed to load server");
                ServerError::Internal(err)
            })?
            .ok_or(ServerError::NotFound)
    }

    /// Credentials exist only once the server is active; before that the
    /// endpoint answers with a conflict rather than empty fields.
    pub async fn credentials(
        &self,
        server_id: i64,
        customer_id: i64,
    ) -> UseCaseResult<CredentialsView> {
        let row = self
            .server_repo
            .credentials_for_customer(server_id, customer_id)
            .await
            .map_err(|err| {
                error!(%server_id, %customer_id, db_error = ?err, "servers: failed to load credentials");
                ServerError::Internal(err)
            })?
            .ok_or(ServerError::NotFound)?;

        if ServerStatus::from_str(&row.status) != Some(ServerStatus::Active) {
            return Err(ServerError::CredentialsNotIssued);
        }

        match (row.server_username, row.server_password) {
            (Some(username), Some(password)) => Ok(CredentialsView {
                username,
                password,
                host: self.sftp.host.clone(),
                port: self.sftp.port,
            }),
            _ => Err(ServerError::CredentialsNotIssued),
        }
    }

    pub async fn list_all(&self) -> UseCaseResult<Vec<AdminServerRow>> {
        self.server_repo.list_all().await.map_err(|err| {
            error!(db_error = ?err, "servers: failed to list all servers");
            ServerError::Internal(err)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crates::domain::{
        entities::plans::PlanEntity,
        repositories::{plans::MockPlanRepository, servers::MockServerRepository},
        value_objects::servers::{CredentialsRow, PurchasedPaymentDto, PurchasedServerDto},
    };
    use mockall::predicate::eq;

    fn sftp() -> Sftp {
        Sftp {
            host: "sftp.astra.host".to_string(),
            port: 2222,
        }
    }

    fn sample_plan(id: i64) -> PlanEntity {
        let now = Utc::now();
        PlanEntity {
            id,
            name: "Iron".to_string(),
            description: None,
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

    fn receipt_for(command: &PurchaseServer) -> PurchaseReceipt {
        PurchaseReceipt {
            server: PurchasedServerDto {
                id: 11,
                server_name: command.server_name.clone(),
                status: "pending".to_string(),
                expires_at: command.expires_at,
                created_at: Utc::now(),
            },
            payment: PurchasedPaymentDto {
                id: 5,
                amount_minor: command.amount_minor,
                status: "pending".to_string(),
            },
        }
    }

    #[tokio::test]
    async fn purchase_resolves_amount_and_expiry_from_plan() {
        let mut server_repo = MockServerRepository::new();
        let mut plan_repo = MockPlanRepository::new();

        plan_repo
            .expect_find_active_by_id()
            .with(eq(3))
            .returning(|id| {
                let plan = sample_plan(id);
                Box::pin(async move { Ok(Some(plan)) })
            });

        server_repo
            .expect_create_with_pending_payment()
            .returning(|command| {
                assert_eq!(command.amount_minor, 1000);
                let expected = Utc::now() + Duration::days(30);
                let drift = (expected - command.expires_at).num_seconds().abs();
                assert!(drift < 5, "expires_at should be ~30 days out");
                let receipt = receipt_for(&command);
                Box::pin(async move { Ok(receipt) })
            });

        let usecase = ServerUseCase::new(Arc::new(server_repo), Arc::new(plan_repo), sftp());

        let receipt = usecase
            .purchase(
                9,
                PurchaseServerModel {
                    plan_id: 3,
                    server_name: Some("my-craft".to_string()),
                },
            )
            .await
            .unwrap();

        assert_eq!(receipt.server.status, "pending");
        assert_eq!(receipt.payment.status, "pending");
        assert_eq!(receipt.payment.amount_minor, 1000);
    }

    #[tokio::test]
    async fn purchase_of_unknown_plan_fails() {
        let mut server_repo = MockServerRepository::new();
        server_repo.expect_create_with_pending_payment().never();

        let mut plan_repo = MockPlanRepository::new();
        plan_repo
            .expect_find_active_by_id()
            .returning(|_| Box::pin(async { Ok(None) }));

        let usecase = ServerUseCase::new(Arc::new(server_repo), Arc::new(plan_repo), sftp());

        let err = usecase
            .purchase(
                9,
                PurchaseServerModel {
                    plan_id: 404,
                    server_name: Some("my-craft".to_string()),
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, ServerError::PlanNotFound));
    }

    #[tokio::test]
    async fn purchase_requires_a_server_name() {
        let server_repo = MockServerRepository::new();
        let mut plan_repo = MockPlanRepository::new();
        plan_repo.expect_find_active_by_id().never();

        let usecase = ServerUseCase::new(Arc::new(server_repo), Arc::new(plan_repo), sftp());

        let err = usecase
            .purchase(
                9,
                PurchaseServerModel {
                    plan_id: 3,
                    server_name: None,
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, ServerError::MissingField("server_name")));
    }

    #[tokio::test]
    async fn renew_maps_missing_server_to_not_found() {
        let mut server_repo = MockServerRepository::new();
        server_repo
            .expect_renew()
            .with(eq(11), eq(9))
            .returning(|_, _| Box::pin(async { Ok(RenewOutcome::ServerNotFound) }));

        let plan_repo = MockPlanRepository::new();
        let usecase = ServerUseCase::new(Arc::new(server_repo), Arc::new(plan_repo), sftp());

        let err = usecase.renew(11, 9).await.unwrap_err();
        assert!(matches!(err, ServerError::NotFound));
    }

    #[tokio::test]
    async fn credentials_are_gated_on_active_status() {
        let mut server_repo = MockServerRepository::new();
        server_repo
            .expect_credentials_for_customer()
            .returning(|_, _| {
                Box::pin(async {
                    Ok(Some(CredentialsRow {
                        server_username: None,
                        server_password: None,
                        status: "pending".to_string(),
                    }))
                })
            });

        let plan_repo = MockPlanRepository::new();
        let usecase = ServerUseCase::new(Arc::new(server_repo), Arc::new(plan_repo), sftp());

        let err = usecase.credentials(11, 9).await.unwrap_err();
        assert!(matches!(err, ServerError::CredentialsNotIssued));
    }

    #[tokio::test]
    async fn credentials_include_sftp_endpoint() {
        let mut server_repo = MockServerRepository::new();
        server_repo
            .expect_credentials_for_customer()
            .returning(|_, _| {
                Box::pin(async {
                    Ok(Some(CredentialsRow {
                        server_username: Some("user_11".to_string()),
                        server_password: Some("hunter2hunter2aa".to_string()),
                        status: "active".to_string(),
                    }))
                })
            });

        let plan_repo = MockPlanRepository::new();
        let usecase = ServerUseCase::new(Arc::new(server_repo), Arc::new(plan_repo), sftp());

        let view = usecase.credentials(11, 9).await.unwrap();
        assert_eq!(view.username, "user_11");
        assert_eq!(view.host, "sftp.astra.host");
        assert_eq!(view.port, 2222);
    }
}
