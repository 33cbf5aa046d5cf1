use std::sync::Arc;

use crates::domain::{
    repositories::{mailer::Mailer, payments::PaymentRepository, realtime::RealtimeNotifier},
    value_objects::{
        credentials::ServerCredentials,
        enums::{payment_statuses::PaymentStatus, server_statuses::ServerStatus},
        payments::{
            ActivatedServerDto, ApprovePayment, ApprovePaymentModel, ApprovedPaymentDto,
            PaymentDetail, PaymentResolution, PendingPaymentSummary, ProofUploadOutcome,
            RejectPayment, RejectPaymentModel, ResolvedPaymentDto, UploadProofModel,
        },
    },
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::config::config_model::Sftp;

/// Fallback provisioning reference when the admin approves without one; the
/// operator assigns the real node afterwards.
const UNASSIGNED_PROVISIONING_ID: &str = "unassigned";

#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("payment not found")]
    NotFound,
    #[error("missing required field: {0}")]
    MissingField(&'static str),
    #[error("payment does not belong to this customer")]
    Forbidden,
    #[error("payment is not pending")]
    NotPending,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl PaymentError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            PaymentError::NotFound => StatusCode::NOT_FOUND,
            PaymentError::MissingField(_) => StatusCode::BAD_REQUEST,
            PaymentError::Forbidden => StatusCode::FORBIDDEN,
            PaymentError::NotPending => StatusCode::CONFLICT,
            PaymentError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            PaymentError::NotFound => "payment_not_found",
            PaymentError::MissingField(_) => "missing_field",
            PaymentError::Forbidden => "forbidden",
            PaymentError::NotPending => "payment_not_pending",
            PaymentError::Internal(_) => "internal_error",
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, PaymentError>;

#[derive(Debug, Clone, Serialize)]
pub struct ProofSubmittedDto {
    pub payment_id: i64,
    pub status: String,
    pub utr: String,
}

pub struct PaymentUseCase<P>
where
    P: PaymentRepository + Send + Sync + 'static,
{
    payment_repo: Arc<P>,
    mailer: Arc<dyn Mailer + Send + Sync>,
    notifier: Arc<dyn RealtimeNotifier + Send + Sync>,
    sftp: Sftp,
}

impl<P> PaymentUseCase<P>
where
    P: PaymentRepository + Send + Sync + 'static,
{
    pub fn new(
        payment_repo: Arc<P>,
        mailer: Arc<dyn Mailer + Send + Sync>,
        notifier: Arc<dyn RealtimeNotifier + Send + Sync>,
        sftp: Sftp,
    ) -> Self {
        Self {
            payment_repo,
            mailer,
            notifier,
            sftp,
        }
    }

    pub async fn list_pending(&self) -> UseCaseResult<Vec<PendingPaymentSummary>> {
        let payments = self.payment_repo.list_pending().await.map_err(|err| {
            error!(db_error = ?err, "payments: failed to list pending payments");
            PaymentError::Internal(err)
        })?;

        info!(payment_count = payments.len(), "payments: pending payments loaded");
        Ok(payments)
    }

    pub async fn get_payment(&self, payment_id: i64) -> UseCaseResult<PaymentDetail> {
        self.payment_repo
            .find_detail(payment_id)
            .await
            .map_err(|err| {
                error!(%payment_id, db_error = ?err, "payments: failed to load payment detail");
                PaymentError::Internal(err)
            })?
            .ok_or(PaymentError::NotFound)
    }

    /// Resolves a pending payment to `approved`. The payment flip, server
    /// activation with freshly generated credentials, and the audit entry
    /// commit in one transaction; mail and the realtime event go out after
    /// commit and are never allowed to fail the operation. A concurrent
    /// second approval loses the conditional update and surfaces as
    /// `NotFound`.
    pub async fn approve(
        &self,
        payment_id: i64,
        model: ApprovePaymentModel,
        admin_id: i64,
    ) -> UseCaseResult<ApprovedPaymentDto> {
        info!(%payment_id, %admin_id, "payments: approve requested");

        let utr = match model.utr.filter(|value| !value.trim().is_empty()) {
            Some(value) => value,
            None => {
                let err = PaymentError::MissingField("utr");
                warn!(
                    %payment_id,
                    %admin_id,
                    status = err.status_code().as_u16(),
                    "payments: approve without utr"
                );
                return Err(err);
            }
        };

        let pending = self
            .payment_repo
            .find_pending(payment_id)
            .await
            .map_err(|err| {
                error!(%payment_id, db_error = ?err, "payments: failed to load pending payment");
                PaymentError::Internal(err)
            })?
            .ok_or(PaymentError::NotFound)?;

        let credentials = ServerCredentials::generate(pending.server_id);

        let provisioning_id = model
            .provisioning_id
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| UNASSIGNED_PROVISIONING_ID.to_string());

        let resolution = self
            .payment_repo
            .approve_pending(ApprovePayment {
                payment_id,
                utr: utr.clone(),
                provisioning_id,
                admin_id,
                credentials: credentials.clone(),
            })
            .await
            .map_err(|err| {
                error!(%payment_id, %admin_id, db_error = ?err, "payments: approve transaction failed");
                PaymentError::Internal(err)
            })?
            // The pending row was resolved between the read and the update;
            // the race loser sees the same NotFound as a stale request.
            .ok_or(PaymentError::NotFound)?;

        info!(
            %payment_id,
            %admin_id,
            server_id = resolution.server_id,
            customer_id = resolution.customer_id,
            "payments: payment approved"
        );

        self.dispatch_approval_side_effects(resolution.clone(), credentials.clone());

        Ok(ApprovedPaymentDto {
            payment: ResolvedPaymentDto {
                id: resolution.payment_id,
                status: PaymentStatus::Approved.to_string(),
                utr: Some(utr),
                rejection_reason: None,
            },
            server: ActivatedServerDto {
                id: resolution.server_id,
                status: ServerStatus::Active.to_string(),
                credentials,
            },
        })
    }

    /// Resolves a pending payment to `rejected` and soft-deletes its server,
    /// with the audit entry in the same transaction.
    pub async fn reject(
        &self,
        payment_id: i64,
        model: RejectPaymentModel,
        admin_id: i64,
    ) -> UseCaseResult<ResolvedPaymentDto> {
        info!(%payment_id, %admin_id, "payments: reject requested");

        let reason = match model.reason.filter(|value| !value.trim().is_empty()) {
            Some(value) => value,
            None => {
                let err = PaymentError::MissingField("reason");
                warn!(
                    %payment_id,
                    %admin_id,
                    status = err.status_code().as_u16(),
                    "payments: reject without reason"
                );
                return Err(err);
            }
        };

        let resolution = self
            .payment_repo
            .reject_pending(RejectPayment {
                payment_id,
                reason: reason.clone(),
                admin_id,
            })
            .await
            .map_err(|err| {
                error!(%payment_id, %admin_id, db_error = ?err, "payments: reject transaction failed");
                PaymentError::Internal(err)
            })?
            .ok_or(PaymentError::NotFound)?;

        info!(
            %payment_id,
            %admin_id,
            server_id = resolution.server_id,
            "payments: payment rejected"
        );

        self.dispatch_rejection_side_effects(resolution.clone(), reason.clone());

        Ok(ResolvedPaymentDto {
            id: resolution.payment_id,
            status: PaymentStatus::Rejected.to_string(),
            utr: None,
            rejection_reason: Some(reason),
        })
    }

    /// Customer attaches a UTR to their own pending payment.
    pub async fn upload_proof(
        &self,
        payment_id: i64,
        customer_id: i64,
        model: UploadProofModel,
    ) -> UseCaseResult<ProofSubmittedDto> {
        let utr = match model.utr.filter(|value| !value.trim().is_empty()) {
            Some(value) => value,
            None => {
                let err = PaymentError::MissingField("utr");
                warn!(
                    %payment_id,
                    %customer_id,
                    status = err.status_code().as_u16(),
                    "payments: proof upload without utr"
                );
                return Err(err);
            }
        };

        let outcome = self
            .payment_repo
            .attach_proof(payment_id, customer_id, utr.clone())
            .await
            .map_err(|err| {
                error!(%payment_id, %customer_id, db_error = ?err, "payments: proof upload failed");
                PaymentError::Internal(err)
            })?;

        let resolution = match outcome {
            ProofUploadOutcome::Updated(resolution) => resolution,
            ProofUploadOutcome::NotOwner => {
                warn!(%payment_id, %customer_id, "payments: proof upload by non-owner");
                return Err(PaymentError::Forbidden);
            }
            ProofUploadOutcome::NotPending => {
                warn!(%payment_id, %customer_id, "payments: proof upload on resolved payment");
                return Err(PaymentError::NotPending);
            }
            ProofUploadOutcome::NotFound => return Err(PaymentError::NotFound),
        };

        info!(%payment_id, %customer_id, "payments: proof submitted");

        self.dispatch_proof_side_effects(resolution, utr.clone());

        Ok(ProofSubmittedDto {
            payment_id,
            status: PaymentStatus::Pending.to_string(),
            utr,
        })
    }

    fn dispatch_approval_side_effects(
        &self,
        resolution: PaymentResolution,
        credentials: ServerCredentials,
    ) {
        self.notifier.emit_to_admins(
            "payment:approved",
            json!({
                "payment_id": resolution.payment_id,
                "server_id": resolution.server_id,
                "customer_id": resolution.customer_id,
                "credentials": credentials,
            }),
        );

        let mailer = Arc::clone(&self.mailer);
        let sftp = self.sftp.clone();
        tokio::spawn(async move {
            let subject = format!("Your server \"{}\" is ready", resolution.server_name);
            let (html, text) = credential_email(&resolution.server_name, &credentials, &sftp);

            if let Err(err) = mailer
                .send_mail(resolution.customer_email.clone(), subject, html, text)
                .await
            {
                warn!(
                    payment_id = resolution.payment_id,
                    mail_error = ?err,
                    "payments: credential email failed"
                );
            }
        });
    }

    fn dispatch_rejection_side_effects(&self, resolution: PaymentResolution, reason: String) {
        self.notifier.emit_to_admins(
            "payment:rejected",
            json!({
                "payment_id": resolution.payment_id,
                "server_id": resolution.server_id,
                "customer_id": resolution.customer_id,
                "reason": reason,
            }),
        );

        let mailer = Arc::clone(&self.mailer);
        tokio::spawn(async move {
            let subject = format!("Payment for \"{}\" was declined", resolution.server_name);
            let (html, text) = rejection_email(&resolution.server_name, &reason);

            if let Err(err) = mailer
                .send_mail(resolution.customer_email.clone(), subject, html, text)
                .await
            {
                warn!(
                    payment_id = resolution.payment_id,
                    mail_error = ?err,
                    "payments: rejection email failed"
                );
            }
        });
    }

    fn dispatch_proof_side_effects(&self, resolution: PaymentResolution, utr: String) {
        let mailer = Arc::clone(&self.mailer);
        tokio::spawn(async move {
            let subject = format!(
                "Payment proof submitted for \"{}\"",
                resolution.server_name
            );
            let (html, text) = proof_submitted_email(&resolution, &utr);

            if let Err(err) = mailer.notify_admins(subject, html, text).await {
                warn!(
                    payment_id = resolution.payment_id,
                    mail_error = ?err,
                    "payments: proof notification email failed"
                );
            }
        });
    }
}

fn credential_email(
    server_name: &str,
    credentials: &ServerCredentials,
    sftp: &Sftp,
) -> (String, String) {
    let html = format!(
        "<h2>Your server is active</h2>\
         <p>Server <b>{server_name}</b> has been activated.</p>\
         <ul>\
         <li>Username: <code>{username}</code></li>\
         <li>Password: <code>{password}</code></li>\
         <li>SFTP: <code>{host}:{port}</code></li>\
         </ul>",
        username = credentials.username,
        password = credentials.password,
        host = sftp.host,
        port = sftp.port,
    );
    let text = format!(
        "Server {server_name} has been activated.\n\
         Username: {username}\nPassword: {password}\nSFTP: {host}:{port}\n",
        username = credentials.username,
        password = credentials.password,
        host = sftp.host,
        port = sftp.port,
    );
    (html, text)
}

fn rejection_email(server_name: &str, reason: &str) -> (String, String) {
    let html = format!(
        "<h2>Payment declined</h2>\
         <p>Your payment for server <b>{server_name}</b> was declined.</p>\
         <p>Reason: {reason}</p>",
    );
    let text = format!(
        "Your payment for server {server_name} was declined.\nReason: {reason}\n",
    );
    (html, text)
}

fn proof_submitted_email(resolution: &PaymentResolution, utr: &str) -> (String, String) {
    let html = format!(
        "<h2>Payment proof submitted</h2>\
         <p>Payment #{payment_id} for server <b>{server_name}</b> \
         (amount {amount_minor}) has a new UTR: <code>{utr}</code>.</p>",
        payment_id = resolution.payment_id,
        server_name = resolution.server_name,
        amount_minor = resolution.amount_minor,
    );
    let text = format!(
        "Payment #{} for server {} (amount {}) has a new UTR: {}\n",
        resolution.payment_id, resolution.server_name, resolution.amount_minor, utr,
    );
    (html, text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crates::domain::repositories::{
        mailer::MockMailer, payments::MockPaymentRepository, realtime::MockRealtimeNotifier,
    };
    use crates::domain::value_objects::payments::PendingPaymentRef;
    use mockall::predicate::eq;

    fn sftp() -> Sftp {
        Sftp {
            host: "sftp.astra.host".to_string(),
            port: 2222,
        }
    }

    fn quiet_mailer() -> Arc<MockMailer> {
        let mut mailer = MockMailer::new();
        mailer
            .expect_send_mail()
            .returning(|_, _, _, _| Box::pin(async { Ok(()) }));
        mailer
            .expect_notify_admins()
            .returning(|_, _, _| Box::pin(async { Ok(()) }));
        Arc::new(mailer)
    }

    fn quiet_notifier() -> Arc<MockRealtimeNotifier> {
        let mut notifier = MockRealtimeNotifier::new();
        notifier.expect_emit_to_admins().returning(|_, _| ());
        Arc::new(notifier)
    }

    fn sample_resolution(payment_id: i64, server_id: i64) -> PaymentResolution {
        PaymentResolution {
            payment_id,
            server_id,
            customer_id: 9,
            customer_email: "customer@example.com".to_string(),
            server_name: "my-craft".to_string(),
            amount_minor: 1000,
        }
    }

    #[tokio::test]
    async fn approve_activates_server_with_generated_credentials() {
        let mut payment_repo = MockPaymentRepository::new();

        payment_repo
            .expect_find_pending()
            .with(eq(5))
            .returning(|_| {
                Box::pin(async {
                    Ok(Some(PendingPaymentRef {
                        id: 5,
                        server_id: 11,
                    }))
                })
            });
        payment_repo.expect_approve_pending().returning(|command| {
            assert_eq!(command.utr, "TXN1");
            assert_eq!(command.credentials.username, "user_11");
            Box::pin(async { Ok(Some(sample_resolution(5, 11))) })
        });

        let usecase = PaymentUseCase::new(
            Arc::new(payment_repo),
            quiet_mailer(),
            quiet_notifier(),
            sftp(),
        );

        let approved = usecase
            .approve(
                5,
                ApprovePaymentModel {
                    utr: Some("TXN1".to_string()),
                    provisioning_id: None,
                },
                1,
            )
            .await
            .unwrap();

        assert_eq!(approved.payment.status, "approved");
        assert_eq!(approved.server.status, "active");
        assert_eq!(approved.server.credentials.username, "user_11");
        assert_eq!(approved.server.credentials.password.len(), 16);
    }

    #[tokio::test]
    async fn approve_without_utr_is_rejected_before_any_mutation() {
        let mut payment_repo = MockPaymentRepository::new();
        payment_repo.expect_find_pending().never();
        payment_repo.expect_approve_pending().never();

        let usecase = PaymentUseCase::new(
            Arc::new(payment_repo),
            quiet_mailer(),
            quiet_notifier(),
            sftp(),
        );

        let err = usecase
            .approve(
                5,
                ApprovePaymentModel {
                    utr: Some("   ".to_string()),
                    provisioning_id: None,
                },
                1,
            )
            .await
            .unwrap_err();

        assert!(matches!(err, PaymentError::MissingField("utr")));
    }

    #[tokio::test]
    async fn approve_on_resolved_payment_returns_not_found() {
        let mut payment_repo = MockPaymentRepository::new();
        payment_repo
            .expect_find_pending()
            .returning(|_| Box::pin(async { Ok(None) }));

        let usecase = PaymentUseCase::new(
            Arc::new(payment_repo),
            quiet_mailer(),
            quiet_notifier(),
            sftp(),
        );

        let err = usecase
            .approve(
                5,
                ApprovePaymentModel {
                    utr: Some("TXN1".to_string()),
                    provisioning_id: None,
                },
                1,
            )
            .await
            .unwrap_err();

        assert!(matches!(err, PaymentError::NotFound));
    }

    #[tokio::test]
    async fn losing_the_conditional_update_race_surfaces_as_not_found() {
        let mut payment_repo = MockPaymentRepository::new();
        payment_repo.expect_find_pending().returning(|_| {
            Box::pin(async {
                Ok(Some(PendingPaymentRef {
                    id: 5,
                    server_id: 11,
                }))
            })
        });
        // The other approve won between our read and our update.
        payment_repo
            .expect_approve_pending()
            .returning(|_| Box::pin(async { Ok(None) }));

        let usecase = PaymentUseCase::new(
            Arc::new(payment_repo),
            quiet_mailer(),
            quiet_notifier(),
            sftp(),
        );

        let err = usecase
            .approve(
                5,
                ApprovePaymentModel {
                    utr: Some("TXN1".to_string()),
                    provisioning_id: None,
                },
                1,
            )
            .await
            .unwrap_err();

        assert!(matches!(err, PaymentError::NotFound));
    }

    #[tokio::test]
    async fn reject_requires_a_reason() {
        let mut payment_repo = MockPaymentRepository::new();
        payment_repo.expect_reject_pending().never();

        let usecase = PaymentUseCase::new(
            Arc::new(payment_repo),
            quiet_mailer(),
            quiet_notifier(),
            sftp(),
        );

        let err = usecase
            .reject(5, RejectPaymentModel { reason: None }, 1)
            .await
            .unwrap_err();

        assert!(matches!(err, PaymentError::MissingField("reason")));
    }

    #[tokio::test]
    async fn reject_carries_reason_into_the_response() {
        let mut payment_repo = MockPaymentRepository::new();
        payment_repo.expect_reject_pending().returning(|command| {
            assert_eq!(command.reason, "invalid proof");
            Box::pin(async { Ok(Some(sample_resolution(5, 11))) })
        });

        let usecase = PaymentUseCase::new(
            Arc::new(payment_repo),
            quiet_mailer(),
            quiet_notifier(),
            sftp(),
        );

        let rejected = usecase
            .reject(
                5,
                RejectPaymentModel {
                    reason: Some("invalid proof".to_string()),
                },
                1,
            )
            .await
            .unwrap();

        assert_eq!(rejected.status, "rejected");
        assert_eq!(rejected.rejection_reason.as_deref(), Some("invalid proof"));
    }

    #[tokio::test]
    async fn proof_upload_by_non_owner_is_forbidden() {
        let mut payment_repo = MockPaymentRepository::new();
        payment_repo
            .expect_attach_proof()
            .returning(|_, _, _| Box::pin(async { Ok(ProofUploadOutcome::NotOwner) }));

        let usecase = PaymentUseCase::new(
            Arc::new(payment_repo),
            quiet_mailer(),
            quiet_notifier(),
            sftp(),
        );

        let err = usecase
            .upload_proof(
                5,
                9,
                UploadProofModel {
                    utr: Some("TXN1".to_string()),
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, PaymentError::Forbidden));
    }

    #[tokio::test]
    async fn proof_upload_on_resolved_payment_is_a_conflict() {
        let mut payment_repo = MockPaymentRepository::new();
        payment_repo
            .expect_attach_proof()
            .returning(|_, _, _| Box::pin(async { Ok(ProofUploadOutcome::NotPending) }));

        let usecase = PaymentUseCase::new(
            Arc::new(payment_repo),
            quiet_mailer(),
            quiet_notifier(),
            sftp(),
        );

        let err = usecase
            .upload_proof(
                5,
                9,
                UploadProofModel {
                    utr: Some("TXN1".to_string()),
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, PaymentError::NotPending));
        assert_eq!(err.status_code().as_u16(), 409);
    }

    #[tokio::test]
    async fn proof_upload_updates_pending_payment() {
        let mut payment_repo = MockPaymentRepository::new();
        payment_repo
            .expect_attach_proof()
            .with(eq(5), eq(9), eq("TXN9".to_string()))
            .returning(|_, _, _| {
                Box::pin(async { Ok(ProofUploadOutcome::Updated(sample_resolution(5, 11))) })
            });

        let usecase = PaymentUseCase::new(
            Arc::new(payment_repo),
            quiet_mailer(),
            quiet_notifier(),
            sftp(),
        );

        let submitted = usecase
            .upload_proof(
                5,
                9,
                UploadProofModel {
                    utr: Some("TXN9".to_string()),
                },
            )
            .await
            .unwrap();

        assert_eq!(submitted.status, "pending");
        assert_eq!(submitted.utr, "TXN9");
    }
}
