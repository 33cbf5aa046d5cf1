use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;

/// Outbound mail. Callers treat delivery as best-effort: failures are logged
/// by the caller and never surfaced to the customer-facing operation.
#[async_trait]
#[automock]
pub trait Mailer {
    async fn send_mail(
        &self,
        to: String,
        subject: String,
        html_body: String,
        text_body: String,
    ) -> Result<()>;

    /// Fans out to the configured admin address; a missing address is a
    /// warning, not an error.
    async fn notify_admins(
        &self,
        subject: String,
        html_body: String,
        text_body: String,
    ) -> Result<()>;
}
