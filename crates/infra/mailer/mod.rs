use std::{path::PathBuf, sync::Arc};

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};

use crate::domain::repositories::mailer::Mailer;

/// Everything the mail layer needs from the environment. `relay_url` decides
/// the transport: set means HTTP relay, unset means the file sink.
#[derive(Debug, Clone)]
pub struct MailerSettings {
    pub relay_url: Option<String>,
    pub from_email: String,
    pub admin_email: Option<String>,
    pub log_dir: PathBuf,
}

#[derive(Debug, Serialize)]
struct OutboundMail {
    from: String,
    to: String,
    subject: String,
    html: String,
    text: String,
}

pub fn mailer_from_settings(settings: MailerSettings) -> Arc<dyn Mailer + Send + Sync> {
    match settings.relay_url.clone() {
        Some(relay_url) => {
            info!(%relay_url, "mailer: using http relay transport");
            Arc::new(HttpRelayMailer::new(settings, relay_url))
        }
        None => {
            info!(log_dir = %settings.log_dir.display(), "mailer: no relay configured, writing mail to disk");
            Arc::new(FileSinkMailer::new(settings))
        }
    }
}

/// Posts each message as JSON to an HTTP relay endpoint.
pub struct HttpRelayMailer {
    settings: MailerSettings,
    relay_url: String,
    client: reqwest::Client,
}

impl HttpRelayMailer {
    pub fn new(settings: MailerSettings, relay_url: String) -> Self {
        Self {
            settings,
            relay_url,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl Mailer for HttpRelayMailer {
    async fn send_mail(
        &self,
        to: String,
        subject: String,
        html_body: String,
        text_body: String,
    ) -> Result<()> {
        let mail = OutboundMail {
            from: self.settings.from_email.clone(),
            to: to.clone(),
            subject: subject.clone(),
            html: html_body,
            text: text_body,
        };

        let response = self
            .client
            .post(&self.relay_url)
            .json(&mail)
            .send()
            .await?
            .error_for_status()?;

        info!(%to, %subject, status = %response.status(), "mail relayed");

        Ok(())
    }

    async fn notify_admins(
        &self,
        subject: String,
        html_body: String,
        text_body: String,
    ) -> Result<()> {
        let Some(admin_email) = self.settings.admin_email.clone() else {
            warn!("no admin email configured, dropping admin notification");
            return Ok(());
        };

        self.send_mail(admin_email, subject, html_body, text_body)
            .await
    }
}

/// Development fallback: every message lands as a JSON file in `log_dir`
/// instead of going anywhere.
pub struct FileSinkMailer {
    settings: MailerSettings,
}

impl FileSinkMailer {
    pub fn new(settings: MailerSettings) -> Self {
        Self { settings }
    }
}

#[async_trait]
impl Mailer for FileSinkMailer {
    async fn send_mail(
        &self,
        to: String,
        subject: String,
        html_body: String,
        text_body: String,
    ) -> Result<()> {
        let mail = OutboundMail {
            from: self.settings.from_email.clone(),
            to: to.clone(),
            subject: subject.clone(),
            html: html_body,
            text: text_body,
        };

        tokio::fs::create_dir_all(&self.settings.log_dir).await?;

        let file_name = format!("{}.json", Utc::now().format("%Y%m%dT%H%M%S%.3f"));
        let path = self.settings.log_dir.join(file_name);

        tokio::fs::write(&path, serde_json::to_vec_pretty(&mail)?).await?;

        info!(%to, %subject, path = %path.display(), "mail written to sink");

        Ok(())
    }

    async fn notify_admins(
        &self,
        subject: String,
        html_body: String,
        text_body: String,
    ) -> Result<()> {
        let Some(admin_email) = self.settings.admin_email.clone() else {
            warn!("no admin email configured, dropping admin notification");
            return Ok(());
        };

        self.send_mail(admin_email, subject, html_body, text_body)
            .await
    }
}
