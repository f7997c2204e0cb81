use async_trait::async_trait;
use ipa_notify_mailer::prelude::*;
use tracing::info;

use crate::{Error, LockedUsersReport, services::ExpirationNotice};

/// What happened to a notification handed to a [`NotificationService`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Sent,
    /// Dry-run mode: the message was rendered and logged but not sent.
    Suppressed,
}

#[async_trait]
pub trait NotificationService: Send + Sync {
    async fn notify_expiration(&self, notice: &ExpirationNotice) -> Result<Delivery, Error>;

    async fn notify_locked_users(
        &self,
        admin_email: &str,
        report: &LockedUsersReport,
    ) -> Result<Delivery, Error>;
}

/// Renders notifications with the built-in templates and delivers them
/// through a [`Mailer`] transport.
pub struct MailNotifier {
    transport: Box<dyn Mailer>,
    engine: AskamaTemplateEngine,
    config: MailerConfig,
    dry_run: bool,
}

impl MailNotifier {
    pub fn new(config: MailerConfig, dry_run: bool) -> Result<Self, Error> {
        let transport = config.build_transport()?;
        Ok(Self::with_transport(config, transport, dry_run))
    }

    pub fn with_transport(config: MailerConfig, transport: Box<dyn Mailer>, dry_run: bool) -> Self {
        Self {
            transport,
            engine: AskamaTemplateEngine::new(),
            config,
            dry_run,
        }
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    async fn deliver(&self, email: Email) -> Result<Delivery, Error> {
        if self.dry_run {
            info!(
                to = %email.to.join(", "),
                subject = %email.subject,
                "dry run, not sending email"
            );
            return Ok(Delivery::Suppressed);
        }

        self.transport.send_email(email).await?;
        Ok(Delivery::Sent)
    }
}

#[async_trait]
impl NotificationService for MailNotifier {
    async fn notify_expiration(&self, notice: &ExpirationNotice) -> Result<Delivery, Error> {
        let email = PasswordExpirationEmail::build(
            &self.engine,
            &self.config.get_from_address(),
            &notice.email,
            &notice.uid,
            &notice.formatted_expiration(),
            notice.days_left,
        )
        .await?;

        self.deliver(email).await
    }

    async fn notify_locked_users(
        &self,
        admin_email: &str,
        report: &LockedUsersReport,
    ) -> Result<Delivery, Error> {
        let email = LockedUsersEmail::build(
            &self.engine,
            &self.config.get_from_address(),
            admin_email,
            &report.to_lines(),
        )
        .await?;

        self.deliver(email).await
    }
}
