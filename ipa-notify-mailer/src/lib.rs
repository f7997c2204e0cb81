//! Email delivery for ipa-notify
//!
//! Provides the [`Email`] model, the [`Mailer`] transport trait with SMTP and
//! file backed implementations, and the askama templates used to render
//! password expiration notices and the locked-user digest.
pub mod config;
pub mod email;
pub mod email_types;
pub mod error;
pub mod mailer;
pub mod message;
pub mod templates;
pub mod transports;

pub use config::{MailerConfig, TlsType, TransportConfig};
pub use email::{Email, EmailBuilder};
pub use email_types::{LockedUsersEmail, PasswordExpirationEmail};
pub use error::MailerError;
pub use mailer::Mailer;
pub use templates::{AskamaTemplateEngine, LockedUserLine, TemplateData, TemplateEngine};
pub use transports::{FileTransport, SmtpTransport};

pub mod prelude {
    pub use crate::{
        AskamaTemplateEngine, Email, EmailBuilder, FileTransport, LockedUserLine,
        LockedUsersEmail, Mailer, MailerConfig, MailerError, PasswordExpirationEmail,
        SmtpTransport, TemplateData, TemplateEngine, TlsType, TransportConfig,
    };
}
