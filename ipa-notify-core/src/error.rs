use std::path::PathBuf;

use ipa_notify_mailer::MailerError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Directory error: {0}")]
    Directory(#[from] DirectoryError),

    #[error("Notification error: {0}")]
    Notification(#[from] NotificationError),

    #[error("Kerberos error: {0}")]
    Kerberos(#[from] KerberosError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("Group not found: {0}")]
    GroupNotFound(String),

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Password policy not found: {0}")]
    PolicyNotFound(String),

    #[error("Login denied: {0}")]
    AuthenticationDenied(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Invalid value {value:?} for attribute {attribute}")]
    InvalidAttribute { attribute: String, value: String },
}

#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("Mailer error: {0}")]
    Mailer(#[from] MailerError),

    #[error("No email address for user {0}")]
    MissingEmail(String),
}

#[derive(Debug, Error)]
pub enum KerberosError {
    #[error("Cannot find keytab file {}", .0.display())]
    KeytabNotFound(PathBuf),

    #[error("Cannot obtain kerberos ticket: {0}")]
    TicketAcquisition(String),

    #[error("Cannot destroy kerberos ticket: {0}")]
    TicketDestruction(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("No checks enabled")]
    NoChecksEnabled,

    #[error("Invalid field: {0}")]
    InvalidField(String),

    #[error("Missing required field: {0}")]
    MissingField(String),
}

impl Error {
    /// Missing directory entries are skipped by the processor rather than
    /// aborting the run.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Error::Directory(DirectoryError::GroupNotFound(_))
                | Error::Directory(DirectoryError::UserNotFound(_))
                | Error::Directory(DirectoryError::PolicyNotFound(_))
        )
    }

    pub fn is_auth_error(&self) -> bool {
        matches!(self, Error::Directory(DirectoryError::AuthenticationDenied(_)))
    }
}

impl From<MailerError> for Error {
    fn from(err: MailerError) -> Self {
        Error::Notification(NotificationError::Mailer(err))
    }
}
