//! Process exit codes for fatal errors.
use std::process::ExitCode;

use ipa_notify_core::Error;
use ipa_notify_core::error::{ConfigError, KerberosError};

/// Why a run stopped before the processor could start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    /// The directory refused our credentials.
    AuthenticationDenied,
    KeytabNotFound,
    TicketAcquisition,
    /// A directory or mail adapter could not be built or connected.
    AdapterConstruction,
    NoChecksEnabled,
}

impl Failure {
    pub fn code(self) -> u8 {
        match self {
            Failure::AuthenticationDenied => 1,
            Failure::KeytabNotFound => 2,
            Failure::TicketAcquisition => 3,
            Failure::AdapterConstruction => 4,
            Failure::NoChecksEnabled => 5,
        }
    }

    pub fn from_error(err: &Error) -> Self {
        match err {
            _ if err.is_auth_error() => Failure::AuthenticationDenied,
            Error::Kerberos(KerberosError::KeytabNotFound(_)) => Failure::KeytabNotFound,
            Error::Kerberos(_) => Failure::TicketAcquisition,
            Error::Config(ConfigError::NoChecksEnabled) => Failure::NoChecksEnabled,
            _ => Failure::AdapterConstruction,
        }
    }
}

impl From<Failure> for ExitCode {
    fn from(failure: Failure) -> Self {
        ExitCode::from(failure.code())
    }
}
