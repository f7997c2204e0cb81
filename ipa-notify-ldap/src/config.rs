//! Directory connection configuration.

use ipa_notify_core::error::ConfigError;
use serde::{Deserialize, Serialize};

/// Transport security of the directory connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Security {
    /// `ldaps://`, TLS from the first byte.
    Ldaps,
    /// `ldap://` upgraded with STARTTLS.
    StartTls,
    /// `ldap://` without TLS.
    Plain,
}

/// How the session authenticates to each server.
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BindMethod {
    /// SASL/GSSAPI with the current Kerberos ticket.
    Gssapi,
    Simple {
        bind_dn: String,
        #[serde(skip_serializing)]
        password: String,
    },
}

impl std::fmt::Debug for BindMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BindMethod::Gssapi => f.write_str("Gssapi"),
            BindMethod::Simple { bind_dn, .. } => f
                .debug_struct("Simple")
                .field("bind_dn", bind_dn)
                .field("password", &"***REDACTED***")
                .finish(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LdapConfig {
    /// Fully qualified name of the server to connect to first.
    pub server: String,

    /// Port override. Defaults to 636 for LDAPS and 389 otherwise.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,

    pub security: Security,

    /// Verify the server certificate.
    #[serde(default = "default_verify_tls")]
    pub verify_tls: bool,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Base DN. Read from the root DSE when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_dn: Option<String>,

    pub bind: BindMethod,
}

fn default_verify_tls() -> bool {
    true
}

fn default_timeout_secs() -> u64 {
    10
}

impl LdapConfig {
    pub fn new(server: impl Into<String>) -> Self {
        Self {
            server: server.into(),
            port: None,
            security: Security::StartTls,
            verify_tls: default_verify_tls(),
            timeout_secs: default_timeout_secs(),
            base_dn: None,
            bind: BindMethod::Gssapi,
        }
    }

    pub fn port(&self) -> u16 {
        self.port.unwrap_or(match self.security {
            Security::Ldaps => 636,
            Security::StartTls | Security::Plain => 389,
        })
    }

    /// LDAP URL for `host` using this configuration's scheme and port.
    pub fn url_for(&self, host: &str) -> String {
        let scheme = match self.security {
            Security::Ldaps => "ldaps",
            Security::StartTls | Security::Plain => "ldap",
        };
        format!("{scheme}://{host}:{}", self.port())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.trim().is_empty() {
            return Err(ConfigError::MissingField("server".to_string()));
        }

        if self.timeout_secs == 0 {
            return Err(ConfigError::InvalidField(
                "timeout_secs must be greater than zero".to_string(),
            ));
        }

        match &self.bind {
            BindMethod::Simple { bind_dn, .. } if bind_dn.trim().is_empty() => {
                return Err(ConfigError::MissingField("bind_dn".to_string()));
            }
            BindMethod::Gssapi if !cfg!(feature = "gssapi") => {
                return Err(ConfigError::InvalidField(
                    "Kerberos authentication requires the gssapi feature; use a simple bind instead"
                        .to_string(),
                ));
            }
            _ => {}
        }

        Ok(())
    }
}
