use std::path::PathBuf;

use clap::{ArgAction, Parser, ValueEnum};
use ipa_notify_core::{RunConfig, error::ConfigError};
use ipa_notify_ldap::{BindMethod, LdapConfig, Security};
use ipa_notify_mailer::{MailerConfig, TlsType, TransportConfig};

/// Notify FreeIPA users about expiring passwords and the administrator about
/// locked accounts
#[derive(Parser, Debug)]
#[command(name = "ipa-notify", author, version, about, long_about = None)]
pub struct Cli {
    /// IPA server fqdn
    #[arg(long, default_value = "ipa.domain.com", env = "IPA_NOTIFY_SERVER")]
    pub server: String,

    /// Use ldaps:// instead of ldap://
    #[arg(long, env = "IPA_NOTIFY_LDAPS")]
    pub ldaps: bool,

    /// Do not upgrade ldap:// connections with STARTTLS
    #[arg(long, conflicts_with = "ldaps", env = "IPA_NOTIFY_NO_STARTTLS")]
    pub no_starttls: bool,

    /// Verify the IPA server certificate (default)
    #[arg(long, overrides_with = "no_verify_ssl", env = "IPA_NOTIFY_VERIFY_SSL")]
    pub verify_ssl: bool,

    /// Do not verify the IPA server certificate
    #[arg(long, overrides_with = "verify_ssl", env = "IPA_NOTIFY_NO_VERIFY_SSL")]
    pub no_verify_ssl: bool,

    /// LDAP port, 636 with --ldaps and 389 otherwise
    #[arg(long, env = "IPA_NOTIFY_LDAP_PORT")]
    pub ldap_port: Option<u16>,

    /// LDAP connect timeout in seconds
    #[arg(long, default_value_t = 10, env = "IPA_NOTIFY_LDAP_TIMEOUT")]
    pub ldap_timeout: u64,

    /// Directory base DN, read from the server when omitted
    #[arg(long, env = "IPA_NOTIFY_BASE_DN")]
    pub base_dn: Option<String>,

    /// User principal for kerberos authentication (needs the gssapi build)
    #[arg(long, default_value = "admin@DOMAIN.COM", env = "IPA_NOTIFY_PRINCIPAL")]
    pub principal: String,

    /// Keytab path for kinit (needs the gssapi build)
    #[arg(long, default_value = "/tmp/user.kt", env = "IPA_NOTIFY_KEYTAB")]
    pub keytab: PathBuf,

    /// Bind DN for a simple bind instead of kerberos authentication
    #[arg(long, env = "IPA_NOTIFY_BIND_DN")]
    pub bind_dn: Option<String>,

    /// Password for the simple bind
    #[arg(long, env = "IPA_NOTIFY_BIND_PASSWORD", hide_env_values = true, requires = "bind_dn")]
    pub bind_password: Option<String>,

    /// List of user groups to check, separated by spaces or commas
    #[arg(
        long,
        num_args = 1..,
        value_delimiter = ',',
        default_value = "users",
        env = "IPA_NOTIFY_GROUPS"
    )]
    pub groups: Vec<String>,

    /// Number of days before notifying a user
    #[arg(long, default_value_t = 5, env = "IPA_NOTIFY_LIMIT")]
    pub limit: i64,

    /// Check password expiration (default)
    #[arg(long, overrides_with = "no_check_expiration", env = "IPA_NOTIFY_CHECK_EXPIRATION")]
    pub check_expiration: bool,

    /// Do not check password expiration
    #[arg(long, overrides_with = "check_expiration", env = "IPA_NOTIFY_NO_CHECK_EXPIRATION")]
    pub no_check_expiration: bool,

    /// Check locked users (default)
    #[arg(long, overrides_with = "no_check_locked", env = "IPA_NOTIFY_CHECK_LOCKED")]
    pub check_locked: bool,

    /// Do not check locked users
    #[arg(long, overrides_with = "check_locked", env = "IPA_NOTIFY_NO_CHECK_LOCKED")]
    pub no_check_locked: bool,

    /// SMTP host for sending email
    #[arg(long, default_value = "localhost", env = "IPA_NOTIFY_SMTP_HOST")]
    pub smtp_host: String,

    /// SMTP port for sending email
    #[arg(long, default_value_t = 587, env = "IPA_NOTIFY_SMTP_PORT")]
    pub smtp_port: u16,

    /// SMTP user login
    #[arg(long, env = "IPA_NOTIFY_SMTP_USER")]
    pub smtp_user: Option<String>,

    /// SMTP user password
    #[arg(long, env = "IPA_NOTIFY_SMTP_PASS", hide_env_values = true)]
    pub smtp_pass: Option<String>,

    /// SMTP from email address
    #[arg(long, default_value = "noreply@domain.com", env = "IPA_NOTIFY_SMTP_FROM")]
    pub smtp_from: String,

    /// Display name for the from address
    #[arg(long, env = "IPA_NOTIFY_SMTP_FROM_NAME")]
    pub smtp_from_name: Option<String>,

    /// SMTP connection security
    #[arg(long, value_enum, default_value_t = SmtpTls::Starttls, env = "IPA_NOTIFY_SMTP_TLS")]
    pub smtp_tls: SmtpTls,

    /// Write emails to this directory instead of sending them over SMTP
    #[arg(long, env = "IPA_NOTIFY_MAIL_DIR")]
    pub mail_dir: Option<PathBuf>,

    /// Admin user email to notify about locked users
    #[arg(long, default_value = "admin@domain.com", env = "IPA_NOTIFY_ADMIN")]
    pub admin: String,

    /// No operation mode. Do not send emails
    #[arg(long, visible_alias = "dry-run", action = ArgAction::SetTrue, env = "IPA_NOTIFY_NOOP")]
    pub noop: bool,

    /// Log level
    #[arg(
        long,
        visible_alias = "loglevel",
        value_enum,
        ignore_case = true,
        default_value_t = LogLevel::Info,
        env = "IPA_NOTIFY_LOG_LEVEL"
    )]
    pub log_level: LogLevel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SmtpTls {
    None,
    Starttls,
    Tls,
}

impl From<SmtpTls> for TlsType {
    fn from(tls: SmtpTls) -> Self {
        match tls {
            SmtpTls::None => TlsType::None,
            SmtpTls::Starttls => TlsType::StartTls,
            SmtpTls::Tls => TlsType::Tls,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl Cli {
    pub fn verifies_tls(&self) -> bool {
        !self.no_verify_ssl
    }

    pub fn checks_expiration(&self) -> bool {
        !self.no_check_expiration
    }

    pub fn checks_locked(&self) -> bool {
        !self.no_check_locked
    }

    pub fn run_config(&self) -> RunConfig {
        RunConfig {
            admin_email: self.admin.clone(),
            limit_days: self.limit,
            groups: self
                .groups
                .iter()
                .flat_map(|g| g.split_whitespace())
                .map(str::to_string)
                .collect(),
            dry_run: self.noop,
            check_expiration: self.checks_expiration(),
            check_locked: self.checks_locked(),
        }
    }

    pub fn ldap_config(&self) -> Result<LdapConfig, ConfigError> {
        let security = if self.ldaps {
            Security::Ldaps
        } else if self.no_starttls {
            Security::Plain
        } else {
            Security::StartTls
        };

        let bind = match &self.bind_dn {
            Some(bind_dn) => BindMethod::Simple {
                bind_dn: bind_dn.clone(),
                password: self
                    .bind_password
                    .clone()
                    .ok_or_else(|| ConfigError::MissingField("bind_password".to_string()))?,
            },
            None => BindMethod::Gssapi,
        };

        Ok(LdapConfig {
            server: self.server.clone(),
            port: self.ldap_port,
            security,
            verify_tls: self.verifies_tls(),
            timeout_secs: self.ldap_timeout,
            base_dn: self.base_dn.clone(),
            bind,
        })
    }

    pub fn mailer_config(&self) -> MailerConfig {
        let transport = match &self.mail_dir {
            Some(output_dir) => TransportConfig::File {
                output_dir: output_dir.clone(),
            },
            None => TransportConfig::Smtp {
                host: self.smtp_host.clone(),
                port: Some(self.smtp_port),
                username: self.smtp_user.clone(),
                password: self.smtp_pass.clone(),
                tls: Some(self.smtp_tls.into()),
            },
        };

        MailerConfig {
            transport,
            from_address: self.smtp_from.clone(),
            from_name: self.smtp_from_name.clone(),
        }
    }
}
