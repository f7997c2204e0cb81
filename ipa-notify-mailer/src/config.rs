use crate::transports::TlsConfig;
use crate::{FileTransport, Mailer, MailerError, SmtpTransport};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailerConfig {
    pub transport: TransportConfig,
    pub from_address: String,
    pub from_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TransportConfig {
    Smtp {
        host: String,
        port: Option<u16>,
        username: Option<String>,
        password: Option<String>,
        tls: Option<TlsType>,
    },
    File {
        output_dir: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TlsType {
    None,
    StartTls,
    Tls,
}

impl From<TlsType> for TlsConfig {
    fn from(tls_type: TlsType) -> Self {
        match tls_type {
            TlsType::None => TlsConfig::None,
            TlsType::StartTls => TlsConfig::StartTls,
            TlsType::Tls => TlsConfig::Tls,
        }
    }
}

impl std::str::FromStr for TlsType {
    type Err = MailerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" => Ok(TlsType::None),
            "starttls" => Ok(TlsType::StartTls),
            "tls" | "ssl" => Ok(TlsType::Tls),
            other => Err(MailerError::Config(format!("unknown TLS mode: {other}"))),
        }
    }
}

impl MailerConfig {
    pub fn smtp(host: impl Into<String>, from_address: impl Into<String>) -> Self {
        Self {
            transport: TransportConfig::Smtp {
                host: host.into(),
                port: None,
                username: None,
                password: None,
                tls: None,
            },
            from_address: from_address.into(),
            from_name: None,
        }
    }

    pub fn build_transport(&self) -> Result<Box<dyn Mailer>, MailerError> {
        match &self.transport {
            TransportConfig::Smtp {
                host,
                port,
                username,
                password,
                tls,
            } => {
                if host.is_empty() {
                    return Err(MailerError::Config("SMTP host is required".to_string()));
                }

                let mut builder = SmtpTransport::builder(host);

                if let Some(port) = port {
                    builder = builder.port(*port);
                }

                if let (Some(username), Some(password)) = (username, password) {
                    builder = builder.credentials(username, password);
                }

                if let Some(tls) = tls {
                    builder = builder.tls((*tls).into());
                }

                Ok(Box::new(builder.build()?))
            }
            TransportConfig::File { output_dir } => Ok(Box::new(FileTransport::new(output_dir)?)),
        }
    }

    pub fn get_from_address(&self) -> String {
        if let Some(name) = &self.from_name {
            format!("{} <{}>", name, self.from_address)
        } else {
            self.from_address.clone()
        }
    }
}

impl Default for MailerConfig {
    fn default() -> Self {
        Self::smtp("localhost", "noreply@domain.com")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = MailerConfig::default();
        assert_eq!(config.from_address, "noreply@domain.com");

        match config.transport {
            TransportConfig::Smtp { host, port, .. } => {
                assert_eq!(host, "localhost");
                assert_eq!(port, None);
            }
            _ => panic!("Expected SMTP transport"),
        }
    }

    #[test]
    fn test_get_from_address() {
        let mut config = MailerConfig::default();
        assert_eq!(config.get_from_address(), "noreply@domain.com");

        config.from_name = Some("IPA Notifier".to_string());
        assert_eq!(
            config.get_from_address(),
            "IPA Notifier <noreply@domain.com>"
        );
    }

    #[test]
    fn test_build_file_transport() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config = MailerConfig {
            transport: TransportConfig::File {
                output_dir: temp_dir.path().to_path_buf(),
            },
            ..MailerConfig::default()
        };

        assert!(config.build_transport().is_ok());
    }

    #[test]
    fn test_build_smtp_transport_rejects_empty_host() {
        let config = MailerConfig::smtp("", "noreply@domain.com");
        assert!(matches!(
            config.build_transport(),
            Err(MailerError::Config(_))
        ));
    }

    #[test]
    fn test_tls_type_from_str() {
        assert_eq!("STARTTLS".parse::<TlsType>().unwrap(), TlsType::StartTls);
        assert_eq!("ssl".parse::<TlsType>().unwrap(), TlsType::Tls);
        assert_eq!("none".parse::<TlsType>().unwrap(), TlsType::None);
        assert!("plaintext".parse::<TlsType>().is_err());
    }

    #[test]
    fn test_transport_config_serde_tag() {
        let config = TransportConfig::File {
            output_dir: PathBuf::from("/var/spool/ipa-notify"),
        };
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["type"], "file");
    }
}
