use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Settings for a single processing run. Immutable once the run starts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Recipient of the locked-user digest.
    pub admin_email: String,
    /// Notify users whose password expires in this many days or fewer.
    pub limit_days: i64,
    pub groups: Vec<String>,
    /// Log intended notifications without sending them.
    pub dry_run: bool,
    pub check_expiration: bool,
    pub check_locked: bool,
}

impl RunConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.check_expiration && !self.check_locked {
            return Err(ConfigError::NoChecksEnabled);
        }

        if self.groups.iter().all(|g| g.trim().is_empty()) {
            return Err(ConfigError::MissingField("groups".to_string()));
        }

        if self.check_locked && self.admin_email.trim().is_empty() {
            return Err(ConfigError::MissingField("admin_email".to_string()));
        }

        if self.limit_days < 0 {
            return Err(ConfigError::InvalidField(format!(
                "limit_days must not be negative, got {}",
                self.limit_days
            )));
        }

        Ok(())
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            admin_email: "admin@domain.com".to_string(),
            limit_days: 5,
            groups: vec!["users".to_string()],
            dry_run: false,
            check_expiration: true,
            check_locked: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(RunConfig::default().validate().is_ok());
    }

    #[test]
    fn test_no_checks_enabled() {
        let config = RunConfig {
            check_expiration: false,
            check_locked: false,
            ..RunConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::NoChecksEnabled)));
    }

    #[test]
    fn test_admin_only_needed_for_lock_check() {
        let config = RunConfig {
            admin_email: String::new(),
            ..RunConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::MissingField(_))));

        let config = RunConfig {
            admin_email: String::new(),
            check_locked: false,
            ..RunConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_groups_required() {
        let config = RunConfig {
            groups: vec![],
            ..RunConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::MissingField(f)) if f == "groups"));
    }
}
