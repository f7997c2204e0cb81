use serde::{Deserialize, Serialize};

/// The password policy in effect for a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordPolicy {
    /// Policy name, `global_policy` or the group the policy is attached to.
    pub name: String,
    /// Failed logins allowed before the account is locked. `0` disables lockout.
    pub max_failures: u32,
}

impl PasswordPolicy {
    pub fn new(name: impl Into<String>, max_failures: u32) -> Self {
        Self {
            name: name.into(),
            max_failures,
        }
    }

    pub fn is_lockout_enabled(&self) -> bool {
        self.max_failures > 0
    }

    pub fn is_exceeded(&self, failed_logins: u32) -> bool {
        self.is_lockout_enabled() && failed_logins >= self.max_failures
    }
}
