//! Directory user records
//!
//! | Field                 | Directory attribute      | Description                                   |
//! | --------------------- | ------------------------ | --------------------------------------------- |
//! | `uid`                 | `uid`                    | Login name.                                   |
//! | `dn`                  | entry DN                 | Distinguished name of the user entry.         |
//! | `email`               | `mail`                   | First mail address, if any.                   |
//! | `locked`              | `nsAccountLock`          | Account disabled by an administrator.         |
//! | `password_expiration` | `krbPasswordExpiration`  | When the current password expires.            |
//! | `policy_reference`    | `krbPwdPolicyReference`  | DN of the password policy applied to the user. |
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub uid: String,
    pub dn: String,
    pub email: Option<String>,
    pub locked: bool,
    pub password_expiration: Option<DateTime<Utc>>,
    pub policy_reference: Option<String>,
}

impl UserRecord {
    pub fn new(uid: impl Into<String>, dn: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            dn: dn.into(),
            email: None,
            locked: false,
            password_expiration: None,
            policy_reference: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_password_expiration(mut self, expiration: DateTime<Utc>) -> Self {
        self.password_expiration = Some(expiration);
        self
    }

    pub fn with_policy_reference(mut self, policy_dn: impl Into<String>) -> Self {
        self.policy_reference = Some(policy_dn.into());
        self
    }

    pub fn locked(mut self) -> Self {
        self.locked = true;
        self
    }
}

/// Failed-login counter for a user as stored on a single replica.
///
/// Failed logins are not replicated between servers, so each replica keeps its
/// own counter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplicaStatus {
    pub server: String,
    pub failed_logins: u32,
}

impl ReplicaStatus {
    pub fn new(server: impl Into<String>, failed_logins: u32) -> Self {
        Self {
            server: server.into(),
            failed_logins,
        }
    }
}
