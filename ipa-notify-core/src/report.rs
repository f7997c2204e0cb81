use std::fmt;

use ipa_notify_mailer::LockedUserLine;
use serde::{Deserialize, Serialize};

/// A user whose failed-login counter reached the policy threshold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockedUser {
    pub uid: String,
    /// Replicas on which the threshold was met, in lookup order.
    pub servers: Vec<String>,
}

impl LockedUser {
    pub fn new(uid: impl Into<String>, servers: Vec<String>) -> Self {
        Self {
            uid: uid.into(),
            servers,
        }
    }
}

impl fmt::Display for LockedUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.uid, self.servers.join(", "))
    }
}

/// Locked users found during one run. Each uid appears at most once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockedUsersReport {
    users: Vec<LockedUser>,
}

impl LockedUsersReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `user`, merging its servers into an existing entry with the same uid.
    pub fn push(&mut self, user: LockedUser) {
        match self.users.iter_mut().find(|u| u.uid == user.uid) {
            Some(existing) => {
                for server in user.servers {
                    if !existing.servers.contains(&server) {
                        existing.servers.push(server);
                    }
                }
            }
            None => self.users.push(user),
        }
    }

    pub fn get(&self, uid: &str) -> Option<&LockedUser> {
        self.users.iter().find(|u| u.uid == uid)
    }

    pub fn iter(&self) -> impl Iterator<Item = &LockedUser> {
        self.users.iter()
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    pub fn uids(&self) -> Vec<&str> {
        self.users.iter().map(|u| u.uid.as_str()).collect()
    }

    pub fn to_lines(&self) -> Vec<LockedUserLine> {
        self.users
            .iter()
            .map(|u| LockedUserLine::new(u.uid.clone(), &u.servers))
            .collect()
    }
}

impl fmt::Display for LockedUsersReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let users: Vec<String> = self.users.iter().map(ToString::to_string).collect();
        write!(f, "{}", users.join(", "))
    }
}
