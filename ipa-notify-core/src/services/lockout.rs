//! Locked account detection.
//!
//! A user counts as locked when the failed-login counter on at least one
//! replica meets or exceeds the `max_failures` of the user's password policy.
//! The report entry lists every replica on which that happened.
use tracing::debug;

use crate::{LockedUser, PasswordPolicy, ReplicaStatus};

/// Replicas on which `policy`'s failure threshold has been reached.
pub fn blocked_servers(policy: &PasswordPolicy, statuses: &[ReplicaStatus]) -> Vec<String> {
    statuses
        .iter()
        .filter(|status| policy.is_exceeded(status.failed_logins))
        .map(|status| status.server.clone())
        .collect()
}

/// Evaluates one user, returning a report entry when any replica is blocked.
pub fn evaluate(
    uid: &str,
    policy: &PasswordPolicy,
    statuses: &[ReplicaStatus],
) -> Option<LockedUser> {
    let servers = blocked_servers(policy, statuses);
    for server in &servers {
        debug!(uid = %uid, server = %server, policy = %policy.name, "account locked");
    }

    if servers.is_empty() {
        None
    } else {
        Some(LockedUser::new(uid, servers))
    }
}
