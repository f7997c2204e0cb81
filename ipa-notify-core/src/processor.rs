//! The per-run evaluation loop.
//!
//! [`Processor`] walks every configured group once. For each member that is
//! not already locked it runs the lockout check and the expiration check
//! independently, sends expiration notices as it goes, and sends a single
//! locked-user digest to the administrator at the end of the run.
//!
//! Lookup and delivery failures are logged and skipped so that one bad group,
//! user, or mail server response does not abort the run.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, error, info, warn};

use crate::{
    Directory, Error, LockedUsersReport, RunConfig, UserRecord,
    error::NotificationError,
    services::{Delivery, ExpirationNotice, NotificationService, expiration, lockout},
};

/// Counters and findings of one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub groups_processed: usize,
    pub groups_skipped: usize,
    pub users_evaluated: usize,
    pub users_skipped: usize,
    pub notices_sent: usize,
    pub notices_suppressed: usize,
    pub notices_failed: usize,
    pub locked_users: LockedUsersReport,
    pub digest: Option<Delivery>,
}

pub struct Processor<D: Directory, N: NotificationService> {
    directory: Arc<D>,
    notifier: Arc<N>,
    config: RunConfig,
}

impl<D: Directory, N: NotificationService> Processor<D, N> {
    pub fn new(directory: Arc<D>, notifier: Arc<N>, config: RunConfig) -> Self {
        Self {
            directory,
            notifier,
            config,
        }
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Processes all configured groups against the current time.
    pub async fn run(&self) -> RunSummary {
        self.run_at(Utc::now()).await
    }

    /// Processes all configured groups, computing expiration against `now`.
    pub async fn run_at(&self, now: DateTime<Utc>) -> RunSummary {
        let mut summary = RunSummary::default();
        let mut seen: HashSet<String> = HashSet::new();

        for group in &self.config.groups {
            let members = match self.directory.group_members(group).await {
                Ok(members) => members,
                Err(e) if e.is_not_found() => {
                    error!(group = %group, "no group named {group}");
                    summary.groups_skipped += 1;
                    continue;
                }
                Err(e) => {
                    error!(group = %group, error = %e, "group lookup failed");
                    summary.groups_skipped += 1;
                    continue;
                }
            };

            debug!(group = %group, members = members.len(), "processing group");
            summary.groups_processed += 1;

            for uid in members {
                if !seen.insert(uid.clone()) {
                    debug!(uid = %uid, group = %group, "user already processed in this run");
                    continue;
                }
                self.process_user(&uid, now, &mut summary).await;
            }
        }

        if !summary.locked_users.is_empty() {
            info!(users = %summary.locked_users, "locked users");
            match self
                .notifier
                .notify_locked_users(&self.config.admin_email, &summary.locked_users)
                .await
            {
                Ok(delivery) => summary.digest = Some(delivery),
                Err(e) => {
                    error!(to = %self.config.admin_email, error = %e, "failed to send locked users digest");
                }
            }
        }

        info!(
            groups = summary.groups_processed,
            skipped_groups = summary.groups_skipped,
            users = summary.users_evaluated,
            notices = summary.notices_sent,
            locked = summary.locked_users.len(),
            "run complete"
        );

        summary
    }

    async fn process_user(&self, uid: &str, now: DateTime<Utc>, summary: &mut RunSummary) {
        let user = match self.directory.user(uid).await {
            Ok(user) => user,
            Err(e) if e.is_not_found() => {
                warn!(uid = %uid, "member has no user entry, skipping");
                summary.users_skipped += 1;
                return;
            }
            Err(e) => {
                error!(uid = %uid, error = %e, "user lookup failed");
                summary.users_skipped += 1;
                return;
            }
        };

        if user.locked {
            debug!(uid = %uid, "account disabled, skipping");
            summary.users_skipped += 1;
            return;
        }

        summary.users_evaluated += 1;

        if self.config.check_locked {
            self.check_locked(&user, &mut summary.locked_users).await;
        }

        if self.config.check_expiration {
            self.check_expiration(&user, now, summary).await;
        }
    }

    async fn check_locked(&self, user: &UserRecord, report: &mut LockedUsersReport) {
        let policy = match self.directory.password_policy(user).await {
            Ok(policy) => policy,
            Err(e) => {
                error!(uid = %user.uid, error = %e, "password policy find error");
                return;
            }
        };

        let statuses = match self.directory.user_status(user).await {
            Ok(statuses) => statuses,
            Err(e) => {
                error!(uid = %user.uid, error = %e, "user status lookup failed");
                return;
            }
        };

        if let Some(locked) = lockout::evaluate(&user.uid, &policy, &statuses) {
            report.push(locked);
        }
    }

    async fn check_expiration(&self, user: &UserRecord, now: DateTime<Utc>, summary: &mut RunSummary) {
        let Some(expires_at) = user.password_expiration else {
            debug!(uid = %user.uid, "no password expiration set");
            return;
        };

        let days_left = expiration::days_left(expires_at, now);
        if !expiration::needs_notice(days_left, self.config.limit_days) {
            return;
        }

        info!(uid = %user.uid, days_left, "user expiration day left {days_left}");

        let Some(email) = user.email.clone() else {
            let err = Error::from(NotificationError::MissingEmail(user.uid.clone()));
            warn!(uid = %user.uid, error = %err, "cannot send expiration notice");
            summary.notices_failed += 1;
            return;
        };

        let notice = ExpirationNotice {
            uid: user.uid.clone(),
            email,
            expires_at,
            days_left,
        };

        match self.notifier.notify_expiration(&notice).await {
            Ok(Delivery::Sent) => summary.notices_sent += 1,
            Ok(Delivery::Suppressed) => summary.notices_suppressed += 1,
            Err(e) => {
                error!(uid = %user.uid, to = %notice.email, error = %e, "failed to send expiration notice");
                summary.notices_failed += 1;
            }
        }
    }
}
