//! Password expiration bookkeeping.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

/// Expiration dates are shown to users in this format.
pub const EXPIRE_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Whole days from `now` until `expires_at`, rounded towards negative
/// infinity. A password that expired an hour ago has `-1` days left, one that
/// expires in 23 hours has `0`.
pub fn days_left(expires_at: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (expires_at - now).num_seconds().div_euclid(SECONDS_PER_DAY)
}

/// Already expired passwords (negative days) always qualify.
pub fn needs_notice(days_left: i64, limit_days: i64) -> bool {
    days_left <= limit_days
}

/// An expiration notice due for one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpirationNotice {
    pub uid: String,
    pub email: String,
    pub expires_at: DateTime<Utc>,
    pub days_left: i64,
}

impl ExpirationNotice {
    pub fn is_expired(&self) -> bool {
        self.days_left <= 0
    }

    pub fn formatted_expiration(&self) -> String {
        self.expires_at.format(EXPIRE_DATE_FORMAT).to_string()
    }
}
