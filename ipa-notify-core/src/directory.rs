//! The directory session seam.
use async_trait::async_trait;

use crate::{Error, PasswordPolicy, ReplicaStatus, UserRecord};

/// Read access to the directory service for one authenticated session.
///
/// Implementations authenticate once when constructed. Every method performs
/// a fresh lookup; nothing read through this trait is cached.
#[async_trait]
pub trait Directory: Send + Sync {
    /// Uids of the direct user members of `group`.
    ///
    /// Returns [`DirectoryError::GroupNotFound`](crate::error::DirectoryError::GroupNotFound)
    /// when the group does not exist.
    async fn group_members(&self, group: &str) -> Result<Vec<String>, Error>;

    /// The full attribute set of a user.
    async fn user(&self, uid: &str) -> Result<UserRecord, Error>;

    /// The password policy in effect for `user`.
    async fn password_policy(&self, user: &UserRecord) -> Result<PasswordPolicy, Error>;

    /// The failed-login counter of `user` on every reachable replica.
    async fn user_status(&self, user: &UserRecord) -> Result<Vec<ReplicaStatus>, Error>;
}
