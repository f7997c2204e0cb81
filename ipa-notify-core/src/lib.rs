//! Core functionality for ipa-notify
//!
//! This crate maps directory state into notification events. It defines the
//! [`Directory`] trait implemented by directory adapters, the records read
//! through it ([`UserRecord`], [`PasswordPolicy`], [`ReplicaStatus`]), and the
//! [`Processor`] that walks the configured groups once, collecting the
//! [`LockedUsersReport`] and sending expiration notices through a
//! [`NotificationService`].
//!
//! Two checks run for every member that is not already locked:
//!
//! - the lockout check compares the failed-login counter on every replica
//!   against the user's password policy, see [`services::lockout`]
//! - the expiration check compares the days left until the password expires
//!   against the configured threshold, see [`services::expiration`]
pub mod config;
pub mod directory;
pub mod error;
pub mod policy;
pub mod processor;
pub mod report;
pub mod services;
pub mod user;

pub use config::RunConfig;
pub use directory::Directory;
pub use error::Error;
pub use policy::PasswordPolicy;
pub use processor::{Processor, RunSummary};
pub use report::{LockedUser, LockedUsersReport};
pub use services::{Delivery, ExpirationNotice, MailNotifier, NotificationService};
pub use user::{ReplicaStatus, UserRecord};
