pub mod expiration;
pub mod lockout;
pub mod notifier;

pub use expiration::ExpirationNotice;
pub use notifier::{Delivery, MailNotifier, NotificationService};
