//! FreeIPA directory adapter for ipa-notify
//!
//! [`IpaSession`] implements [`ipa_notify_core::Directory`] over LDAP. It
//! authenticates once, discovers the base DN, the Kerberos realm and the
//! replica servers, and then answers group, user, password policy and
//! per-replica login status lookups.
//!
//! [`Kinit`] obtains the Kerberos ticket used for the GSSAPI bind and
//! [`KerberosTicket::destroy`] removes it again at the end of the run.
pub mod config;
pub mod entry;
pub mod kerberos;
pub mod session;

pub use config::{BindMethod, LdapConfig, Security};
pub use kerberos::{KerberosTicket, Kinit};
pub use session::IpaSession;
