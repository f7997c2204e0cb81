//! Attribute decoding for FreeIPA directory entries.
use chrono::{DateTime, NaiveDateTime, Utc};
use ipa_notify_core::{Error, PasswordPolicy, UserRecord, error::DirectoryError};
use ldap3::SearchEntry;

pub const UID: &str = "uid";
pub const MAIL: &str = "mail";
pub const ACCOUNT_LOCK: &str = "nsAccountLock";
pub const PASSWORD_EXPIRATION: &str = "krbPasswordExpiration";
pub const POLICY_REFERENCE: &str = "krbPwdPolicyReference";
pub const MAX_FAILURE: &str = "krbPwdMaxFailure";
pub const LOGIN_FAILED_COUNT: &str = "krbLoginFailedCount";
pub const MEMBER: &str = "member";

/// LDAP generalized time as stored by FreeIPA, always UTC.
const GENERALIZED_TIME_FORMAT: &str = "%Y%m%d%H%M%SZ";

/// All values of `attribute`. Attribute names are matched case-insensitively.
pub fn values<'a>(entry: &'a SearchEntry, attribute: &str) -> &'a [String] {
    entry
        .attrs
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(attribute))
        .map(|(_, values)| values.as_slice())
        .unwrap_or(&[])
}

pub fn first<'a>(entry: &'a SearchEntry, attribute: &str) -> Option<&'a str> {
    values(entry, attribute).first().map(String::as_str)
}

fn invalid(attribute: &str, value: &str) -> Error {
    DirectoryError::InvalidAttribute {
        attribute: attribute.to_string(),
        value: value.to_string(),
    }
    .into()
}

pub fn parse_generalized_time(attribute: &str, value: &str) -> Result<DateTime<Utc>, Error> {
    NaiveDateTime::parse_from_str(value, GENERALIZED_TIME_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|_| invalid(attribute, value))
}

pub fn parse_bool(attribute: &str, value: &str) -> Result<bool, Error> {
    match value.to_ascii_lowercase().as_str() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(invalid(attribute, value)),
    }
}

pub fn parse_count(attribute: &str, value: &str) -> Result<u32, Error> {
    value.trim().parse().map_err(|_| invalid(attribute, value))
}

pub fn user_from_entry(entry: &SearchEntry) -> Result<UserRecord, Error> {
    let uid = first(entry, UID).ok_or_else(|| invalid(UID, ""))?;

    let mut user = UserRecord::new(uid, entry.dn.clone());
    user.email = first(entry, MAIL).map(str::to_string);
    user.locked = first(entry, ACCOUNT_LOCK)
        .map(|v| parse_bool(ACCOUNT_LOCK, v))
        .transpose()?
        .unwrap_or(false);
    user.password_expiration = first(entry, PASSWORD_EXPIRATION)
        .map(|v| parse_generalized_time(PASSWORD_EXPIRATION, v))
        .transpose()?;
    user.policy_reference = first(entry, POLICY_REFERENCE).map(str::to_string);

    Ok(user)
}

pub fn policy_from_entry(entry: &SearchEntry) -> Result<PasswordPolicy, Error> {
    let max_failures = first(entry, MAX_FAILURE)
        .ok_or_else(|| DirectoryError::PolicyNotFound(format!("{} has no {MAX_FAILURE}", entry.dn)))?;
    let name = first(entry, "cn").unwrap_or(entry.dn.as_str());

    Ok(PasswordPolicy::new(
        name,
        parse_count(MAX_FAILURE, max_failures)?,
    ))
}

/// Failed-login counter of a user entry; absent means no failures recorded.
pub fn failed_logins(entry: &SearchEntry) -> Result<u32, Error> {
    first(entry, LOGIN_FAILED_COUNT)
        .map(|v| parse_count(LOGIN_FAILED_COUNT, v))
        .transpose()
        .map(|count| count.unwrap_or(0))
}

/// Splits a DN into its first RDN and the remainder, honouring `\` escapes.
fn split_first_rdn(dn: &str) -> (&str, &str) {
    let mut escaped = false;
    for (i, c) in dn.char_indices() {
        match c {
            '\\' if !escaped => escaped = true,
            ',' if !escaped => return (&dn[..i], &dn[i + 1..]),
            _ => escaped = false,
        }
    }
    (dn, "")
}

fn unescape_dn_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// The uid of `dn` when it names an entry directly below `container`.
///
/// `uid=alice,cn=users,cn=accounts,dc=domain,dc=com` yields `alice` for the
/// container `cn=users,cn=accounts,dc=domain,dc=com`. Nested groups and
/// other member types yield `None`.
pub fn uid_from_dn(dn: &str, container: &str) -> Option<String> {
    let (rdn, parent) = split_first_rdn(dn);
    if !parent.trim().eq_ignore_ascii_case(container.trim()) {
        return None;
    }

    let (name, value) = rdn.split_once('=')?;
    if !name.trim().eq_ignore_ascii_case(UID) {
        return None;
    }

    Some(unescape_dn_value(value.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::collections::HashMap;

    const USERS: &str = "cn=users,cn=accounts,dc=domain,dc=com";

    fn search_entry(dn: &str, attrs: &[(&str, &str)]) -> SearchEntry {
        let mut map: HashMap<String, Vec<String>> = HashMap::new();
        for (name, value) in attrs {
            map.entry(name.to_string())
                .or_default()
                .push(value.to_string());
        }
        SearchEntry {
            dn: dn.to_string(),
            attrs: map,
            bin_attrs: HashMap::new(),
        }
    }

    #[test]
    fn test_user_from_entry() {
        let ldap_entry = search_entry(
            "uid=alice,cn=users,cn=accounts,dc=domain,dc=com",
            &[
                ("uid", "alice"),
                ("mail", "alice@domain.com"),
                ("mail", "a.smith@domain.com"),
                ("nsaccountlock", "FALSE"),
                ("krbPasswordExpiration", "20261024120000Z"),
                (
                    "krbPwdPolicyReference",
                    "cn=admins,cn=DOMAIN.COM,cn=kerberos,dc=domain,dc=com",
                ),
            ],
        );

        let user = user_from_entry(&ldap_entry).unwrap();
        assert_eq!(user.uid, "alice");
        assert_eq!(user.email.as_deref(), Some("alice@domain.com"));
        assert!(!user.locked);
        assert_eq!(
            user.password_expiration,
            Some(Utc.with_ymd_and_hms(2026, 10, 24, 12, 0, 0).unwrap())
        );
        assert_eq!(
            user.policy_reference.as_deref(),
            Some("cn=admins,cn=DOMAIN.COM,cn=kerberos,dc=domain,dc=com")
        );
    }

    #[test]
    fn test_user_defaults() {
        let ldap_entry = search_entry("uid=bob,cn=users,cn=accounts,dc=domain,dc=com", &[("uid", "bob")]);

        let user = user_from_entry(&ldap_entry).unwrap();
        assert!(!user.locked);
        assert!(user.email.is_none());
        assert!(user.password_expiration.is_none());
    }

    #[test]
    fn test_locked_user() {
        let ldap_entry = search_entry(
            "uid=carol,cn=users,cn=accounts,dc=domain,dc=com",
            &[("uid", "carol"), ("nsAccountLock", "TRUE")],
        );
        assert!(user_from_entry(&ldap_entry).unwrap().locked);
    }

    #[test]
    fn test_invalid_expiration() {
        let ldap_entry = search_entry(
            "uid=dave,cn=users,cn=accounts,dc=domain,dc=com",
            &[("uid", "dave"), ("krbPasswordExpiration", "next tuesday")],
        );
        assert!(matches!(
            user_from_entry(&ldap_entry),
            Err(Error::Directory(DirectoryError::InvalidAttribute { .. }))
        ));
    }

    #[test]
    fn test_policy_from_entry() {
        let ldap_entry = search_entry(
            "cn=global_policy,cn=DOMAIN.COM,cn=kerberos,dc=domain,dc=com",
            &[("cn", "global_policy"), ("krbPwdMaxFailure", "6")],
        );
        assert_eq!(
            policy_from_entry(&ldap_entry).unwrap(),
            PasswordPolicy::new("global_policy", 6)
        );

        let ldap_entry = search_entry(
            "cn=global_policy,cn=DOMAIN.COM,cn=kerberos,dc=domain,dc=com",
            &[("cn", "global_policy")],
        );
        assert!(matches!(
            policy_from_entry(&ldap_entry),
            Err(Error::Directory(DirectoryError::PolicyNotFound(_)))
        ));
    }

    #[test]
    fn test_failed_logins() {
        let dn = "uid=alice,cn=users,cn=accounts,dc=domain,dc=com";
        assert_eq!(failed_logins(&search_entry(dn, &[("krbLoginFailedCount", "4")])).unwrap(), 4);
        assert_eq!(failed_logins(&search_entry(dn, &[])).unwrap(), 0);
        assert!(failed_logins(&search_entry(dn, &[("krbLoginFailedCount", "-1")])).is_err());
    }

    #[test]
    fn test_uid_from_dn() {
        assert_eq!(
            uid_from_dn("uid=alice,cn=users,cn=accounts,dc=domain,dc=com", USERS),
            Some("alice".to_string())
        );
        assert_eq!(
            uid_from_dn("UID=Bob,CN=Users,cn=accounts,dc=domain,dc=com", USERS),
            Some("Bob".to_string())
        );
        assert_eq!(
            uid_from_dn("uid=smith\\, john,cn=users,cn=accounts,dc=domain,dc=com", USERS),
            Some("smith, john".to_string())
        );
        assert_eq!(
            uid_from_dn("cn=admins,cn=groups,cn=accounts,dc=domain,dc=com", USERS),
            None
        );
        assert_eq!(
            uid_from_dn("uid=svc,cn=sysaccounts,cn=etc,dc=domain,dc=com", USERS),
            None
        );
    }
}
