//! Authenticated FreeIPA session implementing [`Directory`].

use std::time::Duration;

use async_trait::async_trait;
use ipa_notify_core::{
    Directory, Error, PasswordPolicy, ReplicaStatus, UserRecord, error::DirectoryError,
};
use ldap3::{Ldap, LdapConnAsync, LdapConnSettings, LdapResult, Scope, SearchEntry, SearchResult};
use tracing::{debug, info, instrument, warn};

use crate::config::{BindMethod, LdapConfig, Security};
use crate::entry;

const RC_SUCCESS: u32 = 0;
const RC_NO_SUCH_OBJECT: u32 = 32;
const RC_INVALID_CREDENTIALS: u32 = 49;

const ANY: &str = "(objectClass=*)";

/// One authenticated connection per replica server.
struct Replica {
    server: String,
    ldap: Ldap,
}

pub struct IpaSession {
    base_dn: String,
    realm: String,
    /// Connection to the configured server, used for everything but status
    /// lookups.
    primary: Ldap,
    server: String,
    /// Every reachable replica, as named below `cn=masters`.
    replicas: Vec<Replica>,
}

impl IpaSession {
    /// Connects and authenticates to the configured server, discovers the
    /// directory layout and connects to every replica registered below
    /// `cn=masters`.
    ///
    /// Authentication failure on the configured server is fatal. Replicas
    /// that cannot be reached are left out of status lookups. The configured
    /// server only stands in as a replica when none is registered or none
    /// can be reached.
    pub async fn connect(config: LdapConfig) -> Result<Self, Error> {
        config.validate()?;

        let primary = open(&config, &config.server).await?;

        let base_dn = match &config.base_dn {
            Some(base_dn) => base_dn.clone(),
            None => discover_base_dn(&primary).await?,
        };
        let realm = discover_realm(&primary, &base_dn).await?;
        debug!(base_dn = %base_dn, realm = %realm, "directory layout discovered");

        let masters = discover_servers(&primary, &base_dn).await?;
        let mut replicas = Vec::new();

        for server in replica_servers(&config.server, masters) {
            if server.eq_ignore_ascii_case(&config.server) {
                replicas.push(Replica {
                    server,
                    ldap: primary.clone(),
                });
                continue;
            }

            match open(&config, &server).await {
                Ok(ldap) => replicas.push(Replica { server, ldap }),
                Err(e) => warn!(server = %server, error = %e, "replica unreachable, skipping"),
            }
        }

        if replicas.is_empty() {
            warn!(server = %config.server, "no replica reachable, reading login status from the configured server");
            replicas.push(Replica {
                server: config.server.clone(),
                ldap: primary.clone(),
            });
        }

        info!(
            server = %config.server,
            replicas = replicas.len(),
            "directory session established"
        );

        Ok(Self {
            base_dn,
            realm,
            primary,
            server: config.server,
            replicas,
        })
    }

    pub fn base_dn(&self) -> &str {
        &self.base_dn
    }

    pub fn realm(&self) -> &str {
        &self.realm
    }

    pub fn servers(&self) -> Vec<&str> {
        self.replicas.iter().map(|r| r.server.as_str()).collect()
    }

    /// Unbinds every connection.
    pub async fn close(&self) {
        let mut primary = self.primary.clone();
        if let Err(e) = primary.unbind().await {
            warn!(server = %self.server, error = %e, "Error during LDAP unbind");
        }

        for replica in &self.replicas {
            if replica.server.eq_ignore_ascii_case(&self.server) {
                continue;
            }
            let mut ldap = replica.ldap.clone();
            if let Err(e) = ldap.unbind().await {
                warn!(server = %replica.server, error = %e, "Error during LDAP unbind");
            }
        }
        debug!("client logged out");
    }
}

#[async_trait]
impl Directory for IpaSession {
    #[instrument(skip(self))]
    async fn group_members(&self, group: &str) -> Result<Vec<String>, Error> {
        let dn = group_dn(&self.base_dn, group);
        let group_entry = search(&self.primary, &dn, Scope::Base, ANY, &[entry::MEMBER])
            .await?
            .and_then(|entries| entries.into_iter().next())
            .ok_or_else(|| DirectoryError::GroupNotFound(group.to_string()))?;

        Ok(member_uids(&group_entry, &users_container(&self.base_dn)))
    }

    #[instrument(skip(self))]
    async fn user(&self, uid: &str) -> Result<UserRecord, Error> {
        let filter = format!("(uid={})", ldap3::ldap_escape(uid));
        let user_entry = search(
            &self.primary,
            &users_container(&self.base_dn),
            Scope::OneLevel,
            &filter,
            &[
                entry::UID,
                entry::MAIL,
                entry::ACCOUNT_LOCK,
                entry::PASSWORD_EXPIRATION,
                entry::POLICY_REFERENCE,
            ],
        )
        .await?
        .and_then(|entries| entries.into_iter().next())
        .ok_or_else(|| DirectoryError::UserNotFound(uid.to_string()))?;

        entry::user_from_entry(&user_entry)
    }

    #[instrument(skip(self, user), fields(uid = %user.uid))]
    async fn password_policy(&self, user: &UserRecord) -> Result<PasswordPolicy, Error> {
        let dn = policy_dn(user, &self.realm, &self.base_dn);

        let policy_entry = search(&self.primary, &dn, Scope::Base, ANY, &["cn", entry::MAX_FAILURE])
            .await?
            .and_then(|entries| entries.into_iter().next())
            .ok_or_else(|| DirectoryError::PolicyNotFound(dn.clone()))?;

        entry::policy_from_entry(&policy_entry)
    }

    #[instrument(skip(self, user), fields(uid = %user.uid))]
    async fn user_status(&self, user: &UserRecord) -> Result<Vec<ReplicaStatus>, Error> {
        let mut lookups = Vec::with_capacity(self.replicas.len());

        for replica in &self.replicas {
            let found = search(
                &replica.ldap,
                &user.dn,
                Scope::Base,
                ANY,
                &[entry::LOGIN_FAILED_COUNT],
            )
            .await;
            lookups.push((replica.server.as_str(), found));
        }

        collect_statuses(&user.uid, lookups)
    }
}

fn users_container(base_dn: &str) -> String {
    format!("cn=users,cn=accounts,{base_dn}")
}

fn group_dn(base_dn: &str, group: &str) -> String {
    format!("cn={},cn=groups,cn=accounts,{base_dn}", ldap3::dn_escape(group))
}

fn global_policy_dn(realm: &str, base_dn: &str) -> String {
    format!("cn=global_policy,cn={},cn=kerberos,{base_dn}", ldap3::dn_escape(realm))
}

/// The policy referenced by the user, or the realm's global policy.
fn policy_dn(user: &UserRecord, realm: &str, base_dn: &str) -> String {
    user.policy_reference
        .clone()
        .unwrap_or_else(|| global_policy_dn(realm, base_dn))
}

/// Uids of the direct user members of a group. Nested groups, services and
/// hosts are dropped.
fn member_uids(group_entry: &SearchEntry, users_container: &str) -> Vec<String> {
    entry::values(group_entry, entry::MEMBER)
        .iter()
        .filter_map(|member| entry::uid_from_dn(member, users_container))
        .collect()
}

/// Servers whose login counters are read. The registered masters, without
/// duplicates, or the bootstrap server when none is registered.
fn replica_servers(bootstrap: &str, masters: Vec<String>) -> Vec<String> {
    let mut servers: Vec<String> = Vec::with_capacity(masters.len());
    for master in masters {
        if !servers.iter().any(|s| s.eq_ignore_ascii_case(&master)) {
            servers.push(master);
        }
    }

    if servers.is_empty() {
        servers.push(bootstrap.to_string());
    }
    servers
}

/// Folds per-replica lookups into login statuses. A replica that failed,
/// lacks the entry or holds an unreadable counter is skipped; the lookup
/// only fails when no replica answered.
fn collect_statuses(
    uid: &str,
    lookups: Vec<(&str, Result<Option<Vec<SearchEntry>>, Error>)>,
) -> Result<Vec<ReplicaStatus>, Error> {
    let mut statuses = Vec::with_capacity(lookups.len());

    for (server, found) in lookups {
        match found {
            Ok(Some(entries)) => {
                let failed_logins = match entries.first() {
                    Some(status_entry) => entry::failed_logins(status_entry),
                    None => Ok(0),
                };
                match failed_logins {
                    Ok(count) => statuses.push(ReplicaStatus::new(server, count)),
                    Err(e) => warn!(server = %server, uid = %uid, error = %e, "unreadable login counter, skipping replica"),
                }
            }
            Ok(None) => {
                warn!(server = %server, uid = %uid, "user entry missing on replica");
            }
            Err(e) => {
                warn!(server = %server, uid = %uid, error = %e, "replica status lookup failed");
            }
        }
    }

    if statuses.is_empty() {
        return Err(DirectoryError::Connection(format!(
            "no replica returned a login status for {uid}"
        ))
        .into());
    }

    Ok(statuses)
}

async fn open(config: &LdapConfig, host: &str) -> Result<Ldap, Error> {
    let url = config.url_for(host);
    debug!(url = %url, "Connecting to LDAP server");

    let settings = LdapConnSettings::new()
        .set_conn_timeout(Duration::from_secs(config.timeout_secs))
        .set_starttls(config.security == Security::StartTls)
        .set_no_tls_verify(!config.verify_tls);

    let (conn, mut ldap) = LdapConnAsync::with_settings(settings, &url)
        .await
        .map_err(|e| DirectoryError::Connection(format!("Failed to connect to {url}: {e}")))?;

    tokio::spawn(async move {
        if let Err(e) = conn.drive().await {
            warn!(error = %e, "LDAP connection driver error");
        }
    });

    bind(&mut ldap, &config.bind, host).await?;
    debug!(url = %url, "LDAP bind successful");

    Ok(ldap)
}

async fn bind(ldap: &mut Ldap, method: &BindMethod, host: &str) -> Result<(), Error> {
    match method {
        BindMethod::Simple { bind_dn, password } => {
            let result = ldap.simple_bind(bind_dn, password).await.map_err(|e| {
                DirectoryError::Connection(format!("LDAP bind to {host} failed: {e}"))
            })?;
            check_bind(result)
        }
        BindMethod::Gssapi => gssapi_bind(ldap, host).await,
    }
}

#[cfg(feature = "gssapi")]
async fn gssapi_bind(ldap: &mut Ldap, host: &str) -> Result<(), Error> {
    let result = ldap
        .sasl_gssapi_bind(host)
        .await
        .map_err(|e| DirectoryError::AuthenticationDenied(format!("{host}: {e}")))?;
    check_bind(result)
}

#[cfg(not(feature = "gssapi"))]
async fn gssapi_bind(_ldap: &mut Ldap, host: &str) -> Result<(), Error> {
    Err(DirectoryError::Connection(format!(
        "cannot use Kerberos authentication for {host}: built without gssapi support"
    ))
    .into())
}

fn check_bind(result: LdapResult) -> Result<(), Error> {
    match result.rc {
        RC_SUCCESS => Ok(()),
        RC_INVALID_CREDENTIALS => Err(DirectoryError::AuthenticationDenied(result.text).into()),
        rc => Err(DirectoryError::Protocol(format!(
            "LDAP bind failed with code {rc}: {}",
            result.text
        ))
        .into()),
    }
}

/// Runs a search, returning `None` when the base entry does not exist.
async fn search(
    ldap: &Ldap,
    base: &str,
    scope: Scope,
    filter: &str,
    attrs: &[&str],
) -> Result<Option<Vec<SearchEntry>>, Error> {
    let mut ldap = ldap.clone();
    let SearchResult(entries, result) = ldap
        .search(base, scope, filter, attrs.to_vec())
        .await
        .map_err(|e| DirectoryError::Connection(format!("search of {base} failed: {e}")))?;

    match result.rc {
        RC_SUCCESS => Ok(Some(
            entries.into_iter().map(SearchEntry::construct).collect(),
        )),
        RC_NO_SUCH_OBJECT => Ok(None),
        rc => Err(DirectoryError::Protocol(format!(
            "search of {base} failed with code {rc}: {}",
            result.text
        ))
        .into()),
    }
}

async fn discover_base_dn(ldap: &Ldap) -> Result<String, Error> {
    let root_dse = search(
        ldap,
        "",
        Scope::Base,
        ANY,
        &["defaultNamingContext", "namingContexts"],
    )
    .await?
    .and_then(|entries| entries.into_iter().next())
    .ok_or_else(|| DirectoryError::Protocol("root DSE not readable".to_string()))?;

    entry::first(&root_dse, "defaultNamingContext")
        .or_else(|| {
            entry::values(&root_dse, "namingContexts")
                .iter()
                .map(String::as_str)
                .find(|ctx| ctx.to_ascii_lowercase().starts_with("dc="))
        })
        .map(str::to_string)
        .ok_or_else(|| {
            DirectoryError::Protocol("cannot discover the base DN, set it explicitly".to_string())
                .into()
        })
}

async fn discover_realm(ldap: &Ldap, base_dn: &str) -> Result<String, Error> {
    let container = format!("cn=kerberos,{base_dn}");
    search(
        ldap,
        &container,
        Scope::OneLevel,
        "(objectClass=krbRealmContainer)",
        &["cn"],
    )
    .await?
    .and_then(|entries| entries.into_iter().next())
    .and_then(|realm| entry::first(&realm, "cn").map(str::to_string))
    .ok_or_else(|| DirectoryError::Protocol(format!("no Kerberos realm below {container}")).into())
}

/// Names of all IPA servers registered below `cn=masters`.
async fn discover_servers(ldap: &Ldap, base_dn: &str) -> Result<Vec<String>, Error> {
    let container = format!("cn=masters,cn=ipa,cn=etc,{base_dn}");
    let servers = search(ldap, &container, Scope::OneLevel, ANY, &["cn"])
        .await?
        .unwrap_or_default()
        .iter()
        .filter_map(|server| entry::first(server, "cn").map(str::to_string))
        .collect();
    Ok(servers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn ldap_result(rc: u32, text: &str) -> LdapResult {
        LdapResult {
            rc,
            matched: String::new(),
            text: text.to_string(),
            refs: vec![],
            ctrls: vec![],
        }
    }

    #[test]
    fn test_check_bind() {
        assert!(check_bind(ldap_result(0, "")).is_ok());
        assert!(check_bind(ldap_result(49, "Invalid credentials")).unwrap_err().is_auth_error());
        assert!(matches!(
            check_bind(ldap_result(53, "Unwilling to perform")),
            Err(Error::Directory(DirectoryError::Protocol(_)))
        ));
    }

    const BASE: &str = "dc=domain,dc=com";

    fn status_entry(uid: &str, failed: Option<&str>) -> SearchEntry {
        let mut attrs = HashMap::new();
        if let Some(failed) = failed {
            attrs.insert(entry::LOGIN_FAILED_COUNT.to_string(), vec![failed.to_string()]);
        }
        SearchEntry {
            dn: format!("uid={uid},cn=users,cn=accounts,{BASE}"),
            attrs,
            bin_attrs: HashMap::new(),
        }
    }

    #[test]
    fn test_directory_layout() {
        assert_eq!(users_container(BASE), "cn=users,cn=accounts,dc=domain,dc=com");
        assert_eq!(
            group_dn(BASE, "admins"),
            "cn=admins,cn=groups,cn=accounts,dc=domain,dc=com"
        );
    }

    #[test]
    fn test_policy_dn_falls_back_to_global_policy() {
        let user = UserRecord::new("alice", format!("uid=alice,cn=users,cn=accounts,{BASE}"));
        assert_eq!(
            policy_dn(&user, "DOMAIN.COM", BASE),
            "cn=global_policy,cn=DOMAIN.COM,cn=kerberos,dc=domain,dc=com"
        );

        let user = user.with_policy_reference("cn=admins,cn=DOMAIN.COM,cn=kerberos,dc=domain,dc=com");
        assert_eq!(
            policy_dn(&user, "DOMAIN.COM", BASE),
            "cn=admins,cn=DOMAIN.COM,cn=kerberos,dc=domain,dc=com"
        );
    }

    #[test]
    fn test_member_uids_keeps_only_users() {
        let mut attrs = HashMap::new();
        attrs.insert(
            entry::MEMBER.to_string(),
            vec![
                format!("uid=alice,cn=users,cn=accounts,{BASE}"),
                format!("cn=nested,cn=groups,cn=accounts,{BASE}"),
                format!("krbprincipalname=HTTP/web.domain.com@DOMAIN.COM,cn=services,cn=accounts,{BASE}"),
                format!("uid=bob,cn=users,cn=accounts,{BASE}"),
            ],
        );
        let group = SearchEntry {
            dn: format!("cn=admins,cn=groups,cn=accounts,{BASE}"),
            attrs,
            bin_attrs: HashMap::new(),
        };

        assert_eq!(member_uids(&group, &users_container(BASE)), vec!["alice", "bob"]);
    }

    #[test]
    fn test_replica_servers() {
        assert_eq!(
            replica_servers(
                "ipa.domain.com",
                vec![
                    "ipa1.domain.com".to_string(),
                    "ipa2.domain.com".to_string(),
                    "IPA1.domain.com".to_string(),
                ]
            ),
            vec!["ipa1.domain.com", "ipa2.domain.com"]
        );
        assert_eq!(replica_servers("ipa.domain.com", vec![]), vec!["ipa.domain.com"]);
    }

    #[test]
    fn test_collect_statuses_skips_bad_replicas() {
        let lookups = vec![
            ("ipa1.domain.com", Ok(Some(vec![status_entry("alice", Some("6"))]))),
            (
                "ipa2.domain.com",
                Err(DirectoryError::Connection("connection reset".to_string()).into()),
            ),
            ("ipa3.domain.com", Ok(Some(vec![status_entry("alice", Some("many"))]))),
            ("ipa4.domain.com", Ok(None)),
            ("ipa5.domain.com", Ok(Some(vec![status_entry("alice", None)]))),
        ];

        let statuses = collect_statuses("alice", lookups).unwrap();
        assert_eq!(
            statuses,
            vec![
                ReplicaStatus::new("ipa1.domain.com", 6),
                ReplicaStatus::new("ipa5.domain.com", 0),
            ]
        );
    }

    #[test]
    fn test_collect_statuses_fails_without_answers() {
        let lookups = vec![
            (
                "ipa1.domain.com",
                Err(DirectoryError::Connection("connection reset".to_string()).into()),
            ),
            ("ipa2.domain.com", Ok(None)),
        ];

        assert!(matches!(
            collect_statuses("alice", lookups),
            Err(Error::Directory(DirectoryError::Connection(_)))
        ));
    }

    #[tokio::test]
    async fn test_connect_unreachable_server() {
        let config = LdapConfig {
            security: Security::Plain,
            port: Some(1),
            timeout_secs: 1,
            bind: BindMethod::Simple {
                bind_dn: "uid=notifier,cn=sysaccounts,cn=etc,dc=domain,dc=com".to_string(),
                password: "secret".to_string(),
            },
            ..LdapConfig::new("127.0.0.1")
        };

        let result = IpaSession::connect(config).await;
        assert!(matches!(
            result,
            Err(Error::Directory(DirectoryError::Connection(_)))
        ));
    }
}
