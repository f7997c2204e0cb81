//! Settings read from `IPA_NOTIFY_*` environment variables
//!
//! Kept apart from the argument tests: the environment is shared by every
//! test in the binary.

use clap::Parser;
use ipa_notify::cli::Cli;
use ipa_notify_ldap::Security;

#[test]
fn test_settings_from_environment() {
    // SAFETY: the only test in this binary, no other thread reads the environment.
    unsafe {
        std::env::set_var("IPA_NOTIFY_GROUPS", "admins editors");
        std::env::set_var("IPA_NOTIFY_NO_CHECK_LOCKED", "true");
        std::env::set_var("IPA_NOTIFY_NO_VERIFY_SSL", "true");
        std::env::set_var("IPA_NOTIFY_NO_STARTTLS", "true");
        std::env::set_var("IPA_NOTIFY_LIMIT", "3");
    }

    let cli = Cli::try_parse_from(["ipa-notify"]).expect("Failed to parse environment");
    let config = cli.run_config();
    assert_eq!(config.groups, vec!["admins", "editors"]);
    assert_eq!(config.limit_days, 3);
    assert!(!config.check_locked);
    assert!(config.check_expiration);

    let ldap = cli.ldap_config().unwrap();
    assert!(!ldap.verify_tls);
    assert_eq!(ldap.security, Security::Plain);

    // Arguments win over the environment.
    let cli = Cli::try_parse_from(["ipa-notify", "--groups", "users", "--limit", "7"])
        .expect("Failed to parse arguments");
    assert_eq!(cli.run_config().groups, vec!["users"]);
    assert_eq!(cli.run_config().limit_days, 7);
}
