//! One complete notification run.
use std::sync::Arc;

use ipa_notify_core::error::KerberosError;
use ipa_notify_core::{Error, MailNotifier, Processor, RunSummary};
use ipa_notify_ldap::{BindMethod, IpaSession, KerberosTicket, Kinit};
use tracing::{error, info, warn};

use crate::cli::Cli;

/// Runs the configured checks once.
///
/// The ticket obtained for a GSSAPI bind is destroyed before returning,
/// whether or not the directory session could be opened.
pub async fn run(cli: &Cli) -> Result<RunSummary, Error> {
    let config = cli.run_config();
    config.validate()?;

    let ldap_config = cli.ldap_config()?;
    let kinit = match ldap_config.bind {
        BindMethod::Gssapi => {
            let kinit = Kinit::new(&cli.principal, &cli.keytab);
            kinit.check_keytab()?;
            Some(kinit)
        }
        BindMethod::Simple { .. } => None,
    };
    ldap_config.validate()?;

    let notifier = Arc::new(MailNotifier::new(cli.mailer_config(), config.dry_run)?);
    if notifier.is_dry_run() {
        info!("noop mode, no emails will be sent");
    }

    let ticket = match &kinit {
        Some(kinit) => Some(kinit.acquire().await?),
        None => None,
    };

    let session = match IpaSession::connect(ldap_config).await {
        Ok(session) => Arc::new(session),
        Err(e) => {
            release(ticket).await;
            return Err(e);
        }
    };

    let processor = Processor::new(session.clone(), notifier, config);
    let summary = processor.run().await;

    session.close().await;
    release(ticket).await;

    Ok(summary)
}

async fn release(ticket: Option<KerberosTicket>) {
    if let Some(ticket) = ticket {
        if let Err(e) = ticket.destroy().await {
            warn!(error = %e, "kerberos ticket left behind");
        }
    }
}

/// Logs a fatal error the way the operator sees it.
pub fn report(err: &Error) {
    match err {
        Error::Kerberos(KerberosError::KeytabNotFound(path)) => {
            error!(keytab = %path.display(), "Cannot find keytab file")
        }
        _ if err.is_auth_error() => error!(error = %err, "Login denied"),
        _ => error!(error = %err, "run aborted"),
    }
}
