//! Kerberos ticket handling through the system `kinit` and `kdestroy`.
use std::path::{Path, PathBuf};

use ipa_notify_core::error::KerberosError;
use tokio::process::Command;
use tracing::{debug, info};

const KINIT: &str = "kinit";
const KDESTROY: &str = "kdestroy";

/// Obtains a ticket for `principal` from a keytab.
#[derive(Debug, Clone)]
pub struct Kinit {
    principal: String,
    keytab: PathBuf,
    kinit_program: String,
    kdestroy_program: String,
}

impl Kinit {
    pub fn new(principal: impl Into<String>, keytab: impl AsRef<Path>) -> Self {
        Self {
            principal: principal.into(),
            keytab: keytab.as_ref().to_path_buf(),
            kinit_program: KINIT.to_string(),
            kdestroy_program: KDESTROY.to_string(),
        }
    }

    pub fn with_programs(mut self, kinit: impl Into<String>, kdestroy: impl Into<String>) -> Self {
        self.kinit_program = kinit.into();
        self.kdestroy_program = kdestroy.into();
        self
    }

    pub fn check_keytab(&self) -> Result<(), KerberosError> {
        if self.keytab.is_file() {
            Ok(())
        } else {
            Err(KerberosError::KeytabNotFound(self.keytab.clone()))
        }
    }

    /// Runs `kinit <principal> -k -t <keytab>` and waits for it to finish.
    pub async fn acquire(&self) -> Result<KerberosTicket, KerberosError> {
        self.check_keytab()?;

        debug!(principal = %self.principal, keytab = %self.keytab.display(), "running kinit");
        let output = Command::new(&self.kinit_program)
            .arg(&self.principal)
            .arg("-k")
            .arg("-t")
            .arg(&self.keytab)
            .output()
            .await
            .map_err(|e| {
                KerberosError::TicketAcquisition(format!("failed to run {}: {e}", self.kinit_program))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(KerberosError::TicketAcquisition(format!(
                "{} exited with {}: {}",
                self.kinit_program,
                output.status,
                stderr.trim()
            )));
        }

        info!(principal = %self.principal, "kerberos ticket obtained");
        Ok(KerberosTicket {
            principal: self.principal.clone(),
            kdestroy_program: self.kdestroy_program.clone(),
        })
    }
}

/// A ticket obtained by [`Kinit::acquire`]. Call [`destroy`](Self::destroy)
/// when the run is over.
#[derive(Debug)]
pub struct KerberosTicket {
    principal: String,
    kdestroy_program: String,
}

impl KerberosTicket {
    pub fn principal(&self) -> &str {
        &self.principal
    }

    /// Runs `kdestroy -A`, removing every ticket cache of the current user.
    pub async fn destroy(self) -> Result<(), KerberosError> {
        let status = Command::new(&self.kdestroy_program)
            .arg("-A")
            .status()
            .await
            .map_err(|e| {
                KerberosError::TicketDestruction(format!(
                    "failed to run {}: {e}",
                    self.kdestroy_program
                ))
            })?;

        if !status.success() {
            return Err(KerberosError::TicketDestruction(format!(
                "{} exited with {status}",
                self.kdestroy_program
            )));
        }

        debug!(principal = %self.principal, "ticket is destroyed");
        Ok(())
    }
}
