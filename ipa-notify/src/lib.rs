//! Command line front end for ipa-notify
//!
//! [`cli::Cli`] holds every setting of a run, [`app::run`] wires the
//! Kerberos ticket, the directory session and the notifier together and runs
//! the processor once, and [`exit::Failure`] maps fatal errors to process exit
//! codes.
pub mod app;
pub mod cli;
pub mod exit;
pub mod logging;
