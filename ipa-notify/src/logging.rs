use tracing_subscriber::EnvFilter;

use crate::cli::LogLevel;

const NOISY: &[(&str, &str)] = &[("ldap3", "warn"), ("lettre", "warn"), ("rustls", "warn")];

/// Directive string for `level`. Our crates log at the chosen level, chatty
/// dependencies are capped at `warn` unless the level is stricter.
pub fn directives(level: LogLevel) -> String {
    let level = level.as_str();
    let mut directives = vec![level.to_string()];
    if matches!(level, "trace" | "debug" | "info") {
        for (target, lvl) in NOISY {
            directives.push(format!("{target}={lvl}"));
        }
    }
    directives.join(",")
}

/// Installs the global subscriber. `RUST_LOG` takes precedence over `level`.
pub fn init(level: LogLevel) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directives(level)));

    // A subscriber may already be installed when running under a test harness.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
