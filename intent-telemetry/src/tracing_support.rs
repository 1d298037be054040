//! Structured tracing helpers.

use anyhow::{Context, anyhow};
use tracing_subscriber::EnvFilter;

/// Installs a global fmt subscriber filtered by `RUST_LOG`, falling back to
/// `default_directive` (for example `"intent_kernel=debug,info"`).
///
/// # Errors
///
/// Fails when the fallback directive does not parse or a global subscriber is
/// already installed.
pub fn init_tracing(default_directive: &str) -> anyhow::Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_directive)
            .with_context(|| format!("invalid tracing directive `{default_directive}`"))?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .map_err(|err| anyhow!("failed to install tracing subscriber: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_initialisation_is_an_error() {
        // Another test in this binary may have installed one already.
        let _ = init_tracing("info");
        assert!(init_tracing("info").is_err());
    }
}
