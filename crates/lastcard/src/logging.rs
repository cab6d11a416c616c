//! Tracing subscriber setup.

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Installs a global fmt subscriber filtered by `RUST_LOG`, falling back
/// to `default_directive` (e.g. `"info,lastcard_room=debug"`).
///
/// Returns `false` if a global subscriber was already installed; the
/// existing one is kept.
pub fn init_tracing(default_directive: &str) -> bool {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true))
        .try_init()
        .is_ok();

    if installed {
        tracing::info!("tracing initialized");
    }
    installed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_tracing_twice_keeps_first() {
        let _ = init_tracing("debug");
        assert!(!init_tracing("info"));
    }
}
