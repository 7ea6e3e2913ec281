// Copyright 2025 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Optional logging bootstrap.
//!
//! The library crates only emit through the `tracing` facade; nothing is
//! printed unless a subscriber is installed. Embedders with their own
//! subscriber should keep doing what they do. Standalone hosts can enable
//! the `logging` feature and call [`init_logging`] once at startup.

use tracing_subscriber::EnvFilter;

/// Install a formatting subscriber filtered by `RUST_LOG`, falling back to
/// `default_filter` when the variable is unset or invalid.
///
/// Returns an error string when a global subscriber is already installed;
/// initialization is attempted at most once per process either way and
/// never panics.
pub fn init_logging(default_filter: &str) -> Result<(), String> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .map_err(|err| format!("invalid log filter `{default_filter}`: {err}"))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|err| format!("logging already initialized: {err}"))
}

#[cfg(test)]
mod tests {
    use super::init_logging;

    #[test]
    fn init_is_single_shot_and_never_panics() {
        let first = init_logging("info");
        let second = init_logging("debug");
        // At most one global subscriber; the loser reports instead of
        // panicking.
        assert!(!(first.is_ok() && second.is_ok()));
    }
}
