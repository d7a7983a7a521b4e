// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Process-wide tracing subscriber: logcat on Android, fmt to stdout elsewhere.

use tracing_subscriber::EnvFilter;

/// Logcat tag for every record.
#[cfg(target_os = "android")]
pub const LOG_TAG: &str = "tether";

/// Install the subscriber. `RUST_LOG` wins over `default_filter`.
///
/// Safe to call more than once; later calls leave the first subscriber in place.
pub fn init(default_filter: &str) {
    let filter = filter(std::env::var("RUST_LOG").ok().as_deref(), default_filter);
    if !install(filter) {
        tracing::debug!("tracing subscriber already installed");
    }
}

/// `env` if it parses as a filter, else `default_filter`, else `info`.
fn filter(env: Option<&str>, default_filter: &str) -> EnvFilter {
    env.and_then(|directives| EnvFilter::try_new(directives).ok())
        .or_else(|| EnvFilter::try_new(default_filter).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}

#[cfg(target_os = "android")]
fn install(filter: EnvFilter) -> bool {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    tracing_subscriber::registry()
        .with(filter)
        .with(paranoid_android::layer(LOG_TAG))
        .try_init()
        .is_ok()
}

#[cfg(not(target_os = "android"))]
fn install(filter: EnvFilter) -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_directives_win() {
        assert_eq!(
            filter(Some("tether_bridge=trace"), "warn").to_string(),
            "tether_bridge=trace"
        );
    }

    #[test]
    fn default_applies_without_env() {
        assert_eq!(filter(None, "debug").to_string(), "debug");
    }

    #[test]
    fn unparsable_filters_fall_back() {
        assert_eq!(filter(Some("tether=loud"), "warn").to_string(), "warn");
        assert_eq!(filter(None, "tether=loud").to_string(), "info");
    }

    #[test]
    fn repeated_init_is_harmless() {
        init("info");
        init("debug");
    }
}
