// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <j.d.a.jewell@open.ac.uk>

//! Client configuration.
//!
//! Timeouts are applied by the HTTP transport only; the operation layer has
//! no timeout or cancellation of its own.

use std::time::Duration;

use tracing::warn;

/// Request timeout override, in milliseconds.
pub const TIMEOUT_ENV: &str = "DATOMIC_CLIENT_TIMEOUT_MS";
/// Connect timeout override, in milliseconds.
pub const CONNECT_TIMEOUT_ENV: &str = "DATOMIC_CLIENT_CONNECT_TIMEOUT_MS";

/// Settings for the reqwest-backed transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Whole-request timeout.
    pub timeout: Duration,
    /// TCP connect timeout.
    pub connect_timeout: Duration,
    /// `User-Agent` header value.
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            user_agent: format!("datomic-client/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ClientConfig {
    /// Defaults overridden by `DATOMIC_CLIENT_TIMEOUT_MS` and
    /// `DATOMIC_CLIENT_CONNECT_TIMEOUT_MS`.
    pub fn from_env() -> Self {
        Self::default().merge_overrides(
            std::env::var(TIMEOUT_ENV).ok().as_deref(),
            std::env::var(CONNECT_TIMEOUT_ENV).ok().as_deref(),
        )
    }

    fn merge_overrides(mut self, timeout: Option<&str>, connect_timeout: Option<&str>) -> Self {
        if let Some(d) = timeout.and_then(|raw| parse_millis(TIMEOUT_ENV, raw)) {
            self.timeout = d;
        }
        if let Some(d) = connect_timeout.and_then(|raw| parse_millis(CONNECT_TIMEOUT_ENV, raw)) {
            self.connect_timeout = d;
        }
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

fn parse_millis(name: &str, raw: &str) -> Option<Duration> {
    match raw.trim().parse::<u64>() {
        Ok(ms) if ms > 0 => Some(Duration::from_millis(ms)),
        _ => {
            warn!(var = %name, value = %raw, "Ignoring invalid timeout override (expected positive milliseconds)");
            None
        }
    }
}
