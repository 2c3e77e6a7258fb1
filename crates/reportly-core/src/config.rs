// ── Runtime session configuration ──
//
// These types describe how to reach the resource server and how the
// data-access services react to logical failures. They never touch disk:
// the CLI (through reportly-config) builds a `SessionConfig` and hands it in.

use std::time::Duration;

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use url::Url;

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(std::path::PathBuf),
    /// Skip verification (self-signed development servers).
    DangerAcceptInvalid,
}

/// What a data-access call returns when the remote call succeeded but the
/// result cannot be applied consistently (update of a record missing from
/// the mirror, delete acknowledging a count other than one).
///
/// The Error notification is emitted under both policies.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LogicalFailurePolicy {
    /// Return `CoreError::CacheDesync` / `CoreError::UnexpectedDeleteCount`.
    #[default]
    Reject,
    /// Return the remote result as if the call had fully succeeded.
    Resolve,
}

/// Configuration for one session against one resource server.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Server URL (e.g. `https://reporter.example.org`). `/api/v1/` is appended.
    pub base_url: Url,
    /// Optional bearer token.
    pub token: Option<SecretString>,
    /// TLS verification strategy.
    pub tls: TlsVerification,
    /// Request timeout, enforced by the transport.
    pub timeout: Duration,
    /// Outcome of logical failures.
    pub failure_policy: LogicalFailurePolicy,
    /// Buffered notifications per subscriber before it starts lagging.
    pub notification_capacity: usize,
}

impl SessionConfig {
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            token: None,
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(30),
            failure_policy: LogicalFailurePolicy::default(),
            notification_capacity: 64,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn policy_parses_lowercase_names() {
        assert_eq!(
            LogicalFailurePolicy::from_str("resolve").unwrap(),
            LogicalFailurePolicy::Resolve
        );
        assert_eq!(LogicalFailurePolicy::Reject.to_string(), "reject");
        assert!(LogicalFailurePolicy::from_str("ignore").is_err());
    }

    #[test]
    fn new_config_has_defaults() {
        let cfg = SessionConfig::new("http://localhost:8080".parse().unwrap());
        assert_eq!(cfg.failure_policy, LogicalFailurePolicy::Reject);
        assert_eq!(cfg.tls, TlsVerification::SystemDefaults);
        assert_eq!(cfg.timeout, Duration::from_secs(30));
        assert!(cfg.token.is_none());
    }
}
