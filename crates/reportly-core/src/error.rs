// ── Core error types ──
//
// User-facing errors from reportly-core. Consumers never see reqwest
// errors or JSON parse failures directly: `CoreError::from_api` translates
// transport-layer errors into domain variants.

use thiserror::Error;

use reportly_api::RecordId;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot reach resource server at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Request timed out")]
    Timeout,

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    // ── Data errors ──────────────────────────────────────────────────
    #[error("{resource} not found: {identifier}")]
    NotFound {
        resource: String,
        identifier: String,
    },

    // ── Logical failures ─────────────────────────────────────────────
    /// The remote call succeeded but the local mirror has no such record.
    #[error("{resource} local cache is out of sync: record {id} is missing")]
    CacheDesync { resource: String, id: RecordId },

    /// A delete acknowledged a row count other than exactly one.
    #[error("{resource} deletion of record {id} affected {count} records, expected 1")]
    UnexpectedDeleteCount {
        resource: String,
        id: RecordId,
        count: u64,
    },

    // ── Operation errors ─────────────────────────────────────────────
    #[error("Validation failed: {message}")]
    Validation { message: String },

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("API error: {message}")]
    Api {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Translate a transport error, naming the resource in "not found" cases.
    pub fn from_api(err: reportly_api::Error, resource: &str) -> Self {
        match err {
            reportly_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            reportly_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map_or_else(|| "<unknown>".into(), ToString::to_string),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            reportly_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            reportly_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            reportly_api::Error::Status { status: 404, message } => CoreError::NotFound {
                resource: resource.to_owned(),
                identifier: message,
            },
            reportly_api::Error::Status { status: 401 | 403, message } => {
                CoreError::AuthenticationFailed { message }
            }
            reportly_api::Error::Status { status, message } => CoreError::Api {
                message,
                status: Some(status),
            },
            reportly_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
        }
    }

    /// Returns `true` for failures where the remote call itself succeeded.
    pub fn is_logical(&self) -> bool {
        matches!(
            self,
            Self::CacheDesync { .. } | Self::UnexpectedDeleteCount { .. }
        )
    }
}

impl From<reportly_api::Error> for CoreError {
    fn from(err: reportly_api::Error) -> Self {
        Self::from_api(err, "Resource")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_names_the_resource() {
        let err = CoreError::from_api(
            reportly_api::Error::Status {
                status: 404,
                message: "no such record".into(),
            },
            "Cover type",
        );
        assert!(
            matches!(err, CoreError::NotFound { ref resource, .. } if resource == "Cover type"),
            "got {err:?}"
        );
        assert_eq!(err.to_string(), "Cover type not found: no such record");
    }

    #[test]
    fn forbidden_is_authentication() {
        let err: CoreError = reportly_api::Error::Status {
            status: 403,
            message: "Forbidden".into(),
        }
        .into();
        assert!(matches!(err, CoreError::AuthenticationFailed { .. }));
    }

    #[test]
    fn server_errors_keep_their_status() {
        let err: CoreError = reportly_api::Error::Status {
            status: 500,
            message: "boom".into(),
        }
        .into();
        assert!(matches!(err, CoreError::Api { status: Some(500), .. }));
        assert!(!err.is_logical());
    }

    #[test]
    fn logical_failures_are_flagged() {
        let desync = CoreError::CacheDesync {
            resource: "Units".into(),
            id: 3,
        };
        let count = CoreError::UnexpectedDeleteCount {
            resource: "Unit".into(),
            id: 3,
            count: 0,
        };
        assert!(desync.is_logical());
        assert!(count.is_logical());
        assert_eq!(
            count.to_string(),
            "Unit deletion of record 3 affected 0 records, expected 1"
        );
    }
}
