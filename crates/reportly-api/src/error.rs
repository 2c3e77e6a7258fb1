use thiserror::Error;

/// Top-level error type for the `reportly-api` crate.
///
/// Covers transport, protocol and decoding failures of the resource API.
/// `reportly-core` maps these into user-facing variants.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// The configured token could not be turned into a header value.
    #[error("Authentication setup failed: {message}")]
    Authentication { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS setup or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Protocol ────────────────────────────────────────────────────
    /// The server answered with a non-2xx status.
    #[error("Resource API error (HTTP {status}): {message}")]
    Status { status: u16, message: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// HTTP status code carried by this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Returns `true` if this is a transient error worth retrying.
    ///
    /// Nothing in this workspace retries; callers decide.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Status { status, .. } => matches!(status, 502..=504),
            _ => false,
        }
    }

    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Returns `true` if the request timed out in the transport.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Transport(e) if e.is_timeout())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_errors_report_their_code() {
        let err = Error::Status {
            status: 404,
            message: "Not Found".into(),
        };
        assert_eq!(err.status(), Some(404));
        assert!(err.is_not_found());
        assert!(!err.is_transient());
    }

    #[test]
    fn gateway_errors_are_transient() {
        let err = Error::Status {
            status: 503,
            message: "Service Unavailable".into(),
        };
        assert!(err.is_transient());
        assert!(!err.is_not_found());
    }

    #[test]
    fn deserialization_has_no_status() {
        let err = Error::Deserialization {
            message: "expected value".into(),
            body: "oops".into(),
        };
        assert_eq!(err.status(), None);
        assert!(!err.is_timeout());
    }
}
