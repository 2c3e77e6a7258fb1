//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors with
//! actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use reportly_config::ConfigError;
use reportly_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONFLICT: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to the resource server at {url}")]
    #[diagnostic(
        code(reportly::connection_failed),
        help(
            "Check that the server is running and reachable.\n\
             Reason: {reason}\n\
             For self-signed certificates try --insecure (-k) or set ca_cert in your profile."
        )
    )]
    ConnectionFailed { url: String, reason: String },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(reportly::auth_failed),
        help(
            "Verify the bearer token.\n\
             Store one with: reportly --profile <name> config set-token"
        )
    )]
    AuthFailed { message: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("{resource} not found: {identifier}")]
    #[diagnostic(
        code(reportly::not_found),
        help("Run: reportly {list_command} to see available records")
    )]
    NotFound {
        resource: String,
        identifier: String,
        list_command: String,
    },

    /// The server accepted the change but the local cache could not apply it.
    #[error("{message}")]
    #[diagnostic(
        code(reportly::desync),
        help(
            "The server state may differ from what was expected.\n\
             Run: reportly {list_command} to refresh, or pass --on-desync resolve."
        )
    )]
    Desync {
        message: String,
        list_command: String,
    },

    // ── API ──────────────────────────────────────────────────────────
    #[error("API error{}: {message}", .status.map(|s| format!(" (HTTP {s})")).unwrap_or_default())]
    #[diagnostic(code(reportly::api_error))]
    ApiError {
        message: String,
        status: Option<u16>,
    },

    #[error("Internal error: {0}")]
    #[diagnostic(code(reportly::internal))]
    Internal(String),

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(reportly::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(reportly::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: reportly config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No server configured")]
    #[diagnostic(
        code(reportly::no_config),
        help(
            "Create a profile with: reportly config init\n\
             Or pass --base-url / set REPORTLY_BASE_URL.\n\
             Expected config at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(reportly::config))]
    Config(ConfigError),

    // ── Interactive ──────────────────────────────────────────────────
    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(reportly::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── Timeout ──────────────────────────────────────────────────────
    #[error("Request timed out")]
    #[diagnostic(
        code(reportly::timeout),
        help("Increase timeout with --timeout or check server responsiveness.")
    )]
    Timeout,

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    #[diagnostic(code(reportly::json), help("Check the JSON payload and try again."))]
    Json(#[from] serde_json::Error),

    #[error("YAML rendering failed: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } => exit_code::AUTH,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Desync { .. } => exit_code::CONFLICT,
            Self::Timeout => exit_code::TIMEOUT,
            Self::Validation { .. } | Self::NonInteractiveRequiresYes { .. } | Self::Json(_) => {
                exit_code::USAGE
            }
            _ => exit_code::GENERAL,
        }
    }

    /// Translate a core error raised while running `reportly <list_command>`'s
    /// resource group.
    pub fn from_core(err: CoreError, list_command: &str) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => Self::ConnectionFailed { url, reason },
            CoreError::Timeout => Self::Timeout,
            CoreError::AuthenticationFailed { message } => Self::AuthFailed { message },
            CoreError::NotFound {
                resource,
                identifier,
            } => Self::NotFound {
                resource,
                identifier,
                list_command: list_command.into(),
            },
            err @ (CoreError::CacheDesync { .. } | CoreError::UnexpectedDeleteCount { .. }) => {
                Self::Desync {
                    message: err.to_string(),
                    list_command: list_command.into(),
                }
            }
            CoreError::Validation { message } => Self::Validation {
                field: "input".into(),
                reason: message,
            },
            CoreError::Api { message, status } => Self::ApiError { message, status },
            CoreError::Config { message } => Self::Validation {
                field: "config".into(),
                reason: message,
            },
            CoreError::Internal(message) => Self::Internal(message),
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            ConfigError::UnknownProfile { name } => Self::ProfileNotFound {
                name,
                available: "(none)".into(),
            },
            ConfigError::Io(e) => Self::Io(e),
            other => Self::Config(other),
        }
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        Self::from_core(err, "<resource> list")
    }
}
