//! CLI configuration: thin wrapper around `reportly_config` shared types.
//!
//! Re-exports the shared types and adds CLI-specific resolution that
//! respects `GlobalOpts` flag overrides (--base-url, --api-token, etc.).

use std::time::Duration;

use secrecy::SecretString;

use reportly_core::{SessionConfig, TlsVerification};

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use reportly_config::{
    Config, Defaults, Profile, config_path, load_config_or_default, save_config,
};

// ── CLI-specific helpers ────────────────────────────────────────────

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Build a `SessionConfig` from the config file, profile, and CLI overrides.
///
/// Without a matching profile, `--base-url` alone is enough.
pub fn resolve_session_config(global: &GlobalOpts) -> Result<SessionConfig, CliError> {
    let cfg = load_config_or_default();

    let mut session = match cfg.profile(global.profile.as_deref()) {
        Ok((name, profile)) => {
            let mut profile = profile.clone();
            if let Some(ref url) = global.base_url {
                profile.base_url.clone_from(url);
            }
            reportly_config::profile_to_session_config(&profile, name, &cfg.defaults)?
        }
        Err(_) if global.base_url.is_some() => {
            let url = global.base_url.as_deref().unwrap_or_default();
            let mut session = SessionConfig::new(reportly_config::parse_base_url(url)?);
            session.timeout = Duration::from_secs(cfg.defaults.timeout);
            session.failure_policy = cfg.defaults.logical_failure_policy;
            if cfg.defaults.insecure {
                session.tls = TlsVerification::DangerAcceptInvalid;
            }
            session
        }
        Err(_) if global.profile.is_some() => {
            let available: Vec<_> = cfg.profiles.keys().cloned().collect();
            return Err(CliError::ProfileNotFound {
                name: active_profile_name(global, &cfg),
                available: if available.is_empty() {
                    "(none)".into()
                } else {
                    available.join(", ")
                },
            });
        }
        Err(_) => {
            return Err(CliError::NoConfig {
                path: config_path().display().to_string(),
            });
        }
    };

    // Flag overrides
    if let Some(ref token) = global.api_token {
        session.token = Some(SecretString::from(token.clone()));
    }
    if global.insecure {
        session.tls = TlsVerification::DangerAcceptInvalid;
    }
    if let Some(secs) = global.timeout {
        session.timeout = Duration::from_secs(secs);
    }
    if let Some(policy) = global.on_desync {
        session.failure_policy = policy.into();
    }

    Ok(session)
}
