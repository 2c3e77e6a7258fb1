//! Shared configuration for the reportly CLI.
//!
//! TOML profiles, token resolution (env + keyring + plaintext), and
//! translation to `reportly_core::SessionConfig`. The CLI layers its
//! `GlobalOpts` overrides on top.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use reportly_core::{LogicalFailurePolicy, SessionConfig, TlsVerification};

const KEYRING_SERVICE: &str = "reportly";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{name}' not found")]
    UnknownProfile { name: String },

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named server profiles.
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Look up a profile, falling back to `default_profile` when `name`
    /// is `None`. Returns the resolved name alongside the profile.
    pub fn profile<'a>(
        &'a self,
        name: Option<&'a str>,
    ) -> Result<(&'a str, &'a Profile), ConfigError> {
        let name = name
            .or(self.default_profile.as_deref())
            .unwrap_or("default");
        self.profiles
            .get(name)
            .map(|p| (name, p))
            .ok_or_else(|| ConfigError::UnknownProfile { name: name.into() })
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default)]
    pub insecure: bool,

    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Outcome of update/delete calls the local mirror cannot apply.
    #[serde(default)]
    pub logical_failure_policy: LogicalFailurePolicy,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            insecure: false,
            timeout: default_timeout(),
            logical_failure_policy: LogicalFailurePolicy::default(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    30
}

/// A named resource-server profile.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Profile {
    /// Server base URL (e.g., "http://reporter.example.org").
    pub base_url: String,

    /// Bearer token (plaintext; prefer keyring or env var).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,

    /// Environment variable name containing the bearer token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_token_env: Option<String>,

    /// Path to custom CA certificate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ca_cert: Option<PathBuf>,

    /// Override insecure TLS setting.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insecure: Option<bool>,

    /// Override timeout (seconds).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("org", "reportly", "reportly").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("reportly");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from an explicit file. A missing file yields the defaults;
/// `REPORTLY_` variables override both (`REPORTLY_DEFAULTS__TIMEOUT=5`).
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("REPORTLY_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if it can't be read.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Token resolution (without CLI flags) ────────────────────────────

/// Resolve the bearer token from the credential chain.
///
/// Order: env var named by `api_token_env`, system keyring, plaintext.
/// `None` means the server is accessed unauthenticated.
pub fn resolve_token(profile: &Profile, profile_name: &str) -> Option<SecretString> {
    // 1. Profile's api_token_env → env var lookup
    if let Some(ref env_name) = profile.api_token_env {
        if let Ok(val) = std::env::var(env_name) {
            return Some(SecretString::from(val));
        }
    }

    // 2. System keyring
    if let Ok(entry) = keyring::Entry::new(KEYRING_SERVICE, &keyring_user(profile_name)) {
        if let Ok(secret) = entry.get_password() {
            return Some(SecretString::from(secret));
        }
    }

    // 3. Plaintext in config
    profile
        .api_token
        .as_ref()
        .map(|token| SecretString::from(token.clone()))
}

/// Store a profile's bearer token in the system keyring.
pub fn store_token(profile_name: &str, token: &SecretString) -> Result<(), ConfigError> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, &keyring_user(profile_name))?;
    entry.set_password(token.expose_secret())?;
    Ok(())
}

fn keyring_user(profile_name: &str) -> String {
    format!("{profile_name}/api-token")
}

// ── Translation to the core session config ──────────────────────────

/// Build a `SessionConfig` from a profile and the global defaults.
pub fn profile_to_session_config(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<SessionConfig, ConfigError> {
    let base_url = parse_base_url(&profile.base_url)?;

    let mut config = SessionConfig::new(base_url);
    config.token = resolve_token(profile, profile_name);
    config.tls = if profile.insecure.unwrap_or(defaults.insecure) {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else {
        TlsVerification::SystemDefaults
    };
    config.timeout = Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout));
    config.failure_policy = defaults.logical_failure_policy;

    Ok(config)
}

/// Parse and check a server URL (http or https only).
pub fn parse_base_url(raw: &str) -> Result<url::Url, ConfigError> {
    let url: url::Url = raw.parse().map_err(|_| ConfigError::Validation {
        field: "base_url".into(),
        reason: format!("invalid URL: {raw}"),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::Validation {
            field: "base_url".into(),
            reason: format!("unsupported scheme '{}', expected http or https", url.scheme()),
        });
    }
    Ok(url)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn profile(base_url: &str) -> Profile {
        Profile {
            base_url: base_url.into(),
            ..Profile::default()
        }
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(cfg.default_profile.as_deref(), Some("default"));
        assert_eq!(cfg.defaults.timeout, 30);
        assert!(cfg.profiles.is_empty());
    }

    #[test]
    fn file_round_trips_through_save() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.defaults.logical_failure_policy = LogicalFailurePolicy::Resolve;
        cfg.profiles.insert(
            "lab".into(),
            Profile {
                timeout: Some(5),
                ..profile("http://reporter.lab:8080")
            },
        );
        save_config_to(&cfg, &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("logical_failure_policy = \"resolve\""));
        assert!(!text.contains("api_token"));

        let loaded = load_config_from(&path).unwrap();
        let (name, lab) = loaded.profile(Some("lab")).unwrap();
        assert_eq!(name, "lab");
        assert_eq!(lab.base_url, "http://reporter.lab:8080");
        assert_eq!(lab.timeout, Some(5));
        assert_eq!(
            loaded.defaults.logical_failure_policy,
            LogicalFailurePolicy::Resolve
        );
    }

    #[test]
    fn unknown_profile_is_an_error() {
        let cfg = Config::default();
        assert!(matches!(
            cfg.profile(None),
            Err(ConfigError::UnknownProfile { ref name }) if name == "default"
        ));
    }

    #[test]
    fn session_config_applies_overrides() {
        let defaults = Defaults::default();
        let p = Profile {
            ca_cert: Some(PathBuf::from("/etc/reportly/ca.pem")),
            timeout: Some(9),
            api_token: Some("plain".into()),
            ..profile("https://reporter.example.org")
        };

        let cfg = profile_to_session_config(&p, "reportly-test-no-keyring", &defaults).unwrap();
        assert_eq!(
            cfg.tls,
            TlsVerification::CustomCa(PathBuf::from("/etc/reportly/ca.pem"))
        );
        assert_eq!(cfg.timeout, Duration::from_secs(9));
        assert_eq!(cfg.failure_policy, LogicalFailurePolicy::Reject);
    }

    #[test]
    fn insecure_wins_over_ca_cert() {
        let defaults = Defaults {
            insecure: true,
            ..Defaults::default()
        };
        let p = Profile {
            ca_cert: Some(PathBuf::from("/tmp/ca.pem")),
            ..profile("https://localhost")
        };
        let cfg = profile_to_session_config(&p, "x", &defaults).unwrap();
        assert_eq!(cfg.tls, TlsVerification::DangerAcceptInvalid);
    }

    #[test]
    fn env_token_takes_precedence() {
        let p = Profile {
            api_token_env: Some("PATH".into()),
            api_token: Some("plain".into()),
            ..profile("http://localhost")
        };
        let token = resolve_token(&p, "reportly-test-no-keyring").unwrap();
        assert_eq!(token.expose_secret(), std::env::var("PATH").unwrap());
    }

    #[test]
    fn bad_urls_are_rejected() {
        assert!(parse_base_url("not a url").is_err());
        assert!(matches!(
            parse_base_url("ftp://reporter.example.org"),
            Err(ConfigError::Validation { .. })
        ));
        assert!(parse_base_url("http://reporter.example.org").is_ok());
    }
}
