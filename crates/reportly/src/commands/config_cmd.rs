//! Config subcommand handlers.

use std::collections::BTreeMap;

use dialoguer::{Input, Password, Select};
use secrecy::SecretString;
use serde::Serialize;

use reportly_core::LogicalFailurePolicy;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts, OutputFormat};
use crate::config::{self, Config, Defaults, Profile};
use crate::error::CliError;
use crate::output;

// ── Helpers ─────────────────────────────────────────────────────────

/// Config with plaintext tokens masked, for display.
#[derive(Serialize)]
struct RedactedConfig<'a> {
    default_profile: Option<&'a str>,
    defaults: &'a Defaults,
    profiles: BTreeMap<&'a str, Profile>,
}

fn redact(cfg: &Config) -> RedactedConfig<'_> {
    let profiles = cfg
        .profiles
        .iter()
        .map(|(name, p)| {
            let mut p = p.clone();
            if p.api_token.is_some() {
                p.api_token = Some("****".into());
            }
            (name.as_str(), p)
        })
        .collect();
    RedactedConfig {
        default_profile: cfg.default_profile.as_deref(),
        defaults: &cfg.defaults,
        profiles,
    }
}

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

fn invalid(field: &str, reason: &str) -> CliError {
    CliError::Validation {
        field: field.into(),
        reason: reason.into(),
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        // ── Init: interactive wizard ────────────────────────────────
        ConfigCommand::Init => {
            let config_path = config::config_path();
            eprintln!("reportly configuration wizard");
            eprintln!("   Config path: {}\n", config_path.display());

            let profile_name: String = Input::new()
                .with_prompt("Profile name")
                .default("default".into())
                .interact_text()
                .map_err(prompt_err)?;

            let base_url: String = Input::new()
                .with_prompt("Server URL")
                .default("http://localhost:8080".into())
                .validate_with(|input: &String| {
                    reportly_config::parse_base_url(input)
                        .map(|_| ())
                        .map_err(|e| e.to_string())
                })
                .interact_text()
                .map_err(prompt_err)?;

            let token = Password::new()
                .with_prompt("Bearer token (leave empty for none)")
                .allow_empty_password(true)
                .interact()
                .map_err(prompt_err)?;

            let api_token = if token.is_empty() {
                None
            } else {
                let choices = &[
                    "Store in system keyring (recommended)",
                    "Save to config file (plaintext)",
                ];
                let selection = Select::new()
                    .with_prompt("Where to store the token?")
                    .items(choices)
                    .default(0)
                    .interact()
                    .map_err(prompt_err)?;
                if selection == 0 {
                    reportly_config::store_token(&profile_name, &SecretString::from(token))?;
                    eprintln!("   ✓ Token stored in system keyring");
                    None
                } else {
                    Some(token)
                }
            };

            let mut cfg = config::load_config_or_default();
            cfg.profiles.insert(
                profile_name.clone(),
                Profile {
                    base_url,
                    api_token,
                    ..Profile::default()
                },
            );
            cfg.default_profile = Some(profile_name.clone());
            config::save_config(&cfg)?;

            eprintln!("\n✓ Configuration written to {}", config_path.display());
            eprintln!("  Active profile: {profile_name}");
            eprintln!("\n  Test it: reportly unit-categories list");
            Ok(())
        }

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let cfg = config::load_config_or_default();
            let redacted = redact(&cfg);
            let out = match global.output {
                OutputFormat::Json => output::render_json(&redacted, false)?,
                OutputFormat::JsonCompact => output::render_json(&redacted, true)?,
                OutputFormat::Yaml => output::render_yaml(&redacted)?,
                OutputFormat::Table | OutputFormat::Plain => toml_string(&redacted)?,
            };
            output::print_output(&out, global.quiet);
            Ok(())
        }

        // ── Path ────────────────────────────────────────────────────
        ConfigCommand::Path => {
            output::print_output(&config::config_path().display().to_string(), global.quiet);
            Ok(())
        }

        // ── Set <key> <value> ───────────────────────────────────────
        ConfigCommand::Set { key, value } => {
            let mut cfg = config::load_config_or_default();
            let profile_name = config::active_profile_name(global, &cfg);

            if matches!(key.as_str(), "logical_failure_policy" | "logical-failure-policy") {
                cfg.defaults.logical_failure_policy = value
                    .parse::<LogicalFailurePolicy>()
                    .map_err(|_| {
                        invalid("logical_failure_policy", "must be 'reject' or 'resolve'")
                    })?;
                config::save_config(&cfg)?;
                eprintln!("✓ Set {key} in [defaults]");
                return Ok(());
            }

            let profile = cfg.profiles.entry(profile_name.clone()).or_default();
            match key.as_str() {
                "base_url" | "base-url" => {
                    reportly_config::parse_base_url(&value)?;
                    profile.base_url = value;
                }
                "api_token_env" | "api-token-env" => profile.api_token_env = Some(value),
                "ca_cert" | "ca-cert" => profile.ca_cert = Some(value.into()),
                "insecure" => {
                    profile.insecure = Some(
                        value
                            .parse()
                            .map_err(|_| invalid("insecure", "must be 'true' or 'false'"))?,
                    );
                }
                "timeout" => {
                    profile.timeout = Some(
                        value
                            .parse()
                            .map_err(|_| invalid("timeout", "must be a number (seconds)"))?,
                    );
                }
                other => {
                    return Err(CliError::Validation {
                        field: other.into(),
                        reason: format!(
                            "unknown config key '{other}'. Valid keys: base_url, api_token_env, \
                             ca_cert, insecure, timeout, logical_failure_policy"
                        ),
                    });
                }
            }

            config::save_config(&cfg)?;
            eprintln!("✓ Set {key} on profile '{profile_name}'");
            Ok(())
        }

        // ── Profiles ────────────────────────────────────────────────
        ConfigCommand::Profiles => {
            let cfg = config::load_config_or_default();
            let default = cfg.default_profile.as_deref().unwrap_or("default");
            if cfg.profiles.is_empty() {
                eprintln!("No profiles configured. Run: reportly config init");
            } else {
                for name in cfg.profiles.keys() {
                    let marker = if name == default { " *" } else { "" };
                    println!("{name}{marker}");
                }
            }
            Ok(())
        }

        // ── Use <name> ──────────────────────────────────────────────
        ConfigCommand::Use { name } => {
            let mut cfg = config::load_config_or_default();

            if !cfg.profiles.contains_key(&name) {
                let available: Vec<_> = cfg.profiles.keys().cloned().collect();
                return Err(CliError::ProfileNotFound {
                    name,
                    available: if available.is_empty() {
                        "(none)".into()
                    } else {
                        available.join(", ")
                    },
                });
            }

            cfg.default_profile = Some(name.clone());
            config::save_config(&cfg)?;
            eprintln!("✓ Default profile set to '{name}'");
            Ok(())
        }

        // ── SetToken ────────────────────────────────────────────────
        ConfigCommand::SetToken => {
            let cfg = config::load_config_or_default();
            let profile_name = config::active_profile_name(global, &cfg);

            let token = Password::new()
                .with_prompt(format!("Bearer token for '{profile_name}'"))
                .interact()
                .map_err(prompt_err)?;
            if token.is_empty() {
                return Err(invalid("token", "token cannot be empty"));
            }

            reportly_config::store_token(&profile_name, &SecretString::from(token))?;
            eprintln!("✓ Token stored in system keyring for profile '{profile_name}'");
            Ok(())
        }
    }
}

fn toml_string<T: Serialize>(data: &T) -> Result<String, CliError> {
    toml::to_string_pretty(data).map_err(|e| CliError::Validation {
        field: "config".into(),
        reason: e.to_string(),
    })
}
