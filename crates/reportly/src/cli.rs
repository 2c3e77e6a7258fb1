//! Clap derive structures for the `reportly` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use reportly_core::{LogicalFailurePolicy, RecordId};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// reportly -- administer REST reporting resources from the command line
#[derive(Debug, Parser)]
#[command(
    name = "reportly",
    version,
    about = "Manage reporting resources (cover types, unit categories, units)",
    long_about = "A CLI for administering the reference data of a REST reporting server.\n\n\
        Each resource is served under <base-url>/api/v1/<resource> and supports\n\
        list, get, create, update and delete.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Server profile to use
    #[arg(long, short = 'p', env = "REPORTLY_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Server base URL (overrides profile)
    #[arg(long, short = 'u', env = "REPORTLY_BASE_URL", global = true)]
    pub base_url: Option<String>,

    /// Bearer token
    #[arg(long, env = "REPORTLY_API_TOKEN", global = true, hide_env_values = true)]
    pub api_token: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "REPORTLY_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Accept invalid TLS certificates
    #[arg(long, short = 'k', env = "REPORTLY_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "REPORTLY_TIMEOUT", global = true)]
    pub timeout: Option<u64>,

    /// Outcome when the server accepts a change the local cache cannot apply
    #[arg(long, value_enum, global = true)]
    pub on_desync: Option<DesyncPolicy>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one id per line (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum DesyncPolicy {
    /// Fail the command
    Reject,
    /// Report the error but return the server's result
    Resolve,
}

impl From<DesyncPolicy> for LogicalFailurePolicy {
    fn from(policy: DesyncPolicy) -> Self {
        match policy {
            DesyncPolicy::Reject => Self::Reject,
            DesyncPolicy::Resolve => Self::Resolve,
        }
    }
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage land cover types
    #[command(alias = "ct")]
    CoverTypes(ResourceArgs),

    /// Manage unit categories
    #[command(alias = "uc")]
    UnitCategories(ResourceArgs),

    /// Manage units of measure
    #[command(alias = "u")]
    Units(ResourceArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  RESOURCES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ResourceArgs {
    #[command(subcommand)]
    pub command: ResourceCommand,
}

#[derive(Debug, Subcommand)]
pub enum ResourceCommand {
    /// List records, with optional server filters and local search/sort/paging
    #[command(alias = "ls")]
    List(ListArgs),

    /// Get one record
    Get {
        /// Record id
        id: RecordId,
    },

    /// Create a record from a JSON object
    Create(PayloadArgs),

    /// Update a record; the JSON object is merged over the current record
    Update {
        /// Record id
        id: RecordId,

        #[command(flatten)]
        payload: PayloadArgs,
    },

    /// Delete a record
    #[command(alias = "rm")]
    Delete {
        /// Record id
        id: RecordId,
    },
}

/// Filtering, search, sort and pagination for list commands.
#[derive(Debug, Args)]
pub struct ListArgs {
    /// Server-side filter passed as a query parameter (repeatable)
    #[arg(long, short = 'f', value_name = "KEY=VALUE", value_parser = parse_key_val)]
    pub filter: Vec<(String, String)>,

    /// Case-insensitive search across all columns
    #[arg(long, short = 's')]
    pub search: Option<String>,

    /// Column to sort by
    #[arg(long)]
    pub sort: Option<String>,

    /// Sort descending
    #[arg(long, requires = "sort")]
    pub desc: bool,

    /// Page number (1-based)
    #[arg(long, default_value = "1")]
    pub page: usize,

    /// Rows per page
    #[arg(long, default_value = "25")]
    pub page_size: usize,
}

/// JSON record body, inline or from a file.
#[derive(Debug, Args)]
pub struct PayloadArgs {
    /// JSON object, e.g. '{"code":"FOR","description":"Forest"}'
    #[arg(long, short = 'd', required_unless_present = "from_file")]
    pub data: Option<String>,

    /// Read the JSON object from a file
    #[arg(long, short = 'F', conflicts_with = "data")]
    pub from_file: Option<PathBuf>,
}

fn parse_key_val(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{raw}'"))?;
    if key.is_empty() {
        return Err(format!("empty key in '{raw}'"));
    }
    Ok((key.to_owned(), value.to_owned()))
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create initial config file with guided setup
    Init,

    /// Display current resolved configuration
    Show,

    /// Print the config file path
    Path,

    /// Set a value on the active profile
    Set {
        /// Config key (base_url, api_token_env, ca_cert, insecure, timeout,
        /// logical_failure_policy)
        key: String,

        /// Value to set
        value: String,
    },

    /// List configured profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name to set as default
        name: String,
    },

    /// Store the active profile's bearer token in the system keyring
    SetToken,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn command_tree_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn filters_parse_as_pairs() {
        assert_eq!(
            parse_key_val("unitCategoryId=2").unwrap(),
            ("unitCategoryId".to_owned(), "2".to_owned())
        );
        assert_eq!(parse_key_val("q=a=b").unwrap().1, "a=b");
        assert!(parse_key_val("novalue").is_err());
        assert!(parse_key_val("=x").is_err());
    }

    #[test]
    fn list_flags_parse() {
        let cli = Cli::try_parse_from([
            "reportly", "units", "list", "-f", "unitCategoryId=1", "--sort", "name", "--desc",
        ])
        .unwrap();
        let Command::Units(ResourceArgs {
            command: ResourceCommand::List(list),
        }) = cli.command
        else {
            panic!("expected units list");
        };
        assert_eq!(list.filter.len(), 1);
        assert!(list.desc);
        assert_eq!(list.page, 1);
    }
}
