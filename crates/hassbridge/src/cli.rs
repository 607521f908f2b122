//! Clap derive structures for the `hassbridge` CLI.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// hassbridge -- drive Home Assistant entities from the command line
#[derive(Debug, Parser)]
#[command(
    name = "hassbridge",
    version,
    about = "Fetch and control Home Assistant entities from the command line",
    long_about = "Fetch and control Home Assistant entities from the command line.\n\n\
        Talks to the Home Assistant REST API with a long-lived access token.\n\
        Entities listed in the config file are shown by `list` and `watch`.",
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
    /// Server host or URL, without the port (overrides config)
    #[arg(long, short = 'u', env = "HASSBRIDGE_URL", global = true)]
    pub url: Option<String>,

    /// Server port (overrides config)
    #[arg(long, short = 'p', env = "HASSBRIDGE_PORT", global = true)]
    pub port: Option<String>,

    /// Long-lived access token
    #[arg(long, env = "HASSBRIDGE_TOKEN", global = true, hide_env_values = true)]
    pub token: Option<String>,

    /// Report only server-confirmed state after a change
    #[arg(long, global = true)]
    pub no_force: bool,

    /// Config file to use instead of the platform default
    #[arg(long, env = "HASSBRIDGE_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(long, short = 'o', env = "HASSBRIDGE_OUTPUT", global = true)]
    pub output: Option<OutputFormat>,

    /// When to use color output
    #[arg(long, global = true)]
    pub color: Option<ColorMode>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', global = true)]
    pub insecure: bool,

    /// Request timeout in seconds
    #[arg(long, env = "HASSBRIDGE_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
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
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Check that the server is reachable and show its location name
    Status,

    /// Fetch one or more entities
    Get(GetArgs),

    /// Apply an action to an entity and report the resulting state
    #[command(alias = "set")]
    Change(ChangeArgs),

    /// Fetch every entity in the config file
    #[command(alias = "ls")]
    List,

    /// Like `list`, refreshing until interrupted
    Watch(WatchArgs),

    /// Manage the config file
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Entity commands ──────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GetArgs {
    /// Entity ids, e.g. light.kitchen
    #[arg(required = true)]
    pub entity_ids: Vec<String>,
}

#[derive(Debug, Args)]
pub struct ChangeArgs {
    /// Entity id, e.g. switch.lamp
    pub entity_id: String,

    /// Service action, e.g. turn_on or open_cover. Toggles when omitted.
    pub action: Option<String>,
}

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Refresh period in seconds (overrides config)
    #[arg(long, short = 'i')]
    pub interval: Option<u64>,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Interactive setup wizard
    Init,

    /// Show the effective configuration
    Show,

    /// Set a value (url, port, token, force, output, color, timeout, refresh_interval, insecure)
    Set {
        key: String,
        value: String,
    },

    /// Remember an entity for `list` and `watch`
    Add {
        entity_id: String,
    },

    /// Forget a remembered entity
    #[command(alias = "rm")]
    Remove {
        entity_id: String,
    },

    /// Print the config file path
    Path,
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
