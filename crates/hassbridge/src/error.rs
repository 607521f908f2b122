//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use hassbridge_config::ConfigError;
use hassbridge_core::CoreError;

pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to Home Assistant at {address}")]
    #[diagnostic(
        code(hassbridge::connection_failed),
        help(
            "Check that the server is running and reachable.\n\
             Reason: {reason}\n\
             Try: hassbridge status --url <host> --port <port>"
        )
    )]
    ConnectionFailed { address: String, reason: String },

    #[error("Request timed out after {seconds}s")]
    #[diagnostic(
        code(hassbridge::timeout),
        help("Increase the timeout with --timeout or check server responsiveness.")
    )]
    Timeout { seconds: u64 },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(hassbridge::auth_failed),
        help(
            "Create a long-lived access token under your Home Assistant profile,\n\
             then run: hassbridge config init"
        )
    )]
    AuthFailed { message: String },

    #[error("No access token configured")]
    #[diagnostic(
        code(hassbridge::no_token),
        help(
            "Configure one with: hassbridge config init\n\
             Or pass --token / set HASSBRIDGE_TOKEN."
        )
    )]
    NoToken,

    // ── Entities ─────────────────────────────────────────────────────
    #[error("Entity '{identifier}' not found")]
    #[diagnostic(
        code(hassbridge::not_found),
        help("Check the id in Home Assistant under Settings > Entities.")
    )]
    NotFound { identifier: String },

    #[error("Entity '{entity_id}' cannot be controlled")]
    #[diagnostic(
        code(hassbridge::unsupported_domain),
        help(
            "'{domain}' has no service mapping. Supported domains: switch, light,\n\
             cover, fan, input_boolean, lock, script, automation, button."
        )
    )]
    UnsupportedDomain { entity_id: String, domain: String },

    #[error("No entities configured")]
    #[diagnostic(
        code(hassbridge::no_entities),
        help("Remember some with: hassbridge config add <entity_id>")
    )]
    NoEntities,

    // ── API ──────────────────────────────────────────────────────────
    #[error("{message}")]
    #[diagnostic(code(hassbridge::api_error))]
    Api { message: String },

    // ── Validation / config ──────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(hassbridge::validation))]
    Validation { field: String, reason: String },

    #[error(transparent)]
    #[diagnostic(
        code(hassbridge::config),
        help("Inspect the file with: hassbridge config show")
    )]
    Config(ConfigError),

    // ── IO ───────────────────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::AuthFailed { .. } | Self::NoToken => exit_code::AUTH,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::UnsupportedDomain { .. } | Self::NoEntities | Self::Validation { .. } => {
                exit_code::USAGE
            }
            _ => exit_code::GENERAL,
        }
    }

    /// Attach the configured timeout to a core error.
    pub fn from_core(err: CoreError, timeout_secs: u64) -> Self {
        match err {
            CoreError::Timeout => Self::Timeout {
                seconds: timeout_secs,
            },
            other => other.into(),
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { address, reason } => {
                CliError::ConnectionFailed { address, reason }
            }
            CoreError::AuthenticationFailed { message } => CliError::AuthFailed { message },
            CoreError::Timeout => CliError::Timeout { seconds: 0 },
            CoreError::NotConfigured => CliError::NoToken,
            CoreError::EntityNotFound { identifier } => CliError::NotFound { identifier },
            CoreError::UnknownDomain { domain, entity_id } => {
                CliError::UnsupportedDomain { entity_id, domain }
            }
            other @ (CoreError::Api { .. }
            | CoreError::Protocol { .. }
            | CoreError::ChannelClosed) => CliError::Api {
                message: other.to_string(),
            },
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NoToken => CliError::NoToken,
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::Io(e) => CliError::Io(e),
            other => CliError::Config(other),
        }
    }
}
