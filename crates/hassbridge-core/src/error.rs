// ── Core error types ──
//
// User-facing errors from hassbridge-core. Consumers never see raw HTTP
// or JSON failures; the `From<hassbridge_api::Error>` impl translates
// transport-layer errors into domain variants.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot reach server at {address}: {reason}")]
    ConnectionFailed { address: String, reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Server request timed out")]
    Timeout,

    #[error("Gateway is not configured (url, port and token are required)")]
    NotConfigured,

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Entity not found: {identifier}")]
    EntityNotFound { identifier: String },

    #[error("No service group for domain '{domain}' (entity {entity_id})")]
    UnknownDomain { domain: String, entity_id: String },

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("API error: {message}")]
    Api {
        message: String,
        /// HTTP status code (if the server answered).
        status: Option<u16>,
    },

    // ── Protocol / channel errors ────────────────────────────────────
    #[error("Protocol error: {message}")]
    Protocol { message: String },

    #[error("Message channel closed")]
    ChannelClosed,
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<hassbridge_api::Error> for CoreError {
    fn from(err: hassbridge_api::Error) -> Self {
        match err {
            hassbridge_api::Error::Authentication { status, message } => {
                CoreError::AuthenticationFailed {
                    message: format!("HTTP {status}: {message}"),
                }
            }
            hassbridge_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        address: e
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
            hassbridge_api::Error::InvalidUrl(e) => CoreError::ConnectionFailed {
                address: String::new(),
                reason: format!("invalid server address: {e}"),
            },
            hassbridge_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                address: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            hassbridge_api::Error::Http { status, message } => CoreError::Api {
                message: format!("HTTP {status}: {message}"),
                status: Some(status),
            },
            hassbridge_api::Error::Deserialization { message, body: _ } => CoreError::Api {
                message: format!("unreadable response: {message}"),
                status: None,
            },
        }
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        CoreError::Protocol {
            message: err.to_string(),
        }
    }
}
