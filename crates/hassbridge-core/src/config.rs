// ── Gateway configuration ──
//
// The four values the gateway needs to reach a server. Never touches
// disk; the device pushes values over the channel or the CLI builds one
// from hassbridge-config.

use std::fmt;

use secrecy::{ExposeSecret, SecretString};

use crate::model::DeviceSettings;

pub const DEFAULT_URL: &str = "127.0.0.1";
pub const DEFAULT_PORT: &str = "8123";
pub const DEFAULT_FORCE: bool = true;

/// How the gateway learns the outcome of a state-change command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultPolicy {
    /// Assume the action's terminal state as soon as the call succeeds.
    Force,
    /// Report only what the server says the entity's state now is.
    ReadBack,
}

/// Server url, port, access token, and force-update flag.
///
/// Every constructor and setter takes `Option`s: `None` resets that
/// field to its default, it never means "leave unchanged".
#[derive(Clone)]
pub struct GatewayConfig {
    pub url: String,
    pub port: String,
    pub token: SecretString,
    pub force: bool,
}

impl GatewayConfig {
    pub fn new(
        url: Option<String>,
        port: Option<String>,
        token: Option<SecretString>,
        force: Option<bool>,
    ) -> Self {
        Self {
            url: url.unwrap_or_else(|| DEFAULT_URL.into()),
            port: port.unwrap_or_else(|| DEFAULT_PORT.into()),
            token: token.unwrap_or_else(|| SecretString::from(String::new())),
            force: force.unwrap_or(DEFAULT_FORCE),
        }
    }

    pub fn with_url(&self, url: Option<String>) -> Self {
        Self {
            url: url.unwrap_or_else(|| DEFAULT_URL.into()),
            ..self.clone()
        }
    }

    pub fn with_port(&self, port: Option<String>) -> Self {
        Self {
            port: port.unwrap_or_else(|| DEFAULT_PORT.into()),
            ..self.clone()
        }
    }

    pub fn with_token(&self, token: Option<SecretString>) -> Self {
        Self {
            token: token.unwrap_or_else(|| SecretString::from(String::new())),
            ..self.clone()
        }
    }

    pub fn with_force(&self, force: Option<bool>) -> Self {
        Self {
            force: force.unwrap_or(DEFAULT_FORCE),
            ..self.clone()
        }
    }

    /// Url, port, and token are all non-empty.
    pub fn is_configured(&self) -> bool {
        !self.url.is_empty() && !self.port.is_empty() && !self.token.expose_secret().is_empty()
    }

    /// `{url}:{port}`, unvalidated.
    pub fn address(&self) -> String {
        format!("{}:{}", self.url, self.port)
    }

    pub fn policy(&self) -> ResultPolicy {
        if self.force {
            ResultPolicy::Force
        } else {
            ResultPolicy::ReadBack
        }
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self::new(None, None, None, None)
    }
}

impl fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("url", &self.url)
            .field("port", &self.port)
            .field("token", &"****")
            .field("force", &self.force)
            .finish()
    }
}

impl From<&DeviceSettings> for GatewayConfig {
    fn from(settings: &DeviceSettings) -> Self {
        Self::new(
            Some(settings.url.clone()),
            Some(settings.port.clone()),
            Some(SecretString::from(settings.token.clone())),
            Some(settings.force),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configured() -> GatewayConfig {
        GatewayConfig::new(
            Some("10.0.0.2".into()),
            Some("443".into()),
            Some(SecretString::from("s3cr3t".to_string())),
            Some(false),
        )
    }

    #[test]
    fn all_none_yields_defaults_regardless_of_prior_state() {
        let prior = configured();
        assert!(prior.is_configured());

        let reset = GatewayConfig::new(None, None, None, None);
        assert_eq!(reset.url, "127.0.0.1");
        assert_eq!(reset.port, "8123");
        assert!(reset.token.expose_secret().is_empty());
        assert!(reset.force);
        assert!(!reset.is_configured());
    }

    #[test]
    fn setter_with_none_resets_single_field() {
        let cfg = configured().with_url(None);
        assert_eq!(cfg.url, DEFAULT_URL);
        assert_eq!(cfg.port, "443");

        let cfg = configured().with_force(None);
        assert!(cfg.force);
    }

    #[test]
    fn any_empty_field_means_unconfigured() {
        assert!(!configured().with_url(Some(String::new())).is_configured());
        assert!(!configured().with_port(Some(String::new())).is_configured());
        assert!(!configured().with_token(None).is_configured());
    }

    #[test]
    fn address_joins_url_and_port() {
        assert_eq!(configured().address(), "10.0.0.2:443");
        assert_eq!(GatewayConfig::default().address(), "127.0.0.1:8123");
    }

    #[test]
    fn policy_follows_force_flag() {
        assert_eq!(configured().policy(), ResultPolicy::ReadBack);
        assert_eq!(GatewayConfig::default().policy(), ResultPolicy::Force);
    }

    #[test]
    fn debug_never_prints_token() {
        assert!(!format!("{:?}", configured()).contains("s3cr3t"));
    }
}
