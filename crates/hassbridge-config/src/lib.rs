//! Settings file for hassbridge.
//!
//! One TOML file holds the server connection, the remembered entity list
//! and CLI defaults. Loading layers serialized defaults, the file, and
//! `HASSBRIDGE_` environment variables. The access token resolves from
//! env, then the system keyring, then plaintext in the file.

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
use tracing::debug;

use hassbridge_core::config::{DEFAULT_FORCE, DEFAULT_PORT, DEFAULT_URL};
use hassbridge_core::{DeviceSettings, PersistedEntity, TlsMode, TransportConfig};

const KEYRING_SERVICE: &str = "hassbridge";
const KEYRING_USER: &str = "token";
const TOKEN_ENV: &str = "HASSBRIDGE_TOKEN";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no access token configured")]
    NoToken,

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("keyring error: {0}")]
    Keyring(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

impl From<keyring::Error> for ConfigError {
    fn from(err: keyring::Error) -> Self {
        Self::Keyring(err.to_string())
    }
}

// ── TOML config structs ─────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Server host or URL, without the port.
    #[serde(default = "default_url")]
    pub url: String,

    #[serde(default = "default_port")]
    pub port: String,

    /// Plaintext token. Prefer the keyring or `HASSBRIDGE_TOKEN`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Assume an action's terminal state instead of reading it back.
    #[serde(default = "default_force")]
    pub force: bool,

    /// Entities fetched by `list` and `watch`, in display order.
    #[serde(default)]
    pub entities: Vec<PersistedEntity>,

    #[serde(default)]
    pub defaults: Defaults,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            url: default_url(),
            port: default_port(),
            token: None,
            force: default_force(),
            entities: Vec::new(),
            defaults: Defaults::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// `watch` refresh period in seconds.
    #[serde(default = "default_refresh")]
    pub refresh_interval: u64,

    #[serde(default)]
    pub insecure: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ca_cert: Option<PathBuf>,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            timeout: default_timeout(),
            refresh_interval: default_refresh(),
            insecure: false,
            ca_cert: None,
        }
    }
}

fn default_url() -> String {
    DEFAULT_URL.into()
}
fn default_port() -> String {
    DEFAULT_PORT.into()
}
fn default_force() -> bool {
    DEFAULT_FORCE
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
fn default_refresh() -> u64 {
    10
}

impl Config {
    /// The device-side view of this file, with `token` already resolved.
    pub fn device_settings(&self, token: Option<&SecretString>) -> DeviceSettings {
        DeviceSettings {
            url: self.url.clone(),
            port: self.port.clone(),
            token: token.map(|t| t.expose_secret().to_owned()).unwrap_or_default(),
            force: self.force,
            entities: self.entities.clone(),
        }
    }

    /// Take back what a device run changed. The token is left alone so a
    /// keyring or env token never lands in the file.
    pub fn absorb(&mut self, settings: &DeviceSettings) {
        self.url.clone_from(&settings.url);
        self.port.clone_from(&settings.port);
        self.force = settings.force;
        self.entities.clone_from(&settings.entities);
    }

    pub fn transport(&self) -> TransportConfig {
        let tls = if self.defaults.insecure {
            TlsMode::DangerAcceptInvalid
        } else if let Some(ref ca) = self.defaults.ca_cert {
            TlsMode::CustomCa(ca.clone())
        } else {
            TlsMode::System
        };
        TransportConfig {
            tls,
            timeout: Duration::from_secs(self.defaults.timeout),
        }
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.defaults.refresh_interval.max(1))
    }

    /// Set one top-level field from its string form.
    pub fn set_field(&mut self, field: &str, value: &str) -> Result<(), ConfigError> {
        let invalid = |reason: String| ConfigError::Validation {
            field: field.into(),
            reason,
        };
        match field {
            "url" => value.clone_into(&mut self.url),
            "port" => {
                value
                    .parse::<u16>()
                    .map_err(|_| invalid(format!("'{value}' is not a port number")))?;
                value.clone_into(&mut self.port);
            }
            "token" => self.token = Some(value.to_owned()).filter(|t| !t.is_empty()),
            "force" => {
                self.force = value
                    .parse()
                    .map_err(|_| invalid(format!("expected true or false, got '{value}'")))?;
            }
            "output" => value.clone_into(&mut self.defaults.output),
            "color" => value.clone_into(&mut self.defaults.color),
            "timeout" | "refresh_interval" | "refresh-interval" => {
                let secs = value
                    .parse()
                    .map_err(|_| invalid(format!("expected seconds, got '{value}'")))?;
                if field == "timeout" {
                    self.defaults.timeout = secs;
                } else {
                    self.defaults.refresh_interval = secs;
                }
            }
            "insecure" => {
                self.defaults.insecure = value
                    .parse()
                    .map_err(|_| invalid(format!("expected true or false, got '{value}'")))?;
            }
            _ => return Err(invalid("unknown setting".into())),
        }
        Ok(())
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "hassbridge", "hassbridge").map_or_else(
        || dirs_fallback().join("config.toml"),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("hassbridge");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load from `path` and the environment. A missing file yields defaults.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    debug!(path = %path.display(), "loading config");
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(
            Env::prefixed("HASSBRIDGE_")
                .ignore(&["token", "port", "config"])
                .split("__"),
        );

    Ok(figment.extract()?)
}

pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load config, returning a default if loading fails.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write it to `path`, creating parent dirs.
pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    debug!(path = %path.display(), "config saved");
    Ok(())
}

pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

// ── Token resolution ────────────────────────────────────────────────

/// Resolve the access token: `HASSBRIDGE_TOKEN`, then the keyring, then
/// plaintext in the file.
pub fn resolve_token(cfg: &Config) -> Result<SecretString, ConfigError> {
    if let Ok(val) = std::env::var(TOKEN_ENV) {
        if !val.is_empty() {
            return Ok(SecretString::from(val));
        }
    }

    if let Some(secret) = keyring_token() {
        return Ok(secret);
    }

    cfg.token
        .as_ref()
        .filter(|t| !t.is_empty())
        .map(|t| SecretString::from(t.clone()))
        .ok_or(ConfigError::NoToken)
}

fn keyring_token() -> Option<SecretString> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, KEYRING_USER).ok()?;
    entry.get_password().ok().map(SecretString::from)
}

pub fn store_token_in_keyring(token: &SecretString) -> Result<(), ConfigError> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, KEYRING_USER)?;
    entry.set_password(token.expose_secret())?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use hassbridge_core::EntityId;
    use pretty_assertions::assert_eq;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config_from(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(cfg.url, "127.0.0.1");
        assert_eq!(cfg.port, "8123");
        assert!(cfg.force);
        assert!(cfg.entities.is_empty());
        assert_eq!(cfg.defaults.timeout, 30);
    }

    #[test]
    fn file_values_override_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
url = "https://ha.example.org"
port = "443"
force = false

[[entities]]
name = "light.kitchen"

[[entities]]
name = "script.night"

[defaults]
output = "json"
"#,
        )
        .unwrap();

        let cfg = load_config_from(&path).unwrap();
        assert_eq!(cfg.url, "https://ha.example.org");
        assert_eq!(cfg.port, "443");
        assert!(!cfg.force);
        assert_eq!(cfg.entities.len(), 2);
        assert_eq!(cfg.entities[1].name, "script.night");
        assert_eq!(cfg.defaults.output, "json");
        assert_eq!(cfg.defaults.refresh_interval, 10);
    }

    #[test]
    fn save_creates_parent_dirs_and_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.set_field("url", "10.0.0.9").unwrap();
        cfg.entities.push(PersistedEntity {
            name: "cover.blinds".into(),
        });
        save_config_to(&cfg, &path).unwrap();

        assert_eq!(load_config_from(&path).unwrap(), cfg);
    }

    #[test]
    fn plaintext_token_is_not_written_unless_set() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        save_config_to(&Config::default(), &path).unwrap();
        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(!raw.contains("token"));
    }

    #[test]
    fn set_field_validates() {
        let mut cfg = Config::default();
        assert!(cfg.set_field("port", "80").is_ok());
        assert!(matches!(
            cfg.set_field("port", "eighty"),
            Err(ConfigError::Validation { .. })
        ));
        assert!(matches!(
            cfg.set_field("force", "maybe"),
            Err(ConfigError::Validation { .. })
        ));
        assert!(matches!(
            cfg.set_field("colour", "red"),
            Err(ConfigError::Validation { .. })
        ));
        cfg.set_field("force", "false").unwrap();
        assert!(!cfg.force);
    }

    #[test]
    fn device_round_trip_keeps_token_out_of_file() {
        let mut cfg = Config::default();
        let token = SecretString::from("from-keyring".to_string());
        let mut settings = cfg.device_settings(Some(&token));
        assert_eq!(settings.token, "from-keyring");

        settings.remember(&EntityId::from("fan.attic"));
        settings.force = false;
        cfg.absorb(&settings);

        assert!(cfg.token.is_none());
        assert!(!cfg.force);
        assert_eq!(cfg.entities.len(), 1);
    }

    #[test]
    fn transport_follows_defaults() {
        let mut cfg = Config::default();
        assert!(matches!(cfg.transport().tls, TlsMode::System));
        cfg.defaults.insecure = true;
        cfg.defaults.timeout = 5;
        let transport = cfg.transport();
        assert!(matches!(transport.tls, TlsMode::DangerAcceptInvalid));
        assert_eq!(transport.timeout, Duration::from_secs(5));
    }
}
