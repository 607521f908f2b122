//! `GlobalOpts`-aware wrappers over hassbridge-config.
//!
//! Flags beat env vars beat the config file beat built-in defaults.

use std::path::PathBuf;
use std::time::Duration;

use clap::ValueEnum;
use secrecy::SecretString;

use hassbridge_config::{Config, ConfigError};
use hassbridge_core::{DeviceSettings, TlsMode, TransportConfig};

use crate::cli::{ColorMode, GlobalOpts, OutputFormat};
use crate::error::CliError;

pub fn config_path(global: &GlobalOpts) -> PathBuf {
    global
        .config
        .clone()
        .unwrap_or_else(hassbridge_config::config_path)
}

pub fn load(global: &GlobalOpts) -> Result<Config, CliError> {
    Ok(hassbridge_config::load_config_from(&config_path(global))?)
}

pub fn output_format(global: &GlobalOpts, cfg: &Config) -> OutputFormat {
    global
        .output
        .or_else(|| OutputFormat::from_str(&cfg.defaults.output, true).ok())
        .unwrap_or(OutputFormat::Table)
}

pub fn color_mode(global: &GlobalOpts, cfg: &Config) -> ColorMode {
    global
        .color
        .or_else(|| ColorMode::from_str(&cfg.defaults.color, true).ok())
        .unwrap_or(ColorMode::Auto)
}

pub fn timeout_secs(global: &GlobalOpts, cfg: &Config) -> u64 {
    global.timeout.unwrap_or(cfg.defaults.timeout)
}

pub fn transport(global: &GlobalOpts, cfg: &Config) -> TransportConfig {
    let mut transport = cfg
        .transport()
        .with_timeout(Duration::from_secs(timeout_secs(global, cfg)));
    if global.insecure {
        transport.tls = TlsMode::DangerAcceptInvalid;
    }
    transport
}

/// Token from `--token` / `HASSBRIDGE_TOKEN`, else keyring, else the file.
pub fn token(global: &GlobalOpts, cfg: &Config) -> Result<SecretString, CliError> {
    if let Some(ref token) = global.token {
        if !token.is_empty() {
            return Ok(SecretString::from(token.clone()));
        }
    }
    match hassbridge_config::resolve_token(cfg) {
        Ok(token) => Ok(token),
        Err(ConfigError::NoToken) => Err(CliError::NoToken),
        Err(other) => Err(other.into()),
    }
}

/// Device settings with every command-line override applied.
pub fn device_settings(global: &GlobalOpts, cfg: &Config) -> Result<DeviceSettings, CliError> {
    let token = token(global, cfg)?;
    let mut settings = cfg.device_settings(Some(&token));
    if let Some(ref url) = global.url {
        settings.url.clone_from(url);
    }
    if let Some(ref port) = global.port {
        settings.port.clone_from(port);
    }
    if global.no_force {
        settings.force = false;
    }
    Ok(settings)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use clap::Parser;

    use crate::cli::Cli;

    fn global(args: &[&str]) -> GlobalOpts {
        let mut argv = vec!["hassbridge"];
        argv.extend_from_slice(args);
        argv.push("status");
        Cli::try_parse_from(argv).unwrap().global
    }

    #[test]
    fn flags_override_file_values() {
        let cfg = Config {
            token: Some("file-token".into()),
            ..Config::default()
        };
        let g = global(&["--url", "ha.lan", "--port", "80", "--token", "flag", "--no-force"]);
        let settings = device_settings(&g, &cfg).unwrap();
        assert_eq!(settings.url, "ha.lan");
        assert_eq!(settings.port, "80");
        assert_eq!(settings.token, "flag");
        assert!(!settings.force);
    }

    #[test]
    fn output_falls_back_to_file_default() {
        let mut cfg = Config::default();
        cfg.defaults.output = "yaml".into();
        assert_eq!(output_format(&global(&[]), &cfg), OutputFormat::Yaml);
        assert_eq!(output_format(&global(&["-o", "plain"]), &cfg), OutputFormat::Plain);

        cfg.defaults.output = "nonsense".into();
        assert_eq!(output_format(&global(&[]), &cfg), OutputFormat::Table);
    }

    #[test]
    fn timeout_flag_reaches_transport() {
        let cfg = Config::default();
        let t = transport(&global(&["--timeout", "3", "-k"]), &cfg);
        assert_eq!(t.timeout, Duration::from_secs(3));
        assert!(matches!(t.tls, TlsMode::DangerAcceptInvalid));
    }
}
