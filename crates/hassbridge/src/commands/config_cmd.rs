//! Config subcommand handlers.

use std::path::Path;

use dialoguer::{Confirm, Input, Select};
use secrecy::SecretString;

use hassbridge_config::Config;
use hassbridge_core::{DeviceSettings, EntityId};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config;
use crate::error::CliError;
use crate::output;

// ── Helpers ─────────────────────────────────────────────────────────

fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

fn save(cfg: &Config, path: &Path) -> Result<(), CliError> {
    hassbridge_config::save_config_to(cfg, path)?;
    Ok(())
}

/// Copy of `cfg` safe to print.
fn masked(cfg: &Config) -> Config {
    let mut shown = cfg.clone();
    if shown.token.as_deref().is_some_and(|t| !t.is_empty()) {
        shown.token = Some("****".into());
    }
    shown
}

/// Apply a remembered-list edit through the device settings shape.
fn edit_entities(cfg: &mut Config, edit: impl FnOnce(&mut DeviceSettings) -> bool) -> bool {
    let mut settings = cfg.device_settings(None);
    let changed = edit(&mut settings);
    cfg.absorb(&settings);
    changed
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let path = config::config_path(global);

    match args.command {
        ConfigCommand::Init => init(&path),

        ConfigCommand::Show => {
            let cfg = config::load(global)?;
            let shown = masked(&cfg);
            let rendered = output::render_single(
                config::output_format(global, &cfg),
                &shown,
                |c| toml::to_string_pretty(c).unwrap_or_else(|e| format!("{c:#?}\n({e})")),
                |_| path.display().to_string(),
            );
            output::print_output(&rendered, global.quiet);
            Ok(())
        }

        ConfigCommand::Set { key, value } => {
            let mut cfg = config::load(global)?;
            cfg.set_field(&key, &value)?;
            save(&cfg, &path)?;
            if !global.quiet {
                eprintln!("✓ Set {key}");
            }
            Ok(())
        }

        ConfigCommand::Add { entity_id } => {
            let id = EntityId::new(entity_id.trim());
            let mut cfg = config::load(global)?;
            if edit_entities(&mut cfg, |s| s.remember(&id)) {
                save(&cfg, &path)?;
                if !global.quiet {
                    eprintln!("✓ Added {id}");
                }
            } else if !global.quiet {
                eprintln!("{id} is already in the list");
            }
            Ok(())
        }

        ConfigCommand::Remove { entity_id } => {
            let id = EntityId::new(entity_id.trim());
            let mut cfg = config::load(global)?;
            if !edit_entities(&mut cfg, |s| s.forget(&id)) {
                return Err(CliError::NotFound {
                    identifier: id.to_string(),
                });
            }
            save(&cfg, &path)?;
            if !global.quiet {
                eprintln!("✓ Removed {id}");
            }
            Ok(())
        }

        ConfigCommand::Path => {
            println!("{}", path.display());
            Ok(())
        }
    }
}

// ── Init: interactive wizard ────────────────────────────────────────

fn init(path: &Path) -> Result<(), CliError> {
    eprintln!("hassbridge configuration wizard");
    eprintln!("   Config path: {}\n", path.display());

    let mut cfg = hassbridge_config::load_config_from(path).unwrap_or_default();

    cfg.url = Input::new()
        .with_prompt("Server address")
        .default(cfg.url.clone())
        .interact_text()
        .map_err(prompt_err)?;

    cfg.port = Input::<u16>::new()
        .with_prompt("Port")
        .default(cfg.port.parse().unwrap_or(8123))
        .interact_text()
        .map_err(prompt_err)?
        .to_string();

    let token = rpassword::prompt_password("Long-lived access token: ").map_err(prompt_err)?;
    if token.is_empty() {
        return Err(CliError::Validation {
            field: "token".into(),
            reason: "token cannot be empty".into(),
        });
    }

    let store_choices = &[
        "Store in system keyring (recommended)",
        "Save to config file (plaintext)",
    ];
    let store_selection = Select::new()
        .with_prompt("Where to store the token?")
        .items(store_choices)
        .default(0)
        .interact()
        .map_err(prompt_err)?;

    if store_selection == 0 {
        hassbridge_config::store_token_in_keyring(&SecretString::from(token))?;
        cfg.token = None;
        eprintln!("   ✓ Token stored in system keyring");
    } else {
        cfg.token = Some(token);
    }

    cfg.force = Confirm::new()
        .with_prompt("Assume actions succeed instead of reading state back?")
        .default(cfg.force)
        .interact()
        .map_err(prompt_err)?;

    let entities: String = Input::new()
        .with_prompt("Entities to list (comma separated, blank to skip)")
        .allow_empty(true)
        .interact_text()
        .map_err(prompt_err)?;
    edit_entities(&mut cfg, |s| {
        entities
            .split(',')
            .map(str::trim)
            .filter(|raw| !raw.is_empty())
            .fold(false, |added, raw| s.remember(&EntityId::new(raw)) || added)
    });

    save(&cfg, path)?;

    eprintln!("\n✓ Configuration written to {}", path.display());
    eprintln!("\n  Test it: hassbridge status");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn masked_hides_plaintext_token() {
        let cfg = Config {
            token: Some("abc.def".into()),
            ..Config::default()
        };
        let shown = masked(&cfg);
        assert_eq!(shown.token.as_deref(), Some("****"));
        assert_eq!(masked(&Config::default()).token, None);
    }

    #[test]
    fn edit_entities_keeps_token_and_order() {
        let mut cfg = Config {
            token: Some("t".into()),
            ..Config::default()
        };
        assert!(edit_entities(&mut cfg, |s| s.remember(&"light.a".into())));
        assert!(edit_entities(&mut cfg, |s| s.remember(&"switch.b".into())));
        assert!(!edit_entities(&mut cfg, |s| s.remember(&"light.a".into())));
        assert!(edit_entities(&mut cfg, |s| s.forget(&"light.a".into())));

        let names: Vec<_> = cfg.entities.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["switch.b"]);
        assert_eq!(cfg.token.as_deref(), Some("t"));
    }
}
