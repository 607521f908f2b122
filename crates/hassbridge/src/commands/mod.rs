//! Command dispatch: CLI args -> gateway operations -> output formatting.

pub mod config_cmd;
pub mod entity;
pub mod list;
pub mod status;
pub mod util;

use hassbridge_config::Config;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

use self::util::{Bridge, Ctx};

/// Dispatch a server-bound command to its handler.
pub async fn dispatch(cmd: Command, cfg: &Config, global: &GlobalOpts) -> Result<(), CliError> {
    let ctx = Ctx::new(global, cfg);

    match cmd {
        Command::Status => status::handle(&mut Bridge::connect(global, cfg)?, &ctx).await,
        Command::Get(args) => entity::get(&mut Bridge::connect(global, cfg)?, args, &ctx).await,
        Command::Change(args) => {
            entity::change(&mut Bridge::connect(global, cfg)?, args, &ctx).await
        }
        Command::List => list::list(&mut Bridge::connect(global, cfg)?, &ctx).await,
        Command::Watch(args) => list::watch(args, global, cfg, &ctx).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => Ok(()),
    }
}
