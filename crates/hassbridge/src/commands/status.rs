//! `hassbridge status`

use serde::Serialize;

use hassbridge_core::Connectivity;

use crate::commands::util::{Bridge, Ctx};
use crate::error::CliError;
use crate::output;

#[derive(Debug, Serialize)]
struct StatusView {
    address: String,
    reachable: bool,
    location: Option<String>,
    force: bool,
}

pub async fn handle(bridge: &mut Bridge, ctx: &Ctx) -> Result<(), CliError> {
    let spinner = ctx.spinner("checking server");
    let result = bridge.gateway.fetch_server_status().await;
    if let Some(bar) = spinner {
        bar.finish_and_clear();
    }
    bridge.drain();
    result.map_err(|e| ctx.core_err(e))?;

    let location = match bridge.store.connectivity() {
        Connectivity::Available { location } => Some(location.clone()),
        Connectivity::Unknown | Connectivity::Unavailable { .. } => None,
    };
    let view = StatusView {
        address: bridge.gateway.address(),
        reachable: location.is_some(),
        location,
        force: bridge.gateway.config().force,
    };

    let color = ctx.color;
    let rendered = output::render_single(
        ctx.format,
        &view,
        |v| {
            let mark = if v.reachable {
                output::paint_ok("●", color)
            } else {
                output::paint_err("●", color)
            };
            format!(
                "{mark} {}  ({})",
                v.location.as_deref().unwrap_or("unreachable"),
                v.address
            )
        },
        |v| v.location.clone().unwrap_or_default(),
    );
    ctx.print(&rendered);
    Ok(())
}
