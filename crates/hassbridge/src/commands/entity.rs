//! `hassbridge get` and `hassbridge change`

use serde::Serialize;
use tracing::warn;

use hassbridge_core::{EntityId, Message, Renderer, render};

use crate::cli::{ChangeArgs, GetArgs};
use crate::commands::util::{Bridge, Ctx, parse_ids};
use crate::error::CliError;
use crate::output;

// ── Get ─────────────────────────────────────────────────────────────

pub async fn get(bridge: &mut Bridge, args: GetArgs, ctx: &Ctx) -> Result<(), CliError> {
    let ids = parse_ids(&args.entity_ids);

    let spinner = ctx.spinner("fetching entities");
    let failures = bridge.fetch_all(&ids).await;
    if let Some(bar) = spinner {
        bar.finish_and_clear();
    }

    let entities = bridge.ordered(&ids);
    if !entities.is_empty() {
        ctx.print(&output::render_rows(ctx.format, &render::rows(&entities)));
    }

    match failures.into_iter().next() {
        Some((_, err)) => Err(ctx.core_err(err)),
        None => Ok(()),
    }
}

// ── Change ──────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ChangeView {
    entity_id: EntityId,
    action: String,
    executable: bool,
    /// `None` when the server confirmed the call but reported no state.
    state: Option<String>,
}

pub async fn change(bridge: &mut Bridge, args: ChangeArgs, ctx: &Ctx) -> Result<(), CliError> {
    let id = EntityId::new(args.entity_id.trim());

    let action = match args.action {
        Some(action) => action,
        None => toggle_action(bridge, &id, ctx).await?,
    };

    bridge
        .gateway
        .change_entity(&id, &action)
        .await
        .map_err(|e| ctx.core_err(e))?;

    let state = bridge
        .drain()
        .into_iter()
        .filter_map(|msg| match msg {
            Message::Change { id: changed, state } if changed == id => Some(state),
            _ => None,
        })
        .last();

    let view = ChangeView {
        executable: id.is_executable(),
        entity_id: id,
        action,
        state,
    };

    let color = ctx.color;
    let rendered = output::render_single(
        ctx.format,
        &view,
        |v| match (&v.state, v.executable) {
            (_, true) => format!("{} {}", v.entity_id, output::paint_ok("triggered", color)),
            (Some(state), false) => {
                format!("{} → {}", v.entity_id, output::paint_state(state, color))
            }
            (None, false) => format!("{} {}: no state reported", v.entity_id, v.action),
        },
        |v| v.state.clone().unwrap_or_default(),
    );
    ctx.print(&rendered);
    Ok(())
}

/// Pick the action a tap on this entity would send.
async fn toggle_action(bridge: &mut Bridge, id: &EntityId, ctx: &Ctx) -> Result<String, CliError> {
    if let Some((_, err)) = bridge.fetch_all(std::slice::from_ref(id)).await.into_iter().next() {
        return Err(ctx.core_err(err));
    }
    let Some(entity) = bridge.store.get(id) else {
        warn!(entity_id = %id, "fetch succeeded but entity never arrived");
        return Err(CliError::NotFound {
            identifier: id.to_string(),
        });
    };
    match Renderer::action_for(entity) {
        Message::ChangeRequest { action, .. } => Ok(action),
        other => Err(CliError::Api {
            message: format!("unexpected request '{}'", other.key()),
        }),
    }
}
