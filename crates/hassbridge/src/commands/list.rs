//! `hassbridge list` and `hassbridge watch`

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use hassbridge_config::Config;
use hassbridge_core::channel;
use hassbridge_core::{
    Device, DeviceOptions, Entity, EntityId, Gateway, GatewayService, Row, render,
};

use crate::cli::{GlobalOpts, OutputFormat, WatchArgs};
use crate::commands::util::{Bridge, Ctx};
use crate::config;
use crate::error::CliError;
use crate::output;

// ── List ────────────────────────────────────────────────────────────

pub async fn list(bridge: &mut Bridge, ctx: &Ctx) -> Result<(), CliError> {
    let ids = bridge.store.settings().entity_ids();
    if ids.is_empty() {
        return Err(CliError::NoEntities);
    }

    let spinner = ctx.spinner(&format!("fetching {} entities", ids.len()));
    let failures = bridge.fetch_all(&ids).await;
    if let Some(bar) = spinner {
        bar.finish_and_clear();
    }

    let entities = bridge.ordered(&ids);
    if entities.is_empty() {
        if let Some((_, err)) = failures.into_iter().next() {
            return Err(ctx.core_err(err));
        }
    } else {
        for (id, err) in &failures {
            debug!(entity_id = %id, error = %err, "left out of list");
        }
    }

    ctx.print(&output::render_rows(ctx.format, &render::rows(&entities)));
    Ok(())
}

// ── Watch ───────────────────────────────────────────────────────────

/// Run the full device loop against a gateway service until Ctrl-C,
/// reprinting the list whenever it changes.
pub async fn watch(
    args: WatchArgs,
    global: &GlobalOpts,
    cfg: &Config,
    ctx: &Ctx,
) -> Result<(), CliError> {
    let settings = config::device_settings(global, cfg)?;
    if settings.entities.is_empty() {
        return Err(CliError::NoEntities);
    }
    let order = settings.entity_ids();
    let interval = args
        .interval
        .map_or_else(|| cfg.refresh_interval(), |secs| Duration::from_secs(secs.max(1)));

    let (host, device_end) = channel::pair();
    let gateway = Arc::new(Gateway::new(&config::transport(global, cfg), host.sender())?);
    let service = GatewayService::new(gateway, host);
    let device = Device::new(settings, device_end);
    let mut snapshots = device.subscribe();

    let cancel = CancellationToken::new();
    let service_task = tokio::spawn(service.run(cancel.child_token()));
    let device_task = tokio::spawn(device.run(
        DeviceOptions {
            refresh_interval: Some(interval),
            announce: true,
        },
        cancel.clone(),
    ));
    info!(interval_secs = interval.as_secs(), "watching");

    let mut last: Option<Vec<Row>> = None;
    loop {
        tokio::select! {
            biased;
            _ = tokio::signal::ctrl_c() => break,
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = snapshots.borrow_and_update().clone();
                let rows = render::rows(&in_order(&snapshot, &order));
                if last.as_ref() != Some(&rows) {
                    print_frame(ctx, &rows);
                    last = Some(rows);
                }
            }
        }
    }

    cancel.cancel();
    let store = device_task
        .await
        .map_err(|e| CliError::Api { message: format!("device task failed: {e}") })?;
    let _ = service_task.await;
    debug!(
        entities = store.len(),
        connectivity = ?store.connectivity(),
        "watch stopped"
    );
    Ok(())
}

fn in_order(snapshot: &[Entity], order: &[EntityId]) -> Vec<Entity> {
    order
        .iter()
        .filter_map(|id| snapshot.iter().find(|e| &e.id == id).cloned())
        .collect()
}

fn print_frame(ctx: &Ctx, rows: &[Row]) {
    if ctx.format == OutputFormat::Table && !ctx.quiet {
        let stamp = chrono::Local::now().format("%H:%M:%S");
        ctx.print(&format!("\n{stamp}"));
    }
    ctx.print(&output::render_rows(ctx.format, rows));
}
