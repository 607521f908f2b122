//! Shared helpers for command handlers.

use std::io::IsTerminal;
use std::time::Duration;

use futures_util::future::join_all;
use indicatif::{ProgressBar, ProgressStyle};

use hassbridge_config::Config;
use hassbridge_core::channel::{self, ChannelEvent, Endpoint};
use hassbridge_core::{
    CoreError, DeviceSettings, Entity, EntityId, EntityStore, Gateway, GatewayConfig, Message,
};

use crate::cli::{GlobalOpts, OutputFormat};
use crate::config;
use crate::error::CliError;
use crate::output;

/// Resolved presentation settings for one invocation.
#[derive(Debug, Clone, Copy)]
pub struct Ctx {
    pub format: OutputFormat,
    pub color: bool,
    pub quiet: bool,
    pub timeout_secs: u64,
}

impl Ctx {
    pub fn new(global: &GlobalOpts, cfg: &Config) -> Self {
        Self {
            format: config::output_format(global, cfg),
            color: output::should_color(config::color_mode(global, cfg)),
            quiet: global.quiet,
            timeout_secs: config::timeout_secs(global, cfg),
        }
    }

    pub fn print(&self, rendered: &str) {
        output::print_output(rendered, self.quiet);
    }

    pub fn core_err(&self, err: CoreError) -> CliError {
        CliError::from_core(err, self.timeout_secs)
    }

    /// Spinner on stderr for interactive table output.
    pub fn spinner(&self, message: &str) -> Option<ProgressBar> {
        if self.quiet || self.format != OutputFormat::Table || !std::io::stderr().is_terminal() {
            return None;
        }
        let bar = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
            bar.set_style(style);
        }
        bar.set_message(message.to_owned());
        bar.enable_steady_tick(Duration::from_millis(80));
        Some(bar)
    }
}

/// Gateway and store joined in-process by a channel pair.
///
/// Gateway operations emit onto the device end; `drain` folds whatever
/// arrived into the store and hands back the raw messages.
pub struct Bridge {
    pub gateway: Gateway,
    pub store: EntityStore,
    device: Endpoint,
    _host: Endpoint,
}

impl Bridge {
    pub fn connect(global: &GlobalOpts, cfg: &Config) -> Result<Self, CliError> {
        let settings = config::device_settings(global, cfg)?;
        let transport = config::transport(global, cfg);
        Self::with_settings(settings, &transport)
    }

    pub fn with_settings(
        settings: DeviceSettings,
        transport: &hassbridge_core::TransportConfig,
    ) -> Result<Self, CliError> {
        let (host, device) = channel::pair();
        let gateway = Gateway::new(transport, host.sender())?;
        gateway.replace(GatewayConfig::from(&settings));
        tracing::debug!(address = %gateway.address(), "bridge ready");

        Ok(Self {
            gateway,
            store: EntityStore::new(settings),
            device,
            _host: host,
        })
    }

    pub fn drain(&mut self) -> Vec<Message> {
        let mut out = Vec::new();
        while let Some(event) = self.device.try_recv() {
            match event {
                ChannelEvent::Message(msg) => {
                    self.store.apply(&msg);
                    out.push(msg);
                }
                ChannelEvent::Open => {}
                ChannelEvent::Close => break,
            }
        }
        out
    }

    /// Fetch `ids` concurrently and return the ones that failed.
    pub async fn fetch_all(&mut self, ids: &[EntityId]) -> Vec<(EntityId, CoreError)> {
        let gateway = &self.gateway;
        let results = join_all(ids.iter().map(|id| async move {
            (id.clone(), gateway.fetch_entity(id).await)
        }))
        .await;
        self.drain();

        results
            .into_iter()
            .filter_map(|(id, result)| result.err().map(|e| (id, e)))
            .collect()
    }

    /// Known entities in `ids` order, skipping any that never arrived.
    pub fn ordered(&self, ids: &[EntityId]) -> Vec<Entity> {
        ids.iter()
            .filter_map(|id| self.store.get(id).cloned())
            .collect()
    }
}

pub fn parse_ids(raw: &[String]) -> Vec<EntityId> {
    raw.iter().map(|s| EntityId::new(s.trim())).collect()
}
