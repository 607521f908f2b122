// ── Device driver ──
//
// Device-side half of the bridge. On open it pushes its settings to the
// gateway and asks for every remembered entity, then folds incoming
// messages into its store until the channel closes or it is cancelled.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::channel::{ChannelEvent, Endpoint, Sender};
use crate::model::{DeviceSettings, Entity};
use crate::protocol::Message;
use crate::store::EntityStore;

#[derive(Debug, Clone)]
pub struct DeviceOptions {
    /// Re-request every remembered entity at this period.
    pub refresh_interval: Option<Duration>,
    /// Push url, port, token and force to the gateway on open.
    pub announce: bool,
}

impl Default for DeviceOptions {
    fn default() -> Self {
        Self {
            refresh_interval: None,
            announce: true,
        }
    }
}

pub struct Device {
    store: EntityStore,
    endpoint: Endpoint,
}

impl Device {
    pub fn new(settings: DeviceSettings, endpoint: Endpoint) -> Self {
        Self {
            store: EntityStore::new(settings),
            endpoint,
        }
    }

    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    /// Handle for sending requests (e.g. a row tap) while `run` is active.
    pub fn sender(&self) -> Sender {
        self.endpoint.sender()
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<Vec<Entity>>> {
        self.store.subscribe()
    }

    /// Drive the device until the gateway closes the channel or `cancel`
    /// fires. Returns the final store: entities, connectivity and the
    /// settings as last acknowledged by the gateway.
    pub async fn run(mut self, options: DeviceOptions, cancel: CancellationToken) -> EntityStore {
        let mut ticker = options.refresh_interval.map(|period| {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            interval
        });

        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                event = self.endpoint.recv() => match event {
                    ChannelEvent::Open => {
                        let requests = sync_requests(self.store.settings(), options.announce);
                        info!(requests = requests.len(), "channel open, syncing");
                        self.send_all(&requests);
                    }
                    ChannelEvent::Message(msg) => {
                        self.store.apply(&msg);
                    }
                    ChannelEvent::Close => {
                        debug!("gateway closed channel");
                        break;
                    }
                },
                () = next_tick(ticker.as_mut()) => {
                    let requests = fetch_requests(self.store.settings());
                    debug!(requests = requests.len(), "periodic refresh");
                    self.send_all(&requests);
                }
            }
        }

        let Self { store, endpoint } = self;
        endpoint.close();
        store
    }

    fn send_all(&self, requests: &[Message]) {
        let sender = self.endpoint.sender();
        for msg in requests {
            sender.emit(msg);
        }
    }
}

async fn next_tick(ticker: Option<&mut Interval>) {
    match ticker {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending().await,
    }
}

/// Messages sent when the channel opens: configuration (when announcing),
/// a health check, then one fetch per remembered entity.
pub fn sync_requests(settings: &DeviceSettings, announce: bool) -> Vec<Message> {
    let mut out = Vec::with_capacity(settings.entities.len() + 5);
    if announce {
        out.push(Message::Url {
            value: Some(settings.url.clone()),
        });
        out.push(Message::Port {
            value: Some(settings.port.clone()),
        });
        out.push(Message::Token {
            value: Some(settings.token.clone()),
        });
        out.push(Message::Force {
            value: Some(settings.force),
        });
    }
    out.push(Message::Status);
    out.extend(fetch_requests(settings));
    out
}

fn fetch_requests(settings: &DeviceSettings) -> Vec<Message> {
    settings
        .entity_ids()
        .into_iter()
        .map(|id| Message::Fetch { id })
        .collect()
}
