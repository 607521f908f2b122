// ── Gateway message loop ──
//
// Reads device requests off the host end of the channel and drives the
// gateway. Configuration messages are applied inline and acknowledged by
// echoing the effective value; remote operations run as spawned tasks so
// one slow server response never holds up the next request.

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::Gateway;
use crate::channel::{ChannelEvent, Endpoint};
use crate::protocol::Message;

pub struct GatewayService {
    gateway: Arc<Gateway>,
    endpoint: Endpoint,
    tasks: JoinSet<()>,
}

impl GatewayService {
    pub fn new(gateway: Arc<Gateway>, endpoint: Endpoint) -> Self {
        Self {
            gateway,
            endpoint,
            tasks: JoinSet::new(),
        }
    }

    /// Serve until the device closes the channel or `cancel` fires.
    ///
    /// On close, requests already in flight are allowed to finish; on
    /// cancellation they are aborted.
    pub async fn run(mut self, cancel: CancellationToken) {
        info!("gateway service started");

        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    debug!(in_flight = self.tasks.len(), "gateway service cancelled");
                    self.tasks.shutdown().await;
                    break;
                }
                Some(joined) = self.tasks.join_next(), if !self.tasks.is_empty() => {
                    if let Err(e) = joined {
                        warn!(error = %e, "gateway task ended abnormally");
                    }
                }
                event = self.endpoint.recv() => match event {
                    ChannelEvent::Open => self.spawn_status(),
                    ChannelEvent::Message(msg) => self.dispatch(msg),
                    ChannelEvent::Close => {
                        debug!(in_flight = self.tasks.len(), "device closed channel");
                        while self.tasks.join_next().await.is_some() {}
                        break;
                    }
                },
            }
        }

        info!("gateway service stopped");
    }

    fn dispatch(&mut self, msg: Message) {
        debug!(key = msg.key(), "device request");
        let gw = &self.gateway;

        match msg {
            Message::Url { value } => {
                gw.set_url(value);
                self.ack(Message::Url {
                    value: Some(gw.config().url.clone()),
                });
            }
            Message::Port { value } => {
                gw.set_port(value);
                self.ack(Message::Port {
                    value: Some(gw.config().port.clone()),
                });
            }
            Message::Token { value } => {
                gw.set_token(value.map(SecretString::from));
                self.ack(Message::Token {
                    value: Some(gw.config().token.expose_secret().to_owned()),
                });
            }
            Message::Force { value } => {
                gw.set_force(value);
                self.ack(Message::Force {
                    value: Some(gw.config().force),
                });
            }
            Message::Clear => self.ack(Message::Clear),
            Message::Status => self.spawn_status(),
            Message::Fetch { id } => {
                let gw = Arc::clone(gw);
                self.tasks.spawn(async move {
                    let _ = gw.fetch_entity(&id).await;
                });
            }
            Message::ChangeRequest { id, action } => {
                let gw = Arc::clone(gw);
                self.tasks.spawn(async move {
                    let _ = gw.change_entity(&id, &action).await;
                });
            }
            Message::Add { .. } | Message::Change { .. } | Message::Api { .. } => {
                debug!("ignoring device-bound message");
            }
        }
    }

    fn spawn_status(&mut self) {
        let gw = Arc::clone(&self.gateway);
        self.tasks.spawn(async move {
            let _ = gw.fetch_server_status().await;
        });
    }

    fn ack(&self, msg: Message) {
        self.gateway.events.emit(&msg);
    }
}
