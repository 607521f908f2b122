// ── Entity gateway ──
//
// Host-side half of the bridge. Holds the server configuration, fetches
// entity state, and turns requested actions into service calls. Results
// never come back as return values to the device; they travel as
// protocol messages through the `events` sender.
//
// Every remote operation passes through `guarded`: it snapshots the
// configuration, does nothing when unconfigured, and logs failures.

mod service;

pub use service::GatewayService;

use std::future::Future;
use std::sync::Arc;

use arc_swap::ArcSwap;
use secrecy::SecretString;
use tracing::{debug, info, warn};

use hassbridge_api::{HassClient, HttpClient, TransportConfig};

use crate::channel::Sender;
use crate::config::{GatewayConfig, ResultPolicy};
use crate::convert;
use crate::error::CoreError;
use crate::model::tables::{forced_state, resolve_action, service_group};
use crate::model::{Entity, EntityId};
use crate::protocol::Message;

/// Everything one guarded operation needs, captured from a single
/// configuration snapshot.
struct Session {
    client: HassClient,
    policy: ResultPolicy,
    events: Sender,
}

pub struct Gateway {
    config: ArcSwap<GatewayConfig>,
    http: HttpClient,
    events: Sender,
}

impl Gateway {
    /// Build a gateway with default (unconfigured) settings.
    pub fn new(transport: &TransportConfig, events: Sender) -> Result<Self, CoreError> {
        let http = transport.build_client()?;
        Ok(Self::with_client(http, events))
    }

    /// Build around an existing HTTP connection pool.
    pub fn with_client(http: HttpClient, events: Sender) -> Self {
        Self {
            config: ArcSwap::from_pointee(GatewayConfig::default()),
            http,
            events,
        }
    }

    // ── Configuration ────────────────────────────────────────────────

    /// Replace the whole configuration. `None` fields take their defaults.
    pub fn configure(
        &self,
        url: Option<String>,
        port: Option<String>,
        token: Option<SecretString>,
        force: Option<bool>,
    ) {
        self.replace(GatewayConfig::new(url, port, token, force));
    }

    pub fn set_url(&self, url: Option<String>) {
        self.config.rcu(|c| c.with_url(url.clone()));
    }

    pub fn set_port(&self, port: Option<String>) {
        self.config.rcu(|c| c.with_port(port.clone()));
    }

    pub fn set_token(&self, token: Option<SecretString>) {
        self.config.rcu(|c| c.with_token(token.clone()));
    }

    pub fn set_force(&self, force: Option<bool>) {
        self.config.rcu(|c| c.with_force(force));
    }

    pub fn replace(&self, config: GatewayConfig) {
        debug!(?config, "gateway configuration replaced");
        self.config.store(Arc::new(config));
    }

    /// Current configuration snapshot.
    pub fn config(&self) -> Arc<GatewayConfig> {
        self.config.load_full()
    }

    pub fn is_configured(&self) -> bool {
        self.config.load().is_configured()
    }

    pub fn address(&self) -> String {
        self.config.load().address()
    }

    pub fn is_executable(id: &EntityId) -> bool {
        id.is_executable()
    }

    // ── Remote operations ────────────────────────────────────────────

    /// Fetch one entity and emit `add`. Emits nothing on failure.
    pub async fn fetch_entity(&self, id: &EntityId) -> Result<(), CoreError> {
        let id = id.clone();
        self.guarded("fetch_entity", |s| async move {
            let raw = s.client.get_state(id.as_str()).await.map_err(|e| {
                if e.is_not_found() {
                    CoreError::EntityNotFound {
                        identifier: id.to_string(),
                    }
                } else {
                    CoreError::from(e)
                }
            })?;
            let entity = Entity::from(raw);
            debug!(entity_id = %entity.id, state = %entity.state, "fetched entity");
            s.events.emit(&Message::add(&entity));
            Ok(())
        })
        .await
    }

    /// Health check. Always emits `api` once configured: the location
    /// name on success, otherwise a description of the failure.
    pub async fn fetch_server_status(&self) -> Result<(), CoreError> {
        self.guarded("fetch_server_status", |s| async move {
            match s.client.get_config().await {
                Ok(config) => {
                    info!(location = %config.location_name, "server reachable");
                    s.events.emit(&Message::api_available(config.location_name));
                    Ok(())
                }
                Err(e) => {
                    let err = CoreError::from(e);
                    s.events.emit(&Message::api_unavailable(err.to_string()));
                    Err(err)
                }
            }
        })
        .await
    }

    /// Ask the server to apply `action` to `id`, then report the new
    /// state according to the force / read-back policy.
    pub async fn change_entity(&self, id: &EntityId, action: &str) -> Result<(), CoreError> {
        let id = id.clone();
        let requested = action.to_owned();
        self.guarded("change_entity", |s| async move {
            let domain = id.domain();
            let group = service_group(domain).ok_or_else(|| CoreError::UnknownDomain {
                domain: domain.to_owned(),
                entity_id: id.to_string(),
            })?;
            let action = resolve_action(domain, &requested);

            let call = s.client.call_service(group, action, id.as_str()).await?;
            debug!(entity_id = %id, group, action, status = call.status, "service call accepted");

            if id.is_executable() {
                return Ok(());
            }

            match s.policy {
                ResultPolicy::Force => {
                    s.events.emit(&Message::change(&id, forced_state(action)));
                }
                ResultPolicy::ReadBack => {
                    let changed = call.changed_states()?;
                    for state in convert::states_for(&changed, &id) {
                        s.events.emit(&Message::change(&id, state));
                    }
                }
            }
            Ok(())
        })
        .await
    }

    // ── Guard ────────────────────────────────────────────────────────

    async fn guarded<F, Fut>(&self, operation: &'static str, op: F) -> Result<(), CoreError>
    where
        F: FnOnce(Session) -> Fut,
        Fut: Future<Output = Result<(), CoreError>>,
    {
        let config = self.config.load_full();
        if !config.is_configured() {
            debug!(operation, "gateway not configured, skipping");
            return Err(CoreError::NotConfigured);
        }

        let session = Session {
            client: HassClient::with_client(
                self.http.clone(),
                config.address(),
                config.token.clone(),
            ),
            policy: config.policy(),
            events: self.events.clone(),
        };

        let result = op(session).await;
        if let Err(ref e) = result {
            warn!(operation, address = %config.address(), error = %e, "gateway operation failed");
        }
        result
    }
}
