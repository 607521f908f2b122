// ── Device-side entity store ──
//
// Holds what the device knows: the ordered entity list, the settings it
// persists, and the last health-check outcome. Mutated only by the task
// that owns it; other tasks observe through `subscribe()`.

mod collection;

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, trace};

use crate::config::{DEFAULT_FORCE, DEFAULT_PORT, DEFAULT_URL};
use crate::model::{DeviceSettings, Entity, EntityId, EntityStatus};
use crate::protocol::{ApiStatus, Message};

use self::collection::EntityList;

/// Outcome of the last `api` message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Connectivity {
    #[default]
    Unknown,
    Available {
        location: String,
    },
    Unavailable {
        error: String,
    },
}

/// What [`EntityStore::apply`] did with a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreUpdate {
    Cleared,
    Added(EntityId),
    /// `add` for an id already present; the record was replaced.
    Updated(EntityId),
    Changed(EntityId),
    Connectivity,
    Settings,
    /// Unknown id, or a message only the gateway acts on.
    Ignored,
}

impl StoreUpdate {
    /// Whether the rendered list needs refreshing.
    pub fn needs_render(&self) -> bool {
        matches!(
            self,
            Self::Cleared | Self::Added(_) | Self::Updated(_) | Self::Changed(_)
        )
    }
}

pub struct EntityStore {
    entities: EntityList,
    settings: DeviceSettings,
    connectivity: Connectivity,
}

impl EntityStore {
    pub fn new(settings: DeviceSettings) -> Self {
        Self {
            entities: EntityList::new(),
            settings,
            connectivity: Connectivity::Unknown,
        }
    }

    // ── Event handling ───────────────────────────────────────────────

    /// Reflect one gateway message into the store.
    pub fn apply(&mut self, msg: &Message) -> StoreUpdate {
        let update = match msg {
            Message::Clear => {
                self.clear();
                StoreUpdate::Cleared
            }
            Message::Add { id, name, state } => {
                let entity = Entity::new(id.clone(), Some(name.clone()), state.clone());
                if self.add(entity) {
                    StoreUpdate::Added(id.clone())
                } else {
                    StoreUpdate::Updated(id.clone())
                }
            }
            Message::Change { id, state } => {
                if self.change(id, state) {
                    StoreUpdate::Changed(id.clone())
                } else {
                    StoreUpdate::Ignored
                }
            }
            Message::Api { .. } => {
                self.connectivity = match msg.api_status() {
                    Some(ApiStatus::Available { location }) => Connectivity::Available { location },
                    Some(ApiStatus::Unavailable { error }) => Connectivity::Unavailable { error },
                    None => Connectivity::Unknown,
                };
                StoreUpdate::Connectivity
            }
            Message::Url { value } => {
                self.settings.url = value.clone().unwrap_or_else(|| DEFAULT_URL.into());
                StoreUpdate::Settings
            }
            Message::Port { value } => {
                self.settings.port = value.clone().unwrap_or_else(|| DEFAULT_PORT.into());
                StoreUpdate::Settings
            }
            Message::Token { value } => {
                self.settings.token = value.clone().unwrap_or_default();
                StoreUpdate::Settings
            }
            Message::Force { value } => {
                self.settings.force = value.unwrap_or(DEFAULT_FORCE);
                StoreUpdate::Settings
            }
            Message::Fetch { .. } | Message::ChangeRequest { .. } | Message::Status => {
                StoreUpdate::Ignored
            }
        };

        trace!(key = msg.key(), ?update, "applied message");
        update
    }

    /// Insert or replace `entity` and remember its id. Returns `true` if new.
    pub fn add(&mut self, entity: Entity) -> bool {
        self.settings.remember(&entity.id);
        debug!(entity_id = %entity.id, state = %entity.state, "entity added");
        self.entities.upsert(entity)
    }

    /// Update the state of a known entity; unknown ids are ignored.
    pub fn change(&mut self, id: &EntityId, state: &str) -> bool {
        let known = self.entities.set_state(id, state);
        if !known {
            trace!(entity_id = %id, "change for unknown entity ignored");
        }
        known
    }

    /// Forget every entity, including the remembered id list.
    pub fn clear(&mut self) {
        self.entities.clear();
        self.settings.entities.clear();
        debug!("store cleared");
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn entities(&self) -> &[Entity] {
        self.entities.as_slice()
    }

    pub fn get(&self, id: &EntityId) -> Option<&Entity> {
        self.entities.get(id)
    }

    /// `None` while the entity is unknown.
    pub fn status(&self, id: &EntityId) -> Option<EntityStatus<'_>> {
        self.get(id).map(Entity::status)
    }

    pub fn categories(&self) -> &[String] {
        self.entities.categories()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn connectivity(&self) -> &Connectivity {
        &self.connectivity
    }

    pub fn settings(&self) -> &DeviceSettings {
        &self.settings
    }

    pub fn into_settings(self) -> DeviceSettings {
        self.settings
    }

    pub fn snapshot(&self) -> Arc<Vec<Entity>> {
        self.entities.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<Vec<Entity>>> {
        self.entities.subscribe()
    }
}

impl Default for EntityStore {
    fn default() -> Self {
        Self::new(DeviceSettings::default())
    }
}
