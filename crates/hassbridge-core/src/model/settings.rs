// ── Device-side settings record ──
//
// What the device persists between runs. Loading and saving live in
// hassbridge-config; this is only the shape plus the defaults.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::{DEFAULT_FORCE, DEFAULT_PORT, DEFAULT_URL};
use crate::model::EntityId;

/// One remembered entity. `name` is the entity id requested at startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedEntity {
    pub name: String,
}

impl PersistedEntity {
    pub fn id(&self) -> EntityId {
        EntityId::new(self.name.clone())
    }
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceSettings {
    #[serde(default = "default_url")]
    pub url: String,
    #[serde(default = "default_port")]
    pub port: String,
    #[serde(default)]
    pub token: String,
    #[serde(default = "default_force")]
    pub force: bool,
    #[serde(default)]
    pub entities: Vec<PersistedEntity>,
}

fn default_url() -> String {
    DEFAULT_URL.into()
}
fn default_port() -> String {
    DEFAULT_PORT.into()
}
fn default_force() -> bool {
    DEFAULT_FORCE
}

impl Default for DeviceSettings {
    fn default() -> Self {
        Self {
            url: default_url(),
            port: default_port(),
            token: String::new(),
            force: default_force(),
            entities: Vec::new(),
        }
    }
}

impl fmt::Debug for DeviceSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceSettings")
            .field("url", &self.url)
            .field("port", &self.port)
            .field("token", &if self.token.is_empty() { "" } else { "****" })
            .field("force", &self.force)
            .field("entities", &self.entities)
            .finish()
    }
}

impl DeviceSettings {
    pub fn entity_ids(&self) -> Vec<EntityId> {
        self.entities.iter().map(PersistedEntity::id).collect()
    }

    pub fn remembers(&self, id: &EntityId) -> bool {
        self.entities.iter().any(|e| e.name == id.as_str())
    }

    /// Append `id` unless it is already remembered. Returns `true` if added.
    pub fn remember(&mut self, id: &EntityId) -> bool {
        if self.remembers(id) {
            return false;
        }
        self.entities.push(PersistedEntity {
            name: id.to_string(),
        });
        true
    }

    /// Drop `id` from the remembered list. Returns `true` if it was there.
    pub fn forget(&mut self, id: &EntityId) -> bool {
        let before = self.entities.len();
        self.entities.retain(|e| e.name != id.as_str());
        self.entities.len() != before
    }
}
