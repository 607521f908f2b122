// ── Entity record ──

use serde::{Deserialize, Serialize};

use super::entity_id::EntityId;

/// Uniform entity record shared by the gateway and the device store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub name: String,
    pub state: String,
    pub domain: String,
    pub executable: bool,
}

/// What the device shows for a known entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityStatus<'a> {
    Executable,
    Stateful(&'a str),
}

impl Entity {
    /// Build a record, deriving `domain` and `executable` from the id.
    /// An empty or missing name falls back to the id.
    pub fn new(id: EntityId, name: Option<String>, state: impl Into<String>) -> Self {
        let name = name
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| id.to_string());
        Self {
            domain: id.domain().to_owned(),
            executable: id.is_executable(),
            id,
            name,
            state: state.into(),
        }
    }

    /// Category label used for grouping on the device.
    pub fn category(&self) -> &str {
        &self.domain
    }

    pub fn status(&self) -> EntityStatus<'_> {
        if self.executable {
            EntityStatus::Executable
        } else {
            EntityStatus::Stateful(&self.state)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_defaults_to_id() {
        let entity = Entity::new("switch.lamp".into(), None, "off");
        assert_eq!(entity.name, "switch.lamp");
        assert_eq!(entity.domain, "switch");
        assert!(!entity.executable);
        assert_eq!(entity.status(), EntityStatus::Stateful("off"));
    }

    #[test]
    fn empty_name_defaults_to_id() {
        let entity = Entity::new("light.a".into(), Some(String::new()), "on");
        assert_eq!(entity.name, "light.a");
    }

    #[test]
    fn executable_status_ignores_state_value() {
        let entity = Entity::new("button.bell".into(), Some("Bell".into()), "2024-06-15");
        assert!(entity.executable);
        assert_eq!(entity.status(), EntityStatus::Executable);
        assert_eq!(entity.category(), "button");
    }
}
