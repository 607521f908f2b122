// ── Gateway ⇄ device message protocol ──
//
// Flat JSON objects discriminated by `key`. Each key has exactly one
// payload shape; the `force` value is always a JSON boolean.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::model::{Entity, EntityId};

/// `value` carried by a successful health check.
pub const API_OK: &str = "ok";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, strum::IntoStaticStr)]
#[serde(tag = "key", rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Message {
    // ── Gateway → device ─────────────────────────────────────────────
    /// A fetched entity.
    Add {
        id: EntityId,
        name: String,
        state: String,
    },
    /// New state for an entity the device already knows.
    Change { id: EntityId, state: String },
    /// Health-check result: `value == "ok"` plus `name`, or an error text.
    Api {
        value: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
    },

    // ── Configuration, both ways (echoed back as acknowledgement) ────
    Url {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<String>,
    },
    Port {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<String>,
    },
    Token {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<String>,
    },
    Force {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<bool>,
    },

    // ── Device → gateway ─────────────────────────────────────────────
    /// Reset every known entity (echoed back so the store empties).
    Clear,
    /// Enumerate one entity.
    Fetch { id: EntityId },
    /// Ask for `action` on an entity.
    ChangeRequest { id: EntityId, action: String },
    /// Run the health check.
    Status,
}

/// Decoded `api` payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiStatus {
    Available { location: String },
    Unavailable { error: String },
}

impl Message {
    pub fn add(entity: &Entity) -> Self {
        Self::Add {
            id: entity.id.clone(),
            name: entity.name.clone(),
            state: entity.state.clone(),
        }
    }

    pub fn change(id: &EntityId, state: impl Into<String>) -> Self {
        Self::Change {
            id: id.clone(),
            state: state.into(),
        }
    }

    pub fn api_available(location: impl Into<String>) -> Self {
        Self::Api {
            value: API_OK.into(),
            name: Some(location.into()),
        }
    }

    pub fn api_unavailable(error: impl Into<String>) -> Self {
        Self::Api {
            value: error.into(),
            name: None,
        }
    }

    /// The `key` this message travels under.
    pub fn key(&self) -> &'static str {
        self.into()
    }

    pub fn api_status(&self) -> Option<ApiStatus> {
        match self {
            Self::Api { value, name } if value == API_OK => Some(ApiStatus::Available {
                location: name.clone().unwrap_or_default(),
            }),
            Self::Api { value, .. } => Some(ApiStatus::Unavailable {
                error: value.clone(),
            }),
            _ => None,
        }
    }

    pub fn to_json(&self) -> Result<String, CoreError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(raw: &str) -> Result<Self, CoreError> {
        Ok(serde_json::from_str(raw)?)
    }
}
