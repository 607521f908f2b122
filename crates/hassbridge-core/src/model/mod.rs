// ── Domain model ──
//
// Entity identity, the normalized entity record, the static
// domain/action/state tables, and the device-side settings record.

pub mod entity;
pub mod entity_id;
pub mod settings;
pub mod tables;

pub use entity::{Entity, EntityStatus};
pub use entity_id::EntityId;
pub use settings::{DeviceSettings, PersistedEntity};
pub use tables::{EXECUTABLE_STATE, ExecutableDomain, SHARED_CONTROL_GROUP};
