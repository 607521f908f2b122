// hassbridge-core: Entity synchronization between a Home Assistant server and a companion device.

pub mod channel;
pub mod config;
pub mod convert;
pub mod device;
pub mod error;
pub mod gateway;
pub mod model;
pub mod protocol;
pub mod render;
pub mod store;

// ── Primary re-exports ──────────────────────────────────────────────
pub use channel::{ChannelEvent, Endpoint, Sender};
pub use config::{GatewayConfig, ResultPolicy};
pub use device::{Device, DeviceOptions};
pub use error::CoreError;
pub use gateway::{Gateway, GatewayService};
pub use protocol::{ApiStatus, Message};
pub use render::{Renderer, Row, Selection};
pub use store::{Connectivity, EntityStore, StoreUpdate};

pub use hassbridge_api::{TlsMode, TransportConfig};

// Re-export model types at the crate root for ergonomics.
pub use model::{
    DeviceSettings, Entity, EntityId, EntityStatus, ExecutableDomain, PersistedEntity,
    EXECUTABLE_STATE,
};
