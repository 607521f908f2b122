// hassbridge-api: Async Rust client for the Home Assistant REST API

pub mod client;
pub mod error;
pub mod models;
pub mod services;
pub mod states;
pub mod system;
pub mod transport;

pub use client::HassClient;
pub use error::Error;
pub use models::{ChangedState, ServerConfig, ServiceCall, StateAttributes, StateObject};
pub use transport::{TlsMode, TransportConfig};

/// HTTP connection pool shared by every `HassClient` built from it.
pub use reqwest::Client as HttpClient;
