// Wire types for the Home Assistant REST API.
//
// Only the fields hassbridge reads are modelled; everything else the
// server sends is ignored by serde.

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// `GET /api/states/{entity_id}` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateObject {
    pub entity_id: String,
    pub state: String,
    #[serde(default)]
    pub attributes: StateAttributes,
}

impl StateObject {
    pub fn friendly_name(&self) -> Option<&str> {
        self.attributes
            .friendly_name
            .as_deref()
            .filter(|name| !name.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateAttributes {
    #[serde(default)]
    pub friendly_name: Option<String>,
}

/// `GET /api/config` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    pub location_name: String,
    #[serde(default)]
    pub version: Option<String>,
}

/// One entry of the list returned by `POST /api/services/{group}/{action}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangedState {
    pub entity_id: String,
    pub state: String,
}

/// Raw outcome of a service call.
///
/// The body is kept unparsed: callers that assume the post-action state
/// never look at it, callers that trust only the server decode it with
/// [`ServiceCall::changed_states`].
#[derive(Debug, Clone)]
pub struct ServiceCall {
    pub status: u16,
    pub body: String,
}

impl ServiceCall {
    /// Decode the body as the list of entities the call touched.
    pub fn changed_states(&self) -> Result<Vec<ChangedState>, Error> {
        serde_json::from_str(&self.body).map_err(|e| Error::Deserialization {
            message: e.to_string(),
            body: self.body.clone(),
        })
    }
}
