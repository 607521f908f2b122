// Entity state endpoints

use tracing::debug;

use crate::client::HassClient;
use crate::error::Error;
use crate::models::StateObject;

impl HassClient {
    /// Read the current state of one entity.
    ///
    /// `GET /api/states/{entity_id}`
    pub async fn get_state(&self, entity_id: &str) -> Result<StateObject, Error> {
        let url = self.api_url(&["states", entity_id])?;
        debug!(entity_id, "fetching entity state");
        self.get(url).await
    }
}
