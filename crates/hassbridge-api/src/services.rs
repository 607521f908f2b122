// Service call endpoint

use serde_json::json;
use tracing::debug;

use crate::client::HassClient;
use crate::error::Error;
use crate::models::ServiceCall;

impl HassClient {
    /// Invoke `{group}.{action}` targeting one entity.
    ///
    /// `POST /api/services/{group}/{action}` with `{"entity_id": ...}`
    pub async fn call_service(
        &self,
        group: &str,
        action: &str,
        entity_id: &str,
    ) -> Result<ServiceCall, Error> {
        let url = self.api_url(&["services", group, action])?;
        debug!(group, action, entity_id, "calling service");
        let (status, body) = self.post(url, &json!({ "entity_id": entity_id })).await?;
        Ok(ServiceCall { status, body })
    }
}
