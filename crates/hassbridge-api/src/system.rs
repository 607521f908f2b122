// Server-level endpoints

use tracing::debug;

use crate::client::HassClient;
use crate::error::Error;
use crate::models::ServerConfig;

impl HassClient {
    /// Read the server configuration. Doubles as the health check.
    ///
    /// `GET /api/config`
    pub async fn get_config(&self) -> Result<ServerConfig, Error> {
        let url = self.api_url(&["config"])?;
        debug!("fetching server config");
        self.get(url).await
    }
}
