// REST client for a single Home Assistant server
//
// Wraps `reqwest::Client` with bearer authentication, request URL
// construction, and status handling. Endpoint groups (states, services,
// system) are implemented as inherent methods in separate files to keep
// this module focused on transport mechanics.

use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::Error;

/// Raw HTTP client for the Home Assistant REST API.
///
/// `address` is the server root as the user typed it, e.g.
/// `192.168.1.10:8123` or `https://home.example.org:443`. It is not
/// validated up front; a malformed address surfaces as
/// [`Error::InvalidUrl`] or [`Error::Transport`] on the first request.
pub struct HassClient {
    http: reqwest::Client,
    address: String,
    token: SecretString,
}

impl HassClient {
    /// Create a client around a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, address: impl Into<String>, token: SecretString) -> Self {
        Self {
            http,
            address: address.into(),
            token,
        }
    }

    /// The server address this client talks to.
    pub fn address(&self) -> &str {
        &self.address
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Build `{address}/api/{segments...}`.
    ///
    /// Each segment is pushed whole, so `/`, `?` or `..` inside an entity
    /// id is percent-encoded instead of changing the path. An address
    /// without a scheme is requested over plain `http://`.
    pub(crate) fn api_url(&self, segments: &[&str]) -> Result<Url, Error> {
        let root = self.address.trim_end_matches('/');
        let mut url = if root.contains("://") {
            Url::parse(root)?
        } else {
            Url::parse(&format!("http://{root}"))?
        };
        url.path_segments_mut()
            .map_err(|()| Error::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty()
            .push("api")
            .extend(segments);
        Ok(url)
    }

    // ── Request helpers ──────────────────────────────────────────────

    fn authorized(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder
            .bearer_auth(self.token.expose_secret())
            .header(reqwest::header::CONTENT_TYPE, "application/json")
    }

    /// Send an authenticated GET and decode the JSON body.
    pub(crate) async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        debug!("GET {}", url);

        let resp = self
            .authorized(self.http.get(url))
            .send()
            .await
            .map_err(Error::Transport)?;

        let (_, body) = Self::check_status(resp).await?;
        decode(body)
    }

    /// Send an authenticated POST with a JSON body, returning the raw body.
    pub(crate) async fn post(&self, url: Url, body: &impl Serialize) -> Result<(u16, String), Error> {
        debug!("POST {}", url);

        let resp = self
            .authorized(self.http.post(url))
            .json(body)
            .send()
            .await
            .map_err(Error::Transport)?;

        Self::check_status(resp).await
    }

    /// Map non-2xx statuses to errors; return the status and body otherwise.
    async fn check_status(resp: reqwest::Response) -> Result<(u16, String), Error> {
        let status = resp.status();
        let body = resp.text().await.map_err(Error::Transport)?;

        if status.is_success() {
            return Ok((status.as_u16(), body));
        }

        let message = if body.trim().is_empty() {
            status
                .canonical_reason()
                .unwrap_or("unexpected status")
                .to_owned()
        } else {
            body
        };

        match status {
            reqwest::StatusCode::UNAUTHORIZED | reqwest::StatusCode::FORBIDDEN => {
                Err(Error::Authentication {
                    status: status.as_u16(),
                    message,
                })
            }
            _ => Err(Error::Http {
                status: status.as_u16(),
                message,
            }),
        }
    }
}

fn decode<T: DeserializeOwned>(body: String) -> Result<T, Error> {
    serde_json::from_str(&body).map_err(|e| Error::Deserialization {
        message: e.to_string(),
        body,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client(address: &str) -> HassClient {
        HassClient::with_client(reqwest::Client::new(), address, SecretString::from("t".to_string()))
    }

    #[test]
    fn bare_host_gets_http_scheme() {
        let url = client("127.0.0.1:8123").api_url(&["config"]).unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:8123/api/config");
    }

    #[test]
    fn explicit_scheme_is_kept() {
        let url = client("https://ha.local:443/").api_url(&["states", "light.a"]).unwrap();
        assert_eq!(url.as_str(), "https://ha.local/api/states/light.a");
    }

    #[test]
    fn reserved_characters_stay_inside_one_segment() {
        let url = client("127.0.0.1:8123")
            .api_url(&["states", "light.a/../../config?x#y"])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://127.0.0.1:8123/api/states/light.a%2F..%2F..%2Fconfig%3Fx%23y"
        );
        assert_eq!(url.path_segments().unwrap().count(), 3);
    }

    #[test]
    fn malformed_address_fails_at_request_time() {
        assert!(matches!(
            client("http://:notaport").api_url(&["config"]),
            Err(Error::InvalidUrl(_))
        ));
    }
}
