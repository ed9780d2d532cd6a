use anyhow::Context;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::Serialize;
use tracing::debug;
use url::Url;
use uuid::Uuid;

use super::types::{EngineError, EngineResult};
use crate::credentials::Credentials;

/// Default client version (from Cargo.toml)
const DEFAULT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build the User-Agent string sent with every request
fn build_user_agent() -> String {
    std::env::var("NOMIE_STORE_USER_AGENT")
        .unwrap_or_else(|_| format!("nomie-server-storage/{}", DEFAULT_VERSION))
}

/// Authenticated request layer for the Nomie Server REST API.
///
/// Every request goes to `{base_url}/api/{path}` with an
/// `Authorization: Bearer {token}` header. Non-2xx responses are handed back
/// untouched; only missing configuration and transport failures are errors.
///
/// Holds a single `reqwest::Client` so connections are reused across calls.
pub struct RequestClient {
    client: Client,
    user_agent: String,
    base_url: Option<String>,
    access_token: Option<String>,
}

impl RequestClient {
    /// Create a client with no endpoint configured yet.
    pub fn new() -> anyhow::Result<Self> {
        let client = Client::builder()
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            user_agent: build_user_agent(),
            base_url: None,
            access_token: None,
        })
    }

    /// Replace the endpoint and token used by subsequent requests.
    pub fn set_credentials(&mut self, credentials: &Credentials) {
        self.base_url = Some(credentials.endpoint_url.clone());
        self.access_token = Some(credentials.token.clone());
    }

    /// Forget the endpoint and token; later requests fail with a configuration error.
    pub fn clear_credentials(&mut self) {
        self.base_url = None;
        self.access_token = None;
    }

    /// The configured endpoint, if any.
    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    #[cfg(test)]
    fn is_configured(&self) -> bool {
        self.base_url.as_deref().is_some_and(|u| !u.is_empty())
            && self.access_token.as_deref().is_some_and(|t| !t.is_empty())
    }

    fn build_url(base_url: &str, path: &str) -> EngineResult<Url> {
        let raw = format!("{}/api/{}", base_url.trim_end_matches('/'), path);
        Url::parse(&raw).map_err(|e| {
            EngineError::Configuration(format!("Invalid Nomie Server URL {}: {}", raw, e))
        })
    }

    /// Build a request, failing before any network activity when unconfigured.
    fn request(&self, method: Method, path: &str) -> EngineResult<RequestBuilder> {
        let base_url = match self.base_url.as_deref() {
            Some(url) if !url.is_empty() => url,
            _ => {
                return Err(EngineError::Configuration(format!(
                    "Cannot {} {} - API URL not set",
                    method, path
                )))
            }
        };
        let token = match self.access_token.as_deref() {
            Some(token) if !token.is_empty() => token,
            _ => {
                return Err(EngineError::Configuration(format!(
                    "Cannot {} {} - API token not set",
                    method, path
                )))
            }
        };

        let url = Self::build_url(base_url, path)?;
        debug!("{} {}", method, url);

        Ok(self
            .client
            .request(method, url)
            .header("User-Agent", &self.user_agent)
            .header("x-request-id", Uuid::new_v4().to_string())
            .header("Authorization", format!("Bearer {}", token)))
    }

    /// Authenticated `GET /api/{path}`.
    pub async fn get(&self, path: &str) -> EngineResult<Response> {
        let response = self.request(Method::GET, path)?.send().await?;
        debug!("GET {} -> {}", path, response.status());
        Ok(response)
    }

    /// Authenticated `POST /api/{path}` with a JSON body.
    pub async fn post<T>(&self, path: &str, body: &T) -> EngineResult<Response>
    where
        T: Serialize + ?Sized,
    {
        let content = serde_json::to_string(body)?;
        let response = self
            .request(Method::POST, path)?
            .header("Content-Type", "application/json")
            .body(content)
            .send()
            .await?;
        debug!("POST {} -> {}", path, response.status());
        Ok(response)
    }

    /// Authenticated `DELETE /api/{path}`.
    pub async fn delete(&self, path: &str) -> EngineResult<Response> {
        let response = self.request(Method::DELETE, path)?.send().await?;
        debug!("DELETE {} -> {}", path, response.status());
        Ok(response)
    }
}

impl std::fmt::Debug for RequestClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestClient")
            .field("base_url", &self.base_url)
            .field("access_token", &self.access_token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{MockResponse, MockServer};

    fn configured(url: &str, token: &str) -> RequestClient {
        let mut client = RequestClient::new().unwrap();
        client.set_credentials(&Credentials::new(url, token));
        client
    }

    #[test]
    fn test_build_url() {
        let url = RequestClient::build_url("http://localhost:3011", "auth/validate").unwrap();
        assert_eq!(url.as_str(), "http://localhost:3011/api/auth/validate");

        let url = RequestClient::build_url("http://localhost:3011/", "n6storage/list").unwrap();
        assert_eq!(url.as_str(), "http://localhost:3011/api/n6storage/list");
    }

    #[test]
    fn test_build_url_rejects_garbage() {
        let err = RequestClient::build_url("not a url", "auth/validate").unwrap_err();
        assert!(err.is_configuration());
    }

    #[tokio::test]
    async fn test_unconfigured_client_fails_fast() {
        let client = RequestClient::new().unwrap();
        assert!(!client.is_configured());

        let err = client.get("n6storage/trackers").await.unwrap_err();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("API URL not set"));

        let err = client.post("n6storage/trackers", &[1, 2]).await.unwrap_err();
        assert!(err.is_configuration());

        let err = client.delete("n6storage/trackers").await.unwrap_err();
        assert!(err.is_configuration());
    }

    #[tokio::test]
    async fn test_missing_token_is_configuration_error() {
        let server = MockServer::start(vec![]).await;
        let client = configured(&server.url(), "");

        let err = client.get("auth/validate").await.unwrap_err();
        assert!(err.is_configuration());
        assert!(server.requests().is_empty());
    }

    #[tokio::test]
    async fn test_requests_carry_bearer_token() {
        let server = MockServer::start(vec![(
            "GET",
            "/api/n6storage/trackers",
            MockResponse::json(200, "[]"),
        )])
        .await;
        let client = configured(&server.url(), "abc");

        let response = client.get("n6storage/trackers").await.unwrap();
        assert!(response.status().is_success());

        let requests = server.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, "GET");
        assert_eq!(requests[0].path, "/api/n6storage/trackers");
        assert_eq!(requests[0].header("authorization"), Some("Bearer abc"));
    }

    #[tokio::test]
    async fn test_post_sends_json() {
        let server = MockServer::start(vec![(
            "POST",
            "/api/n6storage/board",
            MockResponse::json(200, "{}"),
        )])
        .await;
        let client = configured(&server.url(), "abc");

        client
            .post("n6storage/board", &serde_json::json!({ "a": 1 }))
            .await
            .unwrap();

        let requests = server.requests();
        assert_eq!(requests[0].header("content-type"), Some("application/json"));
        assert_eq!(requests[0].body, r#"{"a":1}"#);
    }

    #[tokio::test]
    async fn test_non_success_status_is_not_an_error() {
        let server = MockServer::start(vec![(
            "DELETE",
            "/api/n6storage/gone",
            MockResponse::json(404, ""),
        )])
        .await;
        let client = configured(&server.url(), "abc");

        let response = client.delete("n6storage/gone").await.unwrap();
        assert_eq!(response.status().as_u16(), 404);
    }

    #[tokio::test]
    async fn test_unreachable_host_is_transport_error() {
        let client = configured(&crate::testutil::unused_local_url().await, "abc");

        let err = client.get("auth/validate").await.unwrap_err();
        assert!(matches!(err, EngineError::Transport(_)));
    }

    #[test]
    fn test_debug_redacts_token() {
        let client = configured("http://localhost:3011", "secret-token-123");
        let debug_str = format!("{:?}", client);
        assert!(!debug_str.contains("secret-token-123"));
        assert!(debug_str.contains("[REDACTED]"));
    }
}
