use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use roster_model::{
    Credentials, LoginResponse, User, UserEnvelope, UserId, UserPage,
    UserPatch, UserPayload,
};
use serde::de::DeserializeOwned;
use url::Url;

use super::{GatewayError, GatewayResult, RemoteGateway};
use crate::config::RosterConfig;

const API_KEY_HEADER: &str = "x-api-key";
const API_KEY_PARAM: &str = "api_key";

/// reqwest adapter for the remote user API
#[derive(Clone)]
pub struct HttpGateway {
    client: Client,
    base_url: Url,
    api_key: String,
}

impl std::fmt::Debug for HttpGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpGateway")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

impl HttpGateway {
    pub fn new(config: &RosterConfig) -> GatewayResult<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|err| GatewayError::Setup(err.to_string()))?;
        Self::with_client(client, &config.api_base, &config.api_key)
    }

    /// Build on an existing client, e.g. one shared with other services.
    pub fn with_client(
        client: Client,
        base_url: &str,
        api_key: &str,
    ) -> GatewayResult<Self> {
        let normalized = normalize_base_url(base_url);
        let base_url = Url::parse(&normalized).map_err(|err| {
            GatewayError::Setup(format!("invalid base URL '{normalized}': {err}"))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(GatewayError::Setup(format!(
                "base URL '{normalized}' cannot hold paths"
            )));
        }

        tracing::info!("[HttpGateway] Using API base URL: {}", base_url);

        Ok(Self {
            client,
            base_url,
            api_key: api_key.to_string(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Absolute URL for `segments` under the base, with the key attached.
    /// Each segment is percent-encoded on its own, so ids cannot escape
    /// their path position.
    pub fn endpoint(&self, segments: &[&str]) -> GatewayResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                GatewayError::Setup("base URL cannot hold paths".to_string())
            })?
            .pop_if_empty()
            .extend(segments);
        url.query_pairs_mut().append_pair(API_KEY_PARAM, &self.api_key);
        Ok(url)
    }

    async fn execute(&self, request: RequestBuilder) -> GatewayResult<Response> {
        let response = request
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await
            .map_err(classify_send_error)?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = extract_error_message(&body);
        tracing::warn!(
            "[HttpGateway] Request failed with status {}: {}",
            status,
            message.as_deref().unwrap_or("<no message>")
        );
        Err(GatewayError::Rejected {
            status: status.as_u16(),
            message,
        })
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> GatewayResult<T> {
        let bytes = response.bytes().await.map_err(classify_send_error)?;
        serde_json::from_slice(&bytes)
            .map_err(|err| GatewayError::Decode(err.to_string()))
    }
}

#[async_trait]
impl RemoteGateway for HttpGateway {
    async fn login(&self, credentials: &Credentials) -> GatewayResult<LoginResponse> {
        let url = self.endpoint(&["login"])?;
        let body = serde_json::json!({
            "email": credentials.email(),
            "password": credentials.expose_password(),
        });
        tracing::debug!("[HttpGateway] POST {}", url.path());
        let response = self.execute(self.client.post(url).json(&body)).await?;
        Self::decode(response).await
    }

    async fn fetch_users(&self, page: u32) -> GatewayResult<UserPage> {
        let mut url = self.endpoint(&["users"])?;
        url.query_pairs_mut().append_pair("page", &page.to_string());
        tracing::debug!("[HttpGateway] GET {} page {}", url.path(), page);
        let response = self.execute(self.client.get(url)).await?;
        Self::decode(response).await
    }

    async fn fetch_user(&self, id: &UserId) -> GatewayResult<User> {
        let url = self.endpoint(&["users", id.as_str()])?;
        tracing::debug!("[HttpGateway] GET {}", url.path());
        let response = self.execute(self.client.get(url)).await?;
        let envelope: UserEnvelope = Self::decode(response).await?;
        Ok(envelope.data)
    }

    async fn create_user(&self, payload: &UserPayload) -> GatewayResult<User> {
        let url = self.endpoint(&["users"])?;
        tracing::debug!("[HttpGateway] POST {}", url.path());
        let response = self.execute(self.client.post(url).json(payload)).await?;
        Self::decode(response).await
    }

    async fn update_user(
        &self,
        id: &UserId,
        payload: &UserPayload,
    ) -> GatewayResult<UserPatch> {
        let url = self.endpoint(&["users", id.as_str()])?;
        tracing::debug!("[HttpGateway] PUT {}", url.path());
        let response = self.execute(self.client.put(url).json(payload)).await?;
        Self::decode(response).await
    }

    async fn delete_user(&self, id: &UserId) -> GatewayResult<()> {
        let url = self.endpoint(&["users", id.as_str()])?;
        tracing::debug!("[HttpGateway] DELETE {}", url.path());
        // 204 with no body is the usual answer
        self.execute(self.client.delete(url)).await?;
        Ok(())
    }
}

/// Add a scheme when missing and drop trailing slashes.
fn normalize_base_url(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    let with_scheme =
        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            trimmed.to_string()
        } else {
            format!("http://{trimmed}")
        };
    if with_scheme != raw {
        tracing::warn!(
            "[HttpGateway] Normalized base URL from '{}' to '{}'",
            raw,
            with_scheme
        );
    }
    with_scheme
}

fn classify_send_error(err: reqwest::Error) -> GatewayError {
    if err.is_builder() {
        GatewayError::Setup(err.to_string())
    } else if err.is_timeout() {
        GatewayError::Network(format!("request timed out: {err}"))
    } else {
        GatewayError::Network(err.to_string())
    }
}

/// `error` wins over `message`; non-JSON bodies are used verbatim.
fn extract_error_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }
    match serde_json::from_str::<serde_json::Value>(trimmed) {
        Ok(value) => ["error", "message"]
            .iter()
            .find_map(|key| value.get(*key).and_then(|v| v.as_str()))
            .map(str::to_string),
        Err(_) => Some(trimmed.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gateway(base: &str) -> HttpGateway {
        HttpGateway::with_client(Client::new(), base, "test-key").unwrap()
    }

    #[test]
    fn base_url_gets_scheme_and_loses_trailing_slash() {
        assert_eq!(
            normalize_base_url("localhost:3000/api/"),
            "http://localhost:3000/api"
        );
        assert_eq!(
            normalize_base_url("https://reqres.in/api"),
            "https://reqres.in/api"
        );
    }

    #[test]
    fn endpoint_keeps_base_path_and_adds_key() {
        let url = gateway("https://reqres.in/api")
            .endpoint(&["users", "7"])
            .unwrap();
        assert_eq!(url.as_str(), "https://reqres.in/api/users/7?api_key=test-key");
    }

    #[test]
    fn ids_are_encoded_as_a_single_segment() {
        let url = gateway("https://reqres.in/api")
            .endpoint(&["users", "7/../login?x=1"])
            .unwrap();
        assert_eq!(url.path(), "/api/users/7%2F..%2Flogin%3Fx=1");
    }

    #[test]
    fn error_field_preferred_over_message() {
        assert_eq!(
            extract_error_message(r#"{"error":"user not found","message":"x"}"#),
            Some("user not found".to_string())
        );
        assert_eq!(
            extract_error_message(r#"{"message":"Missing API key"}"#),
            Some("Missing API key".to_string())
        );
        assert_eq!(extract_error_message("{}"), None);
        assert_eq!(extract_error_message(""), None);
    }
}
