//! HTTP transport for the exam backend.
//!
//! [`HttpBackend`] issues exactly one request per call and maps HTTP
//! statuses onto [`ClientError`]. Refresh-and-replay lives one level up, in
//! [`crate::api::ApiClient`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use examdesk_core::error::ClientError;
use examdesk_core::model::{ClassMembership, User};
use examdesk_core::traits::AuthBackend;
use examdesk_core::validation::SignUpRequest;

use crate::config::ClientConfig;

/// Endpoints that exchange or revoke credentials. A denial on these means
/// the credentials are wrong and must never trigger a token refresh.
pub const CREDENTIAL_ENDPOINTS: [&str; 4] = [
    "auth/signin",
    "auth/signup",
    "auth/gettoken",
    "auth/signout",
];

/// Returns `true` if a denied response from `path` should not be retried.
pub fn is_credential_endpoint(path: &str) -> bool {
    let path = path.trim_start_matches('/');
    CREDENTIAL_ENDPOINTS.iter().any(|e| path.starts_with(e))
}

/// reqwest-backed transport.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: Url,
    timeout_secs: u64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SignInBody<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RefreshTokenBody<'a> {
    refresh_token: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignInResponse {
    refresh_token: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenResponse {
    access_token: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

impl HttpBackend {
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self, ClientError> {
        let mut base_url = Url::parse(base_url)
            .map_err(|e| ClientError::Config(format!("invalid base URL {base_url:?}: {e}")))?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| ClientError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url,
            timeout_secs,
        })
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self, ClientError> {
        Self::new(&config.base_url, config.timeout_secs)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve an endpoint path and query against the base URL.
    pub fn url(&self, path: &str, query: &[(&str, &str)]) -> Result<Url, ClientError> {
        let mut url = self
            .base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| ClientError::Config(format!("invalid endpoint {path:?}: {e}")))?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    /// Send one request and decode the JSON response.
    ///
    /// An empty success body decodes as JSON `null`, so `()` and `Option<_>`
    /// work for endpoints that return nothing.
    pub async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<&serde_json::Value>,
        bearer: Option<&str>,
    ) -> Result<T, ClientError> {
        let url = self.url(path, query)?;
        tracing::debug!(%method, %url, authorized = bearer.is_some(), "sending request");

        let mut request = self.client.request(method, url);
        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                ClientError::Timeout(self.timeout_secs)
            } else {
                ClientError::NetworkError(e.to_string())
            }
        })?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| ClientError::NetworkError(e.to_string()))?;
        tracing::debug!(status, path, "received response");

        if status >= 400 {
            return Err(error_for_status(path, status, text));
        }

        let text = if text.trim().is_empty() { "null" } else { &text };
        serde_json::from_str(text)
            .map_err(|e| ClientError::Decode(format!("{path}: {e}")))
    }
}

/// Map an error response onto the client error taxonomy.
fn error_for_status(path: &str, status: u16, body: String) -> ClientError {
    let message = serde_json::from_str::<ErrorBody>(&body)
        .map(|e| e.message)
        .unwrap_or(body);
    match status {
        401 | 403 if is_credential_endpoint(path) => ClientError::AuthenticationFailed(message),
        401 | 403 => ClientError::Denied { status },
        404 => ClientError::NotFound(if message.is_empty() {
            path.to_string()
        } else {
            message
        }),
        _ => ClientError::ApiError { status, message },
    }
}

pub(crate) fn to_body<T: Serialize>(value: &T) -> Result<serde_json::Value, ClientError> {
    serde_json::to_value(value).map_err(|e| ClientError::Decode(format!("request body: {e}")))
}

#[async_trait]
impl AuthBackend for HttpBackend {
    #[instrument(skip_all, fields(username = %request.username))]
    async fn sign_up(&self, request: &SignUpRequest) -> Result<(), ClientError> {
        let body = to_body(request)?;
        let _: serde_json::Value = self
            .send(Method::POST, "auth/signup", &[], Some(&body), None)
            .await?;
        Ok(())
    }

    #[instrument(skip(self, password))]
    async fn sign_in(&self, username: &str, password: &str) -> Result<String, ClientError> {
        let body = to_body(&SignInBody { username, password })?;
        let response: SignInResponse = self
            .send(Method::POST, "auth/signin", &[], Some(&body), None)
            .await?;
        Ok(response.refresh_token)
    }

    #[instrument(skip_all)]
    async fn exchange_token(&self, refresh_token: &str) -> Result<String, ClientError> {
        let body = to_body(&RefreshTokenBody { refresh_token })?;
        let response: TokenResponse = self
            .send(Method::POST, "auth/gettoken", &[], Some(&body), None)
            .await?;
        Ok(response.access_token)
    }

    #[instrument(skip_all)]
    async fn sign_out(&self, refresh_token: &str) -> Result<(), ClientError> {
        let body = to_body(&RefreshTokenBody { refresh_token })?;
        let _: serde_json::Value = self
            .send(Method::POST, "auth/signout", &[], Some(&body), None)
            .await?;
        Ok(())
    }

    #[instrument(skip_all)]
    async fn get_me(&self, access_token: &str) -> Result<User, ClientError> {
        self.send(Method::GET, "me/getme", &[], None, Some(access_token))
            .await
    }

    #[instrument(skip_all)]
    async fn get_my_classes(
        &self,
        access_token: &str,
    ) -> Result<Vec<ClassMembership>, ClientError> {
        let classes: Option<Vec<ClassMembership>> = self
            .send(Method::GET, "class/getmyclasses", &[], None, Some(access_token))
            .await?;
        Ok(classes.unwrap_or_default())
    }
}
