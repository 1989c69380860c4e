//! reqwest-backed transport for the booking API.
//!
//! DESIGN
//! ======
//! Bearer attachment lives here, in the request layer: callers pass the token
//! they hold and never build headers themselves. Bodies are always read as
//! text and handed to [`decode_response`], because failure envelopes arrive
//! with 4xx/5xx statuses and still carry the message the UI should show.

use std::time::Duration;

use reqwest::Method;
use reqwest::header::AUTHORIZATION;
use serde::de::DeserializeOwned;

use super::api::{AuthBackend, LOGIN_PATH, ME_PATH, REGISTER_PATH};
use super::types::{ApiError, ApiResponse, LoginData, LoginRequest, RegisterRequest, User, decode_bare, decode_response};
use crate::config::{ClientConfig, Timeouts};

/// Format the `Authorization` header value for a token.
#[must_use]
pub fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}

// =============================================================================
// CLIENT
// =============================================================================

/// HTTP client bound to one backend base URL. Cheap to clone.
#[derive(Clone, Debug)]
pub struct HttpBackend {
    http: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    /// Build a client for `base_url` with the given timeouts.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::ClientBuild`] if the HTTP client cannot be constructed.
    pub fn new(base_url: &str, timeouts: Timeouts) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeouts.request_secs))
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .build()
            .map_err(|e| ApiError::ClientBuild(e.to_string()))?;
        Ok(Self { http, base_url: base_url.trim_end_matches('/').to_owned() })
    }

    /// Build a client from a parsed [`ClientConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::ClientBuild`] if the HTTP client cannot be constructed.
    pub fn from_config(config: &ClientConfig) -> Result<Self, ApiError> {
        Self::new(&config.base_url, config.timeouts)
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Start a request, attaching the bearer token when one is held.
    pub(crate) fn request(&self, method: Method, path: &str, token: Option<&str>) -> reqwest::RequestBuilder {
        tracing::debug!(%method, path, authenticated = token.is_some(), "api request");
        let builder = self.http.request(method, self.url(path));
        match token {
            Some(token) => builder.header(AUTHORIZATION, bearer(token)),
            None => builder,
        }
    }

    /// Send a prepared request and decode its envelope.
    pub(crate) async fn send<T: DeserializeOwned>(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<ApiResponse<T>, ApiError> {
        let (status, text) = Self::exchange(builder).await?;
        decode_response(status, &text)
    }

    /// Send a prepared request whose success body may come without an envelope.
    pub(crate) async fn send_bare<T: DeserializeOwned>(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<ApiResponse<T>, ApiError> {
        let (status, text) = Self::exchange(builder).await?;
        decode_bare(status, &text)
    }

    async fn exchange(builder: reqwest::RequestBuilder) -> Result<(u16, String), ApiError> {
        let response = builder
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        Ok((status, text))
    }
}

#[async_trait::async_trait]
impl AuthBackend for HttpBackend {
    async fn current_user(&self, token: &str) -> Result<ApiResponse<User>, ApiError> {
        self.send(self.request(Method::GET, ME_PATH, Some(token))).await
    }

    async fn login(&self, request: &LoginRequest) -> Result<ApiResponse<LoginData>, ApiError> {
        self.send(self.request(Method::POST, LOGIN_PATH, None).json(request))
            .await
    }

    async fn register(&self, request: &RegisterRequest) -> Result<ApiResponse<serde_json::Value>, ApiError> {
        self.send(self.request(Method::POST, REGISTER_PATH, None).json(request))
            .await
    }
}
