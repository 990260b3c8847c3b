//! HTTP client for the Sensorama backend using reqwest.

use std::sync::Arc;
use std::time::Instant;

use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use tokio::sync::RwLock;

use crate::config::ApiConfig;
use crate::error::{ApiError, Result};
use crate::types::{
    Credentials, LoginResponse, Profile, RegistrationRequest, ResponseDto, UpdateProfile,
};

/// Tracing target for API client operations.
pub const TRACING_TARGET: &str = "sensorama_api::client";

struct ApiClientInner {
    http: Client,
    config: ApiConfig,
    /// Sent as `Authorization: Bearer …` when present.
    token: RwLock<Option<String>>,
}

impl std::fmt::Debug for ApiClientInner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClientInner")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Client for the Sensorama REST API.
///
/// Cheap to clone; clones share the HTTP connection pool and the bearer
/// token slot. Every successful response is unwrapped from its
/// [`ResponseDto`] envelope before it is returned.
///
/// # Examples
///
/// ```rust,ignore
/// use sensorama_api::{ApiClient, ApiConfig, Credentials};
///
/// let client = ApiClient::new(ApiConfig::from_env()?)?;
/// let login = client.login(&Credentials::new("ana", "secret")).await?;
/// client.set_token(&login.token).await;
/// let profile = client.profile("42").await?;
/// ```
#[derive(Clone, Debug)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

impl ApiClient {
    /// Creates a client for `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidConfig`] if the config fails validation,
    /// or [`ApiError::Network`] if the HTTP client cannot be built.
    pub fn new(config: ApiConfig) -> Result<Self> {
        tracing::debug!(
            target: TRACING_TARGET,
            base_url = %config.base_url,
            timeout_ms = config.timeout.as_millis() as u64,
            "Creating API client"
        );

        config.validate()?;

        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(ApiError::Network)?;

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                http,
                config,
                token: RwLock::new(None),
            }),
        })
    }

    /// Creates a client from [`ApiConfig::from_env`].
    pub fn from_env() -> Result<Self> {
        Self::new(ApiConfig::from_env()?)
    }

    pub fn config(&self) -> &ApiConfig {
        &self.inner.config
    }

    /// Authorizes every following request with `token`.
    pub async fn set_token(&self, token: impl Into<String>) {
        *self.inner.token.write().await = Some(token.into());
        tracing::debug!(target: TRACING_TARGET, "Bearer token set");
    }

    /// Stops sending an `Authorization` header.
    pub async fn clear_token(&self) {
        *self.inner.token.write().await = None;
        tracing::debug!(target: TRACING_TARGET, "Bearer token cleared");
    }

    /// The bearer token currently in use.
    pub async fn token(&self) -> Option<String> {
        self.inner.token.read().await.clone()
    }

    // -----------------------------------------------------------------------
    // Endpoints
    // -----------------------------------------------------------------------

    /// `POST /public/users/login`.
    pub async fn login(&self, credentials: &Credentials) -> Result<LoginResponse> {
        let request = self
            .request(Method::POST, "/public/users/login")
            .await
            .json(credentials);
        self.send(request).await
    }

    /// `POST /public/users/register`. The backend's reply is returned
    /// as-is.
    pub async fn register(&self, registration: &RegistrationRequest) -> Result<serde_json::Value> {
        let request = self
            .request(Method::POST, "/public/users/register")
            .await
            .json(registration);
        self.send(request).await
    }

    /// `GET /profiles/{id}`.
    pub async fn profile(&self, profile_id: &str) -> Result<Profile> {
        let request = self
            .request(Method::GET, &format!("/profiles/{profile_id}"))
            .await;
        self.send(request).await
    }

    /// `PUT /profiles/{id}`.
    pub async fn update_profile(&self, profile_id: &str, update: &UpdateProfile) -> Result<Profile> {
        let request = self
            .request(Method::PUT, &format!("/profiles/{profile_id}"))
            .await
            .json(update);
        self.send(request).await
    }

    /// `PATCH /profiles/{id}/update-name?newName=…`.
    pub async fn update_profile_name(&self, profile_id: &str, new_name: &str) -> Result<Profile> {
        let request = self
            .request(Method::PATCH, &format!("/profiles/{profile_id}/update-name"))
            .await
            .query(&[("newName", new_name)]);
        self.send(request).await
    }

    // -----------------------------------------------------------------------
    // Plumbing
    // -----------------------------------------------------------------------

    /// Starts a request, attaching the bearer token if one is set.
    async fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.inner.http.request(method, self.inner.config.url(path));
        match self.inner.token.read().await.as_deref() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Sends `request` and unwraps the envelope.
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let started_at = Instant::now();
        let request = request.build()?;
        let method = request.method().clone();
        let path = request.url().path().to_owned();

        let response = match self.inner.http.execute(request).await {
            Ok(response) => response,
            Err(err) => {
                let err = ApiError::from(err);
                tracing::warn!(
                    target: TRACING_TARGET,
                    %method,
                    path = %path,
                    error = %err,
                    elapsed_ms = started_at.elapsed().as_millis() as u64,
                    "API request failed"
                );
                return Err(err);
            }
        };

        let status = response.status();
        let body = response.bytes().await?;

        tracing::debug!(
            target: TRACING_TARGET,
            %method,
            path = %path,
            status = status.as_u16(),
            elapsed_ms = started_at.elapsed().as_millis() as u64,
            "API request completed"
        );

        if !status.is_success() {
            return Err(ApiError::from_status(status, &body));
        }

        let envelope: ResponseDto<T> = serde_json::from_slice(&body)?;
        Ok(envelope.data)
    }
}
