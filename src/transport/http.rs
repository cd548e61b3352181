//! Native HTTP transport
//!
//! `reqwest` client for the chat endpoints. The server authenticates with an
//! `access_token` cookie set by `POST /login`, so the client keeps a cookie
//! store and every call after [`HttpTransport::login`] rides on it.

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;
use tracing::{debug, info};

use super::dto::{
    DreamRequest, DreamResponse, StartTherapyRequest, StartTherapyResponse, TherapyRequest,
    TherapyResponse,
};
use super::error::{TransportError, TransportResult};
use super::{paths, ChatTransport};
use crate::login::Credentials;

/// Configuration for the HTTP transport
#[derive(Debug, Clone)]
pub struct HttpTransportConfig {
    /// Server base URL (e.g., "http://localhost:8000")
    pub base_url: String,
    /// Per-request timeout
    pub timeout: Duration,
}

impl Default for HttpTransportConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            timeout: Duration::from_secs(120),
        }
    }
}

/// Chat transport over HTTP with a cookie-backed login session
pub struct HttpTransport {
    client: Client,
    config: HttpTransportConfig,
}

fn map_reqwest(e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::Timeout
    } else if e.is_connect() || e.is_request() {
        TransportError::Network(e.to_string())
    } else if e.is_decode() {
        TransportError::Decode(e.to_string())
    } else if e.is_builder() {
        TransportError::Request(e.to_string())
    } else {
        TransportError::Network(e.to_string())
    }
}

impl HttpTransport {
    /// Create a transport with its own cookie store
    pub fn new(mut config: HttpTransportConfig) -> TransportResult<Self> {
        config.base_url = config.base_url.trim_end_matches('/').to_string();

        let client = Client::builder()
            .timeout(config.timeout)
            .cookie_store(true)
            .build()
            .map_err(|e| TransportError::Request(e.to_string()))?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &HttpTransportConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url, path)
    }

    /// Log in with the login form.
    ///
    /// The server answers a good login with a redirect to `/` and a bad one
    /// by rendering the login page again, so landing on `/login` means the
    /// credentials were rejected.
    pub async fn login(&self, credentials: &Credentials) -> TransportResult<()> {
        let url = self.url(paths::LOGIN);
        debug!(email = %credentials.email, "Logging in");

        let response = self
            .client
            .post(&url)
            .form(&[
                ("email", credentials.email.as_str()),
                ("password", credentials.password.as_str()),
            ])
            .send()
            .await
            .map_err(map_reqwest)?;

        let response = Self::check_status(response).await?;
        if response.url().path() == paths::LOGIN {
            return Err(TransportError::InvalidCredentials);
        }

        info!(email = %credentials.email, "Logged in");
        Ok(())
    }

    /// Fetch a rendered page (`/` or `/chat/{id}`) as HTML
    pub async fn load_page(&self, path: &str) -> TransportResult<String> {
        let url = self.url(path);
        debug!(%url, "Loading page");

        let response = self.client.get(&url).send().await.map_err(map_reqwest)?;
        let response = Self::check_status(response).await?;

        if path != paths::LOGIN && response.url().path() == paths::LOGIN {
            return Err(TransportError::Unauthorized);
        }

        response.text().await.map_err(map_reqwest)
    }

    async fn check_status(response: Response) -> TransportResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = response.text().await.unwrap_or_default();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            Err(TransportError::Unauthorized)
        } else {
            Err(TransportError::Status {
                status: status.as_u16(),
                message,
            })
        }
    }

    async fn post_json<B, R>(&self, path: &str, body: &B) -> TransportResult<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = self.url(path);
        debug!(%url, "POST");

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(map_reqwest)?;

        let response = Self::check_status(response).await?;
        let text = response.text().await.map_err(map_reqwest)?;
        serde_json::from_str(&text).map_err(|e| TransportError::Decode(e.to_string()))
    }
}

#[async_trait(?Send)]
impl ChatTransport for HttpTransport {
    async fn submit_dream(&self, request: &DreamRequest) -> TransportResult<DreamResponse> {
        self.post_json(paths::SUBMIT_DREAM, request).await
    }

    async fn start_therapy(
        &self,
        request: &StartTherapyRequest,
    ) -> TransportResult<StartTherapyResponse> {
        self.post_json(paths::START_THERAPY, request).await
    }

    async fn ask_follow_up(&self, request: &TherapyRequest) -> TransportResult<TherapyResponse> {
        self.post_json(paths::THERAPY, request).await
    }
}
