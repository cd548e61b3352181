//! HTTP API Client
//!
//! Browser implementation of the chat transport, on top of `fetch`.

use async_trait::async_trait;
use gloo_net::http::{Request, Response};
use serde::{de::DeserializeOwned, Serialize};

use oneiromind::transport::{
    paths, ChatTransport, DreamRequest, DreamResponse, StartTherapyRequest, StartTherapyResponse,
    TherapyRequest, TherapyResponse, TransportError, TransportResult,
};

/// Local storage key for an API base override
pub const API_URL_KEY: &str = "oneiromind_api_url";

/// Get the API base URL from local storage, or the page origin
pub fn get_api_base() -> String {
    let url = web_sys::window()
        .and_then(|window| {
            let stored = window
                .local_storage()
                .ok()
                .flatten()
                .and_then(|storage| storage.get_item(API_URL_KEY).ok().flatten())
                .filter(|url| !url.trim().is_empty());
            stored.or_else(|| window.location().origin().ok())
        })
        .unwrap_or_default();
    normalize_base(&url)
}

fn normalize_base(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

#[derive(Debug, serde::Deserialize)]
struct ErrorBody {
    #[serde(default)]
    detail: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

fn map_gloo(e: gloo_net::Error) -> TransportError {
    match e {
        gloo_net::Error::SerdeError(e) => TransportError::Decode(e.to_string()),
        other => TransportError::Network(other.to_string()),
    }
}

/// Chat API client. The login cookie travels with every request.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base: String,
}

impl Default for ApiClient {
    fn default() -> Self {
        Self::new(get_api_base())
    }
}

impl ApiClient {
    pub fn new(base: impl AsRef<str>) -> Self {
        Self {
            base: normalize_base(base.as_ref()),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    async fn post_json<B, R>(&self, path: &str, body: &B) -> TransportResult<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let response = Request::post(&self.url(path))
            .credentials(web_sys::RequestCredentials::Include)
            .json(body)
            .map_err(|e| TransportError::Request(e.to_string()))?
            .send()
            .await
            .map_err(map_gloo)?;

        let response = check_status(response).await?;
        response.json::<R>().await.map_err(map_gloo)
    }
}

async fn check_status(response: Response) -> TransportResult<Response> {
    if response.ok() {
        return Ok(response);
    }

    let status = response.status();
    let body: Option<ErrorBody> = response.json().await.ok();
    let message = body
        .and_then(|b| b.detail.or(b.error))
        .unwrap_or_else(|| response.status_text());

    web_sys::console::warn_1(&format!("API error {}: {}", status, message).into());

    if status == 401 {
        Err(TransportError::Unauthorized)
    } else {
        Err(TransportError::Status { status, message })
    }
}

#[async_trait(?Send)]
impl ChatTransport for ApiClient {
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
