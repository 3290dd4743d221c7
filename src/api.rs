use crate::config::Config;
use crate::refresh::{RefreshCoordinator, RefreshError};
use crate::state::SessionStore;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// Authorization failure that survived the single refresh-and-retry.
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    #[error("server error {status}: {message}")]
    Status { status: u16, message: String },
    #[error("token refresh failed")]
    Refresh(#[from] RefreshError),
}

impl ApiError {
    fn from_status(status: StatusCode, message: String) -> Self {
        match status.as_u16() {
            401 => Self::Unauthorized(message),
            status => Self::Status { status, message },
        }
    }
}

fn build_headers(access_token: Option<&str>) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    if let Some(token) = access_token {
        if let Ok(value) = HeaderValue::from_str(&format!("Bearer {token}")) {
            headers.insert(AUTHORIZATION, value);
        }
    }
    headers
}

/// Authenticated API client. Attaches the current access token to every
/// outbound request and performs exactly one refresh-and-retry when a
/// request comes back 401.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    config: Config,
    store: SessionStore,
    coordinator: Arc<RefreshCoordinator>,
}

impl ApiClient {
    pub fn new(
        http: reqwest::Client,
        config: Config,
        store: SessionStore,
        coordinator: Arc<RefreshCoordinator>,
    ) -> Self {
        Self {
            http,
            config,
            store,
            coordinator,
        }
    }

    fn build_request(
        &self,
        method: &Method,
        path: &str,
        body: Option<&serde_json::Value>,
        access_token: Option<&str>,
    ) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.config.base_url, path);
        let mut req = self
            .http
            .request(method.clone(), url)
            .headers(build_headers(access_token));
        if let Some(body) = body {
            req = req.json(body);
        }
        req
    }

    /// Issue a request with the current access token. On 401 the request is
    /// refreshed and re-issued once; a 401 on the retry propagates to the
    /// caller.
    pub async fn execute<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<T, ApiError> {
        let token = self.store.access_token();
        let res = self
            .build_request(&method, path, body.as_ref(), token.as_deref())
            .send()
            .await?;

        if res.status() != StatusCode::UNAUTHORIZED {
            return Self::into_json(res).await;
        }

        debug!(path, "request unauthorized, refreshing before retry");
        let refreshed = self.coordinator.refresh().await?;
        let res = self
            .build_request(&method, path, body.as_ref(), Some(&refreshed))
            .send()
            .await?;
        Self::into_json(res).await
    }

    async fn into_json<T: DeserializeOwned>(res: Response) -> Result<T, ApiError> {
        let status = res.status();
        if status.is_success() {
            Ok(res.json().await?)
        } else {
            let message = res.text().await.unwrap_or_else(|_| status.to_string());
            Err(ApiError::from_status(status, message))
        }
    }
}
