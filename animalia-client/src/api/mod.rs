use crate::error::{ClientError, Result};
use reqwest::{Method, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use std::{fmt::Debug, sync::Arc};
use tracing::{debug, warn};

pub mod auth;
mod json;
mod routes;

pub use auth::{NoAuth, TokenCell, TokenSource};
pub use routes::users::ProfileUpdate;

/// Thin typed wrapper around the Animalia HTTP API.
///
/// Every endpoint lives in `routes`, grouped by resource. Paths are resolved relative to the
/// base URL, so a base of `https://api.example/prod/` keeps its `/prod` prefix.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    tokens: Arc<dyn TokenSource>,
}

impl Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    #[must_use]
    pub fn new(base_url: Url, tokens: Arc<dyn TokenSource>) -> Self {
        Self::with_http(reqwest::Client::new(), base_url, tokens)
    }

    #[must_use]
    pub fn with_http(
        http: reqwest::Client,
        mut base_url: Url,
        tokens: Arc<dyn TokenSource>,
    ) -> Self {
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Self {
            http,
            base_url,
            tokens,
        }
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Starts a request, attaching the bearer token when one is available.
    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.http.request(method, self.url(path));
        match self.tokens.access_token() {
            Some(token) => builder.bearer_auth(token.as_str()),
            None => builder,
        }
    }

    async fn execute(&self, path: &str, builder: RequestBuilder) -> Result<reqwest::Response> {
        let response = builder.send().await.map_err(|source| ClientError::Network {
            path: path.to_owned(),
            source,
        })?;

        let status = response.status();
        debug!(path, %status, "API response");

        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            warn!(path, %status, %body, "API request failed");
            return Err(ClientError::Status {
                path: path.to_owned(),
                status,
                body,
            });
        }

        Ok(response)
    }

    /// Sends the request and decodes a JSON body of type `T`.
    async fn send<T: DeserializeOwned>(&self, path: &str, builder: RequestBuilder) -> Result<T> {
        let response = self.execute(path, builder).await?;
        let bytes = response.bytes().await.map_err(|source| ClientError::Network {
            path: path.to_owned(),
            source,
        })?;

        json::decode(path, &bytes)
    }

    /// Sends the request and discards whatever body comes back.
    async fn send_ignoring_body(&self, path: &str, builder: RequestBuilder) -> Result<()> {
        self.execute(path, builder).await.map(drop)
    }
}
