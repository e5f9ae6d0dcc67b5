use crate::catalog::Catalog;
use crate::error::{PinError, Result};
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::StatusCode;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "https://api.github.com";
const API_VERSION: &str = "2022-11-28";

/// Blocking GitHub REST client backing the [`Catalog`] capability.
pub struct GitHubClient {
    client: Client,
    base_url: String,
}

impl GitHubClient {
    /// Build a client rooted at `base_url`. Requests carry a bearer token when
    /// one is given and fail after `timeout`.
    pub fn new(base_url: &str, token: Option<&str>, timeout: Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "x-github-api-version",
            HeaderValue::from_static(API_VERSION),
        );
        if let Some(token) = token.filter(|t| !t.trim().is_empty()) {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token.trim()))
                .map_err(|e| PinError::Transport(format!("invalid token: {e}")))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let client = Client::builder()
            .user_agent(concat!("actpin/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .timeout(timeout.max(Duration::from_secs(1)))
            .build()
            .map_err(|e| PinError::Transport(format!("http client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

impl Catalog for GitHubClient {
    fn get(&self, path: &str) -> Result<serde_json::Value> {
        let url = self.url_for(path);
        tracing::debug!(%url, "GET");

        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|e| PinError::Transport(format!("GET {url}: {e}")))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(PinError::NotFound {
                path: path.to_string(),
            });
        }

        let body = response
            .text()
            .map_err(|e| PinError::Transport(format!("reading {url}: {e}")))?;

        if !status.is_success() {
            let message = serde_json::from_str::<serde_json::Value>(&body)
                .ok()
                .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
                .unwrap_or(body);
            return Err(PinError::Http {
                status: status.as_u16(),
                path: path.to_string(),
                message,
            });
        }

        serde_json::from_str(&body).map_err(|source| PinError::Decode {
            path: path.to_string(),
            source,
        })
    }
}
