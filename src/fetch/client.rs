//! HTTP fetcher implementation using reqwest.

use super::{FetchConfig, FetchRequest, FetchResponse, Fetcher};
use crate::error::FetchError;
use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use serde_json::Value;

/// Tracing target for HTTP fetch operations.
pub const TRACING_TARGET: &str = "jsonflow::fetch";

/// A [`Fetcher`] that issues real HTTP requests.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    http: Client,
    config: FetchConfig,
}

impl HttpFetcher {
    /// Creates a fetcher with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be created.
    pub fn new(config: FetchConfig) -> Result<Self, FetchError> {
        let mut builder = Client::builder().user_agent(config.effective_user_agent());
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(FetchError::Client)?;

        tracing::debug!(
            target: TRACING_TARGET,
            timeout_ms = config.timeout.map(|t| t.as_millis() as u64),
            "Created HTTP fetcher"
        );

        Ok(Self { http, config })
    }

    pub fn with_defaults() -> Result<Self, FetchError> {
        Self::new(FetchConfig::default())
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, request: FetchRequest) -> Result<FetchResponse, FetchError> {
        tracing::debug!(
            target: TRACING_TARGET,
            method = %request.method,
            url = %request.url,
            has_body = request.body.is_some(),
            "Sending request"
        );

        let mut http_request = self
            .http
            .request(request.method.as_reqwest(), request.url.as_str());
        if let Some(body) = &request.body {
            let payload = serde_json::to_vec(body).map_err(|source| FetchError::InvalidJson {
                status: 0,
                source,
            })?;
            http_request = http_request
                .header(CONTENT_TYPE, "application/json")
                .body(payload);
        }

        let response = http_request.send().await?;
        let status = response.status().as_u16();
        let bytes = response.bytes().await?;

        let body = if bytes.iter().all(u8::is_ascii_whitespace) {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .map_err(|source| FetchError::InvalidJson { status, source })?
        };

        tracing::debug!(
            target: TRACING_TARGET,
            url = %request.url,
            status,
            "Received response"
        );

        Ok(FetchResponse { status, body })
    }
}
