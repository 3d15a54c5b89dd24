//! HTTP client wrapper for JSON REST calls.

use super::error::{Error, format_api_error};
use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use serde::{Serialize, de::DeserializeOwned};
use std::time::Duration;

/// Connection timeout.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Authentication attached to a single request.
#[derive(Clone)]
pub enum AuthConfig {
    /// Bearer token authentication (Authorization: Bearer {token}).
    Bearer(String),
    /// Custom header authentication (e.g., Ocp-Apim-Subscription-Key: {key}).
    ApiKey { header: String, key: String },
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bearer(_) => f.debug_tuple("Bearer").field(&"[REDACTED]").finish(),
            Self::ApiKey { header, .. } => f
                .debug_struct("ApiKey")
                .field("header", header)
                .field("key", &"[REDACTED]")
                .finish(),
        }
    }
}

/// Status and raw body of a completed request.
///
/// Callers decide which status counts as success; DirectLine uses 200 for
/// most calls but 201 for opening a conversation.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub body: String,
}

impl HttpResponse {
    /// Whether the response carries exactly `status`.
    #[must_use]
    pub fn is(&self, status: StatusCode) -> bool {
        self.status == status
    }

    /// Deserialize the body into a typed record.
    pub fn decode<R: DeserializeOwned>(&self) -> Result<R, serde_json::Error> {
        serde_json::from_str(&self.body)
    }

    /// Human-readable description of a failed response.
    #[must_use]
    pub fn error_message(&self) -> String {
        format_api_error(self.status, &self.body)
    }
}

/// HTTP client bound to one service base URL.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpClient {
    /// Create a new HTTP client with the given total request timeout.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        let base_url: String = base_url.into();
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build headers including authentication.
    fn build_headers(auth: &AuthConfig, json_body: bool) -> Result<HeaderMap, Error> {
        let mut headers = HeaderMap::new();
        if json_body {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }

        match auth {
            AuthConfig::Bearer(token) => {
                let value = HeaderValue::from_str(&format!("Bearer {token}")).map_err(|_| {
                    Error::InvalidHeader("Bearer token contains invalid header characters".into())
                })?;
                headers.insert(AUTHORIZATION, value);
            }
            AuthConfig::ApiKey { header, key } => {
                let name = HeaderName::try_from(header.as_str())
                    .map_err(|_| Error::InvalidHeader("API key header name is invalid".into()))?;
                let value = HeaderValue::from_str(key).map_err(|_| {
                    Error::InvalidHeader("API key contains invalid header characters".into())
                })?;
                headers.insert(name, value);
            }
        }

        Ok(headers)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// POST a JSON body.
    pub async fn post_json<T: Serialize + ?Sized>(
        &self,
        path: &str,
        auth: &AuthConfig,
        body: &T,
    ) -> Result<HttpResponse, Error> {
        let url = self.url(path);
        let headers = Self::build_headers(auth, true)?;
        tracing::debug!("POST {url}");

        let response = self
            .client
            .post(&url)
            .headers(headers)
            .json(body)
            .send()
            .await?;

        Self::read(response).await
    }

    /// POST without a body.
    pub async fn post_empty(&self, path: &str, auth: &AuthConfig) -> Result<HttpResponse, Error> {
        let url = self.url(path);
        let headers = Self::build_headers(auth, false)?;
        tracing::debug!("POST {url}");

        let response = self.client.post(&url).headers(headers).send().await?;

        Self::read(response).await
    }

    /// GET with query parameters.
    pub async fn get(
        &self,
        path: &str,
        auth: &AuthConfig,
        query: &[(&str, &str)],
    ) -> Result<HttpResponse, Error> {
        let url = self.url(path);
        let headers = Self::build_headers(auth, false)?;
        tracing::debug!("GET {url} query={query:?}");

        let response = self
            .client
            .get(&url)
            .headers(headers)
            .query(query)
            .send()
            .await?;

        Self::read(response).await
    }

    async fn read(response: reqwest::Response) -> Result<HttpResponse, Error> {
        let status = response.status();
        let body = response.text().await?;
        tracing::debug!(status = status.as_u16(), bytes = body.len(), "response received");
        Ok(HttpResponse { status, body })
    }
}
