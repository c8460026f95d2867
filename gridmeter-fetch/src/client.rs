//! HTTP client abstractions.

use crate::error::FetchError;
use reqwest::header::{self, HeaderMap};
use reqwest::{Client, Response, StatusCode};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Thin reqwest wrapper with an explicit per-request timeout.
///
/// Every call is a single attempt. The raw methods surface the response
/// unclassified for flows that inspect statuses themselves (the login
/// sequence); [`HttpClient::get_json`] classifies rejection statuses
/// before parsing and is what data requests go through.
#[derive(Debug, Clone)]
pub struct HttpClient {
    inner: Client,
}

impl HttpClient {
    /// Creates a new HTTP client with the default timeout.
    pub fn new() -> Result<Self, FetchError> {
        Self::with_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Creates a new HTTP client with a custom timeout.
    pub fn with_timeout(timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("gridmeter/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { inner: client })
    }

    /// Performs a GET request, returning the response unclassified.
    pub async fn get(
        &self,
        url: &str,
        query: &[(&str, &str)],
        headers: HeaderMap,
    ) -> Result<Response, FetchError> {
        debug!(url = %url, "GET request");
        self.inner
            .get(url)
            .query(query)
            .headers(headers)
            .send()
            .await
            .map_err(FetchError::from_transport)
    }

    /// Performs a form-encoded POST request, returning the response
    /// unclassified.
    pub async fn post_form(
        &self,
        url: &str,
        form: &[(&str, &str)],
        headers: HeaderMap,
    ) -> Result<Response, FetchError> {
        debug!(url = %url, "POST form request");
        self.inner
            .post(url)
            .headers(headers)
            .form(form)
            .send()
            .await
            .map_err(FetchError::from_transport)
    }

    /// Performs a JSON POST request, returning the response unclassified.
    pub async fn post_json(
        &self,
        url: &str,
        body: &Value,
        headers: HeaderMap,
    ) -> Result<Response, FetchError> {
        debug!(url = %url, "POST json request");
        self.inner
            .post(url)
            .headers(headers)
            .json(body)
            .send()
            .await
            .map_err(FetchError::from_transport)
    }

    /// Performs a GET request expecting a JSON body, classifying
    /// authorization and rate-limit statuses before parsing.
    pub async fn get_json(
        &self,
        url: &str,
        query: &[(&str, &str)],
        headers: HeaderMap,
    ) -> Result<Value, FetchError> {
        let response = self.get(url, query, headers).await?;
        let response = classify_status(response)?;
        let body = response.text().await.map_err(FetchError::from_transport)?;
        Ok(serde_json::from_str(&body)?)
    }
}

/// Maps rejection statuses onto the fetch error taxonomy.
///
/// 401/403 become [`FetchError::Unauthorized`] so callers can invalidate
/// their session; 429 carries the `Retry-After` header value when present.
pub fn classify_status(response: Response) -> Result<Response, FetchError> {
    let status = response.status();

    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(FetchError::Unauthorized);
    }

    if status == StatusCode::TOO_MANY_REQUESTS {
        let retry_after = response
            .headers()
            .get(header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok());
        return Err(FetchError::RateLimited { retry_after });
    }

    if !status.is_success() {
        return Err(FetchError::InvalidResponse(format!(
            "unexpected status code: {status}"
        )));
    }

    Ok(response)
}
