//! Dominion Energy API transport.
//!
//! Endpoint and header details mirror the customer portal: every data
//! request carries the account number and a fixed action code, wears the
//! portal's browser headers, and is authorized by the bearer token from
//! the login flow.

use async_trait::async_trait;
use gridmeter_core::Credentials;
use gridmeter_fetch::{FetchError, HttpClient};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, ORIGIN, USER_AGENT};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, info, instrument};

use super::error::DominionError;
use super::session::Session;

// ============================================================================
// Constants
// ============================================================================

/// Common login page.
const LOGIN_URL: &str = "https://login.dominionenergy.com/CommonLogin";

/// OAuth2 password-grant token endpoint.
const TOKEN_URL: &str = "https://login.dominionenergy.com/oauth2/token";

/// Fallback JSON authentication endpoint.
const AUTHN_URL: &str = "https://login.dominionenergy.com/api/v1/authn";

/// API base for authenticated data requests.
const API_BASE_URL: &str = "https://prodsvc-dominioncip.smartcmobile.com/Service/api/1";

/// Data endpoints.
const BILL_FORECAST_ENDPOINT: &str = "/bill/billForecast";
const USAGE_HISTORY_ENDPOINT: &str = "/usage/usageHistory";
const BILL_HISTORY_ENDPOINT: &str = "/bill/billHistory";

/// Fixed action code the portal sends with every data request.
const ACTION_CODE: &str = "4";

/// Browser user agent the portal expects.
const PORTAL_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

// ============================================================================
// Raw Data
// ============================================================================

/// Raw responses from one fetch pass, before normalization.
#[derive(Debug, Clone)]
pub struct RawAccountData {
    /// `/bill/billForecast` body. Required; the cycle fails without it.
    pub bill_forecast: Value,
    /// `/usage/usageHistory` body, when the endpoint answered.
    pub usage_history: Option<Value>,
    /// `/bill/billHistory` body, when the endpoint answered.
    pub bill_history: Option<Value>,
}

// ============================================================================
// Transport Trait
// ============================================================================

/// Transport seam for the Dominion portal.
///
/// The refresh state machine is written against this trait so it can be
/// driven by a scripted transport in tests.
#[async_trait]
pub trait DominionApi: Send + Sync {
    /// Runs the login flow and returns a fresh session.
    async fn login(&self, credentials: &Credentials) -> Result<Session, DominionError>;

    /// Fetches the bill forecast for the account.
    async fn bill_forecast(
        &self,
        session: &Session,
        account_number: &str,
    ) -> Result<Value, DominionError>;

    /// Fetches daily usage history for the account.
    async fn usage_history(
        &self,
        session: &Session,
        account_number: &str,
    ) -> Result<Value, DominionError>;

    /// Fetches billing history for the account.
    async fn bill_history(
        &self,
        session: &Session,
        account_number: &str,
    ) -> Result<Value, DominionError>;
}

// ============================================================================
// HTTP Implementation
// ============================================================================

/// reqwest-backed transport against the production portal hosts.
#[derive(Debug, Clone)]
pub struct DominionApiClient {
    http: HttpClient,
}

impl DominionApiClient {
    /// Creates a transport with the default request timeout.
    pub fn new() -> Result<Self, FetchError> {
        Ok(Self {
            http: HttpClient::new()?,
        })
    }

    /// Creates a transport with a custom request timeout.
    pub fn with_timeout(timeout: Duration) -> Result<Self, FetchError> {
        Ok(Self {
            http: HttpClient::with_timeout(timeout)?,
        })
    }

    /// Fixed headers the portal expects on every request.
    fn portal_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("uid", HeaderValue::from_static("1"));
        headers.insert("pt", HeaderValue::from_static("1"));
        headers.insert("channel", HeaderValue::from_static("WEB"));
        headers.insert(
            ORIGIN,
            HeaderValue::from_static("https://myaccount.dominionenergy.com"),
        );
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(USER_AGENT, HeaderValue::from_static(PORTAL_USER_AGENT));
        headers
    }

    fn data_headers(session: &Session) -> Result<HeaderMap, DominionError> {
        let mut headers = Self::portal_headers();
        let auth = HeaderValue::from_str(&session.authorization())
            .map_err(|e| DominionError::Api(format!("session token is not a valid header: {e}")))?;
        headers.insert(AUTHORIZATION, auth);
        Ok(headers)
    }

    #[instrument(skip(self, session, account_number))]
    async fn data_request(
        &self,
        session: &Session,
        account_number: &str,
        endpoint: &str,
    ) -> Result<Value, DominionError> {
        let url = format!("{API_BASE_URL}{endpoint}");
        let query = [
            ("accountNumber", account_number),
            ("actionCode", ACTION_CODE),
        ];
        let headers = Self::data_headers(session)?;

        let body = self.http.get_json(&url, &query, headers).await?;
        check_envelope(&body)?;
        Ok(body)
    }
}

#[async_trait]
impl DominionApi for DominionApiClient {
    #[instrument(skip(self, credentials), fields(username = %credentials.username))]
    async fn login(&self, credentials: &Credentials) -> Result<Session, DominionError> {
        debug!("starting login flow");

        // The portal serves the login form first; a failure here means
        // the login host itself is unhealthy, not that the credentials
        // are wrong.
        let page = self
            .http
            .get(
                LOGIN_URL,
                &[("SelectedAppName", "Electric")],
                Self::portal_headers(),
            )
            .await?;
        if !page.status().is_success() {
            return Err(DominionError::Api(format!(
                "login page returned {}",
                page.status()
            )));
        }

        // OAuth2 password grant against the token endpoint.
        let form = [
            ("username", credentials.username.as_str()),
            ("password", credentials.password.as_str()),
            ("client_id", "CustomerPortal"),
            ("grant_type", "password"),
            ("scope", "openid profile email"),
        ];
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(USER_AGENT, HeaderValue::from_static(PORTAL_USER_AGENT));

        let response = self.http.post_form(TOKEN_URL, &form, headers).await?;
        if response.status().is_server_error() {
            return Err(DominionError::Api(format!(
                "token endpoint returned {}",
                response.status()
            )));
        }
        if response.status().is_success() {
            if let Ok(body) = response.json::<Value>().await {
                if let Some(token) = body.get("access_token").and_then(Value::as_str) {
                    info!("authenticated via OAuth token endpoint");
                    return Ok(Session::new(token));
                }
            }
        }

        // Fallback: JSON authentication exchanging a session token.
        let body = json!({
            "Email": credentials.username,
            "Password": credentials.password,
        });
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let response = self.http.post_json(AUTHN_URL, &body, headers).await?;
        if response.status().is_server_error() {
            return Err(DominionError::Api(format!(
                "authn endpoint returned {}",
                response.status()
            )));
        }
        if response.status().is_success() {
            if let Ok(body) = response.json::<Value>().await {
                if let Some(token) = body.get("sessionToken").and_then(Value::as_str) {
                    info!("authenticated via session token exchange");
                    return Ok(Session::new(format!("Bearer {token}")));
                }
            }
        }

        Err(DominionError::InvalidCredentials(
            "login rejected by both authentication endpoints".to_string(),
        ))
    }

    async fn bill_forecast(
        &self,
        session: &Session,
        account_number: &str,
    ) -> Result<Value, DominionError> {
        self.data_request(session, account_number, BILL_FORECAST_ENDPOINT)
            .await
    }

    async fn usage_history(
        &self,
        session: &Session,
        account_number: &str,
    ) -> Result<Value, DominionError> {
        self.data_request(session, account_number, USAGE_HISTORY_ENDPOINT)
            .await
    }

    async fn bill_history(
        &self,
        session: &Session,
        account_number: &str,
    ) -> Result<Value, DominionError> {
        self.data_request(session, account_number, BILL_HISTORY_ENDPOINT)
            .await
    }
}

// ============================================================================
// Response Envelope
// ============================================================================

/// The API reports failures inside a `status` envelope even on HTTP 200.
fn check_envelope(body: &Value) -> Result<(), DominionError> {
    let Some(status) = body.get("status") else {
        return Ok(());
    };

    match envelope_code(status) {
        Some(200) | None => Ok(()),
        Some(code) => {
            let message = status
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("unknown error");
            Err(DominionError::Api(format!("{message} (code {code})")))
        }
    }
}

/// The envelope code arrives as a number or a numeric string.
fn envelope_code(status: &Value) -> Option<i64> {
    match status.get("code") {
        Some(Value::Number(n)) => n.as_i64(),
        Some(Value::String(s)) => s.parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_ok_on_200() {
        let body = json!({"status": {"code": 200}, "data": {}});
        assert!(check_envelope(&body).is_ok());
    }

    #[test]
    fn test_envelope_ok_without_status() {
        let body = json!({"data": {}});
        assert!(check_envelope(&body).is_ok());
    }

    #[test]
    fn test_envelope_error_with_numeric_code() {
        let body = json!({"status": {"code": 500, "message": "internal failure"}});
        let err = check_envelope(&body).unwrap_err();
        assert!(err.to_string().contains("internal failure"));
    }

    #[test]
    fn test_envelope_error_with_string_code() {
        let body = json!({"status": {"code": "403", "message": "account locked"}});
        assert!(check_envelope(&body).is_err());
    }

    #[test]
    fn test_envelope_tolerates_garbage_code() {
        let body = json!({"status": {"code": "not-a-number"}});
        assert!(check_envelope(&body).is_ok());
    }

    #[test]
    fn test_portal_headers() {
        let headers = DominionApiClient::portal_headers();
        assert_eq!(headers.get("channel").unwrap(), "WEB");
        assert_eq!(headers.get("uid").unwrap(), "1");
        assert!(headers.get(USER_AGENT).is_some());
    }
}
