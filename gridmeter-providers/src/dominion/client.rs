//! Refresh orchestration and the snapshot cache.

use chrono::Utc;
use gridmeter_core::{CoreError, Credentials, EnergySource, UsageSnapshot};
use std::time::Duration;
use tracing::{debug, info, instrument};

use super::api::{DominionApi, DominionApiClient, RawAccountData};
use super::error::DominionError;
use super::parser::normalize;
use super::session::Session;

/// Provider display name.
const DISPLAY_NAME: &str = "Dominion Energy";

/// Session-authenticated polling client for one Dominion Energy account.
///
/// Holds the only two pieces of mutable state in the system: the current
/// session and the latest successfully normalized snapshot. `refresh`
/// takes `&mut self`, so cycles for the same account cannot overlap; one
/// client is created per configured account, never shared.
#[derive(Debug)]
pub struct DominionClient<A = DominionApiClient> {
    api: A,
    credentials: Credentials,
    session: Option<Session>,
    latest: Option<UsageSnapshot>,
}

impl DominionClient<DominionApiClient> {
    /// Creates a client against the production portal.
    pub fn new(credentials: Credentials) -> Result<Self, DominionError> {
        Ok(Self::with_api(DominionApiClient::new()?, credentials))
    }

    /// Creates a client against the production portal with a custom
    /// request timeout.
    pub fn with_timeout(
        credentials: Credentials,
        timeout: Duration,
    ) -> Result<Self, DominionError> {
        Ok(Self::with_api(
            DominionApiClient::with_timeout(timeout)?,
            credentials,
        ))
    }
}

impl<A: DominionApi> DominionClient<A> {
    /// Creates a client over a custom transport.
    pub fn with_api(api: A, credentials: Credentials) -> Self {
        Self {
            api,
            credentials,
            session: None,
            latest: None,
        }
    }

    /// Returns the snapshot from the last successful cycle, if any.
    pub fn latest(&self) -> Option<&UsageSnapshot> {
        self.latest.as_ref()
    }

    /// Returns true if a session is currently held.
    pub fn has_session(&self) -> bool {
        self.session.is_some()
    }

    /// Runs one refresh cycle.
    ///
    /// When a data request is rejected with 401/403, the held session is
    /// dropped and the cycle re-authenticates and refetches exactly once;
    /// a second rejection ends the cycle. A failure of any kind leaves
    /// the cached snapshot exactly as it was.
    #[instrument(skip(self), fields(account = %self.credentials.account_number))]
    pub async fn refresh(&mut self) -> Result<(), DominionError> {
        self.ensure_session().await?;

        let raw = match self.fetch_raw().await {
            Ok(raw) => raw,
            Err(DominionError::Unauthorized) => {
                debug!("session rejected, re-authenticating once");
                self.session = None;
                self.ensure_session().await?;
                self.fetch_raw().await?
            }
            Err(err) => return Err(err),
        };

        let snapshot = normalize(&raw, Utc::now())?;
        info!(
            consumption = ?snapshot.grid_consumption_kwh,
            bill = ?snapshot.current_bill,
            "refresh cycle succeeded"
        );
        self.latest = Some(snapshot);
        Ok(())
    }

    /// Logs in and issues one data request to prove the credentials work.
    ///
    /// A data-side failure after a successful login does not condemn the
    /// credentials; only an immediate session rejection does.
    pub async fn validate_credentials(&mut self) -> Result<(), DominionError> {
        self.session = None;
        self.ensure_session().await?;
        let session = self.session.as_ref().ok_or(DominionError::Unauthorized)?;

        match self
            .api
            .bill_forecast(session, &self.credentials.account_number)
            .await
        {
            Ok(_) => Ok(()),
            Err(DominionError::Unauthorized) => Err(DominionError::InvalidCredentials(
                "session rejected immediately after login".to_string(),
            )),
            Err(err) => {
                debug!(error = %err, "data request failed during validation, credentials accepted");
                Ok(())
            }
        }
    }

    async fn ensure_session(&mut self) -> Result<(), DominionError> {
        if self.session.is_none() {
            debug!("no session held, logging in");
            let session = self.api.login(&self.credentials).await?;
            self.session = Some(session);
        }
        Ok(())
    }

    async fn fetch_raw(&self) -> Result<RawAccountData, DominionError> {
        let session = self.session.as_ref().ok_or(DominionError::Unauthorized)?;
        let account = self.credentials.account_number.as_str();

        let bill_forecast = self.api.bill_forecast(session, account).await?;

        // The history endpoints enrich the snapshot but never fail the
        // cycle, except for an authorization rejection which is handled
        // like any other.
        let usage_history = match self.api.usage_history(session, account).await {
            Ok(body) => Some(body),
            Err(DominionError::Unauthorized) => return Err(DominionError::Unauthorized),
            Err(err) => {
                debug!(error = %err, "usage history unavailable");
                None
            }
        };
        let bill_history = match self.api.bill_history(session, account).await {
            Ok(body) => Some(body),
            Err(DominionError::Unauthorized) => return Err(DominionError::Unauthorized),
            Err(err) => {
                debug!(error = %err, "bill history unavailable");
                None
            }
        };

        Ok(RawAccountData {
            bill_forecast,
            usage_history,
            bill_history,
        })
    }
}

impl<A: DominionApi> EnergySource for DominionClient<A> {
    fn display_name(&self) -> &str {
        DISPLAY_NAME
    }

    fn account_number(&self) -> &str {
        &self.credentials.account_number
    }

    fn refresh(&mut self) -> impl std::future::Future<Output = Result<(), CoreError>> + Send {
        async move { DominionClient::refresh(self).await.map_err(CoreError::from) }
    }

    fn latest(&self) -> Option<&UsageSnapshot> {
        DominionClient::latest(self)
    }

    fn validate_credentials(
        &mut self,
    ) -> impl std::future::Future<Output = Result<(), CoreError>> + Send {
        async move {
            DominionClient::validate_credentials(self)
                .await
                .map_err(CoreError::from)
        }
    }
}
