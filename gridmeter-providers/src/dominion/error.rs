//! Dominion-specific errors.

use gridmeter_core::CoreError;
use gridmeter_fetch::FetchError;
use thiserror::Error;

/// Errors from the Dominion Energy client.
#[derive(Debug, Error)]
pub enum DominionError {
    /// The provider rejected the configured credentials. Requires
    /// operator reconfiguration; never auto-retried.
    #[error("invalid credentials: {0}")]
    InvalidCredentials(String),

    /// A data request was rejected with 401/403. Handled internally with
    /// a single re-login per refresh cycle.
    #[error("session rejected by provider")]
    Unauthorized,

    /// Rate limited by the provider.
    #[error("rate limited, retry after {retry_after:?} seconds")]
    RateLimited {
        /// Seconds to wait before retrying, if the provider said.
        retry_after: Option<u64>,
    },

    /// The API answered with an error status or error envelope.
    #[error("API error: {0}")]
    Api(String),

    /// Transport-level failure (connect, TLS, timeout).
    #[error("transport error: {0}")]
    Transport(String),

    /// The response could not be normalized into a snapshot.
    #[error("unparsable response: {0}")]
    Parse(String),
}

impl DominionError {
    /// Fatal errors require operator action; everything else is eligible
    /// for the next scheduled cycle.
    pub fn is_fatal(&self) -> bool {
        matches!(self, DominionError::InvalidCredentials(_))
    }
}

impl From<FetchError> for DominionError {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::Unauthorized => DominionError::Unauthorized,
            FetchError::RateLimited { retry_after } => DominionError::RateLimited { retry_after },
            FetchError::Json(e) => DominionError::Parse(e.to_string()),
            FetchError::InvalidResponse(msg) => DominionError::Api(msg),
            FetchError::Timeout => DominionError::Transport("request timed out".to_string()),
            FetchError::Http(e) => DominionError::Transport(e.to_string()),
        }
    }
}

impl From<DominionError> for CoreError {
    fn from(err: DominionError) -> Self {
        match err {
            DominionError::InvalidCredentials(msg) => CoreError::InvalidCredentials(msg),
            DominionError::Parse(msg) => CoreError::InvalidData(msg),
            other => CoreError::Transient(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_bad_credentials_are_fatal() {
        assert!(DominionError::InvalidCredentials("rejected".into()).is_fatal());

        assert!(!DominionError::Unauthorized.is_fatal());
        assert!(!DominionError::RateLimited { retry_after: None }.is_fatal());
        assert!(!DominionError::Api("boom".into()).is_fatal());
        assert!(!DominionError::Transport("reset".into()).is_fatal());
        assert!(!DominionError::Parse("garbage".into()).is_fatal());
    }

    #[test]
    fn test_core_error_mapping_preserves_fatality() {
        let fatal: CoreError = DominionError::InvalidCredentials("rejected".into()).into();
        assert!(fatal.is_fatal());

        let parse: CoreError = DominionError::Parse("garbage".into()).into();
        assert!(matches!(parse, CoreError::InvalidData(_)));
        assert!(!parse.is_fatal());

        let transient: CoreError = DominionError::Unauthorized.into();
        assert!(!transient.is_fatal());
    }

    #[test]
    fn test_fetch_error_mapping() {
        assert!(matches!(
            DominionError::from(FetchError::Unauthorized),
            DominionError::Unauthorized
        ));
        assert!(matches!(
            DominionError::from(FetchError::RateLimited {
                retry_after: Some(30)
            }),
            DominionError::RateLimited {
                retry_after: Some(30)
            }
        ));
        assert!(matches!(
            DominionError::from(FetchError::Timeout),
            DominionError::Transport(_)
        ));
    }
}
