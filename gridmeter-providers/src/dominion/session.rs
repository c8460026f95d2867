//! Session state for the Dominion portal.

use chrono::{DateTime, Duration, Utc};

/// An authenticated session: the bearer token from the login flow plus
/// when it was established.
///
/// Sessions are never persisted. The provider does not advertise a token
/// lifetime; expiry shows up as a 401 on a later data request, which
/// drops the session and triggers a single re-login in that cycle.
#[derive(Debug, Clone)]
pub struct Session {
    token: String,
    established_at: DateTime<Utc>,
}

impl Session {
    /// Wraps a token obtained from the login flow.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            established_at: Utc::now(),
        }
    }

    /// Value for the `Authorization` header.
    ///
    /// The session-token fallback already hands back a `Bearer` value;
    /// the OAuth endpoint hands back the bare token.
    pub fn authorization(&self) -> String {
        if self.token.starts_with("Bearer ") {
            self.token.clone()
        } else {
            format!("Bearer {}", self.token)
        }
    }

    /// When this session was established.
    pub fn established_at(&self) -> DateTime<Utc> {
        self.established_at
    }

    /// How long this session has been held.
    pub fn age(&self) -> Duration {
        Utc::now() - self.established_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authorization_adds_bearer_prefix() {
        let session = Session::new("abc123");
        assert_eq!(session.authorization(), "Bearer abc123");
    }

    #[test]
    fn test_authorization_keeps_existing_prefix() {
        let session = Session::new("Bearer abc123");
        assert_eq!(session.authorization(), "Bearer abc123");
    }

    #[test]
    fn test_fresh_session_has_small_age() {
        let session = Session::new("abc123");
        assert!(session.age() < Duration::seconds(5));
    }
}
