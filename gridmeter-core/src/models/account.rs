//! Account credentials.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Login credentials plus the account the data requests are scoped to.
///
/// Supplied by configuration and never derived. The provider validates
/// them only by attempting a login. `Debug` redacts the password so the
/// struct can appear in logs and error chains safely.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// Portal login name (usually an email address).
    pub username: String,
    /// Portal password.
    pub password: String,
    /// Utility account number.
    pub account_number: String,
}

impl Credentials {
    /// Creates a new set of credentials.
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        account_number: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            account_number: account_number.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("account_number", &self.account_number)
            .finish()
    }
}
