//! Configuration management.
//!
//! The poll interval defaults to 12 hours. Dominion refreshes usage data
//! roughly once a day and rate-limits aggressive pollers, so operators
//! lowering the interval should do so deliberately; the value is
//! documented but not enforced as a minimum.

use crate::error::StoreError;
use gridmeter_core::Credentials;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Default poll interval in seconds (12 hours; the provider updates data
/// once daily).
pub const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 43_200;

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,
    /// The monitored account.
    #[serde(default)]
    pub account: AccountConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Seconds between refresh cycles in watch mode.
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval: u64,
    /// Per-request timeout in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,
    /// Log level filter used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Account credentials configuration.
///
/// The password can be stored inline or resolved from the environment
/// variable named by `password_env`; the environment wins when both are
/// set so the file can stay free of secrets.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AccountConfig {
    /// Portal login name.
    #[serde(default)]
    pub username: String,
    /// Inline password. Prefer `password_env`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// Name of an environment variable holding the password.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_env: Option<String>,
    /// Utility account number.
    #[serde(default)]
    pub account_number: String,
}

fn default_refresh_interval() -> u64 {
    DEFAULT_REFRESH_INTERVAL_SECS
}

fn default_request_timeout() -> u64 {
    30
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            refresh_interval: default_refresh_interval(),
            request_timeout: default_request_timeout(),
            log_level: default_log_level(),
        }
    }
}

impl AccountConfig {
    /// Resolves the configured credentials.
    pub fn credentials(&self) -> Result<Credentials, StoreError> {
        if self.username.is_empty() {
            return Err(StoreError::Config("account username is not set".into()));
        }
        if self.account_number.is_empty() {
            return Err(StoreError::Config("account number is not set".into()));
        }

        let password = self
            .password_env
            .as_deref()
            .and_then(|var| std::env::var(var).ok())
            .or_else(|| self.password.clone())
            .ok_or_else(|| StoreError::MissingCredential("password".to_string()))?;

        Ok(Credentials::new(
            &self.username,
            password,
            &self.account_number,
        ))
    }
}

impl Config {
    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("gridmeter")
            .join("config.json")
    }

    /// Loads configuration from the default path.
    pub fn load() -> Result<Self, StoreError> {
        Self::load_from(&Self::default_path())
    }

    /// Loads configuration from a specific path.
    ///
    /// A missing file yields the defaults; the caller finds out via
    /// [`AccountConfig::credentials`] that nothing is configured yet.
    pub fn load_from(path: &Path) -> Result<Self, StoreError> {
        if !path.exists() {
            debug!(path = %path.display(), "config file not found, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;

        info!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Saves configuration to the default path.
    pub fn save(&self) -> Result<(), StoreError> {
        self.save_to(&Self::default_path())
    }

    /// Saves configuration to a specific path with owner-only permissions
    /// on Unix.
    pub fn save_to(&self, path: &Path) -> Result<(), StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        set_restrictive_permissions(path)?;

        info!(path = %path.display(), "saved configuration");
        Ok(())
    }

    /// Returns a copy with the inline password masked, for display.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if copy.account.password.is_some() {
            copy.account.password = Some("<redacted>".to_string());
        }
        copy
    }
}

/// The config file may contain a password; keep it owner-readable only.
#[cfg(unix)]
fn set_restrictive_permissions(path: &Path) -> Result<(), StoreError> {
    use std::os::unix::fs::PermissionsExt;

    let mut perms = std::fs::metadata(path)?.permissions();
    perms.set_mode(0o600);
    std::fs::set_permissions(path, perms)?;
    Ok(())
}

#[cfg(not(unix))]
fn set_restrictive_permissions(_path: &Path) -> Result<(), StoreError> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.general.refresh_interval, 43_200);
        assert_eq!(config.general.request_timeout, 30);
        assert_eq!(config.general.log_level, "info");
        assert!(config.account.username.is_empty());
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("missing.json")).unwrap();
        assert_eq!(config.general.refresh_interval, 43_200);
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = Config::default();
        config.general.refresh_interval = 3600;
        config.account.username = "user@example.com".to_string();
        config.account.password = Some("hunter2".to_string());
        config.account.account_number = "1234567890".to_string();
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.general.refresh_interval, 3600);
        assert_eq!(loaded.account.username, "user@example.com");
        assert_eq!(loaded.account.password.as_deref(), Some("hunter2"));
    }

    #[cfg(unix)]
    #[test]
    fn test_saved_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        Config::default().save_to(&path).unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_credentials_from_inline_password() {
        let account = AccountConfig {
            username: "user@example.com".to_string(),
            password: Some("hunter2".to_string()),
            password_env: None,
            account_number: "1234567890".to_string(),
        };

        let creds = account.credentials().unwrap();
        assert_eq!(creds.password, "hunter2");
        assert_eq!(creds.account_number, "1234567890");
    }

    #[test]
    fn test_credentials_prefer_environment() {
        let account = AccountConfig {
            username: "user@example.com".to_string(),
            password: Some("stale".to_string()),
            password_env: Some("GRIDMETER_TEST_PASSWORD_PREFER".to_string()),
            account_number: "1234567890".to_string(),
        };

        // SAFETY: var name is unique to this test.
        unsafe { std::env::set_var("GRIDMETER_TEST_PASSWORD_PREFER", "from-env") };
        let creds = account.credentials().unwrap();
        unsafe { std::env::remove_var("GRIDMETER_TEST_PASSWORD_PREFER") };

        assert_eq!(creds.password, "from-env");
    }

    #[test]
    fn test_credentials_fall_back_to_inline_when_env_unset() {
        let account = AccountConfig {
            username: "user@example.com".to_string(),
            password: Some("hunter2".to_string()),
            password_env: Some("GRIDMETER_TEST_PASSWORD_UNSET".to_string()),
            account_number: "1234567890".to_string(),
        };

        let creds = account.credentials().unwrap();
        assert_eq!(creds.password, "hunter2");
    }

    #[test]
    fn test_credentials_errors() {
        let account = AccountConfig::default();
        assert!(matches!(
            account.credentials(),
            Err(StoreError::Config(_))
        ));

        let account = AccountConfig {
            username: "user@example.com".to_string(),
            password: None,
            password_env: None,
            account_number: "1234567890".to_string(),
        };
        assert!(matches!(
            account.credentials(),
            Err(StoreError::MissingCredential(_))
        ));
    }

    #[test]
    fn test_redacted_masks_password() {
        let mut config = Config::default();
        config.account.password = Some("hunter2".to_string());

        let redacted = config.redacted();
        assert_eq!(redacted.account.password.as_deref(), Some("<redacted>"));
    }
}
