//! Trait definitions for Gridmeter.
//!
//! This module defines the contract that provider clients must satisfy.

use crate::error::CoreError;
use crate::models::UsageSnapshot;

/// A polled source of usage and billing data for one utility account.
///
/// Implementors own the two pieces of mutable state in the system, the
/// authentication session and the cached snapshot, and are responsible
/// for:
/// - Authenticating with the provider when no valid session is held
/// - Fetching and normalizing the account data
/// - Replacing the cached snapshot only after a fully successful parse
///
/// `refresh` takes `&mut self`, so two cycles for the same account can
/// never overlap. Scheduling is the caller's job; an implementation must
/// never sleep or self-schedule between cycles.
pub trait EnergySource {
    /// Display name of the backing provider.
    fn display_name(&self) -> &str;

    /// The account this source is scoped to.
    fn account_number(&self) -> &str;

    /// Runs one refresh cycle: authenticate if needed, fetch, normalize,
    /// and replace the cached snapshot.
    ///
    /// A failed cycle of any kind leaves the cached snapshot untouched.
    /// [`CoreError::is_fatal`] tells the caller whether retrying on the
    /// next scheduled cycle is worthwhile.
    fn refresh(&mut self) -> impl std::future::Future<Output = Result<(), CoreError>> + Send;

    /// Returns the snapshot from the last successful cycle, if any.
    fn latest(&self) -> Option<&UsageSnapshot>;

    /// Checks whether the configured credentials work by logging in and
    /// issuing one data request.
    fn validate_credentials(
        &mut self,
    ) -> impl std::future::Future<Output = Result<(), CoreError>> + Send;
}
