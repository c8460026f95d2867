// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # Gridmeter Providers
//!
//! Provider-specific implementations for Gridmeter.
//!
//! One provider is supported today, Dominion Energy. The module splits
//! along the refresh cycle:
//!
//! - **api**: the transport trait and its reqwest implementation against
//!   the customer portal endpoints
//! - **session**: the bearer-token session produced by the login flow
//! - **parser**: lenient normalization of raw responses into a
//!   [`gridmeter_core::UsageSnapshot`]
//! - **client**: the refresh state machine and the snapshot cache
//!
//! ## Usage
//!
//! ```ignore
//! use gridmeter_core::Credentials;
//! use gridmeter_providers::DominionClient;
//!
//! let credentials = Credentials::new("user@example.com", "secret", "1234567890");
//! let mut client = DominionClient::new(credentials)?;
//! client.refresh().await?;
//! if let Some(snapshot) = client.latest() {
//!     println!("{:?} kWh", snapshot.grid_consumption_kwh);
//! }
//! ```

pub mod dominion;

// Re-export key types
pub use dominion::{
    DominionApi, DominionApiClient, DominionClient, DominionError, RawAccountData, Session,
};
