//! Dominion Energy provider implementation.
//!
//! Dominion exposes its customer portal as a session-authenticated JSON
//! API: an OAuth password grant (with a session-token fallback) produces
//! a bearer token, and data requests carry the account number plus a
//! fixed action code.

pub mod api;
pub mod client;
pub mod error;
pub mod parser;
pub mod session;

pub use api::{DominionApi, DominionApiClient, RawAccountData};
pub use client::DominionClient;
pub use error::DominionError;
pub use session::Session;
