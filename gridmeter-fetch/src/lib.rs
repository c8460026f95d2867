// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # Gridmeter Fetch
//!
//! HTTP plumbing for Gridmeter:
//!
//! - [`HttpClient`] - reqwest wrapper with an explicit per-request timeout
//! - [`FetchError`] - transport errors plus the status classification the
//!   refresh cycle depends on (401/403 as [`FetchError::Unauthorized`],
//!   429 as [`FetchError::RateLimited`])
//! - [`RetryStrategy`] - backoff schedule for callers that poll across
//!   cycles; never applied inside a single request
//!
//! A refresh cycle is one attempt per request. Retrying belongs to the
//! poll loop that schedules cycles, which is why this crate computes
//! delays but never sleeps.

pub mod client;
pub mod error;
pub mod retry;

pub use client::{classify_status, HttpClient};
pub use error::FetchError;
pub use retry::RetryStrategy;
