// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # Gridmeter Core
//!
//! Core types, models, and traits for the Gridmeter workspace.
//!
//! This crate provides the foundational abstractions used across all other
//! Gridmeter crates:
//!
//! - Domain models (account credentials, usage snapshots)
//! - The shared [`CoreError`] taxonomy with its fatal/retryable split
//! - The [`EnergySource`] trait that provider clients implement
//!
//! ## Key Types
//!
//! - [`Credentials`] - Login credentials plus the scoped account number
//! - [`UsageSnapshot`] - The normalized result of one successful refresh
//!   cycle; every value field is optional
//! - [`CoreError`] - Cross-crate error taxonomy; [`CoreError::is_fatal`]
//!   decides whether the host scheduler may retry

pub mod error;
pub mod models;
pub mod traits;

// Re-export error types
pub use error::CoreError;

// Re-export all model types
pub use models::{Credentials, UsageSnapshot};

// Re-export traits
pub use traits::EnergySource;
