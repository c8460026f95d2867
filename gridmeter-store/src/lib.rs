// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # Gridmeter Store
//!
//! Configuration management for Gridmeter.
//!
//! The configuration lives in a single JSON file under the user config
//! directory. Credentials can be stored inline or resolved from an
//! environment variable, and the file is written with owner-only
//! permissions on Unix because it may contain a password.
//!
//! Snapshots are deliberately not persisted: consumers see the last
//! successful in-memory snapshot for the lifetime of the process and
//! nothing across restarts.

pub mod config;
pub mod error;

pub use config::{AccountConfig, Config, GeneralConfig, DEFAULT_REFRESH_INTERVAL_SECS};
pub use error::StoreError;
