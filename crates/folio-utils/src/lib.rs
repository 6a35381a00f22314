//! Shared utilities for folio-rs
//!
//! Environment-driven configuration and tracing setup used across the
//! workspace.

pub mod config;
pub mod logging;

pub use config::Config;
pub use logging::init_tracing;
