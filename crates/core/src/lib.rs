//! Core types and configuration for the cardfolio system.
//!
//! This crate provides shared types used across all other crates:
//! - Holding and reference row types (raw and enriched)
//! - Canonical value and classification types
//! - Configuration structures
//! - Common error types and logging setup

pub mod config;
pub mod error;
pub mod logging;
pub mod types;

pub use config::Config;
pub use error::{Error, Result};
pub use types::*;
