//! Core types and configuration for the pricewatch system.
//!
//! This crate provides shared types used by the validation engine:
//! - Daily price bars and repair logs
//! - Validation verdicts and failure reason codes
//! - Threshold configuration
//! - Common error types

pub mod config;
pub mod error;
pub mod types;

pub use config::Config;
pub use error::{Error, Result};
pub use types::*;
