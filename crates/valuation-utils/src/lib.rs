//! Shared utilities for the valuation workspace
//!
//! This crate provides common functionality used across the workspace,
//! including logging setup and application-level settings.

pub mod config;
pub mod logging;

pub use config::AppConfig;
pub use logging::{init_tracing, init_tracing_with};
