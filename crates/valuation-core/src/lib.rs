//! Industry valuation comparison
//!
//! This crate answers "how does company X's valuation compare to its
//! industry peers?". It includes:
//!
//! - A ratio aggregator that averages bulk TTM ratios across up to 50 peers
//! - An expiring per-industry cache (12 hours by default) with optional
//!   on-disk snapshots
//! - Metric-by-metric classification of a company against its industry
//! - FinancialModelingPrep and Yahoo Finance clients behind source traits
//! - A plain-text report and command parser for chat-style front-ends
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use valuation_core::{CompareConfig, FmpClient, IndustryAverages};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = CompareConfig::builder().with_env().build()?;
//!     let source = Arc::new(FmpClient::from_config(&config)?);
//!     let averages = IndustryAverages::from_config(source, &config);
//!
//!     let software = averages.get_or_compute("Software—Application").await?;
//!     println!("{:?}", software.ratios);
//!     Ok(())
//! }
//! ```

pub mod aggregator;
pub mod api;
pub mod averages;
pub mod cache;
pub mod commands;
pub mod compare;
pub mod config;
pub mod error;
pub mod model;
pub mod report;
pub mod service;
pub mod store;

// Re-export main types for convenience
pub use aggregator::RatioAggregator;
pub use api::{CompanySource, FmpClient, FmpCompanySource, PeerSource, YahooFinanceClient};
pub use averages::IndustryAverages;
pub use cache::{AveragesCache, CacheEntry, Clock, ManualClock, SystemClock};
pub use commands::Command;
pub use compare::{Classification, Comparison, ComparisonRow};
pub use config::CompareConfig;
pub use error::{CompareError, Result};
pub use model::{CompanyRatios, IndustryAverage, Metric, PeerRecord, RatioSet};
pub use service::{ComparisonService, Reply};
pub use store::SnapshotStore;
