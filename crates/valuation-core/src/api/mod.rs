//! Data source traits and their HTTP-backed clients

pub mod company;
pub mod fmp;
pub mod yahoo;

use async_trait::async_trait;

use crate::error::Result;
use crate::model::{CompanyRatios, PeerRecord};

pub use company::FmpCompanySource;
pub use fmp::FmpClient;
pub use yahoo::YahooFinanceClient;

/// Peer list and bulk ratio provider for an industry
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PeerSource: Send + Sync {
    /// Up to `limit` peer identifiers reported for `industry`
    async fn list_peers(&self, industry: &str, limit: usize) -> Result<Vec<String>>;

    /// Raw TTM ratio rows for the given identifiers, fetched in one call
    async fn bulk_ratios(&self, symbols: &[String]) -> Result<Vec<PeerRecord>>;
}

/// Per-company ratio provider
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CompanySource: Send + Sync {
    /// Valuation ratios, price data and industry label for one ticker
    async fn company_ratios(&self, ticker: &str) -> Result<CompanyRatios>;
}
