//! Yahoo Finance API client

use crate::error::{CompareError, Result};
use yahoo_finance_api as yahoo;

const PROVIDER: &str = "Yahoo Finance";

/// Yahoo Finance API client
#[derive(Debug, Clone, Default)]
pub struct YahooFinanceClient {}

impl YahooFinanceClient {
    /// Create a new Yahoo Finance client
    pub fn new() -> Self {
        Self {}
    }

    /// Latest daily close for a symbol
    pub async fn last_close(&self, symbol: &str) -> Result<f64> {
        let provider = yahoo::YahooConnector::new()
            .map_err(|e| CompareError::unavailable(PROVIDER, e.to_string()))?;

        let response = provider
            .get_latest_quotes(symbol, "1d")
            .await
            .map_err(|e| CompareError::unavailable(PROVIDER, e.to_string()))?;

        let quote = response
            .last_quote()
            .map_err(|e| CompareError::unavailable(PROVIDER, e.to_string()))?;

        if quote.close.is_finite() && quote.close > 0.0 {
            Ok(quote.close)
        } else {
            Err(CompareError::unavailable(
                PROVIDER,
                format!("no usable close for {symbol}"),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore] // Requires network access
    async fn test_last_close() {
        let client = YahooFinanceClient::new();
        let close = client.last_close("AAPL").await.unwrap();
        assert!(close > 0.0);
    }
}
