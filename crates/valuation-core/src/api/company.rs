//! Company ratio source backed by FMP fundamentals and Yahoo prices

use async_trait::async_trait;
use serde_json::Value;

use crate::api::{CompanySource, FmpClient, YahooFinanceClient};
use crate::error::Result;
use crate::model::{CompanyRatios, PeerRecord, RatioSet, coerce_number, ratio_of};

/// Builds a [`CompanyRatios`] record from several FMP endpoints
#[derive(Debug, Clone)]
pub struct FmpCompanySource {
    fmp: FmpClient,
    yahoo: YahooFinanceClient,
}

impl FmpCompanySource {
    pub fn new(fmp: FmpClient, yahoo: YahooFinanceClient) -> Self {
        Self { fmp, yahoo }
    }
}

fn number(row: Option<&PeerRecord>, field: &str) -> Option<f64> {
    row.and_then(|r| r.get(field)).and_then(coerce_number)
}

fn text(row: Option<&PeerRecord>, field: &str) -> Option<String> {
    row.and_then(|r| r.get(field))
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Responses gathered for one ticker
#[derive(Debug, Default)]
struct CompanyRows {
    profile: Option<PeerRecord>,
    ratios: Option<PeerRecord>,
    metrics: Option<PeerRecord>,
    balance: Option<PeerRecord>,
    target: Option<PeerRecord>,
}

impl CompanyRows {
    fn into_company(self, ticker: &str, last_close: Option<f64>) -> CompanyRatios {
        let ratios = RatioSet {
            pe: number(self.ratios.as_ref(), "peRatioTTM"),
            ev_ebitda: number(self.metrics.as_ref(), "enterpriseValueOverEBITDATTM"),
            assets_debt: ratio_of(
                number(self.balance.as_ref(), "totalAssets"),
                number(self.balance.as_ref(), "totalDebt"),
            ),
            pb: number(self.ratios.as_ref(), "priceToBookRatioTTM"),
            ev_rev: number(self.metrics.as_ref(), "evToSalesTTM"),
        };

        CompanyRatios {
            ticker: ticker.to_string(),
            price: last_close.or_else(|| number(self.profile.as_ref(), "price")),
            target: number(self.target.as_ref(), "targetConsensus"),
            industry: text(self.profile.as_ref(), "industry"),
            ratios,
        }
    }
}

#[async_trait]
impl CompanySource for FmpCompanySource {
    async fn company_ratios(&self, ticker: &str) -> Result<CompanyRatios> {
        let ticker = ticker.trim().to_uppercase();
        let symbol_param = [("symbol", ticker.clone())];
        let latest = [("limit", "1".to_string())];

        let profile_path = format!("profile/{ticker}");
        let ratios_path = format!("ratios-ttm/{ticker}");
        let metrics_path = format!("key-metrics-ttm/{ticker}");
        let balance_path = format!("balance-sheet-statement/{ticker}");

        let (profile, ratios, metrics, balance, target) = tokio::try_join!(
            self.fmp.first_row(&profile_path, &[]),
            self.fmp.first_row(&ratios_path, &[]),
            self.fmp.first_row(&metrics_path, &[]),
            self.fmp.first_row(&balance_path, &latest),
            self.fmp.first_row("price-target-consensus", &symbol_param),
        )?;

        let last_close = match self.yahoo.last_close(&ticker).await {
            Ok(close) => Some(close),
            Err(e) => {
                tracing::warn!(%ticker, error = %e, "Falling back to profile price");
                None
            }
        };

        let rows = CompanyRows {
            profile,
            ratios,
            metrics,
            balance,
            target,
        };
        Ok(rows.into_company(&ticker, last_close))
    }
}
