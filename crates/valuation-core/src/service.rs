//! Per-request comparison flow and front-end replies

use std::sync::Arc;

use crate::api::{CompanySource, FmpClient, FmpCompanySource, YahooFinanceClient};
use crate::averages::IndustryAverages;
use crate::commands::Command;
use crate::compare::Comparison;
use crate::config::CompareConfig;
use crate::error::{CompareError, Result};
use crate::report::render_report;

/// What the front-end should do with a user message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Send this text back
    Text(String),
    /// Stay silent
    Silent,
    /// Stop the session
    Exit,
}

/// Company ratios combined with cached industry averages
#[derive(Clone)]
pub struct ComparisonService {
    company: Arc<dyn CompanySource>,
    averages: IndustryAverages,
}

impl ComparisonService {
    pub fn new(company: Arc<dyn CompanySource>, averages: IndustryAverages) -> Self {
        Self { company, averages }
    }

    /// Wire the FMP and Yahoo clients from configuration
    pub fn from_config(config: &CompareConfig) -> Result<Self> {
        config.validate()?;
        let fmp = FmpClient::from_config(config)?;
        let company = FmpCompanySource::new(fmp.clone(), YahooFinanceClient::new());
        let averages = IndustryAverages::from_config(Arc::new(fmp), config);
        Ok(Self::new(Arc::new(company), averages))
    }

    pub fn averages(&self) -> &IndustryAverages {
        &self.averages
    }

    /// Compare one ticker with its industry average
    pub async fn compare(&self, ticker: &str) -> Result<Comparison> {
        let company = self.company.company_ratios(ticker).await?;
        let Some(industry) = company.industry.as_deref() else {
            return Err(CompareError::TickerNotFound(ticker.to_string()));
        };

        let average = self.averages.get_or_compute(industry).await?;
        tracing::info!(
            ticker = %company.ticker,
            %industry,
            peers = average.peer_count,
            "Comparison ready"
        );
        Ok(Comparison::build(&company, &average))
    }

    /// Handle one line of user input
    pub async fn respond(&self, input: &str) -> Reply {
        let command = match Command::parse(input) {
            Ok(command) => command,
            Err(CompareError::Command(message)) => return Reply::Text(message),
            Err(e) => return Reply::Text(format!("Error: {e}")),
        };

        match command {
            Command::Start => Reply::Text(Command::greeting().to_string()),
            Command::Help => Reply::Text(Command::help_text().trim().to_string()),
            Command::Exit => Reply::Exit,
            Command::Ignore => Reply::Silent,
            Command::Compare { ticker } => match self.compare(&ticker).await {
                Ok(comparison) => Reply::Text(render_report(&comparison)),
                Err(e) => {
                    tracing::warn!(%ticker, error = %e, "Comparison failed");
                    Reply::Text(format!("Error: {e}"))
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::RatioAggregator;
    use crate::api::{MockCompanySource, MockPeerSource};
    use crate::cache::{AveragesCache, ManualClock};
    use crate::compare::Classification;
    use crate::model::{CompanyRatios, Metric, PeerRecord, RatioSet};
    use serde_json::json;
    use std::time::Duration;

    fn peer_rows() -> Vec<PeerRecord> {
        json!([
            {"symbol": "A", "peRatioTTM": 20.0, "evToEbitdaTTM": 15.0, "priceToBookRatioTTM": 2.0},
            {"symbol": "B", "peRatioTTM": 30.0, "evToEbitdaTTM": 25.0, "priceToBookRatioTTM": "n/a"}
        ])
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_object().unwrap().clone())
        .collect()
    }

    fn software_peers(times: usize) -> MockPeerSource {
        let mut peers = MockPeerSource::new();
        peers
            .expect_list_peers()
            .withf(|industry, _| industry == "Software")
            .times(times)
            .returning(|_, _| Ok(vec!["A".to_string(), "B".to_string()]));
        peers
            .expect_bulk_ratios()
            .times(times)
            .returning(|_| Ok(peer_rows()));
        peers
    }

    fn company(ticker: &str, pe: f64) -> CompanyRatios {
        CompanyRatios {
            ticker: ticker.to_string(),
            price: Some(100.0),
            target: Some(120.0),
            industry: Some("Software".to_string()),
            ratios: RatioSet::default().with(Metric::Pe, pe),
        }
    }

    fn service(company: MockCompanySource, peers: MockPeerSource) -> ComparisonService {
        let averages = IndustryAverages::new(
            RatioAggregator::new(Arc::new(peers)),
            AveragesCache::with_clock(Duration::from_secs(43_200), Arc::new(ManualClock::new(0))),
        );
        ComparisonService::new(Arc::new(company), averages)
    }

    #[tokio::test]
    async fn test_compare_classifies_against_industry() {
        let mut companies = MockCompanySource::new();
        companies
            .expect_company_ratios()
            .returning(|ticker| Ok(company(ticker, if ticker == "LOW" { 22.0 } else { 26.0 })));

        // Two tickers in one industry share one aggregation
        let service = service(companies, software_peers(1));

        let low = service.compare("LOW").await.unwrap();
        assert_eq!(low.classification(Metric::Pe), Classification::Below);
        assert_eq!(low.row(Metric::Pe).unwrap().industry, Some(25.0));
        assert_eq!(low.row(Metric::Pb).unwrap().industry, Some(2.0));

        let high = service.compare("HIGH").await.unwrap();
        assert_eq!(high.classification(Metric::Pe), Classification::Above);
        assert_eq!(high.classification(Metric::EvEbitda), Classification::Uncomparable);
    }

    #[tokio::test]
    async fn test_missing_industry_is_ticker_not_found() {
        let mut companies = MockCompanySource::new();
        companies.expect_company_ratios().returning(|ticker| {
            Ok(CompanyRatios {
                ticker: ticker.to_string(),
                ..Default::default()
            })
        });

        let service = service(companies, software_peers(0));
        let err = service.compare("ZZZZ").await.unwrap_err();
        assert!(matches!(err, CompareError::TickerNotFound(t) if t == "ZZZZ"));
    }

    #[tokio::test]
    async fn test_respond_renders_report() {
        let mut companies = MockCompanySource::new();
        companies
            .expect_company_ratios()
            .withf(|ticker| ticker == "ACME")
            .returning(|ticker| Ok(company(ticker, 22.0)));

        let service = service(companies, software_peers(1));

        let Reply::Text(text) = service.respond("acme").await else {
            panic!("expected a text reply");
        };
        assert!(text.starts_with("Ticker: ACME"));
        assert!(text.contains("(DOWN)"));
        assert!(text.contains("Last price:  100.00 USD"));
    }

    #[tokio::test]
    async fn test_respond_reports_source_errors() {
        let mut companies = MockCompanySource::new();
        companies.expect_company_ratios().returning(|ticker| {
            Ok(company(ticker, 22.0))
        });
        let mut peers = MockPeerSource::new();
        peers
            .expect_list_peers()
            .returning(|_, _| Err(CompareError::unavailable("FMP", "HTTP 503")));

        let service = service(companies, peers);
        assert_eq!(
            service.respond("/compare ACME").await,
            Reply::Text("Error: FMP unavailable: HTTP 503".to_string())
        );
        assert!(service.averages().cache().is_empty().await);
    }

    #[tokio::test]
    async fn test_respond_commands() {
        let service = service(MockCompanySource::new(), MockPeerSource::new());

        assert_eq!(service.respond("/exit").await, Reply::Exit);
        assert_eq!(service.respond("what now?").await, Reply::Silent);
        assert_eq!(
            service.respond("/compare").await,
            Reply::Text("Usage: /compare TICKER".to_string())
        );
        let Reply::Text(greeting) = service.respond("/start").await else {
            panic!("expected greeting");
        };
        assert!(greeting.contains("financebro"));
    }
}
