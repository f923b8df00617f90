//! FinancialModelingPrep API client

use crate::api::PeerSource;
use crate::config::CompareConfig;
use crate::error::{CompareError, Result};
use crate::model::PeerRecord;
use async_trait::async_trait;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

const PROVIDER: &str = "FMP";

type SharedRateLimiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

/// FinancialModelingPrep API client
#[derive(Debug, Clone)]
pub struct FmpClient {
    client: Client,
    base_url: String,
    api_key: String,
    timeout: Duration,
    rate_limiter: SharedRateLimiter,
}

impl FmpClient {
    /// Create a client with an API key, per-call timeout and requests-per-minute budget
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
        rate_limit: u32,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CompareError::Config(format!("HTTP client: {e}")))?;

        let quota = Quota::per_minute(NonZeroU32::new(rate_limit).unwrap_or(NonZeroU32::MIN));

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            timeout,
            rate_limiter: Arc::new(RateLimiter::direct(quota)),
        })
    }

    /// Create a client from validated configuration
    pub fn from_config(config: &CompareConfig) -> Result<Self> {
        let api_key = config
            .fmp_api_key
            .clone()
            .ok_or_else(|| CompareError::Config("FMP API key not configured".to_string()))?;

        Self::new(
            api_key,
            config.fmp_base_url.clone(),
            config.request_timeout,
            config.rate_limit_per_minute,
        )
    }

    /// Call an endpoint and return its JSON body
    pub async fn get_json(&self, endpoint: &str, params: &[(&str, String)]) -> Result<Value> {
        self.rate_limiter.until_ready().await;

        let url = format!("{}/{}", self.base_url, endpoint);
        tracing::debug!(endpoint, "FMP request");

        let response = self
            .client
            .get(&url)
            .query(params)
            .query(&[("apikey", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| self.transport_error(endpoint, e))?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(CompareError::RateLimited {
                provider: PROVIDER.to_string(),
            });
        }
        if !status.is_success() {
            return Err(CompareError::unavailable(
                PROVIDER,
                format!("HTTP {status} from {endpoint}"),
            ));
        }

        let body = response
            .text()
            .await
            .map_err(|e| self.transport_error(endpoint, e))?;
        let data: Value = serde_json::from_str(&body)?;

        if let Some(message) = data.get("Error Message").and_then(Value::as_str) {
            return Err(CompareError::unavailable(PROVIDER, message));
        }

        Ok(data)
    }

    /// First row of an endpoint that answers with a one-element array
    pub async fn first_row(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> Result<Option<PeerRecord>> {
        let data = self.get_json(endpoint, params).await?;
        Ok(object_rows(data).into_iter().next())
    }

    fn transport_error(&self, endpoint: &str, err: reqwest::Error) -> CompareError {
        CompareError::from_transport(PROVIDER, endpoint, self.timeout.as_secs(), err)
    }
}

/// Keep the object rows of an array response, dropping anything else
fn object_rows(data: Value) -> Vec<PeerRecord> {
    match data {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::Object(row) => Some(row),
                other => {
                    tracing::trace!(row = %other, "Skipping non-object row");
                    None
                }
            })
            .collect(),
        Value::Object(row) => vec![row],
        _ => Vec::new(),
    }
}

/// Symbols from screener rows; rows without a usable symbol are skipped
fn screener_symbols(rows: Vec<PeerRecord>) -> Vec<String> {
    rows.into_iter()
        .filter_map(|row| {
            row.get("symbol")
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        })
        .collect()
}

#[async_trait]
impl PeerSource for FmpClient {
    async fn list_peers(&self, industry: &str, limit: usize) -> Result<Vec<String>> {
        let data = self
            .get_json(
                "stock-screener",
                &[("industry", industry.to_string()), ("limit", limit.to_string())],
            )
            .await?;
        Ok(screener_symbols(object_rows(data)))
    }

    async fn bulk_ratios(&self, symbols: &[String]) -> Result<Vec<PeerRecord>> {
        if symbols.is_empty() {
            return Ok(Vec::new());
        }
        let data = self
            .get_json("ratios-ttm-bulk", &[("symbol", symbols.join(","))])
            .await?;
        Ok(object_rows(data))
    }
}
