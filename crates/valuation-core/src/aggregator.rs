//! Industry-average computation from bulk peer ratios
//!
//! Peers are fetched in two calls (peer list, then one bulk ratio table)
//! and reduced to a per-metric arithmetic mean. Values that cannot be
//! coerced to a number are skipped rather than counted as zero, and the
//! debt/assets field is inverted only after averaging.

use std::collections::HashSet;
use std::sync::Arc;

use serde_json::Value;

use crate::api::PeerSource;
use crate::config::DEFAULT_PEER_LIMIT;
use crate::error::{CompareError, Result};
use crate::model::{IndustryAverage, Metric, PeerRecord, RatioSet, coerce_number};

/// Computes industry averages from a [`PeerSource`]
#[derive(Clone)]
pub struct RatioAggregator {
    source: Arc<dyn PeerSource>,
    peer_limit: usize,
}

impl RatioAggregator {
    /// Create an aggregator with the default peer limit
    pub fn new(source: Arc<dyn PeerSource>) -> Self {
        Self::with_peer_limit(source, DEFAULT_PEER_LIMIT)
    }

    /// Create an aggregator requesting at most `peer_limit` peers
    pub fn with_peer_limit(source: Arc<dyn PeerSource>, peer_limit: usize) -> Self {
        Self {
            source,
            peer_limit: peer_limit.max(1),
        }
    }

    pub fn peer_limit(&self) -> usize {
        self.peer_limit
    }

    /// Compute the average ratios of the peers reported for `industry`.
    ///
    /// Zero peers is not an error: the result has every metric absent.
    pub async fn compute_industry_average(&self, industry: &str) -> Result<IndustryAverage> {
        validate_label(industry)?;

        let peers = dedup_peers(
            self.source.list_peers(industry, self.peer_limit).await?,
            self.peer_limit,
        );
        if peers.is_empty() {
            tracing::info!(%industry, "No peers found");
            return Ok(IndustryAverage::empty());
        }

        let rows = self.source.bulk_ratios(&peers).await?;
        let rows = rows_for_peers(rows, &peers);
        let average = average_rows(&rows);

        tracing::info!(
            %industry,
            peers = peers.len(),
            rows = average.peer_count,
            "Computed industry average"
        );
        Ok(average)
    }
}

impl std::fmt::Debug for RatioAggregator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RatioAggregator")
            .field("peer_limit", &self.peer_limit)
            .finish_non_exhaustive()
    }
}

/// Reject absent or blank industry labels before touching the network
pub fn validate_label(industry: &str) -> Result<()> {
    if industry.trim().is_empty() {
        return Err(CompareError::InvalidIndustryLabel(industry.to_string()));
    }
    Ok(())
}

/// Drop empty and repeated identifiers, keeping source order, capped at `limit`
fn dedup_peers(peers: Vec<String>, limit: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    peers
        .into_iter()
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty() && seen.insert(p.clone()))
        .take(limit)
        .collect()
}

/// Keep only rows whose `symbol` is one of the requested peers
fn rows_for_peers(rows: Vec<PeerRecord>, peers: &[String]) -> Vec<PeerRecord> {
    let wanted: HashSet<&str> = peers.iter().map(String::as_str).collect();
    let mut used = HashSet::new();
    rows.into_iter()
        .filter(|row| {
            match row.get("symbol").and_then(Value::as_str).map(str::trim) {
                // One row per peer
                Some(symbol) if wanted.contains(symbol) => used.insert(symbol.to_string()),
                _ => {
                    tracing::trace!("Skipping bulk row without a requested symbol");
                    false
                }
            }
        })
        .collect()
}

/// Mean of the present values, absent when there are none or the sum overflows
fn mean(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values
        .into_iter()
        .fold((0.0_f64, 0_usize), |(sum, count), v| (sum + v, count + 1));
    (count > 0)
        .then(|| sum / count as f64)
        .filter(|v| v.is_finite())
}

/// Reduce peer rows to one average per metric
pub fn average_rows(rows: &[PeerRecord]) -> IndustryAverage {
    let mut ratios = RatioSet::default();

    for metric in Metric::ALL {
        let field = metric.bulk_field();
        let values = rows.iter().filter_map(|row| {
            let raw = row.get(field)?;
            let parsed = coerce_number(raw);
            if parsed.is_none() {
                tracing::trace!(field, value = %raw, "Unparseable metric value");
            }
            parsed
        });

        let mut average = mean(values);
        if metric.is_inverted() {
            average = average
                .filter(|avg| *avg != 0.0)
                .map(|avg| 1.0 / avg)
                .filter(|v| v.is_finite());
        }
        ratios.set(metric, average);
    }

    IndustryAverage {
        ratios,
        peer_count: rows.len(),
    }
}
