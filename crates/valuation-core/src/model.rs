//! Valuation ratio types shared by the aggregator, cache and comparison

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One peer's raw bulk-ratio row, keyed by the source's field names
pub type PeerRecord = serde_json::Map<String, Value>;

/// Valuation metrics tracked for companies and industries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    /// Price / earnings
    Pe,
    /// Enterprise value / EBITDA
    EvEbitda,
    /// Total assets / total debt
    AssetsDebt,
    /// Price / book
    Pb,
    /// Enterprise value / revenue
    EvRev,
}

impl Metric {
    /// All metrics in display order
    pub const ALL: [Metric; 5] = [
        Metric::Pe,
        Metric::EvEbitda,
        Metric::AssetsDebt,
        Metric::Pb,
        Metric::EvRev,
    ];

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            Metric::Pe => "P/E",
            Metric::EvEbitda => "EV/EBITDA",
            Metric::AssetsDebt => "Assets/Debt",
            Metric::Pb => "Price/Book",
            Metric::EvRev => "EV/Revenue",
        }
    }

    /// Field name in the bulk TTM ratio table
    pub fn bulk_field(&self) -> &'static str {
        match self {
            Metric::Pe => "peRatioTTM",
            Metric::EvEbitda => "evToEbitdaTTM",
            // Reported as debt/assets, inverted after averaging
            Metric::AssetsDebt => "debtToAssetsTTM",
            Metric::Pb => "priceToBookRatioTTM",
            Metric::EvRev => "evToSalesTTM",
        }
    }

    /// Whether the bulk field is the reciprocal of this metric
    pub fn is_inverted(&self) -> bool {
        matches!(self, Metric::AssetsDebt)
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Five optional valuation ratios. Absent stays absent, never zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RatioSet {
    pub pe: Option<f64>,
    pub ev_ebitda: Option<f64>,
    pub assets_debt: Option<f64>,
    pub pb: Option<f64>,
    pub ev_rev: Option<f64>,
}

impl RatioSet {
    /// Read one metric
    pub fn get(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::Pe => self.pe,
            Metric::EvEbitda => self.ev_ebitda,
            Metric::AssetsDebt => self.assets_debt,
            Metric::Pb => self.pb,
            Metric::EvRev => self.ev_rev,
        }
    }

    /// Write one metric
    pub fn set(&mut self, metric: Metric, value: Option<f64>) {
        let slot = match metric {
            Metric::Pe => &mut self.pe,
            Metric::EvEbitda => &mut self.ev_ebitda,
            Metric::AssetsDebt => &mut self.assets_debt,
            Metric::Pb => &mut self.pb,
            Metric::EvRev => &mut self.ev_rev,
        };
        *slot = value;
    }

    /// Builder-style setter
    pub fn with(mut self, metric: Metric, value: f64) -> Self {
        self.set(metric, Some(value));
        self
    }

    /// True when no metric is present
    pub fn is_empty(&self) -> bool {
        Metric::ALL.iter().all(|m| self.get(*m).is_none())
    }
}

/// Cross-sectional mean of an industry's peers
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct IndustryAverage {
    pub ratios: RatioSet,
    /// Peer rows that went into the average
    pub peer_count: usize,
}

impl IndustryAverage {
    /// Average for an industry with no peer coverage
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn get(&self, metric: Metric) -> Option<f64> {
        self.ratios.get(metric)
    }
}

/// A single company's ratios as reported by the company source
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompanyRatios {
    pub ticker: String,
    /// Last close in USD
    pub price: Option<f64>,
    /// Consensus 1-year price target in USD
    pub target: Option<f64>,
    /// Industry label used to find peers
    pub industry: Option<String>,
    pub ratios: RatioSet,
}

/// Coerce a raw JSON value to a finite number.
///
/// Numbers and numeric strings parse; nulls, booleans, non-numeric strings
/// and non-finite values are absent.
pub fn coerce_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    number.is_finite().then_some(number)
}

/// Divide two optional amounts, absent when either side is missing or the divisor is zero
pub fn ratio_of(numerator: Option<f64>, denominator: Option<f64>) -> Option<f64> {
    match (numerator, denominator) {
        (Some(n), Some(d)) if d != 0.0 => Some(n / d).filter(|v| v.is_finite()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_coerce_number() {
        assert_eq!(coerce_number(&json!(12.5)), Some(12.5));
        assert_eq!(coerce_number(&json!(7)), Some(7.0));
        assert_eq!(coerce_number(&json!(" 3.25 ")), Some(3.25));
        assert_eq!(coerce_number(&json!("n/a")), None);
        assert_eq!(coerce_number(&json!("")), None);
        assert_eq!(coerce_number(&json!("NaN")), None);
        assert_eq!(coerce_number(&json!("inf")), None);
        assert_eq!(coerce_number(&Value::Null), None);
        assert_eq!(coerce_number(&json!(true)), None);
        assert_eq!(coerce_number(&json!({"v": 1})), None);
    }

    #[test]
    fn test_ratio_set_accessors() {
        let mut ratios = RatioSet::default();
        assert!(ratios.is_empty());

        ratios.set(Metric::Pb, Some(2.0));
        assert_eq!(ratios.get(Metric::Pb), Some(2.0));
        assert_eq!(ratios.pb, Some(2.0));
        assert!(!ratios.is_empty());

        let ratios = ratios.with(Metric::EvRev, 4.0);
        assert_eq!(ratios.ev_rev, Some(4.0));
        assert_eq!(ratios.get(Metric::Pe), None);
    }

    #[test]
    fn test_metric_mapping() {
        assert_eq!(Metric::Pe.bulk_field(), "peRatioTTM");
        assert_eq!(Metric::AssetsDebt.bulk_field(), "debtToAssetsTTM");
        assert!(Metric::AssetsDebt.is_inverted());
        assert!(!Metric::Pb.is_inverted());
        assert_eq!(Metric::EvRev.to_string(), "EV/Revenue");
    }

    #[test]
    fn test_ratio_of() {
        assert_eq!(ratio_of(Some(10.0), Some(4.0)), Some(2.5));
        assert_eq!(ratio_of(Some(10.0), Some(0.0)), None);
        assert_eq!(ratio_of(None, Some(4.0)), None);
        assert_eq!(ratio_of(Some(10.0), None), None);
    }

    #[test]
    fn test_absent_serializes_as_null() {
        let ratios = RatioSet::default().with(Metric::Pe, 25.0);
        let value = serde_json::to_value(ratios).unwrap();
        assert_eq!(value["pe"], json!(25.0));
        assert_eq!(value["pb"], Value::Null);
    }
}
