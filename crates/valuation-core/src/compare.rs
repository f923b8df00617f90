//! Company versus industry classification

use serde::{Deserialize, Serialize};

use crate::model::{CompanyRatios, IndustryAverage, Metric};

/// Where a company's metric sits relative to its industry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Classification {
    Above,
    Below,
    /// Equal to the industry value
    Neutral,
    /// Either side absent
    Uncomparable,
}

impl Classification {
    /// Classify one metric value against the industry value
    pub fn of(company: Option<f64>, industry: Option<f64>) -> Self {
        match (company, industry) {
            (Some(c), Some(i)) if c > i => Self::Above,
            (Some(c), Some(i)) if c < i => Self::Below,
            (Some(_), Some(_)) => Self::Neutral,
            _ => Self::Uncomparable,
        }
    }

    /// Short hint shown next to a report row
    pub fn hint(&self) -> &'static str {
        match self {
            Self::Above => "(UP)",
            Self::Below => "(DOWN)",
            Self::Neutral | Self::Uncomparable => "",
        }
    }
}

/// One metric of a comparison
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRow {
    pub metric: Metric,
    pub company: Option<f64>,
    pub industry: Option<f64>,
    pub classification: Classification,
}

/// A company's ratios side by side with its industry average
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    pub ticker: String,
    pub industry: Option<String>,
    pub price: Option<f64>,
    pub target: Option<f64>,
    pub rows: Vec<ComparisonRow>,
}

impl Comparison {
    pub fn build(company: &CompanyRatios, average: &IndustryAverage) -> Self {
        let rows = Metric::ALL
            .into_iter()
            .map(|metric| {
                let company_value = company.ratios.get(metric);
                let industry_value = average.get(metric);
                ComparisonRow {
                    metric,
                    company: company_value,
                    industry: industry_value,
                    classification: Classification::of(company_value, industry_value),
                }
            })
            .collect();

        Self {
            ticker: company.ticker.clone(),
            industry: company.industry.clone(),
            price: company.price,
            target: company.target,
            rows,
        }
    }

    pub fn row(&self, metric: Metric) -> Option<&ComparisonRow> {
        self.rows.iter().find(|r| r.metric == metric)
    }

    pub fn classification(&self, metric: Metric) -> Classification {
        self.row(metric)
            .map_or(Classification::Uncomparable, |r| r.classification)
    }
}
