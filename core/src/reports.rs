//! Display-ready report types
//!
//! These are the structured results handed back to the presentation layer.
//! A [`ChartSeries`] is a parallel pair of label/value sequences of equal
//! length, suitable for direct chart binding; monetary values are canonical
//! USD amounts (scaling for display is a presentation concern).

use serde::{Deserialize, Serialize};

/// A labelled numeric series produced by an aggregation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChartSeries {
    /// Bucket labels (industry, country, year, round type)
    pub labels: Vec<String>,
    /// Values parallel to `labels`
    pub values: Vec<f64>,
}

impl ChartSeries {
    /// Append one (label, value) pair, keeping the vectors parallel.
    pub fn push(&mut self, label: impl Into<String>, value: f64) {
        self.labels.push(label.into());
        self.values.push(value);
    }

    /// Number of buckets in the series.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// True when the aggregation matched nothing; callers render an
    /// empty/zero state.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Headline metrics for the dashboard view.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DashboardMetrics {
    /// Approximate record count (store-level estimate)
    pub total_startups: u64,
    /// Sum of all round amounts across all records, USD
    pub total_funding: f64,
    /// Number of distinct non-empty industries
    pub industries: usize,
    /// Number of distinct non-empty countries
    pub countries: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_series_stays_parallel() {
        let mut series = ChartSeries::default();
        series.push("ai", 1_000_000.0);
        series.push("biotech", 500_000.0);

        assert_eq!(series.len(), 2);
        assert_eq!(series.labels.len(), series.values.len());
        assert_eq!(series.labels[0], "ai");
        assert_eq!(series.values[1], 500_000.0);
    }

    #[test]
    fn test_empty_series_is_zero_state() {
        let series = ChartSeries::default();
        assert!(series.is_empty());
        assert_eq!(series.len(), 0);
    }
}
