//! Startup record data model
//!
//! This module defines the document shapes stored in the `startups`
//! collection: the startup record itself, its embedded funding rounds, and
//! the validated submission type used when adding a new record.
//!
//! Optional fields carry defined defaults that are applied at the
//! aggregation boundary (0 for a missing amount, "unknown" for a missing
//! industry or round type) rather than scattered through call sites.

use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::error::LensError;

/// Status values offered by the presentation layer.
///
/// Advisory only: `status` is stored as free text and any value may replace
/// any other. There is no transition check and no audit trail.
pub const STATUS_OPTIONS: &[&str] = &[
    "Seed",
    "Series A",
    "Series B",
    "Series C+",
    "Acquired",
    "Active",
    "Inactive",
];

/// Round type values offered by the presentation layer (also advisory).
pub const ROUND_TYPE_OPTIONS: &[&str] =
    &["Seed", "Angel", "Series A", "Series B", "Series C+", "Venture"];

/// A single funding round embedded in a startup record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FundingRound {
    /// Round type (free text, typically one of [`ROUND_TYPE_OPTIONS`])
    #[serde(default)]
    pub round_type: Option<String>,
    /// Amount raised in USD; missing is treated as 0 in all aggregations
    #[serde(default)]
    pub amount: Option<f64>,
    /// Date in `YYYY-MM-DD` form; the first four characters are the year
    /// bucket for the yearly trend
    #[serde(default)]
    pub date: Option<String>,
    /// Post-money valuation in USD; absent when not supplied
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valuation: Option<f64>,
    /// Participating investors, insertion order
    #[serde(default)]
    pub investors: Vec<String>,
}

impl FundingRound {
    /// Amount raised with the aggregation-boundary default applied.
    pub fn amount_usd(&self) -> f64 {
        self.amount.unwrap_or(0.0)
    }

    /// Round type with the aggregation-boundary default applied.
    pub fn round_type_or_unknown(&self) -> &str {
        self.round_type.as_deref().unwrap_or("unknown")
    }
}

/// One document in the `startups` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartupRecord {
    /// Store-assigned identity; absent until insertion
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    /// Startup name; duplicates are permitted by the store
    #[serde(rename = "startup_name")]
    pub name: String,
    /// Lower-cased free-text industry
    #[serde(default)]
    pub industry: Option<String>,
    /// Upper-cased 3-letter-style country code
    #[serde(default)]
    pub country: Option<String>,
    /// Founding year, range-checked only at input time
    #[serde(default)]
    pub founded_year: Option<i32>,
    /// Free-text status (see [`STATUS_OPTIONS`])
    #[serde(default)]
    pub status: Option<String>,
    /// Founder names, insertion order = display order
    #[serde(default)]
    pub founders: Vec<String>,
    /// Funding rounds, append-only, insertion order
    #[serde(default)]
    pub funding_rounds: Vec<FundingRound>,
}

impl StartupRecord {
    /// Total funding across all rounds, missing amounts counted as 0.
    pub fn total_funding(&self) -> f64 {
        self.funding_rounds.iter().map(FundingRound::amount_usd).sum()
    }

    /// The latest round is the LAST array element, not the date-maximum.
    /// Callers that want date order must sort explicitly.
    pub fn latest_round(&self) -> Option<&FundingRound> {
        self.funding_rounds.last()
    }
}

/// A validated submission for `add`.
///
/// Normalization (industry to lower case, country to upper case) and the
/// initial-round gate happen in [`NewStartup::into_record`]; field presence
/// is checked by [`NewStartup::validate`] before any store access.
#[derive(Debug, Clone)]
pub struct NewStartup {
    pub name: String,
    pub industry: String,
    pub country: String,
    pub founded_year: i32,
    pub status: String,
    pub founders: Vec<String>,
    /// Optional initial funding round; only kept when a round type and a
    /// positive amount were supplied
    pub initial_round: Option<FundingRound>,
}

impl NewStartup {
    /// Check required fields. Rejected submissions never reach the store.
    pub fn validate(&self) -> Result<(), LensError> {
        if self.name.trim().is_empty() {
            return Err(LensError::validation("startup_name", "must not be empty"));
        }
        if self.industry.trim().is_empty() {
            return Err(LensError::validation("industry", "must not be empty"));
        }
        if self.country.trim().is_empty() {
            return Err(LensError::validation("country", "must not be empty"));
        }
        if !(1900..=2030).contains(&self.founded_year) {
            return Err(LensError::validation(
                "founded_year",
                "must be between 1900 and 2030",
            ));
        }
        Ok(())
    }

    /// Build the document to insert, applying normalization and the
    /// initial-round gate.
    pub fn into_record(self) -> StartupRecord {
        let initial_round = self.initial_round.filter(|round| {
            round
                .round_type
                .as_deref()
                .is_some_and(|t| !t.trim().is_empty())
                && round.amount_usd() > 0.0
        });

        StartupRecord {
            id: None,
            name: self.name,
            industry: Some(self.industry.to_lowercase()),
            country: Some(self.country.to_uppercase()),
            founded_year: Some(self.founded_year),
            status: Some(self.status),
            founders: self.founders,
            funding_rounds: initial_round.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round(round_type: &str, amount: Option<f64>, date: &str) -> FundingRound {
        FundingRound {
            round_type: Some(round_type.to_string()),
            amount,
            date: Some(date.to_string()),
            valuation: None,
            investors: vec![],
        }
    }

    fn submission() -> NewStartup {
        NewStartup {
            name: "TechVenture AI".to_string(),
            industry: "AI".to_string(),
            country: "usa".to_string(),
            founded_year: 2024,
            status: "Seed".to_string(),
            founders: vec!["John Doe".to_string()],
            initial_round: None,
        }
    }

    #[test]
    fn test_total_funding_treats_missing_amount_as_zero() {
        let record = StartupRecord {
            id: None,
            name: "Test".to_string(),
            industry: None,
            country: None,
            founded_year: None,
            status: None,
            founders: vec![],
            funding_rounds: vec![
                round("Seed", Some(1_000_000.0), "2020-01-15"),
                round("Series A", None, "2021-06-01"),
                round("Series B", Some(5_000_000.0), "2022-03-10"),
            ],
        };

        assert_eq!(record.total_funding(), 6_000_000.0);
    }

    #[test]
    fn test_total_funding_zero_rounds() {
        let record = StartupRecord {
            id: None,
            name: "Empty".to_string(),
            industry: None,
            country: None,
            founded_year: None,
            status: None,
            founders: vec![],
            funding_rounds: vec![],
        };

        assert_eq!(record.total_funding(), 0.0);
    }

    #[test]
    fn test_latest_round_is_array_last_not_date_max() {
        let record = StartupRecord {
            id: None,
            name: "Test".to_string(),
            industry: None,
            country: None,
            founded_year: None,
            status: None,
            founders: vec![],
            funding_rounds: vec![
                round("Series A", Some(2.0), "2023-01-01"),
                round("Seed", Some(1.0), "2019-01-01"),
            ],
        };

        // The 2019 round was appended last, so it is the latest round even
        // though its date is older.
        let latest = record.latest_round().unwrap();
        assert_eq!(latest.round_type.as_deref(), Some("Seed"));
    }

    #[test]
    fn test_validate_rejects_empty_required_fields() {
        let mut s = submission();
        s.name = "".to_string();
        assert!(s.validate().is_err());

        let mut s = submission();
        s.industry = "   ".to_string();
        assert!(s.validate().is_err());

        let mut s = submission();
        s.country = "".to_string();
        assert!(s.validate().is_err());

        assert!(submission().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_out_of_range_year() {
        let mut s = submission();
        s.founded_year = 1850;
        assert!(s.validate().is_err());

        let mut s = submission();
        s.founded_year = 2031;
        assert!(s.validate().is_err());
    }

    #[test]
    fn test_into_record_normalizes_industry_and_country() {
        let record = submission().into_record();
        assert_eq!(record.industry.as_deref(), Some("ai"));
        assert_eq!(record.country.as_deref(), Some("USA"));
        assert_eq!(record.founded_year, Some(2024));
        assert!(record.funding_rounds.is_empty());
    }

    #[test]
    fn test_into_record_keeps_initial_round_only_with_type_and_positive_amount() {
        let mut s = submission();
        s.initial_round = Some(round("Seed", Some(500_000.0), "2024-02-01"));
        assert_eq!(s.into_record().funding_rounds.len(), 1);

        // Zero amount is dropped
        let mut s = submission();
        s.initial_round = Some(round("Seed", Some(0.0), "2024-02-01"));
        assert!(s.into_record().funding_rounds.is_empty());

        // Empty round type is dropped
        let mut s = submission();
        s.initial_round = Some(round("", Some(500_000.0), "2024-02-01"));
        assert!(s.into_record().funding_rounds.is_empty());

        // Missing round type is dropped
        let mut s = submission();
        s.initial_round = Some(FundingRound {
            round_type: None,
            amount: Some(500_000.0),
            ..FundingRound::default()
        });
        assert!(s.into_record().funding_rounds.is_empty());
    }

    #[test]
    fn test_record_wire_format_uses_startup_name() {
        let record = submission().into_record();
        let doc = bson::to_document(&record).unwrap();
        assert!(doc.contains_key("startup_name"));
        assert!(!doc.contains_key("name"));
        // No _id before insertion
        assert!(!doc.contains_key("_id"));
    }

    #[test]
    fn test_round_defaults_applied_at_boundary() {
        let round = FundingRound::default();
        assert_eq!(round.amount_usd(), 0.0);
        assert_eq!(round.round_type_or_unknown(), "unknown");
    }

    #[test]
    fn test_valuation_absent_when_not_supplied() {
        let round = FundingRound {
            round_type: Some("Seed".to_string()),
            amount: Some(1.0),
            date: Some("2024-01-01".to_string()),
            valuation: None,
            investors: vec![],
        };
        let doc = bson::to_document(&round).unwrap();
        assert!(!doc.contains_key("valuation"));
    }
}
