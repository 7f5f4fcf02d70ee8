//! Aggregation pipeline construction and row post-processing
//!
//! Every reporting query follows the same decompose-then-aggregate shape:
//! `$unwind` the embedded `funding_rounds` array into one row per round,
//! substitute defaults for missing fields with `$ifNull`, then group, sum
//! or count, sort, and limit. The builders here are pure functions over
//! their parameters so the exact query shapes can be tested without a
//! server; [`rows_to_series`] turns the raw grouped rows into the parallel
//! label/value series the presentation layer binds to charts.

use bson::{doc, Bson, Document};

use startuplens_core::reports::ChartSeries;

/// Sum of `amount` across every funding round of every record.
///
/// Missing amounts count as 0. An empty collection produces no rows, which
/// callers read as a total of 0.
pub fn total_funding_pipeline() -> Vec<Document> {
    vec![
        doc! { "$unwind": "$funding_rounds" },
        doc! { "$group": {
            "_id": Bson::Null,
            "total": { "$sum": { "$ifNull": ["$funding_rounds.amount", 0] } }
        } },
    ]
}

/// Total funding grouped by industry, descending, truncated to `limit`.
///
/// A record without an industry lands in the "unknown" bucket. Ties between
/// equal sums keep store-native order (non-deterministic across stores).
pub fn top_industries_pipeline(limit: i64) -> Vec<Document> {
    grouped_totals_pipeline("$industry", limit)
}

/// Total funding grouped by country, descending, truncated to `limit`.
pub fn top_countries_pipeline(limit: i64) -> Vec<Document> {
    grouped_totals_pipeline("$country", limit)
}

fn grouped_totals_pipeline(key: &str, limit: i64) -> Vec<Document> {
    vec![
        doc! { "$unwind": "$funding_rounds" },
        doc! { "$group": {
            "_id": { "$ifNull": [key, "unknown"] },
            "total": { "$sum": { "$ifNull": ["$funding_rounds.amount", 0] } }
        } },
        doc! { "$sort": { "total": -1 } },
        doc! { "$limit": limit },
    ]
}

/// Total funding per year, ascending, truncated to the `limit` earliest
/// years.
///
/// The year bucket is the first four characters of the round date; rounds
/// whose date does not start with four digits are dropped from this view
/// only (they still count in [`total_funding_pipeline`]).
pub fn yearly_trend_pipeline(limit: i64) -> Vec<Document> {
    vec![
        doc! { "$unwind": "$funding_rounds" },
        doc! { "$addFields": { "year": { "$substr": ["$funding_rounds.date", 0, 4] } } },
        doc! { "$match": { "year": { "$regex": "^[0-9]{4}$" } } },
        doc! { "$group": {
            "_id": "$year",
            "total": { "$sum": { "$ifNull": ["$funding_rounds.amount", 0] } }
        } },
        doc! { "$sort": { "_id": 1 } },
        doc! { "$limit": limit },
    ]
}

/// Count of rounds per round type, case-folded, descending, truncated.
///
/// "Seed" and "seed" merge into one bucket; a missing round type counts
/// under "unknown".
pub fn round_type_distribution_pipeline(limit: i64) -> Vec<Document> {
    vec![
        doc! { "$unwind": "$funding_rounds" },
        doc! { "$group": {
            "_id": { "$toLower": { "$ifNull": ["$funding_rounds.round_type", "unknown"] } },
            "count": { "$sum": 1 }
        } },
        doc! { "$sort": { "count": -1 } },
        doc! { "$limit": limit },
    ]
}

/// Find filter for the search view.
///
/// The name fragment becomes a case-insensitive regex (passed verbatim, as
/// the source application did); industry and country are exact matches.
/// Empty and "All" values are elided, so an unconstrained search yields an
/// empty filter that matches everything.
pub fn search_filter(
    name_contains: Option<&str>,
    industry: Option<&str>,
    country: Option<&str>,
) -> Document {
    let mut filter = Document::new();

    if let Some(fragment) = selected(name_contains) {
        filter.insert(
            "startup_name",
            doc! { "$regex": fragment, "$options": "i" },
        );
    }
    if let Some(industry) = selected(industry) {
        filter.insert("industry", industry);
    }
    if let Some(country) = selected(country) {
        filter.insert("country", country);
    }

    filter
}

/// Exact-name filter used by update and delete.
pub fn name_filter(name: &str) -> Document {
    doc! { "startup_name": name }
}

/// Case-insensitive name fragment filter used by the name picker.
pub fn name_fragment_filter(fragment: &str) -> Document {
    doc! { "startup_name": { "$regex": fragment, "$options": "i" } }
}

fn selected(value: Option<&str>) -> Option<&str> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty() && *v != "All")
}

/// Convert grouped aggregation rows into a parallel label/value series.
///
/// The `_id` field becomes the label ("unknown" for null), `value_key`
/// becomes the value with missing or non-numeric entries read as 0.
pub fn rows_to_series(rows: &[Document], value_key: &str) -> ChartSeries {
    let mut series = ChartSeries::default();
    for row in rows {
        let label = row
            .get("_id")
            .map(bson_label)
            .unwrap_or_else(|| "unknown".to_string());
        series.push(label, bson_f64(row.get(value_key)));
    }
    series
}

fn bson_label(value: &Bson) -> String {
    match value {
        Bson::String(s) => s.clone(),
        Bson::Null => "unknown".to_string(),
        other => other.to_string(),
    }
}

/// Numeric coercion across the BSON number types the store may return.
pub fn bson_f64(value: Option<&Bson>) -> f64 {
    match value {
        Some(Bson::Double(v)) => *v,
        Some(Bson::Int32(v)) => f64::from(*v),
        Some(Bson::Int64(v)) => *v as f64,
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_funding_pipeline_shape() {
        let pipeline = total_funding_pipeline();
        assert_eq!(pipeline.len(), 2);
        assert_eq!(pipeline[0], doc! { "$unwind": "$funding_rounds" });
        assert_eq!(
            pipeline[1],
            doc! { "$group": {
                "_id": Bson::Null,
                "total": { "$sum": { "$ifNull": ["$funding_rounds.amount", 0] } }
            } }
        );
    }

    #[test]
    fn test_top_industries_pipeline_shape() {
        let pipeline = top_industries_pipeline(10);
        assert_eq!(pipeline.len(), 4);
        assert_eq!(
            pipeline[1],
            doc! { "$group": {
                "_id": { "$ifNull": ["$industry", "unknown"] },
                "total": { "$sum": { "$ifNull": ["$funding_rounds.amount", 0] } }
            } }
        );
        assert_eq!(pipeline[2], doc! { "$sort": { "total": -1 } });
        assert_eq!(pipeline[3], doc! { "$limit": 10_i64 });
    }

    #[test]
    fn test_top_countries_pipeline_keys_on_country() {
        let pipeline = top_countries_pipeline(10);
        let group = pipeline[1].get_document("$group").unwrap();
        assert_eq!(
            group.get_document("_id").unwrap(),
            &doc! { "$ifNull": ["$country", "unknown"] }
        );
    }

    #[test]
    fn test_yearly_trend_pipeline_shape() {
        let pipeline = yearly_trend_pipeline(30);
        assert_eq!(pipeline.len(), 6);
        assert_eq!(
            pipeline[1],
            doc! { "$addFields": { "year": { "$substr": ["$funding_rounds.date", 0, 4] } } }
        );
        // Non-four-digit year buckets are filtered out before grouping
        assert_eq!(
            pipeline[2],
            doc! { "$match": { "year": { "$regex": "^[0-9]{4}$" } } }
        );
        // Ascending by year, earliest years kept
        assert_eq!(pipeline[4], doc! { "$sort": { "_id": 1 } });
        assert_eq!(pipeline[5], doc! { "$limit": 30_i64 });
    }

    #[test]
    fn test_round_type_pipeline_case_folds() {
        let pipeline = round_type_distribution_pipeline(8);
        let group = pipeline[1].get_document("$group").unwrap();
        assert_eq!(
            group.get_document("_id").unwrap(),
            &doc! { "$toLower": { "$ifNull": ["$funding_rounds.round_type", "unknown"] } }
        );
        assert_eq!(group.get_document("count").unwrap(), &doc! { "$sum": 1 });
    }

    #[test]
    fn test_search_filter_combines_constraints() {
        let filter = search_filter(Some("tech"), Some("ai"), Some("USA"));
        assert_eq!(
            filter.get_document("startup_name").unwrap(),
            &doc! { "$regex": "tech", "$options": "i" }
        );
        assert_eq!(filter.get_str("industry").unwrap(), "ai");
        assert_eq!(filter.get_str("country").unwrap(), "USA");
    }

    #[test]
    fn test_search_filter_elides_all_and_empty() {
        let filter = search_filter(Some(""), Some("All"), None);
        assert!(filter.is_empty());

        let filter = search_filter(None, Some("  "), Some("All"));
        assert!(filter.is_empty());
    }

    #[test]
    fn test_search_filter_name_only() {
        let filter = search_filter(Some("bio"), None, None);
        assert_eq!(filter.len(), 1);
        assert!(filter.contains_key("startup_name"));
    }

    #[test]
    fn test_name_filters() {
        assert_eq!(
            name_filter("TechVenture AI"),
            doc! { "startup_name": "TechVenture AI" }
        );
        assert_eq!(
            name_fragment_filter("tech"),
            doc! { "startup_name": { "$regex": "tech", "$options": "i" } }
        );
    }

    #[test]
    fn test_rows_to_series_conversion() {
        let rows = vec![
            doc! { "_id": "ai", "total": 2_500_000.0 },
            doc! { "_id": "biotech", "total": 1_000_000_i64 },
            doc! { "_id": Bson::Null, "total": 5_i32 },
        ];

        let series = rows_to_series(&rows, "total");
        assert_eq!(series.labels, vec!["ai", "biotech", "unknown"]);
        assert_eq!(series.values, vec![2_500_000.0, 1_000_000.0, 5.0]);
    }

    #[test]
    fn test_rows_to_series_missing_value_reads_zero() {
        let rows = vec![doc! { "_id": "seed" }];
        let series = rows_to_series(&rows, "count");
        assert_eq!(series.labels, vec!["seed"]);
        assert_eq!(series.values, vec![0.0]);
    }

    #[test]
    fn test_rows_to_series_empty_input() {
        let series = rows_to_series(&[], "total");
        assert!(series.is_empty());
    }

    #[test]
    fn test_bson_f64_coercions() {
        assert_eq!(bson_f64(Some(&Bson::Double(1.5))), 1.5);
        assert_eq!(bson_f64(Some(&Bson::Int32(7))), 7.0);
        assert_eq!(bson_f64(Some(&Bson::Int64(9))), 9.0);
        assert_eq!(bson_f64(Some(&Bson::Null)), 0.0);
        assert_eq!(bson_f64(None), 0.0);
    }
}
