//! Startup collection operations
//!
//! [`StartupStore`] is the query/reporting layer over the `startups`
//! collection: the dashboard aggregations, the search view, and the four
//! mutations (add, status update, round append, delete). All reads are pure
//! with respect to the collection; every operation returns either its
//! result or a typed [`LensError`], and a zero-match mutation is a
//! [`MutationOutcome::NotFound`], never an error.

use std::sync::Arc;

use bson::{doc, Bson, Document};
use futures::TryStreamExt;
use mongodb::Collection;
use tracing::{debug, info};

use startuplens_core::error::{LensError, MutationOutcome};
use startuplens_core::models::{FundingRound, NewStartup, StartupRecord};
use startuplens_core::reports::{ChartSeries, DashboardMetrics};

use crate::mongo::MongoManager;
use crate::pipelines;

/// Name of the backing collection.
pub const STARTUPS_COLLECTION: &str = "startups";

/// Result cap for the search view; no pagination beyond it.
pub const SEARCH_RESULT_CAP: i64 = 50;
/// Result cap for the update-picker name lookup.
pub const NAME_PICK_LIMIT: i64 = 10;
/// Default bucket count for the top-industries and top-countries views.
pub const DEFAULT_TOP_LIMIT: i64 = 10;
/// Default year count for the yearly trend.
pub const DEFAULT_TREND_LIMIT: i64 = 30;
/// Default bucket count for the round type distribution.
pub const DEFAULT_ROUND_TYPE_LIMIT: i64 = 8;

/// Query/reporting layer over the startup collection.
///
/// Holds the injected connection manager; a handle is acquired per
/// operation (cached inside the manager after the first success).
pub struct StartupStore {
    manager: Arc<MongoManager>,
}

impl StartupStore {
    /// Create a store backed by the given connection manager.
    pub fn new(manager: Arc<MongoManager>) -> Self {
        Self { manager }
    }

    async fn records(&self) -> Result<Collection<StartupRecord>, LensError> {
        Ok(self
            .manager
            .acquire()
            .await?
            .collection::<StartupRecord>(STARTUPS_COLLECTION))
    }

    async fn documents(&self) -> Result<Collection<Document>, LensError> {
        Ok(self
            .manager
            .acquire()
            .await?
            .collection::<Document>(STARTUPS_COLLECTION))
    }

    /// Approximate record count (store-level estimate; not exact under
    /// concurrent writes).
    pub async fn count_all(&self) -> Result<u64, LensError> {
        self.records()
            .await?
            .estimated_document_count()
            .await
            .map_err(|e| LensError::query(e))
    }

    /// Sum of `amount` across every funding round of every record; 0 when
    /// no rounds exist.
    pub async fn total_funding(&self) -> Result<f64, LensError> {
        let rows = self.aggregate(pipelines::total_funding_pipeline()).await?;
        Ok(rows
            .first()
            .map(|row| pipelines::bson_f64(row.get("total")))
            .unwrap_or(0.0))
    }

    /// Top industries by total funding, descending.
    pub async fn top_industries(&self, limit: i64) -> Result<ChartSeries, LensError> {
        let rows = self
            .aggregate(pipelines::top_industries_pipeline(limit))
            .await?;
        Ok(pipelines::rows_to_series(&rows, "total"))
    }

    /// Top countries by total funding, descending.
    pub async fn top_countries(&self, limit: i64) -> Result<ChartSeries, LensError> {
        let rows = self
            .aggregate(pipelines::top_countries_pipeline(limit))
            .await?;
        Ok(pipelines::rows_to_series(&rows, "total"))
    }

    /// Funding per year, ascending; rounds with malformed dates are
    /// excluded from this view only.
    pub async fn yearly_trend(&self, limit: i64) -> Result<ChartSeries, LensError> {
        let rows = self
            .aggregate(pipelines::yearly_trend_pipeline(limit))
            .await?;
        Ok(pipelines::rows_to_series(&rows, "total"))
    }

    /// Round count per (case-folded) round type, descending.
    pub async fn round_type_distribution(&self, limit: i64) -> Result<ChartSeries, LensError> {
        let rows = self
            .aggregate(pipelines::round_type_distribution_pipeline(limit))
            .await?;
        Ok(pipelines::rows_to_series(&rows, "count"))
    }

    /// Distinct non-empty industries, sorted.
    pub async fn distinct_industries(&self) -> Result<Vec<String>, LensError> {
        self.distinct_strings("industry").await
    }

    /// Distinct non-empty countries, sorted.
    pub async fn distinct_countries(&self) -> Result<Vec<String>, LensError> {
        self.distinct_strings("country").await
    }

    /// Headline metrics for the dashboard view.
    pub async fn dashboard_metrics(&self) -> Result<DashboardMetrics, LensError> {
        Ok(DashboardMetrics {
            total_startups: self.count_all().await?,
            total_funding: self.total_funding().await?,
            industries: self.distinct_industries().await?.len(),
            countries: self.distinct_countries().await?.len(),
        })
    }

    /// Search by case-insensitive name fragment AND exact industry/country
    /// filters; "All"/empty filters are ignored. Capped at
    /// [`SEARCH_RESULT_CAP`] records.
    pub async fn search(
        &self,
        name_contains: Option<&str>,
        industry: Option<&str>,
        country: Option<&str>,
    ) -> Result<Vec<StartupRecord>, LensError> {
        let filter = pipelines::search_filter(name_contains, industry, country);
        debug!("Searching startups with filter: {filter}");

        let cursor = self
            .records()
            .await?
            .find(filter)
            .limit(SEARCH_RESULT_CAP)
            .await
            .map_err(|e| LensError::query(e))?;

        cursor
            .try_collect()
            .await
            .map_err(|e| LensError::query(e))
    }

    /// Candidate names matching a fragment, for the update picker.
    pub async fn find_names(&self, fragment: &str) -> Result<Vec<String>, LensError> {
        let cursor = self
            .records()
            .await?
            .find(pipelines::name_fragment_filter(fragment))
            .limit(NAME_PICK_LIMIT)
            .await
            .map_err(|e| LensError::query(e))?;

        let records: Vec<StartupRecord> = cursor
            .try_collect()
            .await
            .map_err(|e| LensError::query(e))?;

        Ok(records.into_iter().map(|record| record.name).collect())
    }

    /// Load one record by exact name.
    pub async fn get(&self, name: &str) -> Result<Option<StartupRecord>, LensError> {
        self.records()
            .await?
            .find_one(pipelines::name_filter(name))
            .await
            .map_err(|e| LensError::query(e))
    }

    /// Validate and insert a new startup; returns the store-assigned
    /// identity. Rejected submissions never reach the store.
    pub async fn add(&self, submission: NewStartup) -> Result<Bson, LensError> {
        submission.validate()?;
        let record = submission.into_record();

        let result = self
            .records()
            .await?
            .insert_one(&record)
            .await
            .map_err(|e| LensError::query(e))?;

        info!("Added startup: {}", record.name);
        Ok(result.inserted_id)
    }

    /// Replace the status of the record with the given exact name.
    ///
    /// Any value may replace any other; there is no transition check.
    pub async fn set_status(
        &self,
        name: &str,
        new_status: &str,
    ) -> Result<MutationOutcome, LensError> {
        let result = self
            .records()
            .await?
            .update_one(
                pipelines::name_filter(name),
                doc! { "$set": { "status": new_status } },
            )
            .await
            .map_err(|e| LensError::query(e))?;

        if result.matched_count == 0 {
            debug!("set_status matched nothing for: {name}");
            return Ok(MutationOutcome::NotFound);
        }
        info!("Updated status of {name} to {new_status}");
        Ok(MutationOutcome::Applied)
    }

    /// Append a funding round to the record with the given exact name
    /// (atomic array push). Dates are not required to be monotonic and no
    /// valuation history is recomputed.
    pub async fn append_funding_round(
        &self,
        name: &str,
        round: FundingRound,
    ) -> Result<MutationOutcome, LensError> {
        let round_bson = bson::to_bson(&round).map_err(|e| LensError::query(e))?;

        let result = self
            .documents()
            .await?
            .update_one(
                pipelines::name_filter(name),
                doc! { "$push": { "funding_rounds": round_bson } },
            )
            .await
            .map_err(|e| LensError::query(e))?;

        if result.matched_count == 0 {
            debug!("append_funding_round matched nothing for: {name}");
            return Ok(MutationOutcome::NotFound);
        }
        info!("Appended funding round to {name}");
        Ok(MutationOutcome::Applied)
    }

    /// Delete the record with the given exact name. Zero matches is a
    /// non-fatal NotFound outcome.
    pub async fn delete(&self, name: &str) -> Result<MutationOutcome, LensError> {
        let result = self
            .records()
            .await?
            .delete_one(pipelines::name_filter(name))
            .await
            .map_err(|e| LensError::query(e))?;

        if result.deleted_count == 0 {
            debug!("delete matched nothing for: {name}");
            return Ok(MutationOutcome::NotFound);
        }
        info!("Deleted startup: {name}");
        Ok(MutationOutcome::Applied)
    }

    async fn aggregate(&self, pipeline: Vec<Document>) -> Result<Vec<Document>, LensError> {
        let cursor = self
            .documents()
            .await?
            .aggregate(pipeline)
            .await
            .map_err(|e| LensError::query(e))?;

        cursor
            .try_collect()
            .await
            .map_err(|e| LensError::query(e))
    }

    async fn distinct_strings(&self, field: &str) -> Result<Vec<String>, LensError> {
        let values = self
            .documents()
            .await?
            .distinct(field, doc! {})
            .await
            .map_err(|e| LensError::query(e))?;

        let mut strings: Vec<String> = values
            .into_iter()
            .filter_map(|value| match value {
                Bson::String(s) if !s.is_empty() => Some(s),
                _ => None,
            })
            .collect();
        strings.sort();
        Ok(strings)
    }
}
