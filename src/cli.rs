//! CLI commands and rendering
//!
//! Each subcommand maps to one view of the original dashboard. Monetary
//! series come back from the reporting layer as canonical USD amounts and
//! are scaled to billions here, at the presentation boundary. A query
//! failure inside one dashboard section degrades that section to its
//! empty/zero state instead of aborting the whole view.

use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing::warn;

use startuplens_core::error::{LensError, MutationOutcome};
use startuplens_core::models::{FundingRound, NewStartup, ROUND_TYPE_OPTIONS, STATUS_OPTIONS};
use startuplens_core::reports::ChartSeries;
use startuplens_core::StoreSettings;
use startuplens_databases::{
    MongoManager, StartupStore, DEFAULT_ROUND_TYPE_LIMIT, DEFAULT_TOP_LIMIT, DEFAULT_TREND_LIMIT,
};

/// StartUpLens: explore global startup funding from the terminal.
#[derive(Debug, Parser)]
#[command(name = "startuplens", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show funding metrics and the aggregate charts
    Dashboard,
    /// Search startups by name fragment and exact filters
    Search {
        /// Case-insensitive name fragment
        #[arg(long)]
        name: Option<String>,
        /// Exact industry filter ("All" or empty means no filter)
        #[arg(long)]
        industry: Option<String>,
        /// Exact country filter ("All" or empty means no filter)
        #[arg(long)]
        country: Option<String>,
    },
    /// Add a new startup, optionally with an initial funding round
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        industry: String,
        #[arg(long)]
        country: String,
        #[arg(long, default_value_t = 2024)]
        founded_year: i32,
        /// Status suggestion list; the store itself accepts any value
        #[arg(long, default_value = "Seed", value_parser = clap::builder::PossibleValuesParser::new(STATUS_OPTIONS.iter().copied()))]
        status: String,
        /// Comma-separated founder names
        #[arg(long, value_delimiter = ',')]
        founders: Vec<String>,
        /// Initial round type; the round is only recorded together with a
        /// positive --amount
        #[arg(long)]
        round_type: Option<String>,
        /// Initial round amount in USD
        #[arg(long)]
        amount: Option<f64>,
        /// Initial round valuation in USD
        #[arg(long)]
        valuation: Option<f64>,
        /// Initial round date (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<String>,
        /// Comma-separated investor names
        #[arg(long, value_delimiter = ',')]
        investors: Vec<String>,
    },
    /// Replace the status of a startup (exact name match)
    SetStatus {
        #[arg(long)]
        name: String,
        /// Any listed value may replace any other; transitions are not
        /// validated
        #[arg(long, value_parser = clap::builder::PossibleValuesParser::new(STATUS_OPTIONS.iter().copied()))]
        status: String,
    },
    /// Append a funding round to a startup (exact name match)
    AddRound {
        #[arg(long)]
        name: String,
        #[arg(long, value_parser = clap::builder::PossibleValuesParser::new(ROUND_TYPE_OPTIONS.iter().copied()))]
        round_type: String,
        #[arg(long)]
        amount: f64,
        #[arg(long)]
        valuation: Option<f64>,
        /// Round date (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<String>,
        /// Comma-separated investor names
        #[arg(long, value_delimiter = ',')]
        investors: Vec<String>,
    },
    /// Delete a startup (exact name match)
    Delete {
        #[arg(long)]
        name: String,
    },
}

/// Execute the parsed command against a store built from `settings`.
pub async fn run(cli: Cli, settings: StoreSettings) -> Result<()> {
    let manager = Arc::new(MongoManager::new(settings));
    let store = StartupStore::new(manager);

    match cli.command {
        Command::Dashboard => run_dashboard(&store).await,
        Command::Search {
            name,
            industry,
            country,
        } => run_search(&store, name, industry, country).await,
        Command::Add {
            name,
            industry,
            country,
            founded_year,
            status,
            founders,
            round_type,
            amount,
            valuation,
            date,
            investors,
        } => {
            let initial_round = round_type.map(|round_type| FundingRound {
                round_type: Some(round_type),
                amount,
                date: Some(date.unwrap_or_else(today)),
                valuation: valuation.filter(|v| *v > 0.0),
                investors: clean_names(investors),
            });

            let submission = NewStartup {
                name,
                industry,
                country,
                founded_year,
                status,
                founders: clean_names(founders),
                initial_round,
            };

            let inserted_id = store.add(submission).await?;
            println!("Successfully added startup (document id: {inserted_id})");
            Ok(())
        }
        Command::SetStatus { name, status } => {
            match store.set_status(&name, &status).await? {
                MutationOutcome::Applied => println!("Status updated to: {status}"),
                MutationOutcome::NotFound => {
                    println!("No startup named '{name}' was found.");
                    suggest_names(&store, &name).await;
                }
            }
            Ok(())
        }
        Command::AddRound {
            name,
            round_type,
            amount,
            valuation,
            date,
            investors,
        } => {
            let round = FundingRound {
                round_type: Some(round_type),
                amount: Some(amount),
                date: Some(date.unwrap_or_else(today)),
                valuation: valuation.filter(|v| *v > 0.0),
                investors: clean_names(investors),
            };

            match store.append_funding_round(&name, round).await? {
                MutationOutcome::Applied => println!("Funding round added to {name}"),
                MutationOutcome::NotFound => {
                    println!("No startup named '{name}' was found.");
                    suggest_names(&store, &name).await;
                }
            }
            Ok(())
        }
        Command::Delete { name } => {
            match store.delete(&name).await? {
                MutationOutcome::Applied => println!("Deleted startup: {name}"),
                MutationOutcome::NotFound => println!("No startup named '{name}' was found."),
            }
            Ok(())
        }
    }
}

async fn run_dashboard(store: &StartupStore) -> Result<()> {
    println!("StartUpLens Dashboard");
    println!("=====================");

    match store.dashboard_metrics().await {
        Ok(metrics) => {
            println!("Total Startups: {}", metrics.total_startups);
            println!(
                "Total Funding:  ${:.2}B",
                to_billions(metrics.total_funding)
            );
            println!("Industries:     {}", metrics.industries);
            println!("Countries:      {}", metrics.countries);
        }
        Err(e) => {
            warn!("dashboard metrics unavailable: {e}");
            println!("(metrics unavailable this refresh)");
        }
    }

    render_money_series(
        "Top 10 Industries by Total Funding ($B)",
        store.top_industries(DEFAULT_TOP_LIMIT).await,
    );
    render_money_series(
        "Yearly Funding Trend ($B)",
        store.yearly_trend(DEFAULT_TREND_LIMIT).await,
    );
    render_money_series(
        "Top 10 Countries by Total Funding ($B)",
        store.top_countries(DEFAULT_TOP_LIMIT).await,
    );
    render_count_series(
        "Funding Round Distribution",
        store.round_type_distribution(DEFAULT_ROUND_TYPE_LIMIT).await,
    );

    Ok(())
}

async fn run_search(
    store: &StartupStore,
    name: Option<String>,
    industry: Option<String>,
    country: Option<String>,
) -> Result<()> {
    let results = store
        .search(name.as_deref(), industry.as_deref(), country.as_deref())
        .await?;

    println!("Found {} startups", results.len());
    if results.is_empty() {
        println!("No startups found matching your criteria.");
        return Ok(());
    }

    for record in &results {
        println!();
        println!(
            "{} - {}",
            record.name,
            record.industry.as_deref().unwrap_or("N/A")
        );
        println!("  Country: {}", record.country.as_deref().unwrap_or("N/A"));
        println!(
            "  Founded: {}",
            record
                .founded_year
                .map_or_else(|| "N/A".to_string(), |y| y.to_string())
        );
        println!("  Status:  {}", record.status.as_deref().unwrap_or("N/A"));
        if !record.founders.is_empty() {
            let shown: Vec<&str> = record.founders.iter().take(3).map(String::as_str).collect();
            println!("  Founders: {}", shown.join(", "));
        }
        println!("  Total Funding: ${}", format_usd(record.total_funding()));
        println!("  Funding Rounds: {}", record.funding_rounds.len());
        if let Some(latest) = record.latest_round() {
            println!("  Latest Round: {}", latest.round_type_or_unknown());
            println!("  Latest Amount: ${}", format_usd(latest.amount_usd()));
        }
    }

    Ok(())
}

/// Offer close name matches after a zero-match update, the way the update
/// page's picker did. A lookup failure here is not worth surfacing.
async fn suggest_names(store: &StartupStore, fragment: &str) {
    match store.find_names(fragment).await {
        Ok(candidates) if !candidates.is_empty() => {
            println!("Did you mean: {}", candidates.join(", "));
        }
        Ok(_) => {}
        Err(e) => warn!("name suggestion lookup failed: {e}"),
    }
}

/// A query failure degrades to the empty series; the caller renders the
/// zero state.
fn series_or_empty(result: std::result::Result<ChartSeries, LensError>, title: &str) -> ChartSeries {
    match result {
        Ok(series) => series,
        Err(e) => {
            warn!("{title} unavailable: {e}");
            ChartSeries::default()
        }
    }
}

fn render_money_series(title: &str, result: std::result::Result<ChartSeries, LensError>) {
    let series = series_or_empty(result, title);
    println!();
    println!("{title}");
    if series.is_empty() {
        println!("  (no data)");
        return;
    }
    for (label, value) in series.labels.iter().zip(&series.values) {
        println!("  {label:<16} {:.2}", to_billions(*value));
    }
}

fn render_count_series(title: &str, result: std::result::Result<ChartSeries, LensError>) {
    let series = series_or_empty(result, title);
    println!();
    println!("{title}");
    if series.is_empty() {
        println!("  (no data)");
        return;
    }
    for (label, value) in series.labels.iter().zip(&series.values) {
        println!("  {label:<16} {value:.0}");
    }
}

/// Scale a canonical USD amount to billions for display.
pub fn to_billions(amount: f64) -> f64 {
    amount / 1e9
}

/// Render a USD amount with thousands separators, no cents.
pub fn format_usd(amount: f64) -> String {
    let whole = amount.round() as i64;
    let negative = whole < 0;
    let digits = whole.unsigned_abs().to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if negative {
        format!("-{grouped}")
    } else {
        grouped
    }
}

fn today() -> String {
    Utc::now().format("%Y-%m-%d").to_string()
}

fn clean_names(names: Vec<String>) -> Vec<String> {
    names
        .into_iter()
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .collect()
}
