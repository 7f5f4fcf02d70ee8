//! StartUpLens Core Module
//!
//! The core module provides the fundamental types for the StartUpLens
//! funding reporting system: the startup record model, configuration
//! resolution for the backing store, the error taxonomy, and the
//! display-ready report types returned to the presentation layer.

pub mod config;
pub mod error;
pub mod models;
pub mod reports;

pub use config::StoreSettings;
pub use error::{LensError, MutationOutcome};
pub use models::{
    FundingRound, NewStartup, StartupRecord, ROUND_TYPE_OPTIONS, STATUS_OPTIONS,
};
pub use reports::{ChartSeries, DashboardMetrics};
