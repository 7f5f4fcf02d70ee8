//! StartUpLens Databases Module
//!
//! The databases module provides connection management for the backing
//! MongoDB store and the query/reporting layer over the startup
//! collection: aggregation pipeline construction, row post-processing,
//! search, and the record mutations.

pub mod mongo;
pub mod pipelines;
pub mod startups;

pub use mongo::{ConnectionStatus, MongoManager};
pub use startups::{
    StartupStore, DEFAULT_ROUND_TYPE_LIMIT, DEFAULT_TOP_LIMIT, DEFAULT_TREND_LIMIT,
    NAME_PICK_LIMIT, SEARCH_RESULT_CAP, STARTUPS_COLLECTION,
};
