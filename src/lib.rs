//! StartUpLens: funding reporting core over MongoDB
//!
//! This crate is the presentation collaborator for the reporting layer: a
//! CLI whose subcommands mirror the dashboard, search, add, update, and
//! delete views and render the returned numeric series as text tables.

pub mod cli;

pub use cli::{Cli, Command};
