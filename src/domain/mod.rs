//! Core domain types and logic.

pub mod app_config;
pub mod chart;
pub mod config_validation;
pub mod date_range;
pub mod error;
pub mod filter_chain;
pub mod format;
pub mod ingest;
pub mod price_record;
pub mod table;
