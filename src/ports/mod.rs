//! Port traits implemented by adapters.

pub mod chart_port;
pub mod config_port;
pub mod price_source_port;
pub mod price_store_port;
