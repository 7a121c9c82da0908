//! Zubicks price page adapter.
//!
//! The page carries an `<h4>Updated Month day, year</h4>` header and one or
//! more `<table>`s whose `<td>` rows hold a material name and a price cell.

use crate::adapters::html::{tag_blocks, text_of};
use crate::domain::error::ScrapError;
use crate::domain::ingest::{RawPriceRow, SourceSnapshot, UPDATED_PREFIX, parse_source_date};

/// Extract the update date and every non-empty table row from a page.
pub fn parse_page(html: &str, yard: &str) -> Result<SourceSnapshot, ScrapError> {
    // a page may repeat the header; the last one wins
    let header = tag_blocks(html, "h4")
        .into_iter()
        .map(text_of)
        .filter(|text| text.starts_with(UPDATED_PREFIX))
        .last()
        .ok_or_else(|| ScrapError::SourceFormat {
            reason: format!("no \"{UPDATED_PREFIX}\" header on the {yard} page"),
        })?;
    let date = parse_source_date(&header)?;

    let rows: Vec<RawPriceRow> = tag_blocks(html, "table")
        .into_iter()
        .flat_map(|table| tag_blocks(table, "tr"))
        .map(|tr| RawPriceRow::new(tag_blocks(tr, "td").into_iter().map(text_of)))
        .filter(|row| !row.cells.is_empty())
        .collect();

    tracing::debug!(%yard, %date, rows = rows.len(), "parsed price page");

    Ok(SourceSnapshot {
        yard: yard.to_string(),
        date,
        rows,
    })
}

#[cfg(feature = "fetch")]
mod http {
    use super::parse_page;
    use crate::domain::app_config::SourceConfig;
    use crate::domain::error::ScrapError;
    use crate::domain::ingest::SourceSnapshot;
    use crate::ports::price_source_port::PriceSource;
    use reqwest::blocking::Client;
    use std::time::Duration;

    pub struct ZubicksAdapter {
        client: Client,
        yard: String,
        url: String,
    }

    impl ZubicksAdapter {
        pub fn from_config(config: &SourceConfig) -> Result<Self, ScrapError> {
            let client = Client::builder()
                .timeout(Duration::from_secs(config.timeout_secs))
                .user_agent(config.user_agent.clone())
                .build()
                .map_err(|e: reqwest::Error| ScrapError::SourceUnavailable {
                    reason: e.to_string(),
                })?;

            Ok(Self {
                client,
                yard: config.yard.clone(),
                url: config.url.clone(),
            })
        }
    }

    impl PriceSource for ZubicksAdapter {
        fn fetch(&self) -> Result<SourceSnapshot, ScrapError> {
            tracing::info!(url = %self.url, "fetching price page");

            let unavailable = |e: reqwest::Error| ScrapError::SourceUnavailable {
                reason: e.to_string(),
            };
            let body = self
                .client
                .get(&self.url)
                .send()
                .and_then(|response| response.error_for_status())
                .and_then(|response| response.text())
                .map_err(unavailable)?;

            parse_page(&body, &self.yard)
        }
    }
}

#[cfg(feature = "fetch")]
pub use http::ZubicksAdapter;
