//! Price ingestion: turning a vendor snapshot into stored records.
//!
//! Rows that cannot be read are skipped and logged; the update as a whole
//! only reports whether new prices were stored or the source had nothing
//! newer than the store.

use crate::domain::error::ScrapError;
use crate::domain::price_record::PriceRecord;
use crate::ports::price_source_port::PriceSource;
use crate::ports::price_store_port::PriceStore;
use chrono::NaiveDate;

pub const DEFAULT_POUNDS_PER_NET_TON: f64 = 2000.0;

pub const UPDATED_PREFIX: &str = "Updated";

/// One table row as scraped: material name first, then the price cell.
#[derive(Debug, Clone, PartialEq)]
pub struct RawPriceRow {
    pub cells: Vec<String>,
}

impl RawPriceRow {
    pub fn new<S: Into<String>>(cells: impl IntoIterator<Item = S>) -> Self {
        Self {
            cells: cells.into_iter().map(Into::into).collect(),
        }
    }
}

/// Everything one fetch of a vendor page yields.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceSnapshot {
    pub yard: String,
    pub date: NaiveDate,
    pub rows: Vec<RawPriceRow>,
}

#[derive(Debug, Clone)]
pub struct IngestConfig {
    pub pounds_per_net_ton: f64,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            pounds_per_net_ton: DEFAULT_POUNDS_PER_NET_TON,
        }
    }
}

/// Why a single source row was not stored.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RecordError {
    #[error("expected material and price cells, found {found}")]
    MissingCells { found: usize },

    #[error("price cell has no '|' separator: {cell:?}")]
    MissingPriceSeparator { cell: String },

    #[error("price cell has no '/' unit separator: {cell:?}")]
    MissingUnitSeparator { cell: String },

    #[error("price is not a number: {value:?}")]
    InvalidPrice { value: String },

    #[error("price must be positive, got {price}")]
    NonPositivePrice { price: f64 },
}

#[derive(Debug, Clone)]
pub struct SkippedRow {
    pub material: Option<String>,
    pub reason: RecordError,
}

#[derive(Debug, Clone, Default)]
pub struct IngestBatch {
    pub records: Vec<PriceRecord>,
    pub skipped: Vec<SkippedRow>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum UpdateOutcome {
    /// New prices stored; `records` are every row now stored for `date`.
    Updated {
        yard: String,
        date: NaiveDate,
        records: Vec<PriceRecord>,
    },
    /// The store already holds the source's current date-stamp.
    NoNewData { yard: String, date: NaiveDate },
}

/// Read the date-stamp out of a header such as `Updated September 30, 2024`.
pub fn parse_source_date(header: &str) -> Result<NaiveDate, ScrapError> {
    let format_error = || ScrapError::SourceFormat {
        reason: format!("unreadable update header: {header:?}"),
    };

    let rest = header
        .trim()
        .strip_prefix(UPDATED_PREFIX)
        .ok_or_else(format_error)?
        .trim_start_matches(':');

    let tokens: Vec<&str> = rest.split_whitespace().collect();
    let [month, day, year] = tokens.as_slice() else {
        return Err(format_error());
    };
    let day = day.trim_end_matches(',');

    NaiveDate::parse_from_str(&format!("{month} {day} {year}"), "%B %d %Y")
        .map_err(|_| format_error())
}

/// Split a cell such as `$3.10/lb | $6,200/nt` into a per-unit price.
///
/// Only the text before `|` is read. Prices quoted per net ton (`nt`) are
/// converted to per pound.
pub fn parse_price_cell(cell: &str, pounds_per_net_ton: f64) -> Result<(f64, String), RecordError> {
    let (price_per_unit, _) = cell
        .split_once('|')
        .ok_or_else(|| RecordError::MissingPriceSeparator { cell: cell.into() })?;

    let (price_str, unit) = price_per_unit
        .trim()
        .split_once('/')
        .ok_or_else(|| RecordError::MissingUnitSeparator { cell: cell.into() })?;

    let digits: String = price_str
        .trim()
        .trim_start_matches('$')
        .chars()
        .filter(|&c| c != ',')
        .collect();
    let mut price: f64 = digits
        .parse()
        .ok()
        .filter(|p: &f64| p.is_finite())
        .ok_or_else(|| RecordError::InvalidPrice {
            value: price_str.trim().into(),
        })?;

    let mut unit = unit.trim().to_string();
    if unit.contains("nt") {
        price /= pounds_per_net_ton;
        unit = "lb".to_string();
    }

    if price <= 0.0 {
        return Err(RecordError::NonPositivePrice { price });
    }

    Ok((price, unit))
}

pub fn build_batch(snapshot: &SourceSnapshot, config: &IngestConfig) -> IngestBatch {
    let mut batch = IngestBatch::default();

    for row in &snapshot.rows {
        let material = row.cells.first().map(|m| m.trim().to_string());
        let (Some(name), Some(cell)) = (material.clone(), row.cells.get(1)) else {
            batch.skipped.push(SkippedRow {
                material,
                reason: RecordError::MissingCells {
                    found: row.cells.len(),
                },
            });
            continue;
        };

        match parse_price_cell(cell, config.pounds_per_net_ton) {
            Ok((price, unit)) => batch.records.push(PriceRecord::new(
                snapshot.yard.as_str(),
                name,
                price,
                unit,
                snapshot.date,
            )),
            Err(reason) => batch.skipped.push(SkippedRow { material, reason }),
        }
    }

    batch
}

/// Fetch once, compare against the store, insert what is new.
pub fn run_update(
    source: &dyn PriceSource,
    store: &dyn PriceStore,
    config: &IngestConfig,
) -> Result<UpdateOutcome, ScrapError> {
    let snapshot = source.fetch()?;
    let yard = snapshot.yard.clone();

    let latest = store.date_bounds()?.map(|(_, last)| last);
    if latest == Some(snapshot.date) {
        tracing::info!(%yard, date = %snapshot.date, "no new prices");
        return Ok(UpdateOutcome::NoNewData {
            yard,
            date: snapshot.date,
        });
    }

    let batch = build_batch(&snapshot, config);
    for skipped in &batch.skipped {
        tracing::warn!(
            material = skipped.material.as_deref().unwrap_or("?"),
            reason = %skipped.reason,
            "skipping source row"
        );
    }

    if batch.records.is_empty() {
        return Err(ScrapError::SourceFormat {
            reason: format!(
                "no readable prices on the {yard} page ({} rows skipped)",
                batch.skipped.len()
            ),
        });
    }

    store.insert_records(&batch.records)?;
    let records = store.records_on(snapshot.date)?;
    tracing::info!(
        %yard,
        date = %snapshot.date,
        inserted = batch.records.len(),
        skipped = batch.skipped.len(),
        "prices updated"
    );

    Ok(UpdateOutcome::Updated {
        yard,
        date: snapshot.date,
        records,
    })
}
