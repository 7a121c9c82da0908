//! Price record representation.

use chrono::NaiveDate;

/// Storage and wire format for date-stamps.
pub const DATESTAMP_FORMAT: &str = "%Y-%m-%d";

/// One quoted price from one yard on one date.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceRecord {
    pub yard: String,
    pub material: String,
    pub price: f64,
    pub unit: String,
    pub date: NaiveDate,
}

impl PriceRecord {
    pub fn new(
        yard: impl Into<String>,
        material: impl Into<String>,
        price: f64,
        unit: impl Into<String>,
        date: NaiveDate,
    ) -> Self {
        Self {
            yard: yard.into(),
            material: material.into(),
            price,
            unit: unit.into(),
            date,
        }
    }

    pub fn datestamp(&self) -> String {
        self.date.format(DATESTAMP_FORMAT).to_string()
    }
}

/// Earliest date in a record set, if any.
pub fn earliest_date(records: &[PriceRecord]) -> Option<NaiveDate> {
    records.iter().map(|r| r.date).min()
}

/// Parse a `YYYY-MM-DD` date-stamp.
pub fn parse_datestamp(value: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(value.trim(), DATESTAMP_FORMAT)
}
