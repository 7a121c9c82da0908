//! Price persistence port trait.

use crate::domain::error::ScrapError;
use crate::domain::price_record::PriceRecord;
use chrono::NaiveDate;

pub trait PriceStore {
    /// Insert a batch atomically. Duplicate (yard, material, date) rows are kept.
    fn insert_records(&self, records: &[PriceRecord]) -> Result<(), ScrapError>;

    fn records_on(&self, date: NaiveDate) -> Result<Vec<PriceRecord>, ScrapError>;

    /// Every record, newest date first; ties keep insertion order.
    fn all_records(&self) -> Result<Vec<PriceRecord>, ScrapError>;

    fn list_yards(&self) -> Result<Vec<String>, ScrapError>;

    fn list_materials(&self) -> Result<Vec<String>, ScrapError>;

    /// First and last date-stamp, `None` when the store is empty.
    fn date_bounds(&self) -> Result<Option<(NaiveDate, NaiveDate)>, ScrapError>;

    /// One material's prices between two dates inclusive, oldest first.
    fn material_history(
        &self,
        material: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<PriceRecord>, ScrapError>;

    fn count(&self) -> Result<usize, ScrapError>;

    /// Delete every record.
    fn reset(&self) -> Result<(), ScrapError>;
}
