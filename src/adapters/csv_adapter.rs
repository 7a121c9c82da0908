//! CSV export and import of price records.
//!
//! Columns follow the store: `yard,material,price,unit,datestamp`, with
//! unformatted prices and `YYYY-MM-DD` dates.

use crate::domain::error::ScrapError;
use crate::domain::price_record::{PriceRecord, parse_datestamp};
use std::fs;
use std::io::Write;
use std::path::Path;

pub const CSV_HEADER: [&str; 5] = ["yard", "material", "price", "unit", "datestamp"];

pub fn write_records<W: Write>(writer: W, rows: &[&PriceRecord]) -> Result<(), ScrapError> {
    let mut wtr = csv::Writer::from_writer(writer);
    let csv_error = |e: csv::Error| ScrapError::Io(std::io::Error::other(e));

    wtr.write_record(CSV_HEADER).map_err(csv_error)?;
    for record in rows {
        wtr.write_record([
            record.yard.as_str(),
            record.material.as_str(),
            &record.price.to_string(),
            record.unit.as_str(),
            &record.datestamp(),
        ])
        .map_err(csv_error)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn export_csv(path: &Path, rows: &[&PriceRecord]) -> Result<(), ScrapError> {
    let file = fs::File::create(path)?;
    write_records(file, rows)?;
    tracing::info!(path = %path.display(), rows = rows.len(), "exported prices");
    Ok(())
}

/// Read records written by [`export_csv`]. Any malformed row fails the whole
/// import.
pub fn import_csv(path: &Path) -> Result<Vec<PriceRecord>, ScrapError> {
    let content = fs::read_to_string(path)?;
    let mut rdr = csv::Reader::from_reader(content.as_bytes());
    let mut records = Vec::new();

    for (index, result) in rdr.records().enumerate() {
        let line = index + 2;
        let row = result.map_err(|e| ScrapError::SourceFormat {
            reason: format!("{}: CSV parse error: {}", path.display(), e),
        })?;

        let field = |i: usize, name: &'static str| {
            row.get(i)
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .ok_or_else(|| ScrapError::SourceFormat {
                    reason: format!("{}:{line}: missing {name} column", path.display()),
                })
        };

        let price: f64 = field(2, "price")?
            .parse()
            .map_err(|e| ScrapError::SourceFormat {
                reason: format!("{}:{line}: invalid price: {}", path.display(), e),
            })?;
        if !price.is_finite() || price <= 0.0 {
            return Err(ScrapError::SourceFormat {
                reason: format!("{}:{line}: price must be positive", path.display()),
            });
        }
        let date = parse_datestamp(field(4, "datestamp")?).map_err(|e| ScrapError::SourceFormat {
            reason: format!("{}:{line}: invalid datestamp: {}", path.display(), e),
        })?;

        records.push(PriceRecord::new(
            field(0, "yard")?,
            field(1, "material")?,
            price,
            field(3, "unit")?,
            date,
        ));
    }

    Ok(records)
}
