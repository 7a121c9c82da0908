//! SQLite price store adapter.

use crate::domain::app_config::StoreConfig;
use crate::domain::error::ScrapError;
use crate::domain::price_record::{DATESTAMP_FORMAT, PriceRecord, parse_datestamp};
use crate::ports::price_store_port::PriceStore;
use chrono::NaiveDate;
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{Row, params};

const SELECT_COLUMNS: &str = "SELECT yard, material, price, unit, datestamp FROM prices";

pub struct SqliteAdapter {
    pool: Pool<SqliteConnectionManager>,
}

impl SqliteAdapter {
    pub fn from_config(config: &StoreConfig) -> Result<Self, ScrapError> {
        let manager = SqliteConnectionManager::file(&config.path);
        let pool = Pool::builder()
            .max_size(config.pool_size.max(1))
            .build(manager)
            .map_err(|e: r2d2::Error| ScrapError::Database {
                reason: e.to_string(),
            })?;

        tracing::debug!(path = %config.path.display(), "opened price store");
        Ok(Self { pool })
    }

    pub fn in_memory() -> Result<Self, ScrapError> {
        let manager = SqliteConnectionManager::memory();
        let pool = Pool::builder()
            .max_size(1)
            .build(manager)
            .map_err(|e: r2d2::Error| ScrapError::Database {
                reason: e.to_string(),
            })?;

        Ok(Self { pool })
    }

    pub fn initialize_schema(&self) -> Result<(), ScrapError> {
        let conn = self.conn()?;

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS prices (
                yard TEXT NOT NULL,
                material TEXT NOT NULL,
                price REAL NOT NULL,
                unit TEXT NOT NULL,
                datestamp TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_prices_datestamp ON prices(datestamp);
            CREATE INDEX IF NOT EXISTS idx_prices_material ON prices(material);",
        )
        .map_err(|e: rusqlite::Error| ScrapError::DatabaseQuery {
            reason: e.to_string(),
        })?;

        Ok(())
    }

    fn conn(&self) -> Result<PooledConnection<SqliteConnectionManager>, ScrapError> {
        self.pool.get().map_err(|e: r2d2::Error| ScrapError::Database {
            reason: e.to_string(),
        })
    }

    fn query_records(
        &self,
        query: &str,
        params: impl rusqlite::Params,
    ) -> Result<Vec<PriceRecord>, ScrapError> {
        let conn = self.conn()?;

        let mut stmt = conn
            .prepare(query)
            .map_err(|e: rusqlite::Error| ScrapError::DatabaseQuery {
                reason: e.to_string(),
            })?;

        let rows = stmt
            .query_map(params, record_from_row)
            .map_err(|e: rusqlite::Error| ScrapError::DatabaseQuery {
                reason: e.to_string(),
            })?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row.map_err(|e: rusqlite::Error| ScrapError::DatabaseQuery {
                reason: e.to_string(),
            })?);
        }

        Ok(records)
    }

    fn query_strings(&self, query: &str) -> Result<Vec<String>, ScrapError> {
        let conn = self.conn()?;

        let mut stmt = conn
            .prepare(query)
            .map_err(|e: rusqlite::Error| ScrapError::DatabaseQuery {
                reason: e.to_string(),
            })?;

        let rows = stmt
            .query_map([], |row| row.get(0))
            .map_err(|e: rusqlite::Error| ScrapError::DatabaseQuery {
                reason: e.to_string(),
            })?;

        let mut values = Vec::new();
        for row in rows {
            values.push(row.map_err(|e: rusqlite::Error| ScrapError::DatabaseQuery {
                reason: e.to_string(),
            })?);
        }

        Ok(values)
    }
}

fn record_from_row(row: &Row<'_>) -> rusqlite::Result<PriceRecord> {
    let date_str: String = row.get(4)?;
    let date = parse_datestamp(&date_str).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(
            4,
            rusqlite::types::Type::Text,
            Box::new(e),
        )
    })?;
    Ok(PriceRecord {
        yard: row.get(0)?,
        material: row.get(1)?,
        price: row.get(2)?,
        unit: row.get(3)?,
        date,
    })
}

fn datestamp(date: NaiveDate) -> String {
    date.format(DATESTAMP_FORMAT).to_string()
}

impl PriceStore for SqliteAdapter {
    fn insert_records(&self, records: &[PriceRecord]) -> Result<(), ScrapError> {
        let mut conn = self.conn()?;

        let tx = conn
            .transaction()
            .map_err(|e: rusqlite::Error| ScrapError::DatabaseQuery {
                reason: e.to_string(),
            })?;

        for record in records {
            tx.execute(
                "INSERT INTO prices (yard, material, price, unit, datestamp)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    record.yard,
                    record.material,
                    record.price,
                    record.unit,
                    record.datestamp()
                ],
            )
            .map_err(|e: rusqlite::Error| ScrapError::DatabaseQuery {
                reason: e.to_string(),
            })?;
        }

        tx.commit()
            .map_err(|e: rusqlite::Error| ScrapError::DatabaseQuery {
                reason: e.to_string(),
            })?;

        Ok(())
    }

    fn records_on(&self, date: NaiveDate) -> Result<Vec<PriceRecord>, ScrapError> {
        self.query_records(
            &format!("{SELECT_COLUMNS} WHERE datestamp = ?1 ORDER BY rowid"),
            params![datestamp(date)],
        )
    }

    fn all_records(&self) -> Result<Vec<PriceRecord>, ScrapError> {
        self.query_records(
            &format!("{SELECT_COLUMNS} ORDER BY datestamp DESC, rowid ASC"),
            [],
        )
    }

    fn list_yards(&self) -> Result<Vec<String>, ScrapError> {
        self.query_strings("SELECT DISTINCT yard FROM prices ORDER BY yard")
    }

    fn list_materials(&self) -> Result<Vec<String>, ScrapError> {
        self.query_strings("SELECT DISTINCT material FROM prices ORDER BY material")
    }

    fn date_bounds(&self) -> Result<Option<(NaiveDate, NaiveDate)>, ScrapError> {
        let conn = self.conn()?;

        let result: (Option<String>, Option<String>) = conn
            .query_row("SELECT MIN(datestamp), MAX(datestamp) FROM prices", [], |row| {
                Ok((row.get(0)?, row.get(1)?))
            })
            .map_err(|e: rusqlite::Error| ScrapError::DatabaseQuery {
                reason: e.to_string(),
            })?;

        match result {
            (Some(min_str), Some(max_str)) => {
                let min = parse_datestamp(&min_str).map_err(|e: chrono::ParseError| {
                    ScrapError::Database {
                        reason: e.to_string(),
                    }
                })?;
                let max = parse_datestamp(&max_str).map_err(|e: chrono::ParseError| {
                    ScrapError::Database {
                        reason: e.to_string(),
                    }
                })?;
                Ok(Some((min, max)))
            }
            _ => Ok(None),
        }
    }

    fn material_history(
        &self,
        material: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<PriceRecord>, ScrapError> {
        self.query_records(
            &format!(
                "{SELECT_COLUMNS}
                 WHERE material = ?1 AND datestamp >= ?2 AND datestamp <= ?3
                 ORDER BY datestamp ASC, rowid ASC"
            ),
            params![material, datestamp(start_date), datestamp(end_date)],
        )
    }

    fn count(&self) -> Result<usize, ScrapError> {
        let conn = self.conn()?;
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM prices", [], |row| row.get(0))
            .map_err(|e: rusqlite::Error| ScrapError::DatabaseQuery {
                reason: e.to_string(),
            })?;
        Ok(count as usize)
    }

    fn reset(&self) -> Result<(), ScrapError> {
        let conn = self.conn()?;
        let deleted = conn
            .execute("DELETE FROM prices", [])
            .map_err(|e: rusqlite::Error| ScrapError::DatabaseQuery {
                reason: e.to_string(),
            })?;
        tracing::info!(deleted, "price store reset");
        Ok(())
    }
}
