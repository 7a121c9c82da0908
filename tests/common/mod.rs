#![allow(dead_code)]

use chrono::NaiveDate;
use scraptrack::domain::chart::PriceChart;
use scraptrack::domain::error::ScrapError;
use scraptrack::domain::ingest::{RawPriceRow, SourceSnapshot};
pub use scraptrack::domain::price_record::PriceRecord;
use scraptrack::ports::chart_port::ChartPort;
use scraptrack::ports::price_source_port::PriceSource;
use scraptrack::ports::price_store_port::PriceStore;
use std::cell::{Cell, RefCell};
use std::path::{Path, PathBuf};

/// In-memory store keeping rows in insertion order.
pub struct MockPriceStore {
    pub records: RefCell<Vec<PriceRecord>>,
    pub fail_with: Option<String>,
}

impl MockPriceStore {
    pub fn new() -> Self {
        Self {
            records: RefCell::new(Vec::new()),
            fail_with: None,
        }
    }

    pub fn with_records(records: Vec<PriceRecord>) -> Self {
        Self {
            records: RefCell::new(records),
            fail_with: None,
        }
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            records: RefCell::new(Vec::new()),
            fail_with: Some(reason.to_string()),
        }
    }

    fn check(&self) -> Result<(), ScrapError> {
        match &self.fail_with {
            Some(reason) => Err(ScrapError::DatabaseQuery {
                reason: reason.clone(),
            }),
            None => Ok(()),
        }
    }
}

impl PriceStore for MockPriceStore {
    fn insert_records(&self, records: &[PriceRecord]) -> Result<(), ScrapError> {
        self.check()?;
        self.records.borrow_mut().extend_from_slice(records);
        Ok(())
    }

    fn records_on(&self, date: NaiveDate) -> Result<Vec<PriceRecord>, ScrapError> {
        self.check()?;
        Ok(self
            .records
            .borrow()
            .iter()
            .filter(|r| r.date == date)
            .cloned()
            .collect())
    }

    fn all_records(&self) -> Result<Vec<PriceRecord>, ScrapError> {
        self.check()?;
        let mut records = self.records.borrow().clone();
        // stable: equal dates keep insertion order
        records.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(records)
    }

    fn list_yards(&self) -> Result<Vec<String>, ScrapError> {
        self.check()?;
        let mut yards: Vec<String> = self.records.borrow().iter().map(|r| r.yard.clone()).collect();
        yards.sort();
        yards.dedup();
        Ok(yards)
    }

    fn list_materials(&self) -> Result<Vec<String>, ScrapError> {
        self.check()?;
        let mut materials: Vec<String> = self
            .records
            .borrow()
            .iter()
            .map(|r| r.material.clone())
            .collect();
        materials.sort();
        materials.dedup();
        Ok(materials)
    }

    fn date_bounds(&self) -> Result<Option<(NaiveDate, NaiveDate)>, ScrapError> {
        self.check()?;
        let records = self.records.borrow();
        let first = records.iter().map(|r| r.date).min();
        let last = records.iter().map(|r| r.date).max();
        Ok(first.zip(last))
    }

    fn material_history(
        &self,
        material: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<PriceRecord>, ScrapError> {
        self.check()?;
        let mut history: Vec<PriceRecord> = self
            .records
            .borrow()
            .iter()
            .filter(|r| r.material == material && r.date >= start_date && r.date <= end_date)
            .cloned()
            .collect();
        history.sort_by_key(|r| r.date);
        Ok(history)
    }

    fn count(&self) -> Result<usize, ScrapError> {
        self.check()?;
        Ok(self.records.borrow().len())
    }

    fn reset(&self) -> Result<(), ScrapError> {
        self.check()?;
        self.records.borrow_mut().clear();
        Ok(())
    }
}

/// Source returning a fixed snapshot, or a fixed failure.
pub struct MockPriceSource {
    pub snapshot: Result<SourceSnapshot, String>,
    pub fetches: Cell<usize>,
}

impl MockPriceSource {
    pub fn new(snapshot: SourceSnapshot) -> Self {
        Self {
            snapshot: Ok(snapshot),
            fetches: Cell::new(0),
        }
    }

    pub fn unavailable(reason: &str) -> Self {
        Self {
            snapshot: Err(reason.to_string()),
            fetches: Cell::new(0),
        }
    }
}

impl PriceSource for MockPriceSource {
    fn fetch(&self) -> Result<SourceSnapshot, ScrapError> {
        self.fetches.set(self.fetches.get() + 1);
        self.snapshot
            .clone()
            .map_err(|reason| ScrapError::SourceUnavailable { reason })
    }
}

/// Records every chart it is asked to write instead of rendering it.
pub struct RecordingChartPort {
    pub written: RefCell<Vec<(String, PathBuf)>>,
}

impl RecordingChartPort {
    pub fn new() -> Self {
        Self {
            written: RefCell::new(Vec::new()),
        }
    }
}

impl ChartPort for RecordingChartPort {
    fn write(&self, chart: &PriceChart, output_path: &Path) -> Result<(), ScrapError> {
        self.written
            .borrow_mut()
            .push((chart.title.clone(), output_path.to_path_buf()));
        Ok(())
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn make_record(yard: &str, material: &str, price: f64, datestamp: &str) -> PriceRecord {
    PriceRecord::new(
        yard,
        material,
        price,
        "lb",
        NaiveDate::parse_from_str(datestamp, "%Y-%m-%d").unwrap(),
    )
}

/// The three-record store used across the end-to-end scenarios.
pub fn sample_records() -> Vec<PriceRecord> {
    vec![
        make_record("Zubicks", "Copper", 3.10, "2024-01-01"),
        make_record("Zubicks", "Copper", 3.25, "2024-02-01"),
        make_record("Zubicks", "Aluminum", 0.60, "2024-02-01"),
    ]
}

pub fn snapshot(date: NaiveDate, rows: &[(&str, &str)]) -> SourceSnapshot {
    SourceSnapshot {
        yard: "Zubicks".to_string(),
        date,
        rows: rows
            .iter()
            .map(|(material, cell)| RawPriceRow::new([*material, *cell]))
            .collect(),
    }
}
