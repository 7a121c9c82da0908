//! Price history chart model.
//!
//! Holds everything a renderer needs (points, axis bounds, monthly ticks with
//! their visibility) so that renderers stay free of date logic.

use crate::domain::date_range::DateRange;
use crate::domain::error::ScrapError;
use crate::domain::filter_chain::ALL_MATERIALS;
use crate::domain::price_record::PriceRecord;
use chrono::{Datelike, Months, NaiveDate};

const SMALL_PRICE: f64 = 0.5;
const SMALL_PRICE_PADDING: f64 = 0.01;
const PRICE_PADDING: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartPoint {
    pub date: NaiveDate,
    pub price: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MonthTick {
    pub date: NaiveDate,
    /// Month abbreviation and year on separate lines.
    pub label: String,
    pub visible: bool,
}

#[derive(Debug, Clone)]
pub struct PriceChart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub range: DateRange,
    pub points: Vec<ChartPoint>,
    pub ticks: Vec<MonthTick>,
    pub y_min: f64,
    pub y_max: f64,
}

impl PriceChart {
    pub fn build(
        yard: &str,
        material: &str,
        range: DateRange,
        history: &[PriceRecord],
    ) -> Result<Self, ScrapError> {
        if material == ALL_MATERIALS || material.trim().is_empty() {
            return Err(ScrapError::InvalidSelection {
                reason: "select a material to plot".into(),
            });
        }

        let mut points: Vec<ChartPoint> = history
            .iter()
            .filter(|r| r.material == material && range.contains(r.date))
            .map(|r| ChartPoint {
                date: r.date,
                price: r.price,
            })
            .collect();
        if points.is_empty() {
            return Err(ScrapError::NoDataAvailable);
        }
        points.sort_by_key(|p| p.date);

        let (y_min, y_max) = padded_bounds(&points);

        Ok(Self {
            title: format!("{yard} Purchase Price for\n{material}"),
            x_label: "Date".into(),
            y_label: "Price per Pound".into(),
            range,
            ticks: month_ticks(range),
            points,
            y_min,
            y_max,
        })
    }

    pub fn visible_ticks(&self) -> impl Iterator<Item = &MonthTick> {
        self.ticks.iter().filter(|t| t.visible)
    }
}

/// One tick on the first of every month inside `range`.
pub fn month_ticks(range: DateRange) -> Vec<MonthTick> {
    let start = range.start();
    let mut current = if start.day() == 1 {
        Some(start)
    } else {
        start
            .with_day(1)
            .and_then(|d| d.checked_add_months(Months::new(1)))
    };

    let mut ticks = Vec::new();
    while let Some(date) = current.filter(|d| *d <= range.end()) {
        ticks.push(MonthTick {
            date,
            label: date.format("%b\n%Y").to_string(),
            visible: range.tick_label_visible(ticks.len()),
        });
        current = date.checked_add_months(Months::new(1));
    }
    ticks
}

fn padded_bounds(points: &[ChartPoint]) -> (f64, f64) {
    let min = points.iter().map(|p| p.price).fold(f64::INFINITY, f64::min);
    let max = points.iter().map(|p| p.price).fold(f64::NEG_INFINITY, f64::max);
    let padding = if min < SMALL_PRICE {
        SMALL_PRICE_PADDING
    } else {
        PRICE_PADDING
    };
    (min - padding, max + padding)
}
