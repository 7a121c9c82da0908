//! Price table presentation.
//!
//! Columns declare a [`ColumnKind`] and each kind owns one formatting
//! strategy. Display sorting works on a copy of the evaluated rows and never
//! feeds back into the filter chain.

use crate::domain::format::{format_date, format_price};
use crate::domain::price_record::PriceRecord;
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Text,
    Currency,
    Date,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Yard,
    Material,
    Price,
    Unit,
    Date,
}

#[derive(Debug, Clone, Copy)]
pub struct Column {
    pub title: &'static str,
    pub field: Field,
    pub kind: ColumnKind,
}

pub const COLUMNS: [Column; 5] = [
    Column {
        title: "YARD",
        field: Field::Yard,
        kind: ColumnKind::Text,
    },
    Column {
        title: "MATERIAL",
        field: Field::Material,
        kind: ColumnKind::Text,
    },
    Column {
        title: "PRICE",
        field: Field::Price,
        kind: ColumnKind::Currency,
    },
    Column {
        title: "UNIT",
        field: Field::Unit,
        kind: ColumnKind::Text,
    },
    Column {
        title: "DATESTAMP",
        field: Field::Date,
        kind: ColumnKind::Date,
    },
];

impl Column {
    pub fn cell(&self, record: &PriceRecord) -> String {
        match (self.kind, self.field) {
            (ColumnKind::Currency, _) => format_price(record.price),
            (ColumnKind::Date, _) => format_date(record.date),
            (ColumnKind::Text, Field::Yard) => record.yard.clone(),
            (ColumnKind::Text, Field::Material) => record.material.clone(),
            (ColumnKind::Text, Field::Unit) => record.unit.clone(),
            (ColumnKind::Text, Field::Price) => record.price.to_string(),
            (ColumnKind::Text, Field::Date) => record.datestamp(),
        }
    }

    fn right_aligned(&self) -> bool {
        matches!(self.kind, ColumnKind::Currency | ColumnKind::Date)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Yard,
    Material,
    Date,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// Stable sort of a display copy; ties keep their filtered order.
pub fn sort_for_display<'a>(
    rows: &[&'a PriceRecord],
    key: SortKey,
    order: SortOrder,
) -> Vec<&'a PriceRecord> {
    let mut sorted = rows.to_vec();
    sorted.sort_by(|a, b| {
        let ord: Ordering = match key {
            SortKey::Yard => a.yard.cmp(&b.yard),
            SortKey::Material => a.material.cmp(&b.material),
            SortKey::Date => a.date.cmp(&b.date),
        };
        match order {
            SortOrder::Ascending => ord,
            SortOrder::Descending => ord.reverse(),
        }
    });
    sorted
}

pub fn render_table(rows: &[&PriceRecord]) -> String {
    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|r| COLUMNS.iter().map(|c| c.cell(r)).collect())
        .collect();

    let widths: Vec<usize> = COLUMNS
        .iter()
        .enumerate()
        .map(|(i, col)| {
            cells
                .iter()
                .map(|row| row[i].chars().count())
                .chain(std::iter::once(col.title.len()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut output = String::new();
    let header: Vec<String> = COLUMNS
        .iter()
        .zip(&widths)
        .map(|(col, &w)| pad(col.title, w, col.right_aligned()))
        .collect();
    output.push_str(header.join("  ").trim_end());
    output.push('\n');

    let rule: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();
    output.push_str(&rule.join("  "));
    output.push('\n');

    for row in &cells {
        let line: Vec<String> = COLUMNS
            .iter()
            .zip(&widths)
            .zip(row)
            .map(|((col, &w), cell)| pad(cell, w, col.right_aligned()))
            .collect();
        output.push_str(line.join("  ").trim_end());
        output.push('\n');
    }

    output
}

fn pad(value: &str, width: usize, right: bool) -> String {
    let fill = width.saturating_sub(value.chars().count());
    if right {
        format!("{}{}", " ".repeat(fill), value)
    } else {
        format!("{}{}", value, " ".repeat(fill))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(yard: &str, material: &str, price: f64, date: &str) -> PriceRecord {
        PriceRecord::new(
            yard,
            material,
            price,
            "lb",
            NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
        )
    }

    #[test]
    fn cells_follow_column_kind() {
        let r = record("Zubicks", "Copper", 3.1, "2024-02-01");
        let cells: Vec<String> = COLUMNS.iter().map(|c| c.cell(&r)).collect();
        assert_eq!(cells, vec!["Zubicks", "Copper", "$3.10", "lb", "February 1, 2024"]);
    }

    #[test]
    fn sort_by_material_is_stable() {
        let a = record("Zubicks", "Copper", 3.25, "2024-02-01");
        let b = record("Zubicks", "Aluminum", 0.60, "2024-02-01");
        let c = record("Zubicks", "Copper", 3.10, "2024-01-01");
        let rows = vec![&a, &b, &c];

        let sorted = sort_for_display(&rows, SortKey::Material, SortOrder::Ascending);
        let prices: Vec<f64> = sorted.iter().map(|r| r.price).collect();
        assert_eq!(prices, vec![0.60, 3.25, 3.10]);

        // the input slice is untouched
        assert_eq!(rows[0].price, 3.25);
    }

    #[test]
    fn sort_by_date_ascending_reverses_store_order() {
        let a = record("Zubicks", "Copper", 3.25, "2024-02-01");
        let b = record("Zubicks", "Copper", 3.10, "2024-01-01");
        let sorted = sort_for_display(&[&a, &b], SortKey::Date, SortOrder::Ascending);
        assert_eq!(sorted[0].price, 3.10);
    }

    #[test]
    fn render_table_aligns_columns() {
        let a = record("Zubicks", "Copper", 3.25, "2024-02-01");
        let b = record("Zubicks", "Aluminum", 0.60, "2024-12-11");
        let out = render_table(&[&a, &b]);
        let lines: Vec<&str> = out.lines().collect();

        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("YARD     MATERIAL  PRICE  UNIT"));
        assert!(lines[1].starts_with("-------  --------"));
        assert!(lines[2].ends_with(" February 1, 2024"));
        assert!(lines[3].contains("  60¢  lb"));
        assert!(lines[3].ends_with("December 11, 2024"));
    }

    #[test]
    fn render_empty_table_has_header_only() {
        let out = render_table(&[]);
        assert_eq!(out.lines().count(), 2);
    }
}
