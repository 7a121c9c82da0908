//! Date-range labels and their resolution to concrete calendar spans.
//!
//! A label such as "Last 6 Months" is anchored on `today` and shifted back
//! with calendar-month arithmetic (the day of month is clamped to the length
//! of the target month). "All Dates", and any label that is not recognised,
//! reaches back to the earliest recorded price.
//!
//! The same span drives tick thinning on the chart's monthly axis: the longer
//! the span in whole years, the sparser the visible labels.

use crate::domain::error::ScrapError;
use chrono::{Months, NaiveDate};
use std::fmt;

pub const ALL_DATES: &str = "All Dates";

const DAYS_PER_YEAR: i64 = 365;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RangeLabel {
    AllDates,
    ThisMonth,
    Last2Months,
    Last3Months,
    Last6Months,
    Last9Months,
    LastYear,
    Last15Months,
    Last18Months,
    Last2Years,
}

impl RangeLabel {
    /// Every label in presentation order.
    pub const ALL: [RangeLabel; 10] = [
        RangeLabel::AllDates,
        RangeLabel::ThisMonth,
        RangeLabel::Last2Months,
        RangeLabel::Last3Months,
        RangeLabel::Last6Months,
        RangeLabel::Last9Months,
        RangeLabel::LastYear,
        RangeLabel::Last15Months,
        RangeLabel::Last18Months,
        RangeLabel::Last2Years,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RangeLabel::AllDates => ALL_DATES,
            RangeLabel::ThisMonth => "This Month",
            RangeLabel::Last2Months => "Last 2 Months",
            RangeLabel::Last3Months => "Last 3 Months",
            RangeLabel::Last6Months => "Last 6 Months",
            RangeLabel::Last9Months => "Last 9 Months",
            RangeLabel::LastYear => "Last Year",
            RangeLabel::Last15Months => "Last 15 Months",
            RangeLabel::Last18Months => "Last 18 Months",
            RangeLabel::Last2Years => "Last 2 Years",
        }
    }

    /// Exact, case-sensitive lookup. `None` for anything else.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|l| l.as_str() == label)
    }

    /// Calendar months to step back from `today`; `None` for "All Dates".
    pub fn months_back(&self) -> Option<u32> {
        match self {
            RangeLabel::AllDates => None,
            RangeLabel::ThisMonth => Some(1),
            RangeLabel::Last2Months => Some(2),
            RangeLabel::Last3Months => Some(3),
            RangeLabel::Last6Months => Some(6),
            RangeLabel::Last9Months => Some(9),
            RangeLabel::LastYear => Some(12),
            RangeLabel::Last15Months => Some(15),
            RangeLabel::Last18Months => Some(18),
            RangeLabel::Last2Years => Some(24),
        }
    }
}

impl fmt::Display for RangeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inclusive calendar span with `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// Returns `None` when `start > end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Option<Self> {
        (start <= end).then_some(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    pub fn span_days(&self) -> i64 {
        (self.end - self.start).num_days()
    }

    /// Whole years spanned; every n-th monthly tick label is shown when this
    /// exceeds one.
    pub fn tick_stride(&self) -> i64 {
        tick_stride(self.span_days())
    }

    pub fn tick_label_visible(&self, index: usize) -> bool {
        tick_label_visible(self.tick_stride(), index)
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}

/// `floor(span_days / 365)`.
pub fn tick_stride(span_days: i64) -> i64 {
    span_days.div_euclid(DAYS_PER_YEAR)
}

pub fn tick_label_visible(stride: i64, index: usize) -> bool {
    stride <= 1 || (index as i64) % stride == 0
}

/// Resolve a symbolic label against `today`.
///
/// `earliest` is the first recorded date-stamp and is only consulted for
/// "All Dates" or an unrecognised label; without it the request fails with
/// [`ScrapError::NoDataAvailable`]. An `earliest` later than `today` is
/// clamped so the range stays ordered.
pub fn resolve(
    label: &str,
    today: NaiveDate,
    earliest: Option<NaiveDate>,
) -> Result<DateRange, ScrapError> {
    let months_back = RangeLabel::from_label(label).and_then(|l| l.months_back());

    let start = match months_back {
        Some(months) => today.checked_sub_months(Months::new(months)).ok_or_else(|| {
            ScrapError::InvalidSelection {
                reason: format!("{label} from {today} is out of the calendar range"),
            }
        })?,
        None => earliest.ok_or(ScrapError::NoDataAvailable)?.min(today),
    };

    Ok(DateRange { start, end: today })
}
