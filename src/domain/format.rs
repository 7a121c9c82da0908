//! Currency and date display formatting.

use chrono::NaiveDate;

pub const CENT_SIGN: char = '\u{a2}';

/// `$3.10` at or above one dollar; `60¢` / `62.50¢` below it.
pub fn format_price(dollars: f64) -> String {
    if dollars < 1.0 {
        let cents = dollars * 100.0;
        // Tolerate binary noise such as 0.07 * 100 = 7.000000000000001.
        if (cents - cents.round()).abs() < 1e-9 {
            format!("{:.0}{}", cents.round(), CENT_SIGN)
        } else {
            format!("{:.2}{}", cents, CENT_SIGN)
        }
    } else {
        format!("${:.2}", dollars)
    }
}

/// `February 1, 2024`
pub fn format_date(date: NaiveDate) -> String {
    date.format("%B %-d, %Y").to_string()
}
