//! calendar.rs
//!
//! The contributions API only answers for windows of at most one year, so an
//! all-time total has to be assembled from per-year pieces:
//!
//! ```text
//! [created, Dec 31 of created year]
//! [Jan 1, Dec 31] for every full year in between
//! [Jan 1 of current year, now]
//! ```
//!
//! When both ends fall in the same year there is exactly one window.

use chrono::{DateTime, Datelike, Months, NaiveDate, Utc};
use std::fmt;

/// One query window, inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearWindow {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl YearWindow {
    pub fn new(from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        Self { from, to }
    }

    /// True when the window is ordered and ends no later than one calendar
    /// year after it starts.
    pub fn is_queryable(&self) -> bool {
        self.from <= self.to
            && self
                .from
                .checked_add_months(Months::new(12))
                .is_some_and(|limit| self.to <= limit)
    }
}

impl fmt::Display for YearWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}..{}",
            self.from.date_naive(),
            self.to.date_naive()
        )
    }
}

/// Split `[from, to]` into windows aligned to calendar-year boundaries.
///
/// Returns an empty list when `from` is after `to`.
pub fn year_windows(from: DateTime<Utc>, to: DateTime<Utc>) -> Vec<YearWindow> {
    if from > to {
        return Vec::new();
    }

    (from.year()..=to.year())
        .filter_map(|year| {
            let start = if year == from.year() {
                from
            } else {
                start_of_year(year)?
            };
            let end = if year == to.year() {
                to
            } else {
                end_of_year(year)?
            };
            Some(YearWindow::new(start, end))
        })
        .collect()
}

fn start_of_year(year: i32) -> Option<DateTime<Utc>> {
    Some(NaiveDate::from_ymd_opt(year, 1, 1)?.and_hms_opt(0, 0, 0)?.and_utc())
}

fn end_of_year(year: i32) -> Option<DateTime<Utc>> {
    Some(
        NaiveDate::from_ymd_opt(year, 12, 31)?
            .and_hms_opt(23, 59, 59)?
            .and_utc(),
    )
}
