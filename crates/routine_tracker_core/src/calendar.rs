//! crates/routine_tracker_core/src/calendar.rs
//!
//! Calendar-date helpers used by the aggregation code.
//!
//! Every date in this crate is a zone-less `NaiveDate`. Values that carry a
//! time of day are truncated to their calendar day, never shifted between time
//! zones, so "same day" and "same month" always mean the written date.

use chrono::{Datelike, Months, NaiveDate, NaiveDateTime};

/// An inclusive range of calendar days covering one whole month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthWindow {
    start: NaiveDate,
    end: NaiveDate,
}

impl MonthWindow {
    /// The window for the month that contains `date`.
    pub fn containing(date: NaiveDate) -> Self {
        let start = date.with_day(1).unwrap_or(date);
        // `chrono` only fails past the representable range (year ±262143), where
        // we fall back to the last representable day.
        let end = start
            .checked_add_months(Months::new(1))
            .and_then(|next| next.pred_opt())
            .unwrap_or(NaiveDate::MAX);
        Self { start, end }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Inclusive on both ends.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Drops the time-of-day component.
pub fn truncate(timestamp: NaiveDateTime) -> NaiveDate {
    timestamp.date()
}

/// Whether two dates fall on the same calendar day.
pub fn same_day(a: NaiveDate, b: NaiveDate) -> bool {
    a.year() == b.year() && a.month() == b.month() && a.day() == b.day()
}
