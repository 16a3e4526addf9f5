//! crates/routine_tracker_core/src/stats.rs
//!
//! The aggregation engine: stateless functions that turn record collections
//! into the derived values shown on the dashboard and calendar.
//!
//! Nothing here reads from a repository. Callers fetch the collections they
//! need and pass them in together with a reference date. Any subset that is
//! returned is sorted by (date, id), so results never depend on the order in
//! which records were supplied.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{NaiveDate, NaiveDateTime};

use crate::calendar::{self, MonthWindow};
use crate::domain::{Book, BookStatus, Dated, DomainError, DomainResult, ReadingSession};

//=========================================================================================
// Result Types
//=========================================================================================

/// Reading statistics for the month containing the reference date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthlyStats {
    pub window: MonthWindow,
    /// Books marked completed with a completion date inside the window.
    pub completed_count: usize,
    /// Pages read across `monthly_sessions`.
    pub total_pages: u64,
    pub monthly_sessions: Vec<ReadingSession>,
}

/// A book together with the values derived from its sessions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookSnapshot<'a> {
    pub book: &'a Book,
    pub current_page: u64,
    pub progress: DomainResult<u64>,
}

//=========================================================================================
// Monthly Statistics
//=========================================================================================

pub fn monthly_stats(
    books: &[Book],
    sessions: &[ReadingSession],
    reference_date: NaiveDate,
) -> MonthlyStats {
    let window = MonthWindow::containing(reference_date);

    let completed_count = books
        .iter()
        .filter(|book| book.status() == BookStatus::Completed)
        .filter_map(Book::completion)
        .filter(|done| window.contains(*done))
        .count();

    let mut monthly_sessions: Vec<ReadingSession> = sessions
        .iter()
        .filter(|session| window.contains(session.date()))
        .cloned()
        .collect();
    monthly_sessions.sort_by(|a, b| (a.date(), a.id()).cmp(&(b.date(), b.id())));

    let total_pages = sum_amounts(&monthly_sessions);

    MonthlyStats {
        window,
        completed_count,
        total_pages,
        monthly_sessions,
    }
}

//=========================================================================================
// Book Progress
//=========================================================================================

/// Pages read so far: the sum of `amount` over the sessions logged for `book`.
pub fn current_page(book: &Book, sessions: &[ReadingSession]) -> u64 {
    sessions
        .iter()
        .filter(|session| session.book_id() == book.id())
        .map(|session| u64::from(session.amount()))
        .sum()
}

/// `current_page / total_page` as a whole percentage, rounded half up.
///
/// Not clamped: reading past the last page yields more than 100.
pub fn progress_percent(current_page: u64, total_page: u64) -> DomainResult<u64> {
    if total_page == 0 {
        return Err(DomainError::Arithmetic(
            "progress requested for a book with zero pages".to_string(),
        ));
    }
    // round(c * 100 / t) == floor((200c + t) / 2t), computed wide to stay exact.
    let current = u128::from(current_page);
    let total = u128::from(total_page);
    let rounded = (current * 200 + total) / (total * 2);
    u64::try_from(rounded)
        .map_err(|_| DomainError::Arithmetic(format!("progress overflow for {} pages", current_page)))
}

pub fn book_progress(book: &Book, current_page: u64) -> DomainResult<u64> {
    progress_percent(current_page, u64::from(book.total_page()))
}

pub fn book_progress_from_sessions(book: &Book, sessions: &[ReadingSession]) -> DomainResult<u64> {
    book_progress(book, current_page(book, sessions))
}

/// One snapshot per book, ordered by book id.
///
/// A book whose progress cannot be computed keeps its error in `progress`
/// instead of failing the whole overview.
pub fn book_overview<'a>(books: &'a [Book], sessions: &[ReadingSession]) -> Vec<BookSnapshot<'a>> {
    let mut snapshots: Vec<_> = books
        .iter()
        .map(|book| {
            let current_page = current_page(book, sessions);
            BookSnapshot {
                book,
                current_page,
                progress: book_progress(book, current_page),
            }
        })
        .collect();
    snapshots.sort_by(|a, b| a.book.id().cmp(b.book.id()));
    snapshots
}

//=========================================================================================
// Daily Totals
//=========================================================================================

pub fn daily_total_pages(sessions: &[ReadingSession], date: NaiveDate) -> u64 {
    sessions
        .iter()
        .filter(|session| calendar::same_day(session.date(), date))
        .map(|session| u64::from(session.amount()))
        .sum()
}

/// Same as [`daily_total_pages`] for a timestamp; the time of day is discarded.
pub fn daily_total_pages_at(sessions: &[ReadingSession], timestamp: NaiveDateTime) -> u64 {
    daily_total_pages(sessions, calendar::truncate(timestamp))
}

/// Page totals for each day of the reference month that has at least one session.
pub fn daily_page_totals(
    sessions: &[ReadingSession],
    reference_date: NaiveDate,
) -> BTreeMap<NaiveDate, u64> {
    let window = MonthWindow::containing(reference_date);
    let mut totals = BTreeMap::new();
    for session in sessions.iter().filter(|s| window.contains(s.date())) {
        *totals.entry(session.date()).or_insert(0) += u64::from(session.amount());
    }
    totals
}

//=========================================================================================
// Calendar Views
//=========================================================================================

pub fn records_on<T: Dated>(records: &[T], date: NaiveDate) -> Vec<&T> {
    sorted(
        records
            .iter()
            .filter(|record| calendar::same_day(record.date(), date))
            .collect(),
    )
}

pub fn records_in_month<T: Dated>(records: &[T], reference_date: NaiveDate) -> Vec<&T> {
    let window = MonthWindow::containing(reference_date);
    sorted(
        records
            .iter()
            .filter(|record| window.contains(record.date()))
            .collect(),
    )
}

/// Days of the reference month that carry at least one record.
pub fn marked_days<T: Dated>(records: &[T], reference_date: NaiveDate) -> BTreeSet<NaiveDate> {
    let window = MonthWindow::containing(reference_date);
    records
        .iter()
        .map(Dated::date)
        .filter(|date| window.contains(*date))
        .collect()
}

fn sorted<T: Dated>(mut records: Vec<&T>) -> Vec<&T> {
    records.sort_by(|a, b| (a.date(), a.id()).cmp(&(b.date(), b.id())));
    records
}

fn sum_amounts(sessions: &[ReadingSession]) -> u64 {
    sessions.iter().map(|session| u64::from(session.amount())).sum()
}
