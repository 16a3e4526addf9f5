//! crates/routine_tracker_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database or serialization format.
//!
//! Records with invariants (`Book`, `ReadingSession`) can only be built through
//! their validating constructors.

use chrono::NaiveDate;

//=========================================================================================
// Domain Error
//=========================================================================================

/// Errors raised when a record is malformed or a derived value cannot be computed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Arithmetic error: {0}")]
    Arithmetic(String),
}

/// A convenience type alias for `Result<T, DomainError>`.
pub type DomainResult<T> = Result<T, DomainError>;

fn require_id(kind: &str, id: &str) -> DomainResult<()> {
    if id.trim().is_empty() {
        return Err(DomainError::InvalidInput(format!("{} id must not be empty", kind)));
    }
    Ok(())
}

//=========================================================================================
// Record Categories
//=========================================================================================

/// The fixed tag carried by every dated record kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RecordCategory {
    Meal,
    Reading,
    Daily,
}

impl RecordCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordCategory::Meal => "meal",
            RecordCategory::Reading => "reading",
            RecordCategory::Daily => "daily",
        }
    }
}

impl std::str::FromStr for RecordCategory {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "meal" => Ok(RecordCategory::Meal),
            "reading" => Ok(RecordCategory::Reading),
            "daily" => Ok(RecordCategory::Daily),
            other => Err(DomainError::InvalidInput(format!(
                "Unknown record category '{}'",
                other
            ))),
        }
    }
}

/// Anything placed on the calendar: a record with an opaque id and a calendar day.
pub trait Dated {
    fn id(&self) -> &str;
    fn date(&self) -> NaiveDate;
    fn category(&self) -> RecordCategory;
}

//=========================================================================================
// Books
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BookStatus {
    Reading,
    Completed,
    Paused,
}

/// A book on the user's shelf.
///
/// The current page is not stored here; it is derived from the reading sessions
/// logged against the book (see `stats::current_page`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Book {
    id: String,
    title: String,
    author: String,
    total_page: u32,
    status: BookStatus,
    start_date: NaiveDate,
    completed_date: Option<NaiveDate>,
}

impl Book {
    /// Validates and builds a book.
    ///
    /// Rejects an empty id, `total_page == 0`, and a completion date earlier
    /// than the start date.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        author: impl Into<String>,
        total_page: u32,
        status: BookStatus,
        start_date: NaiveDate,
        completed_date: Option<NaiveDate>,
    ) -> DomainResult<Self> {
        let id = id.into();
        require_id("Book", &id)?;

        if total_page == 0 {
            return Err(DomainError::InvalidInput(format!(
                "Book {} must have at least one page",
                id
            )));
        }
        if let Some(done) = completed_date {
            if done < start_date {
                return Err(DomainError::InvalidInput(format!(
                    "Book {} completed on {} before it was started on {}",
                    id, done, start_date
                )));
            }
        }

        Ok(Self {
            id,
            title: title.into(),
            author: author.into(),
            total_page,
            status,
            start_date,
            completed_date,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn total_page(&self) -> u32 {
        self.total_page
    }

    pub fn status(&self) -> BookStatus {
        self.status
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    pub fn completed_date(&self) -> Option<NaiveDate> {
        self.completed_date
    }

    /// The completion date, but only when the status actually says the book is finished.
    pub fn completion(&self) -> Option<NaiveDate> {
        match self.status {
            BookStatus::Completed => self.completed_date,
            BookStatus::Reading | BookStatus::Paused => None,
        }
    }
}

//=========================================================================================
// Reading Sessions
//=========================================================================================

/// A contiguous range of pages read from one book on one day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadingSession {
    id: String,
    book_id: String,
    date: NaiveDate,
    start_page: u32,
    end_page: u32,
}

impl ReadingSession {
    /// Validates and builds a session. Pages are 1-based and inclusive on both ends,
    /// so `start_page == end_page` is a one-page session.
    pub fn new(
        id: impl Into<String>,
        book_id: impl Into<String>,
        date: NaiveDate,
        start_page: u32,
        end_page: u32,
    ) -> DomainResult<Self> {
        let id = id.into();
        let book_id = book_id.into();
        require_id("ReadingSession", &id)?;
        require_id("Book", &book_id)?;

        if start_page == 0 {
            return Err(DomainError::InvalidInput(format!(
                "ReadingSession {} starts at page 0; pages are numbered from 1",
                id
            )));
        }
        if end_page < start_page {
            return Err(DomainError::InvalidInput(format!(
                "ReadingSession {} ends on page {} before its start page {}",
                id, end_page, start_page
            )));
        }

        Ok(Self {
            id,
            book_id,
            date,
            start_page,
            end_page,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn book_id(&self) -> &str {
        &self.book_id
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn start_page(&self) -> u32 {
        self.start_page
    }

    pub fn end_page(&self) -> u32 {
        self.end_page
    }

    /// Number of pages read, always at least 1.
    pub fn amount(&self) -> u32 {
        self.end_page - self.start_page + 1
    }
}

//=========================================================================================
// Routine Records
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

/// A logged meal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MealRecord {
    pub id: String,
    pub date: NaiveDate,
    pub meal_type: MealType,
    pub menu: String,
    pub memo: Option<String>,
}

/// A free-form reading note, independent of page-tracked sessions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadingRecord {
    pub id: String,
    pub date: NaiveDate,
    pub book_title: String,
    pub memo: Option<String>,
}

/// A daily journal entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyRecord {
    pub id: String,
    pub date: NaiveDate,
    pub title: String,
    pub content: String,
}

impl Dated for MealRecord {
    fn id(&self) -> &str {
        &self.id
    }
    fn date(&self) -> NaiveDate {
        self.date
    }
    fn category(&self) -> RecordCategory {
        RecordCategory::Meal
    }
}

impl Dated for ReadingRecord {
    fn id(&self) -> &str {
        &self.id
    }
    fn date(&self) -> NaiveDate {
        self.date
    }
    fn category(&self) -> RecordCategory {
        RecordCategory::Reading
    }
}

impl Dated for DailyRecord {
    fn id(&self) -> &str {
        &self.id
    }
    fn date(&self) -> NaiveDate {
        self.date
    }
    fn category(&self) -> RecordCategory {
        RecordCategory::Daily
    }
}

// Sessions are shown on the reading calendar alongside reading notes.
impl Dated for ReadingSession {
    fn id(&self) -> &str {
        &self.id
    }
    fn date(&self) -> NaiveDate {
        self.date
    }
    fn category(&self) -> RecordCategory {
        RecordCategory::Reading
    }
}
