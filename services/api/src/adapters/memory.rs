//! services/api/src/adapters/memory.rs
//!
//! This module contains the in-memory repository, the concrete implementation
//! of the `RecordRepository` port from the `core` crate. Records are loaded once
//! from a JSON seed file, validated through the domain constructors, and then
//! served read-only.

use async_trait::async_trait;
use chrono::NaiveDate;
use routine_tracker_core::domain::{
    Book, BookStatus, DailyRecord, DomainError, MealRecord, MealType, ReadingRecord,
    ReadingSession,
};
use routine_tracker_core::ports::{PortError, PortResult, RecordRepository};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

/// Failures while loading the seed file.
#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("Failed to read seed file {0}: {1}")]
    Io(String, #[source] std::io::Error),
    #[error("Failed to parse seed file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Seed file contains an invalid record: {0}")]
    Invalid(#[from] DomainError),
}

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// Every record the repository serves, already validated.
#[derive(Debug, Clone, Default)]
pub struct RecordSet {
    pub books: Vec<Book>,
    pub sessions: Vec<ReadingSession>,
    pub meals: Vec<MealRecord>,
    pub reading_records: Vec<ReadingRecord>,
    pub daily_records: Vec<DailyRecord>,
}

impl RecordSet {
    /// Cross-record checks the individual constructors cannot make: unique ids
    /// per kind and sessions that point at a known book.
    pub fn validate(&self) -> Result<(), DomainError> {
        unique_ids("Book", self.books.iter().map(|b| b.id()))?;
        unique_ids("ReadingSession", self.sessions.iter().map(|s| s.id()))?;
        unique_ids("MealRecord", self.meals.iter().map(|m| m.id.as_str()))?;
        unique_ids("ReadingRecord", self.reading_records.iter().map(|r| r.id.as_str()))?;
        unique_ids("DailyRecord", self.daily_records.iter().map(|d| d.id.as_str()))?;

        let book_ids: HashSet<&str> = self.books.iter().map(|b| b.id()).collect();
        if let Some(orphan) = self
            .sessions
            .iter()
            .find(|s| !book_ids.contains(s.book_id()))
        {
            return Err(DomainError::InvalidInput(format!(
                "ReadingSession {} references unknown book {}",
                orphan.id(),
                orphan.book_id()
            )));
        }
        Ok(())
    }
}

fn unique_ids<'a>(kind: &str, ids: impl Iterator<Item = &'a str>) -> Result<(), DomainError> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(DomainError::InvalidInput(format!("Duplicate {} id {}", kind, id)));
        }
    }
    Ok(())
}

/// An immutable, shareable repository backed by a `RecordSet`.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    records: Arc<RecordSet>,
}

impl InMemoryRepository {
    /// Creates a repository over an already-built record set.
    pub fn new(records: RecordSet) -> Result<Self, DomainError> {
        records.validate()?;
        Ok(Self {
            records: Arc::new(records),
        })
    }

    /// Parses and validates a JSON seed document.
    pub fn from_json(json: &str) -> Result<Self, SeedError> {
        let seed: SeedFile = serde_json::from_str(json)?;
        Ok(Self::new(seed.to_domain()?)?)
    }

    /// Loads a seed file from disk.
    pub fn from_seed_file(path: &Path) -> Result<Self, SeedError> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| SeedError::Io(path.display().to_string(), e))?;
        let repo = Self::from_json(&json)?;
        info!(
            "Loaded seed file {}: {} books, {} sessions, {} meals, {} reading notes, {} journal entries",
            path.display(),
            repo.records.books.len(),
            repo.records.sessions.len(),
            repo.records.meals.len(),
            repo.records.reading_records.len(),
            repo.records.daily_records.len(),
        );
        Ok(repo)
    }
}

//=========================================================================================
// "Impure" Seed Record Structs
//=========================================================================================

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct SeedFile {
    books: Vec<BookEntry>,
    sessions: Vec<SessionEntry>,
    meals: Vec<MealEntry>,
    reading_records: Vec<ReadingEntry>,
    daily_records: Vec<DailyEntry>,
}
impl SeedFile {
    fn to_domain(self) -> Result<RecordSet, DomainError> {
        Ok(RecordSet {
            books: self
                .books
                .into_iter()
                .map(BookEntry::to_domain)
                .collect::<Result<_, _>>()?,
            sessions: self
                .sessions
                .into_iter()
                .map(SessionEntry::to_domain)
                .collect::<Result<_, _>>()?,
            meals: self.meals.into_iter().map(MealEntry::to_domain).collect(),
            reading_records: self
                .reading_records
                .into_iter()
                .map(ReadingEntry::to_domain)
                .collect(),
            daily_records: self.daily_records.into_iter().map(DailyEntry::to_domain).collect(),
        })
    }
}

fn id_or_new(id: Option<String>) -> String {
    id.unwrap_or_else(|| Uuid::new_v4().to_string())
}

#[derive(Deserialize, Clone, Copy)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
enum StatusEntry {
    Reading,
    Completed,
    Paused,
}
impl From<StatusEntry> for BookStatus {
    fn from(status: StatusEntry) -> Self {
        match status {
            StatusEntry::Reading => BookStatus::Reading,
            StatusEntry::Completed => BookStatus::Completed,
            StatusEntry::Paused => BookStatus::Paused,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BookEntry {
    id: Option<String>,
    title: String,
    author: String,
    total_page: u32,
    status: StatusEntry,
    start_date: NaiveDate,
    completed_date: Option<NaiveDate>,
}
impl BookEntry {
    fn to_domain(self) -> Result<Book, DomainError> {
        Book::new(
            id_or_new(self.id),
            self.title,
            self.author,
            self.total_page,
            self.status.into(),
            self.start_date,
            self.completed_date,
        )
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SessionEntry {
    id: Option<String>,
    book_id: String,
    date: NaiveDate,
    start_page: u32,
    end_page: u32,
    /// Optional in the seed; when present it must agree with the page range.
    amount: Option<u32>,
}
impl SessionEntry {
    fn to_domain(self) -> Result<ReadingSession, DomainError> {
        let session = ReadingSession::new(
            id_or_new(self.id),
            self.book_id,
            self.date,
            self.start_page,
            self.end_page,
        )?;
        match self.amount {
            Some(amount) if amount != session.amount() => Err(DomainError::InvalidInput(format!(
                "ReadingSession {} declares {} pages but covers pages {}-{}",
                session.id(),
                amount,
                session.start_page(),
                session.end_page()
            ))),
            _ => Ok(session),
        }
    }
}

#[derive(Deserialize, Clone, Copy)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
enum MealTypeEntry {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}
impl From<MealTypeEntry> for MealType {
    fn from(meal_type: MealTypeEntry) -> Self {
        match meal_type {
            MealTypeEntry::Breakfast => MealType::Breakfast,
            MealTypeEntry::Lunch => MealType::Lunch,
            MealTypeEntry::Dinner => MealType::Dinner,
            MealTypeEntry::Snack => MealType::Snack,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MealEntry {
    id: Option<String>,
    date: NaiveDate,
    meal_type: MealTypeEntry,
    menu: String,
    memo: Option<String>,
}
impl MealEntry {
    fn to_domain(self) -> MealRecord {
        MealRecord {
            id: id_or_new(self.id),
            date: self.date,
            meal_type: self.meal_type.into(),
            menu: self.menu,
            memo: self.memo,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReadingEntry {
    id: Option<String>,
    date: NaiveDate,
    book_title: String,
    memo: Option<String>,
}
impl ReadingEntry {
    fn to_domain(self) -> ReadingRecord {
        ReadingRecord {
            id: id_or_new(self.id),
            date: self.date,
            book_title: self.book_title,
            memo: self.memo,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DailyEntry {
    id: Option<String>,
    date: NaiveDate,
    title: String,
    #[serde(default)]
    content: String,
}
impl DailyEntry {
    fn to_domain(self) -> DailyRecord {
        DailyRecord {
            id: id_or_new(self.id),
            date: self.date,
            title: self.title,
            content: self.content,
        }
    }
}

//=========================================================================================
// `RecordRepository` Trait Implementation
//=========================================================================================

#[async_trait]
impl RecordRepository for InMemoryRepository {
    async fn list_books(&self) -> PortResult<Vec<Book>> {
        Ok(self.records.books.clone())
    }

    async fn get_book(&self, book_id: &str) -> PortResult<Book> {
        self.records
            .books
            .iter()
            .find(|book| book.id() == book_id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("Book {} not found", book_id)))
    }

    async fn list_sessions(&self) -> PortResult<Vec<ReadingSession>> {
        Ok(self.records.sessions.clone())
    }

    async fn list_sessions_for_book(&self, book_id: &str) -> PortResult<Vec<ReadingSession>> {
        let sessions: Vec<_> = self
            .records
            .sessions
            .iter()
            .filter(|session| session.book_id() == book_id)
            .cloned()
            .collect();
        debug!("Found {} sessions for book {}", sessions.len(), book_id);
        Ok(sessions)
    }

    async fn list_meals(&self) -> PortResult<Vec<MealRecord>> {
        Ok(self.records.meals.clone())
    }

    async fn list_reading_records(&self) -> PortResult<Vec<ReadingRecord>> {
        Ok(self.records.reading_records.clone())
    }

    async fn list_daily_records(&self) -> PortResult<Vec<DailyRecord>> {
        Ok(self.records.daily_records.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SEED: &str = r#"{
        "books": [
            { "id": "b1", "title": "Dune", "author": "Frank Herbert", "totalPage": 200,
              "status": "COMPLETED", "startDate": "2024-03-01", "completedDate": "2024-03-15" },
            { "id": "b2", "title": "Emma", "author": "Jane Austen", "totalPage": 3,
              "status": "READING", "startDate": "2024-03-02" }
        ],
        "sessions": [
            { "id": "s1", "bookId": "b1", "date": "2024-03-10", "startPage": 1, "endPage": 30, "amount": 30 },
            { "id": "s2", "bookId": "b2", "date": "2024-04-01", "startPage": 1, "endPage": 1 }
        ],
        "meals": [
            { "id": "m1", "date": "2024-03-10", "mealType": "LUNCH", "menu": "Ramen" }
        ],
        "dailyRecords": [
            { "date": "2024-03-11", "title": "Rainy day" }
        ]
    }"#;

    #[tokio::test]
    async fn test_loads_seed() {
        let repo = InMemoryRepository::from_json(SEED).unwrap();

        assert_eq!(repo.list_books().await.unwrap().len(), 2);
        assert_eq!(repo.list_sessions().await.unwrap().len(), 2);
        assert_eq!(repo.list_meals().await.unwrap()[0].meal_type, MealType::Lunch);
        assert!(repo.list_reading_records().await.unwrap().is_empty());

        let journal = repo.list_daily_records().await.unwrap();
        assert_eq!(journal.len(), 1);
        // Missing ids are generated.
        assert!(Uuid::parse_str(&journal[0].id).is_ok());
        assert_eq!(journal[0].content, "");
    }

    #[tokio::test]
    async fn test_get_book_and_sessions() {
        let repo = InMemoryRepository::from_json(SEED).unwrap();

        let book = repo.get_book("b1").await.unwrap();
        assert_eq!(book.status(), BookStatus::Completed);
        assert_eq!(repo.list_sessions_for_book("b2").await.unwrap().len(), 1);

        let err = repo.get_book("missing").await.unwrap_err();
        assert!(matches!(err, PortError::NotFound(_)));
    }

    #[test]
    fn test_empty_document() {
        let repo = InMemoryRepository::from_json("{}").unwrap();
        assert!(repo.records.books.is_empty());
    }

    #[test]
    fn test_rejects_invalid_book() {
        let json = r#"{ "books": [ { "id": "b1", "title": "Blank", "author": "Nobody",
            "totalPage": 0, "status": "READING", "startDate": "2024-03-01" } ] }"#;
        let err = InMemoryRepository::from_json(json).err().unwrap();
        assert!(matches!(err, SeedError::Invalid(DomainError::InvalidInput(_))));
    }

    #[test]
    fn test_rejects_mismatched_amount() {
        let json = r#"{
            "books": [ { "id": "b1", "title": "Dune", "author": "Herbert", "totalPage": 10,
                         "status": "READING", "startDate": "2024-03-01" } ],
            "sessions": [ { "id": "s1", "bookId": "b1", "date": "2024-03-02",
                            "startPage": 1, "endPage": 5, "amount": 4 } ] }"#;
        let err = InMemoryRepository::from_json(json).err().unwrap();
        assert!(matches!(err, SeedError::Invalid(_)));
    }

    #[test]
    fn test_rejects_orphan_session() {
        let json = r#"{ "sessions": [ { "id": "s1", "bookId": "ghost", "date": "2024-03-02",
                                        "startPage": 1, "endPage": 5 } ] }"#;
        let err = InMemoryRepository::from_json(json).err().unwrap();
        assert!(matches!(err, SeedError::Invalid(_)));
    }

    #[test]
    fn test_rejects_duplicate_ids() {
        let json = r#"{ "meals": [
            { "id": "m1", "date": "2024-03-10", "mealType": "LUNCH", "menu": "Ramen" },
            { "id": "m1", "date": "2024-03-11", "mealType": "DINNER", "menu": "Curry" } ] }"#;
        let err = InMemoryRepository::from_json(json).err().unwrap();
        assert!(matches!(err, SeedError::Invalid(_)));
    }

    #[test]
    fn test_rejects_malformed_json() {
        let err = InMemoryRepository::from_json("{ \"books\": 3 }").err().unwrap();
        assert!(matches!(err, SeedError::Parse(_)));
    }

    #[tokio::test]
    async fn test_bundled_seed_is_valid() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../data/seed.json");
        let repo = InMemoryRepository::from_seed_file(&path).unwrap();
        assert_eq!(repo.list_books().await.unwrap().len(), 3);
    }

    #[test]
    fn test_from_seed_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SEED.as_bytes()).unwrap();

        let repo = InMemoryRepository::from_seed_file(file.path()).unwrap();
        assert_eq!(repo.records.books.len(), 2);

        let missing = InMemoryRepository::from_seed_file(Path::new("/nonexistent/seed.json"));
        assert!(matches!(missing, Err(SeedError::Io(_, _))));
    }
}
