//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the REST API endpoints and the master
//! definition for the OpenAPI specification.
//!
//! Handlers fetch record collections through the repository port and hand them
//! to the aggregation functions in `routine_tracker_core::stats`.

use crate::web::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use chrono::NaiveDate;
use routine_tracker_core::calendar::MonthWindow;
use routine_tracker_core::domain::{
    Book, BookStatus, DailyRecord, Dated, DomainError, MealRecord, MealType, ReadingRecord,
    ReadingSession, RecordCategory,
};
use routine_tracker_core::ports::PortError;
use routine_tracker_core::stats;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, error, warn};
use utoipa::{IntoParams, OpenApi, ToSchema};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        health_handler,
        monthly_stats_handler,
        daily_stats_handler,
        calendar_handler,
        list_books_handler,
        book_progress_handler,
        day_records_handler,
    ),
    components(
        schemas(
            HealthResponse,
            MonthlyStatsResponse,
            SessionResponse,
            DailyTotalResponse,
            CalendarResponse,
            DayTotal,
            MarkedDays,
            BookProgressResponse,
            RecordEntry,
            DayRecordsResponse,
        )
    ),
    tags(
        (name = "Routine Tracker API", description = "Reading and routine statistics for the dashboard and calendar.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Query and Response Structs
//=========================================================================================

/// The reference date for a request. Defaults to today's local date.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DateQuery {
    /// Calendar date in `YYYY-MM-DD` form.
    pub date: Option<NaiveDate>,
}

impl DateQuery {
    fn date_or_today(&self) -> NaiveDate {
        self.date.unwrap_or_else(|| chrono::Local::now().date_naive())
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    /// Seed file the records were loaded from, if any.
    pub seed_path: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub id: String,
    pub book_id: String,
    pub date: NaiveDate,
    pub start_page: u32,
    pub end_page: u32,
    pub amount: u32,
}

impl From<&ReadingSession> for SessionResponse {
    fn from(session: &ReadingSession) -> Self {
        Self {
            id: session.id().to_string(),
            book_id: session.book_id().to_string(),
            date: session.date(),
            start_page: session.start_page(),
            end_page: session.end_page(),
            amount: session.amount(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyStatsResponse {
    pub month_start: NaiveDate,
    pub month_end: NaiveDate,
    pub completed_count: usize,
    pub total_pages: u64,
    pub monthly_sessions: Vec<SessionResponse>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DailyTotalResponse {
    pub date: NaiveDate,
    pub total_pages: u64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DayTotal {
    pub date: NaiveDate,
    pub total_pages: u64,
}

/// Days of the month that carry at least one record, per record kind.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MarkedDays {
    pub meal: Vec<NaiveDate>,
    pub reading: Vec<NaiveDate>,
    pub daily: Vec<NaiveDate>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CalendarResponse {
    pub month_start: NaiveDate,
    pub month_end: NaiveDate,
    pub page_totals: Vec<DayTotal>,
    pub marked_days: MarkedDays,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookProgressResponse {
    pub id: String,
    pub title: String,
    pub author: String,
    pub status: String,
    pub total_page: u32,
    pub current_page: u64,
    /// `None` when the progress cannot be computed for this book.
    pub progress: Option<u64>,
    pub start_date: NaiveDate,
    pub completed_date: Option<NaiveDate>,
}

impl BookProgressResponse {
    fn new(book: &Book, current_page: u64, progress: Option<u64>) -> Self {
        Self {
            id: book.id().to_string(),
            title: book.title().to_string(),
            author: book.author().to_string(),
            status: status_label(book.status()).to_string(),
            total_page: book.total_page(),
            current_page,
            progress,
            start_date: book.start_date(),
            completed_date: book.completed_date(),
        }
    }
}

fn status_label(status: BookStatus) -> &'static str {
    match status {
        BookStatus::Reading => "READING",
        BookStatus::Completed => "COMPLETED",
        BookStatus::Paused => "PAUSED",
    }
}

fn meal_label(meal_type: MealType) -> &'static str {
    match meal_type {
        MealType::Breakfast => "BREAKFAST",
        MealType::Lunch => "LUNCH",
        MealType::Dinner => "DINNER",
        MealType::Snack => "SNACK",
    }
}

/// A routine record flattened for display.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RecordEntry {
    pub id: String,
    pub date: NaiveDate,
    /// `meal`, `reading` or `daily`.
    pub kind: String,
    /// Meal type for meals; absent for other kinds.
    pub tag: Option<String>,
    pub title: String,
    pub body: Option<String>,
}

impl From<&MealRecord> for RecordEntry {
    fn from(meal: &MealRecord) -> Self {
        Self {
            id: meal.id.clone(),
            date: meal.date,
            kind: meal.category().as_str().to_string(),
            tag: Some(meal_label(meal.meal_type).to_string()),
            title: meal.menu.clone(),
            body: meal.memo.clone(),
        }
    }
}

impl From<&ReadingRecord> for RecordEntry {
    fn from(record: &ReadingRecord) -> Self {
        Self {
            id: record.id.clone(),
            date: record.date,
            kind: record.category().as_str().to_string(),
            tag: None,
            title: record.book_title.clone(),
            body: record.memo.clone(),
        }
    }
}

impl From<&DailyRecord> for RecordEntry {
    fn from(record: &DailyRecord) -> Self {
        Self {
            id: record.id.clone(),
            date: record.date,
            kind: record.category().as_str().to_string(),
            tag: None,
            title: record.title.clone(),
            body: Some(record.content.clone()),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DayRecordsResponse {
    pub date: NaiveDate,
    pub kind: String,
    pub records: Vec<RecordEntry>,
}

//=========================================================================================
// Error Mapping
//=========================================================================================

type HandlerError = (StatusCode, String);

fn port_failure(e: PortError) -> HandlerError {
    match e {
        PortError::NotFound(message) => (StatusCode::NOT_FOUND, message),
        PortError::Invalid(err) => {
            warn!("Repository returned an invalid record: {}", err);
            (StatusCode::UNPROCESSABLE_ENTITY, err.to_string())
        }
        PortError::Unexpected(message) => {
            error!("Failed to load records: {}", message);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to load records".to_string(),
            )
        }
    }
}

fn stats_failure(e: DomainError) -> HandlerError {
    warn!("Unable to compute stats: {}", e);
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        format!("Unable to compute stats: {}", e),
    )
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up", body = HealthResponse))
)]
pub async fn health_handler(State(app_state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        seed_path: app_state
            .config
            .seed_path
            .as_ref()
            .map(|path| path.display().to_string()),
    })
}

/// Completed books, pages read, and sessions for the month containing `date`.
#[utoipa::path(
    get,
    path = "/stats/monthly",
    params(DateQuery),
    responses(
        (status = 200, description = "Monthly reading statistics", body = MonthlyStatsResponse),
        (status = 400, description = "Malformed date"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn monthly_stats_handler(
    State(app_state): State<Arc<AppState>>,
    Query(query): Query<DateQuery>,
) -> Result<Json<MonthlyStatsResponse>, HandlerError> {
    let reference_date = query.date_or_today();
    let books = app_state.repo.list_books().await.map_err(port_failure)?;
    let sessions = app_state.repo.list_sessions().await.map_err(port_failure)?;

    let monthly = stats::monthly_stats(&books, &sessions, reference_date);
    debug!(
        "Monthly stats for {}: {} completed, {} pages",
        reference_date, monthly.completed_count, monthly.total_pages
    );

    Ok(Json(MonthlyStatsResponse {
        month_start: monthly.window.start(),
        month_end: monthly.window.end(),
        completed_count: monthly.completed_count,
        total_pages: monthly.total_pages,
        monthly_sessions: monthly.monthly_sessions.iter().map(SessionResponse::from).collect(),
    }))
}

/// Pages read on a single day.
#[utoipa::path(
    get,
    path = "/stats/daily",
    params(DateQuery),
    responses(
        (status = 200, description = "Pages read on the day", body = DailyTotalResponse),
        (status = 400, description = "Malformed date")
    )
)]
pub async fn daily_stats_handler(
    State(app_state): State<Arc<AppState>>,
    Query(query): Query<DateQuery>,
) -> Result<Json<DailyTotalResponse>, HandlerError> {
    let date = query.date_or_today();
    let sessions = app_state.repo.list_sessions().await.map_err(port_failure)?;

    Ok(Json(DailyTotalResponse {
        date,
        total_pages: stats::daily_total_pages(&sessions, date),
    }))
}

/// Per-day page totals and record markers for the month containing `date`.
#[utoipa::path(
    get,
    path = "/stats/calendar",
    params(DateQuery),
    responses(
        (status = 200, description = "Calendar view of the month", body = CalendarResponse),
        (status = 400, description = "Malformed date")
    )
)]
pub async fn calendar_handler(
    State(app_state): State<Arc<AppState>>,
    Query(query): Query<DateQuery>,
) -> Result<Json<CalendarResponse>, HandlerError> {
    let reference_date = query.date_or_today();
    let repo = &app_state.repo;
    let sessions = repo.list_sessions().await.map_err(port_failure)?;
    let meals = repo.list_meals().await.map_err(port_failure)?;
    let reading_records = repo.list_reading_records().await.map_err(port_failure)?;
    let daily_records = repo.list_daily_records().await.map_err(port_failure)?;

    let window = MonthWindow::containing(reference_date);
    let page_totals: Vec<DayTotal> = stats::daily_page_totals(&sessions, reference_date)
        .into_iter()
        .map(|(date, total_pages)| DayTotal { date, total_pages })
        .collect();

    let mut reading_days: BTreeSet<NaiveDate> = stats::marked_days(&reading_records, reference_date);
    reading_days.extend(stats::marked_days(&sessions, reference_date));

    Ok(Json(CalendarResponse {
        month_start: window.start(),
        month_end: window.end(),
        page_totals,
        marked_days: MarkedDays {
            meal: stats::marked_days(&meals, reference_date).into_iter().collect(),
            reading: reading_days.into_iter().collect(),
            daily: stats::marked_days(&daily_records, reference_date)
                .into_iter()
                .collect(),
        },
    }))
}

/// Every book with its current page and progress.
#[utoipa::path(
    get,
    path = "/books",
    responses((status = 200, description = "Book overview", body = [BookProgressResponse]))
)]
pub async fn list_books_handler(
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<Vec<BookProgressResponse>>, HandlerError> {
    let books = app_state.repo.list_books().await.map_err(port_failure)?;
    let sessions = app_state.repo.list_sessions().await.map_err(port_failure)?;

    let overview: Vec<BookProgressResponse> = stats::book_overview(&books, &sessions)
        .into_iter()
        .map(|snapshot| {
            let progress = match snapshot.progress {
                Ok(percent) => Some(percent),
                Err(e) => {
                    warn!("Unable to compute progress for book {}: {}", snapshot.book.id(), e);
                    None
                }
            };
            BookProgressResponse::new(snapshot.book, snapshot.current_page, progress)
        })
        .collect();

    Ok(Json(overview))
}

/// Progress of a single book.
#[utoipa::path(
    get,
    path = "/books/{id}/progress",
    params(("id" = String, Path, description = "The id of the book.")),
    responses(
        (status = 200, description = "Progress of the book", body = BookProgressResponse),
        (status = 404, description = "Unknown book"),
        (status = 422, description = "Progress cannot be computed for this book")
    )
)]
pub async fn book_progress_handler(
    State(app_state): State<Arc<AppState>>,
    Path(book_id): Path<String>,
) -> Result<Json<BookProgressResponse>, HandlerError> {
    let book = app_state.repo.get_book(&book_id).await.map_err(port_failure)?;
    let sessions = app_state
        .repo
        .list_sessions_for_book(&book_id)
        .await
        .map_err(port_failure)?;

    let current_page = stats::current_page(&book, &sessions);
    let progress = stats::book_progress(&book, current_page).map_err(stats_failure)?;

    Ok(Json(BookProgressResponse::new(&book, current_page, Some(progress))))
}

/// Records of one kind on a single day.
#[utoipa::path(
    get,
    path = "/records/{kind}",
    params(
        ("kind" = String, Path, description = "One of `meal`, `reading`, `daily`."),
        DateQuery
    ),
    responses(
        (status = 200, description = "Records on the day", body = DayRecordsResponse),
        (status = 400, description = "Unknown kind or malformed date")
    )
)]
pub async fn day_records_handler(
    State(app_state): State<Arc<AppState>>,
    Path(kind): Path<String>,
    Query(query): Query<DateQuery>,
) -> Result<Json<DayRecordsResponse>, HandlerError> {
    let category: RecordCategory = kind
        .parse()
        .map_err(|e: DomainError| (StatusCode::BAD_REQUEST, e.to_string()))?;
    let date = query.date_or_today();
    let repo = &app_state.repo;

    let records: Vec<RecordEntry> = match category {
        RecordCategory::Meal => {
            let meals = repo.list_meals().await.map_err(port_failure)?;
            stats::records_on(&meals, date).into_iter().map(RecordEntry::from).collect()
        }
        RecordCategory::Reading => {
            let notes = repo.list_reading_records().await.map_err(port_failure)?;
            stats::records_on(&notes, date).into_iter().map(RecordEntry::from).collect()
        }
        RecordCategory::Daily => {
            let journal = repo.list_daily_records().await.map_err(port_failure)?;
            stats::records_on(&journal, date).into_iter().map(RecordEntry::from).collect()
        }
    };

    Ok(Json(DayRecordsResponse {
        date,
        kind: category.as_str().to_string(),
        records,
    }))
}
