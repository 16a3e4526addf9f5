pub mod rest;
pub mod state;

use axum::{routing::get, Router};
use std::sync::Arc;

pub use rest::{
    book_progress_handler, calendar_handler, daily_stats_handler, day_records_handler,
    health_handler, list_books_handler, monthly_stats_handler,
};
pub use state::AppState;

/// Builds the API router. Cross-cutting layers (CORS, tracing) are added by the binary.
pub fn router(app_state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/stats/monthly", get(monthly_stats_handler))
        .route("/stats/daily", get(daily_stats_handler))
        .route("/stats/calendar", get(calendar_handler))
        .route("/books", get(list_books_handler))
        .route("/books/{id}/progress", get(book_progress_handler))
        .route("/records/{kind}", get(day_records_handler))
        .with_state(app_state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemoryRepository;
    use crate::config::Config;
    use crate::web::rest::{
        BookProgressResponse, CalendarResponse, DailyTotalResponse, DayRecordsResponse,
        HealthResponse, MonthlyStatsResponse,
    };
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use chrono::NaiveDate;
    use serde::de::DeserializeOwned;
    use tower::ServiceExt;

    const SEED: &str = r#"{
        "books": [
            { "id": "dune", "title": "Dune", "author": "Frank Herbert", "totalPage": 200,
              "status": "COMPLETED", "startDate": "2024-03-01", "completedDate": "2024-03-15" },
            { "id": "emma", "title": "Emma", "author": "Jane Austen", "totalPage": 3,
              "status": "READING", "startDate": "2024-03-02", "completedDate": "2024-03-20" }
        ],
        "sessions": [
            { "id": "s1", "bookId": "dune", "date": "2024-03-10", "startPage": 1, "endPage": 30 },
            { "id": "s2", "bookId": "dune", "date": "2024-04-01", "startPage": 31, "endPage": 50 },
            { "id": "s3", "bookId": "emma", "date": "2024-03-10", "startPage": 1, "endPage": 1 }
        ],
        "meals": [
            { "id": "m2", "date": "2024-03-10", "mealType": "DINNER", "menu": "Curry" },
            { "id": "m1", "date": "2024-03-10", "mealType": "LUNCH", "menu": "Ramen", "memo": "spicy" },
            { "id": "m3", "date": "2024-03-11", "mealType": "BREAKFAST", "menu": "Toast" }
        ],
        "readingRecords": [
            { "id": "r1", "date": "2024-03-12", "bookTitle": "Dune", "memo": "Fear is the mind-killer." }
        ],
        "dailyRecords": [
            { "id": "d1", "date": "2024-03-31", "title": "Month end", "content": "Tidied the shelf." }
        ]
    }"#;

    fn app() -> Router {
        let config = Config::from_lookup(|_| None).unwrap();
        let repo = InMemoryRepository::from_json(SEED).unwrap();
        router(Arc::new(AppState {
            repo: Arc::new(repo),
            config: Arc::new(config),
        }))
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    async fn get(uri: &str) -> (StatusCode, axum::body::Bytes) {
        let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let resp = app().oneshot(req).await.unwrap();
        let status = resp.status();
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, body)
    }

    async fn get_json<T: DeserializeOwned>(uri: &str) -> T {
        let (status, body) = get(uri).await;
        assert_eq!(status, StatusCode::OK, "unexpected status for {}", uri);
        serde_json::from_slice(&body).unwrap()
    }

    #[test]
    fn test_openapi_lists_every_route() {
        use utoipa::OpenApi;
        let doc = rest::ApiDoc::openapi();
        for path in [
            "/health",
            "/stats/monthly",
            "/stats/daily",
            "/stats/calendar",
            "/books",
            "/books/{id}/progress",
            "/records/{kind}",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {}", path);
        }
    }

    #[tokio::test]
    async fn test_health() {
        let health: HealthResponse = get_json("/health").await;
        assert_eq!(health.status, "ok");
        assert_eq!(health.seed_path, None);
    }

    #[tokio::test]
    async fn test_health_reports_seed_path() {
        let config = Config::from_lookup(|key| {
            (key == "SEED_PATH").then(|| "data/seed.json".to_string())
        })
        .unwrap();
        let app = router(Arc::new(AppState {
            repo: Arc::new(InMemoryRepository::default()),
            config: Arc::new(config),
        }));
        let req = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let health: HealthResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(health.seed_path.as_deref(), Some("data/seed.json"));
    }

    #[tokio::test]
    async fn test_monthly_stats() {
        let stats: MonthlyStatsResponse = get_json("/stats/monthly?date=2024-03-20").await;
        // Emma carries a completion date but is still marked as reading.
        assert_eq!(stats.completed_count, 1);
        assert_eq!(stats.total_pages, 31);
        assert_eq!(stats.month_start, date(2024, 3, 1));
        assert_eq!(stats.month_end, date(2024, 3, 31));
        let ids: Vec<_> = stats.monthly_sessions.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["s1", "s3"]);
        assert_eq!(stats.monthly_sessions[0].amount, 30);
    }

    #[tokio::test]
    async fn test_monthly_stats_rejects_bad_date() {
        let (status, _) = get("/stats/monthly?date=2024-13-40").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_daily_stats() {
        let daily: DailyTotalResponse = get_json("/stats/daily?date=2024-03-10").await;
        assert_eq!(daily.total_pages, 31);

        let quiet: DailyTotalResponse = get_json("/stats/daily?date=2024-03-11").await;
        assert_eq!(quiet.total_pages, 0);
    }

    #[tokio::test]
    async fn test_calendar() {
        let calendar: CalendarResponse = get_json("/stats/calendar?date=2024-03-05").await;
        assert_eq!(calendar.page_totals.len(), 1);
        assert_eq!(calendar.page_totals[0].date, date(2024, 3, 10));
        assert_eq!(calendar.page_totals[0].total_pages, 31);
        assert_eq!(calendar.marked_days.meal, vec![date(2024, 3, 10), date(2024, 3, 11)]);
        assert_eq!(calendar.marked_days.reading, vec![date(2024, 3, 10), date(2024, 3, 12)]);
        assert_eq!(calendar.marked_days.daily, vec![date(2024, 3, 31)]);
    }

    #[tokio::test]
    async fn test_list_books() {
        let books: Vec<BookProgressResponse> = get_json("/books").await;
        assert_eq!(books.len(), 2);
        assert_eq!(books[0].id, "dune");
        assert_eq!(books[0].current_page, 50);
        assert_eq!(books[0].progress, Some(25));
        assert_eq!(books[0].status, "COMPLETED");
        assert_eq!(books[1].id, "emma");
        assert_eq!(books[1].progress, Some(33));
    }

    #[tokio::test]
    async fn test_book_progress() {
        let book: BookProgressResponse = get_json("/books/emma/progress").await;
        assert_eq!(book.current_page, 1);
        assert_eq!(book.progress, Some(33));

        let (status, _) = get("/books/ghost/progress").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_day_records() {
        let meals: DayRecordsResponse = get_json("/records/meal?date=2024-03-10").await;
        let ids: Vec<_> = meals.records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["m1", "m2"]);
        assert_eq!(meals.records[0].tag.as_deref(), Some("LUNCH"));
        assert_eq!(meals.records[0].body.as_deref(), Some("spicy"));
        assert_eq!(meals.kind, "meal");
        assert!(meals.records.iter().all(|r| r.kind == "meal"));

        let notes: DayRecordsResponse = get_json("/records/reading?date=2024-03-12").await;
        assert_eq!(notes.kind, "reading");
        assert_eq!(notes.records.len(), 1);
        assert_eq!(notes.records[0].id, "r1");
        assert_eq!(notes.records[0].kind, "reading");
        assert_eq!(notes.records[0].tag, None);
        assert_eq!(notes.records[0].title, "Dune");
        assert_eq!(notes.records[0].body.as_deref(), Some("Fear is the mind-killer."));

        // Sessions are not reading notes.
        let no_notes: DayRecordsResponse = get_json("/records/reading?date=2024-03-10").await;
        assert!(no_notes.records.is_empty());

        let journal: DayRecordsResponse = get_json("/records/daily?date=2024-03-31").await;
        assert_eq!(journal.records.len(), 1);
        assert_eq!(journal.records[0].title, "Month end");
        assert_eq!(journal.records[0].kind, "daily");

        let (status, _) = get("/records/workout?date=2024-03-31").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
