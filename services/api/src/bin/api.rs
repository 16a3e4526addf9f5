//! services/api/src/bin/api.rs

use api_lib::{
    adapters::InMemoryRepository,
    config::Config,
    error::ApiError,
    web::{self, state::AppState},
};
use axum::http::{header::ACCEPT, header::CONTENT_TYPE, HeaderValue, Method};
use routine_tracker_core::ports::RecordRepository;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{info, warn, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(config.env_filter()?)
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Load Records ---
    let repo = match &config.seed_path {
        Some(path) => {
            info!("Loading records from {}", path.display());
            InMemoryRepository::from_seed_file(path)?
        }
        None => {
            warn!("SEED_PATH is not set; serving an empty repository");
            InMemoryRepository::default()
        }
    };
    let book_count = repo.list_books().await?.len();
    info!("Repository ready with {} books", book_count);

    // --- 3. Build the Shared AppState ---
    let app_state = Arc::new(AppState {
        repo: Arc::new(repo),
        config: config.clone(),
    });

    let origin = config.cors_origin.parse::<HeaderValue>().map_err(|e| {
        ApiError::Internal(format!(
            "Invalid CORS origin '{}': {}",
            config.cors_origin, e
        ))
    })?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, ACCEPT]);

    // --- 4. Create the Web Router ---
    let trace = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));
    let app = web::router(app_state).layer(cors).layer(trace);

    // --- 5. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
