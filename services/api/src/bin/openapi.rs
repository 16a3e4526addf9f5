//! services/api/src/bin/openapi.rs
//!
//! Writes the OpenAPI document of the routine tracker API.
//!
//! Usage: `openapi [OUTPUT]`. The output path defaults to `openapi.json`.

use api_lib::{error::ApiError, web::rest::ApiDoc};
use std::path::PathBuf;
use utoipa::OpenApi;

const DEFAULT_OUTPUT: &str = "openapi.json";

fn main() -> Result<(), ApiError> {
    let output = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT));

    let api_doc = ApiDoc::openapi();
    let document = api_doc
        .to_pretty_json()
        .map_err(|e| ApiError::Internal(format!("Failed to render OpenAPI document: {}", e)))?;
    std::fs::write(&output, document)?;

    println!(
        "Wrote {} routes to {}",
        api_doc.paths.paths.len(),
        output.display()
    );
    Ok(())
}
