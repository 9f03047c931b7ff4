//! Handler for the CSV report export endpoint.

use axum::{Json, extract::State};

use crate::api::dto::export::ExportResponse;
use crate::error::AppError;
use crate::state::AppState;

/// Exports every link as a CSV report and returns where to download it.
///
/// # Endpoint
///
/// `GET /links/export`
///
/// # Response
///
/// ```json
/// { "reportUrl": "http://localhost:3333/exports/downloads/0190...-links.csv" }
/// ```
///
/// Responds only after the report is fully uploaded.
///
/// # Errors
///
/// Returns 500 Internal Server Error if any stage of the export fails or it
/// exceeds the export timeout.
pub async fn export_links_handler(
    State(state): State<AppState>,
) -> Result<Json<ExportResponse>, AppError> {
    let report_url = state.link_service.export_links_to_csv().await?;

    Ok(Json(ExportResponse { report_url }))
}
