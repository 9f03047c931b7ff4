//! DTO for the report export endpoint.

use serde::Serialize;

/// Response of `GET /links/export`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportResponse {
    /// Public URL of the uploaded CSV report.
    pub report_url: String,
}
