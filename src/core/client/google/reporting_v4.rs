//! Analytics Reporting API v4 (Universal Analytics) wire types.

use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{send_json, GoogleApiError, GoogleEndpoint};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GetReportsRequest {
    pub report_requests: Vec<ReportRequest>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRequest {
    pub view_id: String,
    pub date_ranges: Vec<DateRange>,
    pub metrics: Vec<Metric>,
    pub dimensions: Vec<Dimension>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    pub start_date: String,
    pub end_date: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Metric {
    pub expression: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Dimension {
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GetReportsResponse {
    #[serde(default)]
    pub reports: Vec<Report>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Report {
    #[serde(default)]
    pub data: ReportData,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReportData {
    #[serde(default)]
    pub rows: Vec<ReportRow>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReportRow {
    #[serde(default)]
    pub dimensions: Vec<String>,
    #[serde(default)]
    pub metrics: Vec<DateRangeValues>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DateRangeValues {
    #[serde(default)]
    pub values: Vec<String>,
}

/// `POST /v4/reports:batchGet`
pub async fn batch_get(
    http: &Client,
    endpoint: &GoogleEndpoint,
    body: &GetReportsRequest,
) -> Result<GetReportsResponse, GoogleApiError> {
    let req = endpoint.authorize(http.post(endpoint.url("v4/reports:batchGet")).json(body));
    send_json(req).await
}
