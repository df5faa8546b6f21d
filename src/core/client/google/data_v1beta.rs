//! Analytics Data API v1beta (GA4) wire types.

use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{send_json, GoogleApiError, GoogleEndpoint};

/// Dimension GA4 uses to tag rows with their date range (`date_range_<n>`).
pub const DATE_RANGE_DIMENSION: &str = "dateRange";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReportRequest {
    pub date_ranges: Vec<DateRange>,
    pub dimensions: Vec<Dimension>,
    pub metrics: Vec<Metric>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    pub start_date: String,
    pub end_date: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Dimension {
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Metric {
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReportResponse {
    #[serde(default)]
    pub rows: Vec<Row>,
    #[serde(default)]
    pub row_count: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Row {
    #[serde(default)]
    pub dimension_values: Vec<Value>,
    #[serde(default)]
    pub metric_values: Vec<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Value {
    #[serde(default)]
    pub value: String,
}

/// `POST /v1beta/properties/{property_id}:runReport`
pub async fn run_report(
    http: &Client,
    endpoint: &GoogleEndpoint,
    property_id: &str,
    body: &RunReportRequest,
) -> Result<RunReportResponse, GoogleApiError> {
    let path = format!("v1beta/properties/{}:runReport", urlencoding::encode(property_id));
    let req = endpoint.authorize(http.post(endpoint.url(&path)).json(body));
    send_json(req).await
}
