//! Google Sheets API v4: the handful of calls the spreadsheet job makes.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{send_json, GoogleApiError, GoogleEndpoint};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Spreadsheet {
    #[serde(default)]
    pub spreadsheet_id: String,
    #[serde(default)]
    pub spreadsheet_url: String,
}

#[derive(Debug, Clone, Serialize)]
struct BatchClearValuesRequest<'a> {
    ranges: &'a [String],
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchClearValuesResponse {
    #[serde(default)]
    pub cleared_ranges: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct ValueRange<'a> {
    range: &'a str,
    major_dimension: &'static str,
    values: &'a [Vec<String>],
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateValuesResponse {
    #[serde(default)]
    pub updated_range: String,
    #[serde(default)]
    pub updated_cells: u64,
}

/// A connected handle to one spreadsheet.
pub struct SheetsClient {
    http: Client,
    endpoint: GoogleEndpoint,
    spreadsheet_id: String,
}

impl SheetsClient {
    pub fn new(http: Client, endpoint: GoogleEndpoint, spreadsheet_id: impl Into<String>) -> Self {
        Self {
            http,
            endpoint,
            spreadsheet_id: spreadsheet_id.into(),
        }
    }

    fn sheet_path(&self, suffix: &str) -> String {
        format!(
            "v4/spreadsheets/{}{}",
            urlencoding::encode(&self.spreadsheet_id),
            suffix
        )
    }

    pub async fn get(&self) -> Result<Spreadsheet, GoogleApiError> {
        let url = self.endpoint.url(&self.sheet_path(""));
        let req = self.endpoint.authorize(self.http.get(url));
        send_json(req).await
    }

    pub async fn batch_clear(&self, ranges: &[String]) -> Result<BatchClearValuesResponse, GoogleApiError> {
        let url = self.endpoint.url(&self.sheet_path("/values:batchClear"));
        let body = BatchClearValuesRequest { ranges };
        let req = self.endpoint.authorize(self.http.post(url).json(&body));
        send_json(req).await
    }

    /// Overwrites `range` with `columns`, one inner vec per sheet column.
    pub async fn update_columns(
        &self,
        range: &str,
        columns: &[Vec<String>],
    ) -> Result<UpdateValuesResponse, GoogleApiError> {
        let suffix = format!("/values/{}?valueInputOption=RAW", urlencoding::encode(range));
        let url = self.endpoint.url(&self.sheet_path(&suffix));
        let body = ValueRange {
            range,
            major_dimension: "COLUMNS",
            values: columns,
        };

        debug!(range, columns = columns.len(), "Writing sheet values");
        let req = self.endpoint.authorize(self.http.put(url).json(&body));
        send_json(req).await
    }
}
