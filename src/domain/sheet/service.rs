//! Pulls monthly revenue per dimension and writes one sheet tab per
//! (source, dimension) pair.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use chrono::{NaiveDate, Utc};
use futures::future::try_join_all;
use serde::Serialize;
use tracing::info;

use crate::config::AppConfig;
use crate::core::client::google::sheets_v4::SheetsClient;
use crate::core::client::google::GoogleEndpoint;
use crate::domain::extract::service::ExtractService;
use crate::domain::metric::model::{DateRange, Dimension, Metric, MetricKind, Source};
use crate::domain::sheet::grid::{build_grid, grid_range};
use crate::domain::sheet::monthly_dates::monthly_windows;

const CLEAR_EXTENT: &str = "A1:Z100";

pub fn tab_name(source: Source, dim: Dimension) -> String {
    let dim_label = match dim {
        Dimension::ChannelGroup => "Default Channel Group",
        Dimension::Medium => "Medium",
        Dimension::Source => "Source",
    };
    format!("{} - {}", source.label(), dim_label)
}

#[derive(Debug, Clone, Serialize)]
pub struct SheetReport {
    pub spreadsheet_url: String,
    pub tabs_written: Vec<String>,
}

pub struct SheetService {
    extract: Arc<ExtractService>,
    endpoint: GoogleEndpoint,
    spreadsheet_id: Option<String>,
    first_month: NaiveDate,
    timeout: Duration,
}

impl SheetService {
    pub fn new(
        extract: Arc<ExtractService>,
        endpoint: GoogleEndpoint,
        spreadsheet_id: Option<String>,
        first_month: NaiveDate,
        timeout: Duration,
    ) -> Self {
        Self {
            extract,
            endpoint,
            spreadsheet_id,
            first_month,
            timeout,
        }
    }

    pub fn from_config(cfg: &AppConfig, extract: Arc<ExtractService>) -> Self {
        Self::new(
            extract,
            GoogleEndpoint::new(&cfg.sheets_base_url, cfg.access_token.clone()),
            cfg.spreadsheet_id.clone(),
            cfg.sheet_first_month,
            cfg.pull_timeout,
        )
    }

    pub async fn generate_sheet(&self) -> Result<SheetReport> {
        self.generate_sheet_until(Utc::now().date_naive()).await
    }

    pub async fn generate_sheet_until(&self, today: NaiveDate) -> Result<SheetReport> {
        let spreadsheet_id = self
            .spreadsheet_id
            .as_deref()
            .ok_or_else(|| anyhow!("ETL_SPREADSHEET_ID is not set"))?;

        let windows = monthly_windows(self.first_month, today);
        if windows.is_empty() {
            return Err(anyhow!("no monthly windows between {} and {}", self.first_month, today));
        }

        let pulls = Dimension::ALL
            .iter()
            .map(|dim| self.pull_dimension(*dim, windows.clone()));
        let data = try_join_all(pulls).await?;

        let http = self
            .endpoint
            .connect(self.timeout)
            .context("error when creating sheets client")?;
        let client = SheetsClient::new(http, self.endpoint.clone(), spreadsheet_id);

        let sheet = client.get().await.context("error when getting sheet")?;

        let mut tabs_written = Vec::new();
        for (dim, metrics) in data {
            let tabs: Vec<(Source, String)> = Source::ALL.iter().map(|s| (*s, tab_name(*s, dim))).collect();

            let clear: Vec<String> = tabs
                .iter()
                .map(|(_, tab)| format!("{}!{}", tab, CLEAR_EXTENT))
                .collect();
            client
                .batch_clear(&clear)
                .await
                .context("error when clearing old values")?;

            for (source, tab) in tabs {
                let subset: Vec<Metric> = metrics
                    .iter()
                    .filter(|m| m.source == source.label())
                    .cloned()
                    .collect();
                let grid = build_grid(&subset);
                let range = grid_range(&tab, &grid);

                client
                    .update_columns(&range, &grid)
                    .await
                    .with_context(|| format!("error when writing to sheet tab '{}'", tab))?;
                tabs_written.push(tab);
            }
        }

        info!(tabs = tabs_written.len(), "Spreadsheet generated");
        Ok(SheetReport {
            spreadsheet_url: sheet.spreadsheet_url,
            tabs_written,
        })
    }

    async fn pull_dimension(&self, dim: Dimension, windows: Vec<DateRange>) -> Result<(Dimension, Vec<Metric>)> {
        let sources: Vec<&str> = Source::ALL.iter().map(|s| s.as_code()).collect();
        let outcome = self
            .extract
            .extract(MetricKind::TotalRevenue, &sources, windows, vec![dim])
            .await;

        if outcome.is_partial() {
            return Err(anyhow!(
                "error pulling {} data: {}",
                dim.as_code(),
                outcome.errors
            ));
        }

        let metrics = outcome
            .metrics
            .into_iter()
            .filter(|m| m.name == MetricKind::TotalRevenue.as_code())
            .collect();
        Ok((dim, metrics))
    }
}
