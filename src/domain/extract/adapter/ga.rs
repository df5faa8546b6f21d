//! Universal Analytics source, via the Reporting API v4.

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::core::client::google::reporting_v4::{
    self, DateRange as GaDateRange, Dimension as GaDimension, GetReportsRequest,
    Metric as GaMetric, ReportRequest, ReportRow,
};
use crate::core::client::google::GoogleEndpoint;
use crate::domain::extract::error::ExtractError;
use crate::domain::extract::source_adapter::{FetchRequest, SourceAdapter};
use crate::domain::metric::model::{Dimension, Metric, MetricKind, Source};

const LABEL: &str = "GA";

/// Reporting API v4 rejects report requests with more date ranges.
const MAX_DATE_RANGES: usize = 2;

fn native_dimension(dim: Dimension) -> &'static str {
    match dim {
        Dimension::ChannelGroup => "ga:channelGrouping",
        Dimension::Source => "ga:source",
        Dimension::Medium => "ga:medium",
    }
}

fn native_metric(metric: MetricKind) -> &'static str {
    match metric {
        MetricKind::TotalRevenue => "ga:transactionRevenue",
    }
}

pub struct GaAdapter {
    endpoint: GoogleEndpoint,
    view_id: String,
    timeout: Duration,
}

impl GaAdapter {
    pub fn new(endpoint: GoogleEndpoint, view_id: impl Into<String>, timeout: Duration) -> Self {
        Self {
            endpoint,
            view_id: view_id.into(),
            timeout,
        }
    }

    fn build_request(&self, req: &FetchRequest) -> GetReportsRequest {
        let report = ReportRequest {
            view_id: self.view_id.clone(),
            date_ranges: req
                .ranges
                .iter()
                .map(|r| GaDateRange {
                    start_date: r.start_str(),
                    end_date: r.end_str(),
                })
                .collect(),
            metrics: vec![GaMetric {
                expression: native_metric(req.metric).to_string(),
            }],
            dimensions: req
                .dimensions
                .iter()
                .map(|d| GaDimension {
                    name: native_dimension(*d).to_string(),
                })
                .collect(),
        };

        GetReportsRequest {
            report_requests: vec![report],
        }
    }

    /// One metric per requested range: the Reporting API returns the values
    /// for `ranges[k]` in `row.metrics[k]`.
    fn to_metrics(req: &FetchRequest, row: &ReportRow) -> Result<Vec<Metric>, ExtractError> {
        let dimension = row.dimensions.first().ok_or_else(|| ExtractError::Decode {
            source_label: LABEL,
            message: "row has no dimension values".into(),
        })?;

        if row.metrics.is_empty() {
            return Err(ExtractError::Decode {
                source_label: LABEL,
                message: "row has no metric values".into(),
            });
        }

        row.metrics
            .iter()
            .enumerate()
            .map(|(k, per_range)| -> Result<Metric, ExtractError> {
                let range = req.ranges.get(k).ok_or_else(|| ExtractError::RangeIndex {
                    source_label: LABEL,
                    message: format!(
                        "date range index {} out of bounds for {} requested ranges",
                        k,
                        req.ranges.len()
                    ),
                })?;

                let value = per_range.values.first().ok_or_else(|| ExtractError::Decode {
                    source_label: LABEL,
                    message: format!("no metric value for date range {}", k),
                })?;

                Ok(Metric {
                    source: Source::GoogleAnalytics.label().to_string(),
                    name: req.metric.as_code().to_string(),
                    value: value.clone(),
                    dimension: dimension.clone(),
                    start: range.start_str(),
                    end: range.end_str(),
                })
            })
            .collect()
    }

    async fn fetch_batch(
        &self,
        http: &reqwest::Client,
        req: &FetchRequest,
    ) -> Result<Vec<Metric>, ExtractError> {
        let body = self.build_request(req);
        let response = reporting_v4::batch_get(http, &self.endpoint, &body)
            .await
            .map_err(|e| ExtractError::from_api(LABEL, self.timeout.as_secs(), e))?;

        let mut metrics = Vec::new();
        for row in response.reports.iter().flat_map(|report| report.data.rows.iter()) {
            metrics.extend(Self::to_metrics(req, row)?);
        }
        Ok(metrics)
    }
}

#[async_trait]
impl SourceAdapter for GaAdapter {
    fn source(&self) -> Source {
        Source::GoogleAnalytics
    }

    async fn fetch_metrics(&self, req: &FetchRequest) -> Result<Vec<Metric>, ExtractError> {
        if req.ranges.is_empty() {
            return Err(ExtractError::InvalidRequest {
                source_label: LABEL,
                message: "no date ranges requested".into(),
            });
        }
        if req.dimensions.is_empty() {
            return Err(ExtractError::InvalidRequest {
                source_label: LABEL,
                message: "no dimensions requested".into(),
            });
        }

        let http = self
            .endpoint
            .connect(self.timeout)
            .map_err(|e| ExtractError::from_api(LABEL, self.timeout.as_secs(), e))?;

        let mut metrics = Vec::new();
        for batch in req.batches(MAX_DATE_RANGES) {
            metrics.extend(self.fetch_batch(&http, &batch).await?);
        }

        debug!(source = LABEL, rows = metrics.len(), "GA report decoded");
        Ok(metrics)
    }
}
