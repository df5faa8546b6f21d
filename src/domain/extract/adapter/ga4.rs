//! Google Analytics 4 source, via the Data API v1beta.

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::core::client::google::data_v1beta::{
    self, DateRange as Ga4DateRange, Dimension as Ga4Dimension, Metric as Ga4Metric, Row,
    RunReportRequest, DATE_RANGE_DIMENSION,
};
use crate::core::client::google::GoogleEndpoint;
use crate::domain::extract::date_range::resolve_row_range;
use crate::domain::extract::error::ExtractError;
use crate::domain::extract::source_adapter::{FetchRequest, SourceAdapter};
use crate::domain::metric::model::{Dimension, Metric, MetricKind, Source};

const LABEL: &str = "GA4";

/// The Data API rejects `runReport` calls with more date ranges.
const MAX_DATE_RANGES: usize = 4;

fn native_dimension(dim: Dimension) -> &'static str {
    match dim {
        Dimension::ChannelGroup => "defaultChannelGroup",
        Dimension::Source => "firstUserSource",
        Dimension::Medium => "firstUserMedium",
    }
}

fn native_metric(metric: MetricKind) -> &'static str {
    match metric {
        MetricKind::TotalRevenue => "totalRevenue",
    }
}

pub struct Ga4Adapter {
    endpoint: GoogleEndpoint,
    property_id: String,
    timeout: Duration,
}

impl Ga4Adapter {
    pub fn new(endpoint: GoogleEndpoint, property_id: impl Into<String>, timeout: Duration) -> Self {
        Self {
            endpoint,
            property_id: property_id.into(),
            timeout,
        }
    }

    fn build_request(req: &FetchRequest) -> RunReportRequest {
        let mut dimensions: Vec<Ga4Dimension> = req
            .dimensions
            .iter()
            .map(|d| Ga4Dimension {
                name: native_dimension(*d).to_string(),
            })
            .collect();

        if req.needs_range_index() {
            dimensions.push(Ga4Dimension {
                name: DATE_RANGE_DIMENSION.to_string(),
            });
        }

        RunReportRequest {
            date_ranges: req
                .ranges
                .iter()
                .map(|r| Ga4DateRange {
                    start_date: r.start_str(),
                    end_date: r.end_str(),
                })
                .collect(),
            dimensions,
            metrics: vec![Ga4Metric {
                name: native_metric(req.metric).to_string(),
            }],
        }
    }

    fn to_metric(req: &FetchRequest, row: &Row) -> Result<Metric, ExtractError> {
        let token = row
            .dimension_values
            .get(req.dimensions.len())
            .map(|v| v.value.as_str());
        let range = resolve_row_range(&req.ranges, token).map_err(|message| ExtractError::RangeIndex {
            source_label: LABEL,
            message,
        })?;

        let value = row.metric_values.first().ok_or_else(|| ExtractError::Decode {
            source_label: LABEL,
            message: "row has no metric values".into(),
        })?;

        let dimension = row.dimension_values.first().ok_or_else(|| ExtractError::Decode {
            source_label: LABEL,
            message: "row has no dimension values".into(),
        })?;

        Ok(Metric {
            source: Source::GoogleAnalytics4.label().to_string(),
            name: req.metric.as_code().to_string(),
            value: value.value.clone(),
            dimension: dimension.value.clone(),
            start: range.start_str(),
            end: range.end_str(),
        })
    }

    async fn fetch_batch(
        &self,
        http: &reqwest::Client,
        req: &FetchRequest,
    ) -> Result<Vec<Metric>, ExtractError> {
        let body = Self::build_request(req);
        let response = data_v1beta::run_report(http, &self.endpoint, &self.property_id, &body)
            .await
            .map_err(|e| ExtractError::from_api(LABEL, self.timeout.as_secs(), e))?;

        if response.row_count < 1 {
            return Err(ExtractError::EmptyReport { source_label: LABEL });
        }

        response
            .rows
            .iter()
            .map(|row| Self::to_metric(req, row))
            .collect()
    }
}

#[async_trait]
impl SourceAdapter for Ga4Adapter {
    fn source(&self) -> Source {
        Source::GoogleAnalytics4
    }

    async fn fetch_metrics(&self, req: &FetchRequest) -> Result<Vec<Metric>, ExtractError> {
        if req.ranges.is_empty() {
            return Err(ExtractError::InvalidRequest {
                source_label: LABEL,
                message: "no date ranges requested".into(),
            });
        }
        // The range token would otherwise land in the breakdown slot.
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

        debug!(source = LABEL, rows = metrics.len(), "GA4 report decoded");
        Ok(metrics)
    }
}
