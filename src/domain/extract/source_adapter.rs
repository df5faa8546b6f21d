use async_trait::async_trait;

use crate::domain::extract::error::ExtractError;
use crate::domain::metric::model::{DateRange, Dimension, Metric, MetricKind, Source};

/// Everything one adapter call needs. Each spawned task owns its own copy.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub metric: MetricKind,
    pub dimensions: Vec<Dimension>,
    pub ranges: Vec<DateRange>,
}

impl FetchRequest {
    pub fn new(metric: MetricKind, dimensions: Vec<Dimension>, ranges: Vec<DateRange>) -> Self {
        Self {
            metric,
            dimensions,
            ranges,
        }
    }

    /// Synthetic range-index dimension is only needed when batching.
    pub fn needs_range_index(&self) -> bool {
        self.ranges.len() > 1
    }

    /// Splits the ranges into consecutive requests of at most `max_ranges`
    /// each, the most a single backend report accepts.
    pub fn batches(&self, max_ranges: usize) -> Vec<FetchRequest> {
        self.ranges
            .chunks(max_ranges.max(1))
            .map(|chunk| FetchRequest::new(self.metric, self.dimensions.clone(), chunk.to_vec()))
            .collect()
    }
}

/// One analytics backend, translated into canonical metrics.
///
/// Implementations build a single backend request covering every sub-range in
/// `req`, bound the call with their own timeout, and decode every row before
/// returning. Any failure yields an error and no metrics.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    fn source(&self) -> Source;

    async fn fetch_metrics(&self, req: &FetchRequest) -> Result<Vec<Metric>, ExtractError>;
}
