//! Fans one request out to every requested source and merges the results.
//!
//! Aggregation is best-effort: a failing source is logged and contributes
//! nothing, the remaining sources still return their metrics.

use std::sync::Arc;

use anyhow::Result;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, error, warn};

use crate::config::AppConfig;
use crate::core::client::google::GoogleEndpoint;
use crate::core::util::channel_util::{join_channel_errors, remove_zero_entries, to_vec};
use crate::domain::extract::adapter::ga::GaAdapter;
use crate::domain::extract::adapter::ga4::Ga4Adapter;
use crate::domain::extract::error::ExtractError;
use crate::domain::extract::source_adapter::{FetchRequest, SourceAdapter};
use crate::domain::metric::model::{DateRange, Dimension, Metric, MetricKind, Source};

const METRIC_BUFFER: usize = 256;

/// Merged result of one fan-out.
#[derive(Debug, Default)]
pub struct ExtractOutcome {
    pub metrics: Vec<Metric>,
    /// Per-source failures joined with `", "`; empty when every source succeeded.
    pub errors: String,
}

impl ExtractOutcome {
    pub fn is_partial(&self) -> bool {
        !self.errors.is_empty()
    }
}

pub struct ExtractService {
    adapters: Vec<Arc<dyn SourceAdapter>>,
}

impl ExtractService {
    pub fn new(adapters: Vec<Arc<dyn SourceAdapter>>) -> Self {
        Self { adapters }
    }

    /// Registers an adapter for every backend that has an id configured.
    pub fn from_config(cfg: &AppConfig) -> Self {
        let mut adapters: Vec<Arc<dyn SourceAdapter>> = Vec::new();

        match cfg.ga_view_id.as_deref() {
            Some(view_id) => adapters.push(Arc::new(GaAdapter::new(
                GoogleEndpoint::new(&cfg.ga_base_url, cfg.access_token.clone()),
                view_id,
                cfg.pull_timeout,
            ))),
            None => warn!("ETL_GA_VIEW_ID not set; GA source disabled"),
        }

        match cfg.ga4_property_id.as_deref() {
            Some(property_id) => adapters.push(Arc::new(Ga4Adapter::new(
                GoogleEndpoint::new(&cfg.ga4_base_url, cfg.access_token.clone()),
                property_id,
                cfg.pull_timeout,
            ))),
            None => warn!("ETL_GA4_PROPERTY_ID not set; GA4 source disabled"),
        }

        Self::new(adapters)
    }

    fn resolve(&self, code: &str) -> Option<Arc<dyn SourceAdapter>> {
        let source = Source::from_code(code)?;
        self.adapters.iter().find(|a| a.source() == source).cloned()
    }

    /// Dispatches per metric name. Unknown names are logged and skipped.
    pub async fn get_data<S: AsRef<str>>(
        &self,
        sources: &[S],
        metric_names: &[S],
        starts: &[S],
        ends: &[S],
        dimensions: &[S],
    ) -> Vec<Metric> {
        let mut all_metrics = Vec::new();

        for name in metric_names {
            match MetricKind::from_code(name) {
                Some(MetricKind::TotalRevenue) => {
                    match self.get_total_revenue_data(sources, starts, ends, dimensions).await {
                        Ok(data) => all_metrics.extend(data),
                        Err(e) => error!(error = %e, "Error pulling total revenue"),
                    }
                }
                None => warn!(metric = name.as_ref(), "Unrecognised metric type, skipping"),
            }
        }

        all_metrics
    }

    /// Total revenue from every requested source.
    ///
    /// Always returns `Ok`: per-source failures are only logged, so an empty
    /// result cannot be told apart from every source failing. Use
    /// [`ExtractService::extract`] when that distinction matters.
    pub async fn get_total_revenue_data<S: AsRef<str>>(
        &self,
        sources: &[S],
        starts: &[S],
        ends: &[S],
        dimensions: &[S],
    ) -> Result<Vec<Metric>> {
        let ranges = match DateRange::zip_lists(starts, ends) {
            Ok(ranges) => ranges,
            Err(e) => {
                warn!(error = %e, "Invalid date ranges, no data pulled");
                return Ok(Vec::new());
            }
        };

        let dims = parse_dimensions(dimensions);
        let outcome = self.extract(MetricKind::TotalRevenue, sources, ranges, dims).await;
        if outcome.is_partial() {
            warn!(errors = %outcome.errors, "Error(s) occurred with total revenue data pull");
        }

        Ok(outcome.metrics)
    }

    /// Runs one task per resolved source and waits for all of them.
    pub async fn extract<S: AsRef<str>>(
        &self,
        metric: MetricKind,
        sources: &[S],
        ranges: Vec<DateRange>,
        dimensions: Vec<Dimension>,
    ) -> ExtractOutcome {
        if dimensions.is_empty() {
            warn!("No recognised dimensions requested, nothing pulled");
            return ExtractOutcome::default();
        }

        let adapters: Vec<Arc<dyn SourceAdapter>> = sources
            .iter()
            .filter_map(|code| {
                let adapter = self.resolve(code.as_ref());
                if adapter.is_none() {
                    warn!(src = code.as_ref(), "Unrecognised source, skipping");
                }
                adapter
            })
            .collect();

        if adapters.is_empty() {
            return ExtractOutcome::default();
        }

        let req = FetchRequest::new(metric, dimensions, ranges);
        let (metric_tx, metric_rx) = mpsc::channel::<Metric>(METRIC_BUFFER);
        // One slot per task so reporting a failure never blocks.
        let (err_tx, err_rx) = mpsc::channel::<ExtractError>(adapters.len());

        let mut tasks = JoinSet::new();
        for adapter in adapters {
            let req = req.clone();
            let metric_tx = metric_tx.clone();
            let err_tx = err_tx.clone();

            tasks.spawn(async move {
                let source = adapter.source();
                match adapter.fetch_metrics(&req).await {
                    Ok(metrics) => {
                        debug!(src = source.as_code(), count = metrics.len(), "Source pull complete");
                        for m in metrics {
                            if metric_tx.send(m).await.is_err() {
                                break;
                            }
                        }
                    }
                    Err(e) => {
                        warn!(src = source.as_code(), decode = e.is_decode(), error = %e, "Source pull failed");
                        let _ = err_tx.try_send(e);
                    }
                }
            });
        }

        // Channels close once the last task drops its senders.
        drop(metric_tx);
        drop(err_tx);

        let metrics = to_vec(metric_rx).await;

        while let Some(joined) = tasks.join_next().await {
            if let Err(e) = joined {
                error!(error = %e, "Source task did not complete");
            }
        }

        let errors = join_channel_errors(err_rx, ", ").await;

        ExtractOutcome {
            metrics: remove_zero_entries(metrics),
            errors,
        }
    }
}

/// Maps request dimension names onto canonical ones, dropping unknown names.
pub fn parse_dimensions<S: AsRef<str>>(names: &[S]) -> Vec<Dimension> {
    names
        .iter()
        .filter_map(|name| {
            let dim = Dimension::from_code(name);
            if dim.is_none() {
                warn!(dimension = name.as_ref(), "Unrecognised dimension, skipping");
            }
            dim
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::time::Duration;

    enum MockOutcome {
        Rows(Vec<(&'static str, &'static str)>),
        Fail,
        Panic,
    }

    struct MockAdapter {
        source: Source,
        outcome: MockOutcome,
        delay: Duration,
        seen: Mutex<Vec<FetchRequest>>,
    }

    impl MockAdapter {
        fn new(source: Source, outcome: MockOutcome) -> Arc<Self> {
            Arc::new(Self {
                source,
                outcome,
                delay: Duration::from_millis(0),
                seen: Mutex::new(Vec::new()),
            })
        }

        fn slow(source: Source, outcome: MockOutcome, delay: Duration) -> Arc<Self> {
            Arc::new(Self {
                source,
                outcome,
                delay,
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl SourceAdapter for MockAdapter {
        fn source(&self) -> Source {
            self.source
        }

        async fn fetch_metrics(&self, req: &FetchRequest) -> Result<Vec<Metric>, ExtractError> {
            self.seen.lock().unwrap().push(req.clone());
            tokio::time::sleep(self.delay).await;

            match &self.outcome {
                MockOutcome::Rows(rows) => {
                    let range = req.ranges[0];
                    Ok(rows
                        .iter()
                        .map(|(dim, value)| Metric {
                            source: self.source.label().to_string(),
                            name: req.metric.as_code().to_string(),
                            value: value.to_string(),
                            dimension: dim.to_string(),
                            start: range.start_str(),
                            end: range.end_str(),
                        })
                        .collect())
                }
                MockOutcome::Fail => Err(ExtractError::Backend {
                    source_label: self.source.label(),
                    status: 503,
                    body: "unavailable".into(),
                }),
                MockOutcome::Panic => panic!("adapter blew up"),
            }
        }
    }

    fn service(adapters: Vec<Arc<MockAdapter>>) -> ExtractService {
        ExtractService::new(
            adapters
                .into_iter()
                .map(|a| a as Arc<dyn SourceAdapter>)
                .collect(),
        )
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn no_recognised_sources_returns_empty() {
        let svc = service(vec![MockAdapter::new(Source::GoogleAnalytics, MockOutcome::Fail)]);

        let data = svc
            .get_total_revenue_data(
                &strings(&["kl", "em"]),
                &strings(&["2024-01-01"]),
                &strings(&["2024-01-31"]),
                &strings(&["source"]),
            )
            .await
            .unwrap();
        assert!(data.is_empty());

        let empty = ExtractService::new(Vec::new());
        let data = empty
            .get_total_revenue_data(
                &strings(&["ga"]),
                &strings(&["2024-01-01"]),
                &strings(&["2024-01-31"]),
                &strings(&["source"]),
            )
            .await
            .unwrap();
        assert!(data.is_empty());
    }

    #[tokio::test]
    async fn one_failing_source_does_not_fail_the_call() {
        let ga = MockAdapter::new(Source::GoogleAnalytics, MockOutcome::Fail);
        let ga4 = MockAdapter::new(
            Source::GoogleAnalytics4,
            MockOutcome::Rows(vec![("google", "10"), ("bing", "5")]),
        );
        let svc = service(vec![ga, ga4]);

        let outcome = svc
            .extract(
                MetricKind::TotalRevenue,
                &["ga", "ga4"],
                DateRange::zip_lists(&["2024-01-01"], &["2024-01-31"]).unwrap(),
                vec![Dimension::Source],
            )
            .await;

        assert_eq!(outcome.metrics.len(), 2);
        assert!(outcome.metrics.iter().all(|m| m.source == "GA4"));
        assert!(outcome.is_partial());
        assert!(outcome.errors.contains("GA backend returned 503"));

        let data = svc
            .get_total_revenue_data(
                &strings(&["ga", "ga4"]),
                &strings(&["2024-01-01"]),
                &strings(&["2024-01-31"]),
                &strings(&["source"]),
            )
            .await
            .expect("partial failure is not an error");
        assert_eq!(data.len(), 2);
    }

    #[tokio::test]
    async fn every_source_failing_still_returns_ok() {
        let svc = service(vec![
            MockAdapter::new(Source::GoogleAnalytics, MockOutcome::Fail),
            MockAdapter::new(Source::GoogleAnalytics4, MockOutcome::Fail),
        ]);

        let outcome = svc
            .extract(
                MetricKind::TotalRevenue,
                &["ga", "ga4"],
                DateRange::zip_lists(&["2024-01-01"], &["2024-01-31"]).unwrap(),
                vec![Dimension::Source],
            )
            .await;
        assert!(outcome.metrics.is_empty());
        assert_eq!(outcome.errors.matches("backend returned 503").count(), 2);
        assert!(!outcome.errors.ends_with(", "));
    }

    #[tokio::test]
    async fn panicking_task_is_contained() {
        let svc = service(vec![
            MockAdapter::new(Source::GoogleAnalytics, MockOutcome::Panic),
            MockAdapter::new(Source::GoogleAnalytics4, MockOutcome::Rows(vec![("direct", "1")])),
        ]);

        let outcome = svc
            .extract(
                MetricKind::TotalRevenue,
                &["ga", "ga4"],
                DateRange::zip_lists(&["2024-01-01"], &["2024-01-31"]).unwrap(),
                vec![Dimension::Source],
            )
            .await;
        assert_eq!(outcome.metrics.len(), 1);
    }

    #[tokio::test]
    async fn sources_run_concurrently() {
        let delay = Duration::from_millis(300);
        let svc = service(vec![
            MockAdapter::slow(Source::GoogleAnalytics, MockOutcome::Rows(vec![("a", "1")]), delay),
            MockAdapter::slow(Source::GoogleAnalytics4, MockOutcome::Rows(vec![("b", "2")]), delay),
        ]);

        let started = std::time::Instant::now();
        let outcome = svc
            .extract(
                MetricKind::TotalRevenue,
                &["ga", "ga4"],
                DateRange::zip_lists(&["2024-01-01"], &["2024-01-31"]).unwrap(),
                vec![Dimension::Source],
            )
            .await;

        assert_eq!(outcome.metrics.len(), 2);
        assert!(started.elapsed() < delay * 2);
    }

    #[tokio::test]
    async fn get_data_tags_each_backend_and_shares_dates() {
        let ga = MockAdapter::new(Source::GoogleAnalytics, MockOutcome::Rows(vec![("google", "1.5")]));
        let ga4 = MockAdapter::new(Source::GoogleAnalytics4, MockOutcome::Rows(vec![("google", "2.5")]));
        let svc = service(vec![ga.clone(), ga4.clone()]);

        let data = svc
            .get_data(
                &strings(&["ga", "ga4"]),
                &strings(&["totalrevenue", "sessions"]),
                &strings(&["2024-01-01"]),
                &strings(&["2024-01-31"]),
                &strings(&["source", "bogus"]),
            )
            .await;

        let mut sources: Vec<&str> = data.iter().map(|m| m.source.as_str()).collect();
        sources.sort();
        assert_eq!(sources, vec!["GA", "GA4"]);
        assert!(data.iter().all(|m| m.name == "totalrevenue"));
        assert!(data.iter().all(|m| m.start == "2024-01-01" && m.end == "2024-01-31"));

        let seen = ga.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].dimensions, vec![Dimension::Source]);
        assert_eq!(seen[0].ranges.len(), 1);
    }

    #[tokio::test]
    async fn mismatched_date_lists_pull_nothing() {
        let ga = MockAdapter::new(Source::GoogleAnalytics, MockOutcome::Rows(vec![("google", "1")]));
        let svc = service(vec![ga.clone()]);

        let data = svc
            .get_total_revenue_data(
                &strings(&["ga"]),
                &strings(&["2024-01-01", "2024-02-01"]),
                &strings(&["2024-01-31"]),
                &strings(&["source"]),
            )
            .await
            .unwrap();
        assert!(data.is_empty());
        assert!(ga.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn only_unrecognised_dimensions_pull_nothing() {
        let ga4 = MockAdapter::new(Source::GoogleAnalytics4, MockOutcome::Rows(vec![("date_range_0", "10")]));
        let svc = service(vec![ga4.clone()]);

        let data = svc
            .get_data(
                &strings(&["ga4"]),
                &strings(&["totalrevenue"]),
                &strings(&["2024-01-01", "2024-02-01"]),
                &strings(&["2024-01-31", "2024-02-29"]),
                &strings(&["country"]),
            )
            .await;

        assert!(data.is_empty());
        assert!(ga4.seen.lock().unwrap().is_empty());
    }

    #[test]
    fn unknown_dimensions_are_dropped() {
        assert_eq!(
            parse_dimensions(&["medium", "country", "channelgroup"]),
            vec![Dimension::Medium, Dimension::ChannelGroup]
        );
    }
}
