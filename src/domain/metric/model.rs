//! Canonical metric shape shared by every source adapter and consumer.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Wire date format for `start` / `end`.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// One measured value for one dimension value over one date sub-range.
///
/// Field names on the wire are stable: downstream consumers parse `src`,
/// `name`, `value`, `dimension`, `start` and `end` verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metric {
    #[serde(rename = "src")]
    pub source: String,
    pub name: String,
    /// Kept as text so the backend's precision survives untouched.
    pub value: String,
    pub dimension: String,
    pub start: String,
    pub end: String,
}

/// Backends the extraction service knows how to query.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Source {
    GoogleAnalytics,
    GoogleAnalytics4,
}

impl Source {
    pub const ALL: [Source; 2] = [Source::GoogleAnalytics, Source::GoogleAnalytics4];

    /// Parses the short request code (`ga`, `ga4`).
    pub fn from_code<S: AsRef<str>>(code: S) -> Option<Self> {
        match code.as_ref().trim().to_lowercase().as_str() {
            "ga" => Some(Self::GoogleAnalytics),
            "ga4" => Some(Self::GoogleAnalytics4),
            _ => None,
        }
    }

    pub fn as_code(&self) -> &'static str {
        match self {
            Self::GoogleAnalytics => "ga",
            Self::GoogleAnalytics4 => "ga4",
        }
    }

    /// Label stamped into `Metric::source`.
    pub fn label(&self) -> &'static str {
        match self {
            Self::GoogleAnalytics => "GA",
            Self::GoogleAnalytics4 => "GA4",
        }
    }
}

/// Metric names a caller may ask for.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum MetricKind {
    TotalRevenue,
}

impl MetricKind {
    pub fn from_code<S: AsRef<str>>(code: S) -> Option<Self> {
        match code.as_ref().trim().to_lowercase().as_str() {
            "totalrevenue" => Some(Self::TotalRevenue),
            _ => None,
        }
    }

    pub fn as_code(&self) -> &'static str {
        match self {
            Self::TotalRevenue => "totalrevenue",
        }
    }
}

/// Canonical breakdown dimensions. Each adapter maps these onto its own
/// backend identifiers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Dimension {
    ChannelGroup,
    Medium,
    Source,
}

impl Dimension {
    pub const ALL: [Dimension; 3] = [Dimension::ChannelGroup, Dimension::Medium, Dimension::Source];

    pub fn from_code<S: AsRef<str>>(code: S) -> Option<Self> {
        match code.as_ref().trim().to_lowercase().as_str() {
            "channelgroup" => Some(Self::ChannelGroup),
            "medium" => Some(Self::Medium),
            "source" => Some(Self::Source),
            _ => None,
        }
    }

    pub fn as_code(&self) -> &'static str {
        match self {
            Self::ChannelGroup => "channelgroup",
            Self::Medium => "medium",
            Self::Source => "source",
        }
    }
}

/// One `(start, end)` pair of a batched request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn start_str(&self) -> String {
        self.start.format(DATE_FORMAT).to_string()
    }

    pub fn end_str(&self) -> String {
        self.end.format(DATE_FORMAT).to_string()
    }

    /// Pairs two parallel date lists index by index.
    ///
    /// Fails when the lists differ in length, when any entry is not
    /// `YYYY-MM-DD`, or when a start falls after its end.
    pub fn zip_lists<S: AsRef<str>>(starts: &[S], ends: &[S]) -> anyhow::Result<Vec<DateRange>> {
        if starts.len() != ends.len() {
            anyhow::bail!(
                "length of start dates ({}) does not match length of end dates ({})",
                starts.len(),
                ends.len()
            );
        }

        starts
            .iter()
            .zip(ends)
            .map(|(s, e)| {
                let start = parse_date(s.as_ref())?;
                let end = parse_date(e.as_ref())?;
                if start > end {
                    anyhow::bail!("start date {} is after end date {}", start, end);
                }
                Ok(DateRange::new(start, end))
            })
            .collect()
    }
}

pub fn parse_date(raw: &str) -> anyhow::Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
        .map_err(|e| anyhow::anyhow!("error when parsing date '{}': {}", raw, e))
}
