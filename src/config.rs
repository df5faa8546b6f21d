use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use tracing::debug;

use crate::domain::metric::model::parse_date;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_PULL_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_GA_BASE_URL: &str = "https://analyticsreporting.googleapis.com";
pub const DEFAULT_GA4_BASE_URL: &str = "https://analyticsdata.googleapis.com";
pub const DEFAULT_SHEETS_BASE_URL: &str = "https://sheets.googleapis.com";
pub const DEFAULT_SHEET_FIRST_MONTH: &str = "2023-01-01";

/// Process-wide settings, read once from the environment (and `.env`).
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub log_dir: PathBuf,
    pub pull_timeout: Duration,
    pub access_token: Option<String>,

    pub ga_base_url: String,
    pub ga_view_id: Option<String>,

    pub ga4_base_url: String,
    pub ga4_property_id: Option<String>,

    pub sheets_base_url: String,
    pub spreadsheet_id: Option<String>,
    pub sheet_first_month: NaiveDate,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            log_dir: PathBuf::from("logs"),
            pull_timeout: Duration::from_secs(DEFAULT_PULL_TIMEOUT_SECS),
            access_token: None,
            ga_base_url: DEFAULT_GA_BASE_URL.to_string(),
            ga_view_id: None,
            ga4_base_url: DEFAULT_GA4_BASE_URL.to_string(),
            ga4_property_id: None,
            sheets_base_url: DEFAULT_SHEETS_BASE_URL.to_string(),
            spreadsheet_id: None,
            sheet_first_month: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap_or(NaiveDate::MIN),
        }
    }
}

fn var(key: &str) -> Option<String> {
    env::var(key).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let port = match var("PORT") {
            Some(p) => p.parse::<u16>().with_context(|| format!("invalid PORT '{}'", p))?,
            None => defaults.port,
        };

        let pull_timeout = match var("ETL_PULL_TIMEOUT_SECS") {
            Some(s) => Duration::from_secs(
                s.parse::<u64>()
                    .with_context(|| format!("invalid ETL_PULL_TIMEOUT_SECS '{}'", s))?,
            ),
            None => defaults.pull_timeout,
        };

        let sheet_first_month = parse_date(
            &var("ETL_SHEET_FIRST_MONTH").unwrap_or_else(|| DEFAULT_SHEET_FIRST_MONTH.to_string()),
        )
        .context("invalid ETL_SHEET_FIRST_MONTH")?;

        let cfg = Self {
            port,
            log_dir: var("ETL_LOG_DIR").map(PathBuf::from).unwrap_or(defaults.log_dir),
            pull_timeout,
            access_token: var("ETL_GOOGLE_ACCESS_TOKEN"),
            ga_base_url: var("ETL_GA_BASE_URL").unwrap_or(defaults.ga_base_url),
            ga_view_id: var("ETL_GA_VIEW_ID"),
            ga4_base_url: var("ETL_GA4_BASE_URL").unwrap_or(defaults.ga4_base_url),
            ga4_property_id: var("ETL_GA4_PROPERTY_ID"),
            sheets_base_url: var("ETL_SHEETS_BASE_URL").unwrap_or(defaults.sheets_base_url),
            spreadsheet_id: var("ETL_SPREADSHEET_ID"),
            sheet_first_month,
        };

        debug!(
            port = cfg.port,
            timeout_secs = cfg.pull_timeout.as_secs(),
            ga = cfg.ga_view_id.is_some(),
            ga4 = cfg.ga4_property_id.is_some(),
            "Configuration loaded"
        );
        Ok(cfg)
    }
}
