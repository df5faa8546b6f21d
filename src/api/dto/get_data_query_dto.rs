//! Query parameters of `/getdata`

use serde::Deserialize;
use validator::{Validate, ValidationError};

use crate::domain::metric::model::{parse_date, DateRange};

/// Every list parameter is comma separated. `start` and `end` are parallel
/// lists: `start[i]..=end[i]` is one sub-range.
#[derive(Debug, Clone, Deserialize, Validate)]
#[validate(schema(function = "validate_ranges"))]
pub struct GetDataQueryDto {
    #[validate(length(min = 1, message = "srcs param missing"))]
    pub srcs: String,

    #[validate(length(min = 1, message = "metrictypes param missing"))]
    pub metrictypes: String,

    #[validate(length(min = 1, message = "dimensions param missing"))]
    pub dimensions: String,

    #[validate(custom(function = "validate_date_list"))]
    pub start: String,

    #[validate(custom(function = "validate_date_list"))]
    pub end: String,
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn validate_date_list(raw: &str) -> Result<(), ValidationError> {
    let dates = split_list(raw);
    if dates.is_empty() {
        return Err(ValidationError::new("date_missing").with_message("date param missing".into()));
    }

    for date in &dates {
        if let Err(e) = parse_date(date) {
            return Err(ValidationError::new("date_format").with_message(e.to_string().into()));
        }
    }
    Ok(())
}

fn validate_ranges(dto: &GetDataQueryDto) -> Result<(), ValidationError> {
    DateRange::zip_lists(&dto.starts(), &dto.ends())
        .map(|_| ())
        .map_err(|e| ValidationError::new("date_ranges").with_message(e.to_string().into()))
}

impl GetDataQueryDto {
    pub fn sources(&self) -> Vec<String> {
        split_list(&self.srcs)
    }

    pub fn metric_types(&self) -> Vec<String> {
        split_list(&self.metrictypes)
    }

    pub fn dimension_list(&self) -> Vec<String> {
        split_list(&self.dimensions)
    }

    pub fn starts(&self) -> Vec<String> {
        split_list(&self.start)
    }

    pub fn ends(&self) -> Vec<String> {
        split_list(&self.end)
    }
}
