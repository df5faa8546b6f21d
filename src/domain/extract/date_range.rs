//! Recovers which requested sub-range a report row belongs to.
//!
//! A batched GA4 report with several date ranges tags each row with a synthetic
//! token such as `date_range_1`. The trailing `_<n>` is a zero-based index
//! into the caller's start/end lists.

use crate::domain::metric::model::DateRange;

/// Parses the zero-based index out of a range token (`date_range_3` → 3).
pub fn parse_range_index(token: &str) -> Result<usize, String> {
    let suffix = token
        .rsplit_once('_')
        .map(|(_, idx)| idx)
        .unwrap_or(token);

    suffix
        .parse::<usize>()
        .map_err(|e| format!("invalid date range index '{}': {}", token, e))
}

/// Picks the sub-range for one row.
///
/// With a single requested range the token is ignored and that range is used
/// directly. Otherwise `token` must be present and must index into `ranges`.
pub fn resolve_row_range<'a>(
    ranges: &'a [DateRange],
    token: Option<&str>,
) -> Result<&'a DateRange, String> {
    match ranges {
        [] => Err("no date ranges requested".to_string()),
        [only] => Ok(only),
        _ => {
            let token = token.ok_or_else(|| "error with dimension values length".to_string())?;
            let idx = parse_range_index(token)?;
            ranges.get(idx).ok_or_else(|| {
                format!(
                    "date range index {} out of bounds for {} requested ranges",
                    idx,
                    ranges.len()
                )
            })
        }
    }
}
