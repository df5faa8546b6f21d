//! Reshapes canonical metrics into a month-by-category sheet grid.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{Datelike, NaiveDate};
use tracing::warn;

use crate::domain::metric::model::{parse_date, Metric};

/// Column-major grid: `grid[0]` holds the category names under an empty
/// header cell, every following column is one month.
pub type Grid = Vec<Vec<String>>;

fn month_key(m: &Metric) -> Option<NaiveDate> {
    match parse_date(&m.start) {
        Ok(date) => date.with_day(1),
        Err(e) => {
            warn!(metric = ?m, error = %e, "Metric omitted from sheet");
            None
        }
    }
}

pub fn build_grid(metrics: &[Metric]) -> Grid {
    let mut cells: BTreeMap<(NaiveDate, &str), &str> = BTreeMap::new();
    let mut months = BTreeSet::new();
    let mut categories = BTreeSet::new();

    for m in metrics {
        let Some(month) = month_key(m) else { continue };
        months.insert(month);
        categories.insert(m.dimension.as_str());
        cells.insert((month, m.dimension.as_str()), m.value.as_str());
    }

    let mut grid = Vec::with_capacity(months.len() + 1);

    let mut first = vec![String::new()];
    first.extend(categories.iter().map(|c| c.to_string()));
    grid.push(first);

    for month in &months {
        let mut column = vec![month.format("%B %Y").to_string()];
        column.extend(categories.iter().map(|cat| {
            cells
                .get(&(*month, *cat))
                .map(|v| v.to_string())
                .unwrap_or_default()
        }));
        grid.push(column);
    }

    grid
}

/// Spreadsheet column letters for a 1-based index (1 → A, 27 → AA).
pub fn column_letter(mut index: usize) -> String {
    let mut letters = Vec::new();
    while index > 0 {
        let rem = (index - 1) % 26;
        letters.push(char::from(b'A' + rem as u8));
        index = (index - 1) / 26;
    }
    letters.iter().rev().collect()
}

/// A1 notation covering the whole grid on `tab`.
pub fn grid_range(tab: &str, grid: &Grid) -> String {
    let columns = grid.len().max(1);
    let rows = grid.iter().map(Vec::len).max().unwrap_or(1).max(1);
    format!("{}!A1:{}{}", tab, column_letter(columns), rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metric(dim: &str, value: &str, start: &str) -> Metric {
        Metric {
            source: "GA4".into(),
            name: "totalrevenue".into(),
            value: value.into(),
            dimension: dim.into(),
            start: start.into(),
            end: start.into(),
        }
    }

    #[test]
    fn grid_is_sorted_and_column_major() {
        let metrics = vec![
            metric("Paid Search", "5", "2024-02-01"),
            metric("Direct", "1", "2024-01-01"),
            metric("Direct", "2", "2024-02-01"),
            metric("Email", "9", "2023-12-01"),
        ];

        let grid = build_grid(&metrics);
        assert_eq!(grid.len(), 4);
        assert_eq!(grid[0], vec!["", "Direct", "Email", "Paid Search"]);
        assert_eq!(grid[1], vec!["December 2023", "", "9", ""]);
        assert_eq!(grid[2], vec!["January 2024", "1", "", ""]);
        assert_eq!(grid[3], vec!["February 2024", "2", "", "5"]);
    }

    #[test]
    fn unparsable_start_is_skipped() {
        let grid = build_grid(&[metric("Direct", "1", ""), metric("Email", "2", "2024-01-05")]);
        assert_eq!(grid[0], vec!["", "Email"]);
        assert_eq!(grid[1], vec!["January 2024", "2"]);
    }

    #[test]
    fn column_letters_roll_over() {
        assert_eq!(column_letter(1), "A");
        assert_eq!(column_letter(26), "Z");
        assert_eq!(column_letter(27), "AA");
        assert_eq!(column_letter(53), "BA");
    }

    #[test]
    fn range_spans_grid() {
        let grid = build_grid(&[metric("Direct", "1", "2024-01-01")]);
        assert_eq!(grid_range("GA - Source", &grid), "GA - Source!A1:B2");
        assert_eq!(grid_range("GA - Source", &build_grid(&[])), "GA - Source!A1:A1");
    }
}
