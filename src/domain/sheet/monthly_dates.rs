use chrono::{Datelike, Months, NaiveDate};

use crate::domain::metric::model::DateRange;

/// Calendar-month windows from the month containing `first` up to `today`.
///
/// Every window runs from the 1st to the last day of its month; the final
/// window is clipped to `today`.
pub fn monthly_windows(first: NaiveDate, today: NaiveDate) -> Vec<DateRange> {
    let mut windows = Vec::new();
    let Some(mut month_start) = first.with_day(1) else {
        return windows;
    };

    while month_start <= today {
        let Some(next) = month_start.checked_add_months(Months::new(1)) else {
            break;
        };
        let month_end = next.pred_opt().unwrap_or(next).min(today);
        windows.push(DateRange::new(month_start, month_end));
        month_start = next;
    }

    windows
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn windows_cover_whole_months_and_clip_today() {
        let windows = monthly_windows(d(2023, 11, 15), d(2024, 2, 10));
        let got: Vec<(String, String)> = windows.iter().map(|w| (w.start_str(), w.end_str())).collect();
        assert_eq!(
            got,
            vec![
                ("2023-11-01".into(), "2023-11-30".into()),
                ("2023-12-01".into(), "2023-12-31".into()),
                ("2024-01-01".into(), "2024-01-31".into()),
                ("2024-02-01".into(), "2024-02-10".into()),
            ]
        );
    }

    #[test]
    fn leap_february_ends_on_29th() {
        let windows = monthly_windows(d(2024, 2, 1), d(2024, 3, 31));
        assert_eq!(windows[0].end_str(), "2024-02-29");
        assert_eq!(windows[1].end_str(), "2024-03-31");
    }

    #[test]
    fn first_after_today_yields_nothing() {
        assert!(monthly_windows(d(2025, 1, 1), d(2024, 12, 31)).is_empty());
    }
}
