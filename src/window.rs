/// Reporting windows ("dasarian")
///
/// A report covers days `1..=end_day` of one month: the first ten days, the
/// first twenty, or the whole month.
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ReportError;
use crate::utils::days_in_month;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum WindowSelector {
    /// Days 1-10 (dasarian I)
    TenDayFirst,
    /// Days 1-20 (through dasarian II)
    TenDaySecond,
    /// The whole month (through dasarian III)
    FullMonth,
}

impl fmt::Display for WindowSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            WindowSelector::TenDayFirst => "ten-day-first",
            WindowSelector::TenDaySecond => "ten-day-second",
            WindowSelector::FullMonth => "full-month",
        };
        f.write_str(label)
    }
}

/// A validated year/month/selector with its last day resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReportingWindow {
    pub year: i32,
    pub month: u32,
    pub selector: WindowSelector,
    pub end_day: u32,
}

impl ReportingWindow {
    pub fn new(year: i32, month: u32, selector: WindowSelector) -> Result<Self, ReportError> {
        let month_days = days_in_month(year, month).ok_or(ReportError::InvalidMonth(month))?;
        let end_day = match selector {
            WindowSelector::TenDayFirst => 10,
            WindowSelector::TenDaySecond => 20,
            WindowSelector::FullMonth => month_days,
        };

        Ok(Self {
            year,
            month,
            selector,
            end_day,
        })
    }

    pub fn in_month(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    /// Day number of `date` when it falls inside the window
    pub fn day_of(&self, date: NaiveDate) -> Option<u32> {
        (self.in_month(date) && date.day() <= self.end_day).then(|| date.day())
    }
}

impl fmt::Display for ReportingWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{:02} {} (days 1-{})",
            self.year, self.month, self.selector, self.end_day
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_end_day_per_selector() {
        let first = ReportingWindow::new(2025, 2, WindowSelector::TenDayFirst).unwrap();
        let second = ReportingWindow::new(2025, 2, WindowSelector::TenDaySecond).unwrap();
        let full = ReportingWindow::new(2025, 2, WindowSelector::FullMonth).unwrap();
        assert_eq!(first.end_day, 10);
        assert_eq!(second.end_day, 20);
        assert_eq!(full.end_day, 28);
    }

    #[test]
    fn test_full_month_leap_and_long_months() {
        assert_eq!(
            ReportingWindow::new(2024, 2, WindowSelector::FullMonth)
                .unwrap()
                .end_day,
            29
        );
        assert_eq!(
            ReportingWindow::new(2025, 7, WindowSelector::FullMonth)
                .unwrap()
                .end_day,
            31
        );
    }

    #[test]
    fn test_invalid_month() {
        assert!(matches!(
            ReportingWindow::new(2025, 0, WindowSelector::FullMonth),
            Err(ReportError::InvalidMonth(0))
        ));
        assert!(matches!(
            ReportingWindow::new(2025, 13, WindowSelector::TenDayFirst),
            Err(ReportError::InvalidMonth(13))
        ));
    }

    #[test]
    fn test_day_of_respects_month_and_end_day() {
        let window = ReportingWindow::new(2025, 3, WindowSelector::TenDayFirst).unwrap();
        let date = |y, m, d| NaiveDate::from_ymd_opt(y, m, d).unwrap();

        assert_eq!(window.day_of(date(2025, 3, 1)), Some(1));
        assert_eq!(window.day_of(date(2025, 3, 10)), Some(10));
        assert_eq!(window.day_of(date(2025, 3, 11)), None);
        assert_eq!(window.day_of(date(2025, 4, 2)), None);
        assert_eq!(window.day_of(date(2024, 3, 2)), None);
    }

    #[test]
    fn test_selector_serde_names() {
        let selector: WindowSelector = serde_json::from_str("\"ten-day-second\"").unwrap();
        assert_eq!(selector, WindowSelector::TenDaySecond);
        assert_eq!(
            serde_json::to_string(&WindowSelector::FullMonth).unwrap(),
            "\"full-month\""
        );
    }

    #[test]
    fn test_display() {
        let window = ReportingWindow::new(2025, 3, WindowSelector::FullMonth).unwrap();
        assert_eq!(window.to_string(), "2025-03 full-month (days 1-31)");
    }
}
