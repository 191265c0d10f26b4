/// Shared utility functions for the rain bulletin service
use chrono::{Datelike, Duration, NaiveDate};

/// Number of days in a calendar month, or `None` for an invalid month
///
/// # Examples
///
/// ```
/// use rain_bulletin_service::utils::days_in_month;
///
/// assert_eq!(days_in_month(2025, 2), Some(28));
/// assert_eq!(days_in_month(2024, 2), Some(29));
/// assert_eq!(days_in_month(2025, 12), Some(31));
/// assert_eq!(days_in_month(2025, 13), None);
/// ```
pub fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next_first = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    next_first.pred_opt().map(|last| {
        debug_assert_eq!(last.month(), first.month());
        last.day()
    })
}

/// Round to one decimal place (percentages in the QC tables)
///
/// ```
/// use rain_bulletin_service::utils::round_to_tenth;
///
/// assert_eq!(round_to_tenth(2.0 / 3.0 * 100.0), 66.7);
/// assert_eq!(round_to_tenth(100.0), 100.0);
/// ```
pub fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Render a rainfall amount the way the bulletin tables print floats
///
/// Integral amounts keep one decimal ("5.0"); anything else uses the
/// shortest form that round-trips ("12.4").
///
/// ```
/// use rain_bulletin_service::utils::format_rainfall;
///
/// assert_eq!(format_rainfall(12.4), "12.4");
/// assert_eq!(format_rainfall(5.0), "5.0");
/// assert_eq!(format_rainfall(0.1), "0.1");
/// ```
pub fn format_rainfall(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}

/// Excel serial of 9999-12-31
const MAX_EXCEL_SERIAL: f64 = 2_958_465.0;

/// Convert an Excel date serial to a calendar date
///
/// Excel counts days from 1899-12-30 (the epoch absorbs Excel's 1900 leap-year bug).
/// Fractional parts (time of day) are dropped. Serials past 9999-12-31, the
/// last date Excel can hold, give `None`.
pub fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || !(1.0..=MAX_EXCEL_SERIAL).contains(&serial) {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    epoch.checked_add_signed(Duration::try_days(serial.trunc() as i64)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_days_in_month_all_months_2025() {
        let expected = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];
        for (month, days) in (1..=12).zip(expected) {
            assert_eq!(days_in_month(2025, month), Some(days), "month {month}");
        }
    }

    #[test]
    fn test_days_in_month_century_leap_rules() {
        assert_eq!(days_in_month(1900, 2), Some(28));
        assert_eq!(days_in_month(2000, 2), Some(29));
    }

    #[test]
    fn test_days_in_month_month_zero() {
        assert_eq!(days_in_month(2025, 0), None);
    }

    #[test]
    fn test_round_to_tenth_half_up() {
        assert_eq!(round_to_tenth(12.25), 12.3);
        assert_eq!(round_to_tenth(0.0), 0.0);
    }

    #[test]
    fn test_format_rainfall_large_integral() {
        assert_eq!(format_rainfall(150.0), "150.0");
        assert_eq!(format_rainfall(0.25), "0.25");
    }

    #[test]
    fn test_excel_serial_to_date() {
        // 45658 = 2025-01-01
        assert_eq!(
            excel_serial_to_date(45658.0),
            NaiveDate::from_ymd_opt(2025, 1, 1)
        );
        // Time of day is ignored
        assert_eq!(
            excel_serial_to_date(45658.75),
            NaiveDate::from_ymd_opt(2025, 1, 1)
        );
        assert_eq!(excel_serial_to_date(f64::NAN), None);
        assert_eq!(excel_serial_to_date(0.0), None);
    }

    #[test]
    fn test_excel_serial_out_of_range() {
        assert_eq!(
            excel_serial_to_date(2_958_465.0),
            NaiveDate::from_ymd_opt(9999, 12, 31)
        );
        assert_eq!(excel_serial_to_date(2_958_466.0), None);
        assert_eq!(excel_serial_to_date(1e20), None);
        assert_eq!(excel_serial_to_date(f64::INFINITY), None);
        assert_eq!(excel_serial_to_date(-5.0), None);
    }
}
