//! Teaching-week arithmetic

use chrono::NaiveDate;

/// Date format of `semester_start_date`
pub const START_DATE_FORMAT: &str = "%Y-%m-%d";

/// Week number of `today` in a semester starting on `start`
///
/// Week 1 is the seven days beginning at `start`; dates before the start
/// also count as week 1. Returns `None` when `start` is not a valid date.
pub fn week_number(start: &str, today: NaiveDate) -> Option<u32> {
    let start = NaiveDate::parse_from_str(start.trim(), START_DATE_FORMAT).ok()?;
    let days = today.signed_duration_since(start).num_days();
    let week = days.div_euclid(7) + 1;
    Some(u32::try_from(week.max(1)).unwrap_or(u32::MAX))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_week_boundaries() {
        assert_eq!(week_number("2024-02-26", date(2024, 2, 26)), Some(1));
        assert_eq!(week_number("2024-02-26", date(2024, 3, 3)), Some(1));
        assert_eq!(week_number("2024-02-26", date(2024, 3, 4)), Some(2));
        assert_eq!(week_number("2024-02-26", date(2024, 3, 12)), Some(3));
    }

    #[test]
    fn test_before_start_is_week_one() {
        assert_eq!(week_number("2024-02-26", date(2024, 2, 1)), Some(1));
    }

    #[test]
    fn test_invalid_start() {
        assert_eq!(week_number("26/02/2024", date(2024, 3, 1)), None);
        assert_eq!(week_number("", date(2024, 3, 1)), None);
    }
}
