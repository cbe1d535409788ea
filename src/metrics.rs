//! Gregorian calendar metrics.
//!
//! A [`CalendarMetrics`] value is constructed once per pipeline and answers
//! every calendar question the stages ask: month lengths, weekday and
//! year-day of a date, and week-of-year numbering. Week numbering follows
//! the ISO 8601 shape, "the first week is the one with at least 4 days in
//! the new year", generalized to a configurable week start day.
//!
//! Months are 0-based (0 = January) and weekdays are numbered
//! 0 = Sunday .. 6 = Saturday, matching the packed instance codec.

use crate::core::Weekday;

/// Cumulative days before each month in a non-leap year.
const DAYS_BEFORE_MONTH: [i32; 12] = [0, 31, 59, 90, 120, 151, 181, 212, 243, 273, 304, 334];

/// Days per month in a non-leap year.
const DAYS_PER_MONTH: [i32; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

/// Stateless Gregorian calendar calculations for one week-start
/// configuration.
///
/// All methods are pure; the value is `Copy` and freely shared between
/// stages. Supported years cover at least 1..=9999.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarMetrics {
    week_start: i32,
}

impl CalendarMetrics {
    /// Creates metrics that number weeks starting on the given weekday,
    /// with a minimum of 4 days in the first week of the year.
    #[must_use]
    pub const fn new(week_start: Weekday) -> Self {
        Self {
            week_start: week_start.number(),
        }
    }

    /// The configured week start, 0 = Sunday .. 6 = Saturday.
    #[must_use]
    pub const fn week_start(self) -> i32 {
        self.week_start
    }

    /// Whether `year` is a Gregorian leap year.
    #[must_use]
    pub const fn is_leap_year(self, year: i32) -> bool {
        year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
    }

    /// The number of days in `year` (365 or 366).
    #[must_use]
    pub const fn days_in_year(self, year: i32) -> i32 {
        if self.is_leap_year(year) { 366 } else { 365 }
    }

    /// The number of days in the 0-based `month` of `year`.
    #[must_use]
    pub fn days_in_month(self, year: i32, month: i32) -> i32 {
        debug_assert!((0..12).contains(&month));
        if month == 1 && self.is_leap_year(year) {
            29
        } else {
            DAYS_PER_MONTH[month as usize]
        }
    }

    /// The weekday of January 1st of `year`.
    #[must_use]
    pub fn weekday_of_first_year_day(self, year: i32) -> i32 {
        // Gauss' formula for January 1st, 0 = Sunday.
        let y = year - 1;
        (1 + 5 * y.rem_euclid(4) + 4 * y.rem_euclid(100) + 6 * y.rem_euclid(400)).rem_euclid(7)
    }

    /// The weekday of the given date, 0 = Sunday .. 6 = Saturday.
    #[must_use]
    pub fn day_of_week(self, year: i32, month: i32, day: i32) -> i32 {
        (self.weekday_of_first_year_day(year) + self.day_of_year(year, month, day) - 1)
            .rem_euclid(7)
    }

    /// The 1-based day of the year of the given date.
    #[must_use]
    pub fn day_of_year(self, year: i32, month: i32, day: i32) -> i32 {
        debug_assert!((0..12).contains(&month));
        debug_assert!(day >= 1 && day <= self.days_in_month(year, month));
        let leap_shift = i32::from(month > 1 && self.is_leap_year(year));
        DAYS_BEFORE_MONTH[month as usize] + leap_shift + day
    }

    /// Splits a 1-based year day into (0-based month, 1-based day of month).
    ///
    /// `year_day` must be within `1..=days_in_year(year)`; use
    /// [`CalendarMetrics::resolve_year_day`] when it may point into an
    /// adjacent year.
    #[must_use]
    pub fn month_and_day_of_year_day(self, year: i32, year_day: i32) -> (i32, i32) {
        debug_assert!(year_day >= 1 && year_day <= self.days_in_year(year));
        let mut remaining = year_day;
        for month in 0..12 {
            let month_days = self.days_in_month(year, month);
            if remaining <= month_days {
                return (month, remaining);
            }
            remaining -= month_days;
        }
        (11, 31)
    }

    /// Resolves a year day that may fall outside `year` into the actual
    /// (year, 0-based month, day of month) date.
    ///
    /// Year days below 1 count backwards into the previous year, values
    /// beyond the year length roll into the following one. Weeks overlap
    /// calendar years, so the week-based expansions routinely produce such
    /// out-of-range year days.
    #[must_use]
    pub fn resolve_year_day(self, year: i32, year_day: i32) -> (i32, i32, i32) {
        let mut year = year;
        let mut year_day = year_day;
        while year_day < 1 {
            year -= 1;
            year_day += self.days_in_year(year);
        }
        while year_day > self.days_in_year(year) {
            year_day -= self.days_in_year(year);
            year += 1;
        }
        let (month, day) = self.month_and_day_of_year_day(year, year_day);
        (year, month, day)
    }

    /// The week number of the given date.
    ///
    /// Week 1 is the first week with at least 4 days in `year`, weeks
    /// starting on the configured week start. Dates in the final days of
    /// December may belong to week 1 of the following year; dates in the
    /// first days of January may belong to the last week of the previous
    /// year. The returned number is the week's own number, which is why
    /// this can return 52 or 53 for a January 1st.
    #[must_use]
    pub fn week_of_year(self, year: i32, month: i32, day: i32) -> i32 {
        let year_day = self.day_of_year(year, month, day);
        let jan1 = self.weekday_of_first_year_day(year);
        // Position of January 1st within its week, 0 = on the week start.
        let offset = (jan1 + 7 - self.week_start).rem_euclid(7);
        let week_index = (year_day - 1 + offset) / 7;
        let mut week = if offset <= 3 {
            week_index + 1
        } else {
            week_index
        };

        if week == 0 {
            // The first days of January belong to the previous year's
            // final week.
            week = self.weeks_in_year(year - 1);
        } else if week >= 52 {
            let year_days = self.days_in_year(year);
            let dec31 = (jan1 + year_days - 1).rem_euclid(7);
            let dec31_offset = (dec31 + 7 - self.week_start).rem_euclid(7);
            // Fewer than 4 days left in this year's final partial week
            // means those days already count into week 1 of the next year.
            if dec31_offset <= 2 && year_days - year_day <= dec31_offset {
                week = 1;
            }
        }
        week
    }

    /// The number of numbered weeks in `year` (52 or 53).
    #[must_use]
    pub fn weeks_in_year(self, year: i32) -> i32 {
        // December 28th always lies in the final numbered week.
        self.week_of_year(year, 11, 28)
    }

    /// The 1-based year day on which week `week` of `year` begins.
    ///
    /// May be zero or negative (week 1 often starts in the previous
    /// December); resolve with [`CalendarMetrics::resolve_year_day`].
    #[must_use]
    pub fn year_day_of_week_start(self, year: i32, week: i32) -> i32 {
        let jan1 = self.weekday_of_first_year_day(year);
        let offset = (jan1 + 7 - self.week_start).rem_euclid(7);
        let week1_start = if offset <= 3 {
            1 - offset
        } else {
            1 + 7 - offset
        };
        week1_start + (week - 1) * 7
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, NaiveDate};

    fn iso() -> CalendarMetrics {
        CalendarMetrics::new(Weekday::Monday)
    }

    #[test]
    fn leap_years() {
        let m = iso();
        assert!(m.is_leap_year(2000));
        assert!(m.is_leap_year(2024));
        assert!(!m.is_leap_year(1900));
        assert!(!m.is_leap_year(2023));
        assert_eq!(m.days_in_year(2024), 366);
        assert_eq!(m.days_in_year(2100), 365);
    }

    #[test]
    fn month_lengths() {
        let m = iso();
        assert_eq!(m.days_in_month(2024, 1), 29);
        assert_eq!(m.days_in_month(2023, 1), 28);
        assert_eq!(m.days_in_month(2023, 0), 31);
        assert_eq!(m.days_in_month(2023, 3), 30);
        assert_eq!(m.days_in_month(2023, 11), 31);
    }

    #[test]
    fn day_of_week_agrees_with_chrono() {
        let m = iso();
        let mut date = NaiveDate::from_ymd_opt(1997, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2030, 12, 31).unwrap();
        while date <= end {
            let expected = date.weekday().num_days_from_sunday() as i32;
            let got = m.day_of_week(date.year(), date.month0() as i32, date.day() as i32);
            assert_eq!(got, expected, "weekday mismatch on {date}");
            date = date.succ_opt().unwrap();
        }
    }

    #[test]
    fn day_of_year_and_inverse() {
        let m = iso();
        assert_eq!(m.day_of_year(2023, 0, 1), 1);
        assert_eq!(m.day_of_year(2023, 11, 31), 365);
        assert_eq!(m.day_of_year(2024, 11, 31), 366);
        assert_eq!(m.day_of_year(2024, 2, 1), 61);

        for year in [2023, 2024] {
            for year_day in 1..=m.days_in_year(year) {
                let (month, day) = m.month_and_day_of_year_day(year, year_day);
                assert_eq!(m.day_of_year(year, month, day), year_day);
            }
        }
    }

    #[test]
    fn resolve_year_day_crosses_years() {
        let m = iso();
        assert_eq!(m.resolve_year_day(2025, -1), (2024, 11, 30));
        assert_eq!(m.resolve_year_day(2025, 0), (2024, 11, 31));
        assert_eq!(m.resolve_year_day(2024, 367), (2025, 0, 1));
        assert_eq!(m.resolve_year_day(2024, 60), (2024, 1, 29));
    }

    #[test]
    fn iso_week_numbers() {
        let m = iso();
        // 2023-01-01 is a Sunday and belongs to week 52 of 2022.
        assert_eq!(m.week_of_year(2023, 0, 1), 52);
        assert_eq!(m.week_of_year(2023, 0, 2), 1);
        // 2020 has 53 ISO weeks.
        assert_eq!(m.week_of_year(2020, 11, 31), 53);
        // 2024-12-30 belongs to week 1 of 2025.
        assert_eq!(m.week_of_year(2024, 11, 30), 1);
        assert_eq!(m.week_of_year(2024, 11, 29), 52);
        assert_eq!(m.week_of_year(2023, 11, 31), 52);
    }

    #[test]
    fn iso_weeks_agree_with_chrono() {
        let m = iso();
        let mut date = NaiveDate::from_ymd_opt(2018, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2027, 12, 31).unwrap();
        while date <= end {
            let expected = date.iso_week().week() as i32;
            let got = m.week_of_year(date.year(), date.month0() as i32, date.day() as i32);
            assert_eq!(got, expected, "week mismatch on {date}");
            date = date.succ_opt().unwrap();
        }
    }

    #[test]
    fn weeks_in_year_counts() {
        let m = iso();
        assert_eq!(m.weeks_in_year(2020), 53);
        assert_eq!(m.weeks_in_year(2015), 53);
        assert_eq!(m.weeks_in_year(2023), 52);
        assert_eq!(m.weeks_in_year(2024), 52);
    }

    #[test]
    fn week_start_of_week_one() {
        let m = iso();
        // Week 1 of 2023 starts on January 2nd.
        assert_eq!(m.year_day_of_week_start(2023, 1), 2);
        // Week 1 of 2024 starts on January 1st.
        assert_eq!(m.year_day_of_week_start(2024, 1), 1);
        // Week 1 of 2025 starts on 2024-12-30.
        assert_eq!(m.resolve_year_day(2025, m.year_day_of_week_start(2025, 1)), (2024, 11, 30));
    }

    #[test]
    fn sunday_weeks() {
        let m = CalendarMetrics::new(Weekday::Sunday);
        // With weeks starting on Sunday, week 1 of 2020 starts on
        // 2019-12-29 and January 6th falls in week 2.
        assert_eq!(m.resolve_year_day(2020, m.year_day_of_week_start(2020, 1)), (2019, 11, 29));
        assert_eq!(m.week_of_year(2020, 0, 6), 2);
    }
}
