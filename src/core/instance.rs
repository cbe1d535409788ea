//! Packed recurrence instance codec.
//!
//! Every candidate that flows through the expansion pipeline is a single
//! `i64` with the date-time fields packed into fixed bit ranges. Stages
//! exchange millions of candidates for long expansions; a stack-allocated
//! integer avoids allocation entirely and lets a stage replace one field
//! with two bit operations.

use std::fmt;

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};

// Bit layout, low to high. The year occupies the remaining high bits and is
// recovered with an arithmetic shift, so packed ordering matches
// chronological ordering even for negative years.
const SECOND_BITS: u32 = 6;
const MINUTE_BITS: u32 = 6;
const HOUR_BITS: u32 = 5;
const DAY_BITS: u32 = 5;
const MONTH_BITS: u32 = 4;

const MINUTE_POS: u32 = SECOND_BITS;
const HOUR_POS: u32 = MINUTE_POS + MINUTE_BITS;
const DAY_POS: u32 = HOUR_POS + HOUR_BITS;
const MONTH_POS: u32 = DAY_POS + DAY_BITS;
const YEAR_POS: u32 = MONTH_POS + MONTH_BITS;

const SECOND_MASK: i64 = (1 << SECOND_BITS) - 1;
const MINUTE_MASK: i64 = ((1 << MINUTE_BITS) - 1) << MINUTE_POS;
const HOUR_MASK: i64 = ((1 << HOUR_BITS) - 1) << HOUR_POS;
const DAY_MASK: i64 = ((1 << DAY_BITS) - 1) << DAY_POS;
const MONTH_MASK: i64 = ((1 << MONTH_BITS) - 1) << MONTH_POS;

/// One occurrence candidate, packed into a single integer.
///
/// Months are 0-based (0 = January) throughout the expansion core; the
/// chrono conversions at the crate boundary translate to the 1-based
/// convention.
///
/// Two instances compare the way their wall-clock values compare, so a
/// buffer of packed instances can be sorted directly. Out-of-range fields
/// produce undefined packed values; callers range-check before packing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Instance(i64);

impl Instance {
    /// Packs the given fields into an instance.
    #[must_use]
    pub const fn new(year: i32, month: i32, day: i32, hour: i32, minute: i32, second: i32) -> Self {
        Self(
            ((year as i64) << YEAR_POS)
                | ((month as i64) << MONTH_POS)
                | ((day as i64) << DAY_POS)
                | ((hour as i64) << HOUR_POS)
                | ((minute as i64) << MINUTE_POS)
                | second as i64,
        )
    }

    /// Packs a `chrono` date-time, truncating sub-second precision.
    #[must_use]
    #[expect(
        clippy::cast_possible_wrap,
        reason = "chrono date-time components are far below i32::MAX"
    )]
    pub fn from_naive(value: NaiveDateTime) -> Self {
        Self::new(
            value.year(),
            value.month0() as i32,
            value.day() as i32,
            value.hour() as i32,
            value.minute() as i32,
            value.second() as i32,
        )
    }

    /// Decodes into a `chrono` date-time.
    ///
    /// Returns `None` when the packed fields do not form a representable
    /// date-time (including leap-second values).
    #[must_use]
    #[expect(
        clippy::cast_sign_loss,
        reason = "negative fields fail the chrono range checks and yield None"
    )]
    pub fn to_naive(self) -> Option<NaiveDateTime> {
        NaiveDate::from_ymd_opt(self.year(), self.month() as u32 + 1, self.day_of_month() as u32)?
            .and_hms_opt(
                self.hour() as u32,
                self.minute() as u32,
                self.second() as u32,
            )
    }

    /// The year, which may be negative.
    #[must_use]
    pub const fn year(self) -> i32 {
        (self.0 >> YEAR_POS) as i32
    }

    /// The 0-based month (0 = January).
    #[must_use]
    pub const fn month(self) -> i32 {
        ((self.0 & MONTH_MASK) >> MONTH_POS) as i32
    }

    /// The 1-based day of the month.
    #[must_use]
    pub const fn day_of_month(self) -> i32 {
        ((self.0 & DAY_MASK) >> DAY_POS) as i32
    }

    /// The hour of the day (0-23).
    #[must_use]
    pub const fn hour(self) -> i32 {
        ((self.0 & HOUR_MASK) >> HOUR_POS) as i32
    }

    /// The minute of the hour (0-59).
    #[must_use]
    pub const fn minute(self) -> i32 {
        ((self.0 & MINUTE_MASK) >> MINUTE_POS) as i32
    }

    /// The second of the minute (0-60, 60 for a leap second).
    #[must_use]
    pub const fn second(self) -> i32 {
        (self.0 & SECOND_MASK) as i32
    }

    /// Returns a copy with the year replaced.
    #[must_use]
    pub const fn with_year(self, year: i32) -> Self {
        Self((self.0 & ((1 << YEAR_POS) - 1)) | ((year as i64) << YEAR_POS))
    }

    /// Returns a copy with the 0-based month replaced.
    #[must_use]
    pub const fn with_month(self, month: i32) -> Self {
        Self((self.0 & !MONTH_MASK) | ((month as i64) << MONTH_POS))
    }

    /// Returns a copy with the day of the month replaced.
    #[must_use]
    pub const fn with_day_of_month(self, day: i32) -> Self {
        Self((self.0 & !DAY_MASK) | ((day as i64) << DAY_POS))
    }

    /// Returns a copy with the hour replaced.
    #[must_use]
    pub const fn with_hour(self, hour: i32) -> Self {
        Self((self.0 & !HOUR_MASK) | ((hour as i64) << HOUR_POS))
    }

    /// Returns a copy with the minute replaced.
    #[must_use]
    pub const fn with_minute(self, minute: i32) -> Self {
        Self((self.0 & !MINUTE_MASK) | ((minute as i64) << MINUTE_POS))
    }

    /// Returns a copy with the second replaced.
    #[must_use]
    pub const fn with_second(self, second: i32) -> Self {
        Self((self.0 & !SECOND_MASK) | second as i64)
    }

    /// The raw packed representation.
    #[must_use]
    pub const fn raw(self) -> i64 {
        self.0
    }
}

impl fmt::Display for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}{:02}{:02}T{:02}{:02}{:02}",
            self.year(),
            self.month() + 1,
            self.day_of_month(),
            self.hour(),
            self.minute(),
            self.second()
        )
    }
}
