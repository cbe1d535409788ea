//! Recurrence rule data model.
//!
//! An [`RRule`] is the parsed form the expansion pipeline consumes: the
//! base frequency, the interval/COUNT/UNTIL bounds, and one list per
//! BY-part. Fields are public and rules are built with struct-update
//! syntax over [`RRule::new`]; the `Display` impl writes the RRULE text
//! form back out, listing the BY-parts in the order the pipeline applies
//! them.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Base frequency of a rule (RFC 5545 §3.3.10).
///
/// Declared finest to coarsest, so the derived ordering is "how coarse is
/// this period": `Frequency::Daily > Frequency::Hourly`. Stage
/// construction leans on that ordering to decide between expanding and
/// limiting, e.g. BYHOUR expands exactly when the frequency is coarser
/// than [`Frequency::Hourly`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Frequency {
    Secondly,
    Minutely,
    Hourly,
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Frequency {
    const ALL: [Self; 7] = [
        Self::Secondly,
        Self::Minutely,
        Self::Hourly,
        Self::Daily,
        Self::Weekly,
        Self::Monthly,
        Self::Yearly,
    ];

    const NAMES: [&'static str; 7] = [
        "SECONDLY", "MINUTELY", "HOURLY", "DAILY", "WEEKLY", "MONTHLY", "YEARLY",
    ];

    /// The FREQ name of this frequency.
    #[must_use]
    pub const fn name(self) -> &'static str {
        Self::NAMES[self as usize]
    }

    /// Looks a frequency up by its FREQ name, ignoring case.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|freq| name.eq_ignore_ascii_case(freq.name()))
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Day of the week.
///
/// Numbered 0 = Sunday .. 6 = Saturday, the encoding the calendar metrics
/// and the packed BYDAY membership lists use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Weekday {
    Sunday,
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl Weekday {
    const ALL: [Self; 7] = [
        Self::Sunday,
        Self::Monday,
        Self::Tuesday,
        Self::Wednesday,
        Self::Thursday,
        Self::Friday,
        Self::Saturday,
    ];

    const ABBREVIATIONS: [&'static str; 7] = ["SU", "MO", "TU", "WE", "TH", "FR", "SA"];

    /// The two-letter RFC abbreviation.
    #[must_use]
    pub const fn abbrev(self) -> &'static str {
        Self::ABBREVIATIONS[self as usize]
    }

    /// Looks a weekday up by its two-letter abbreviation, ignoring case.
    #[must_use]
    pub fn from_abbrev(abbrev: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|day| abbrev.eq_ignore_ascii_case(day.abbrev()))
    }

    /// The numeric form used by the calendar math: 0 = Sunday .. 6 = Saturday.
    #[must_use]
    pub const fn number(self) -> i32 {
        self as i32
    }

    /// Inverse of [`Weekday::number`].
    #[must_use]
    pub fn from_number(number: i32) -> Option<Self> {
        usize::try_from(number)
            .ok()
            .and_then(|index| Self::ALL.get(index).copied())
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.abbrev())
    }
}

/// One BYDAY entry: a weekday with a position within the BYDAY scope.
///
/// Position 0 means "every occurrence" (plain `MO`); positive positions
/// count occurrences from the start of the scope window (`2TU`, the
/// second Tuesday), negative ones from its end (`-1FR`, the last Friday).
/// Keeping the position as a plain integer lets the BYDAY stage pack
/// entries into single-integer membership keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekdayNum {
    /// Occurrence position within the scope; 0 matches every occurrence.
    pub pos: i8,
    /// The day of the week.
    pub weekday: Weekday,
}

impl WeekdayNum {
    /// An entry matching every occurrence of `weekday`.
    #[must_use]
    pub const fn every(weekday: Weekday) -> Self {
        Self { pos: 0, weekday }
    }

    /// An entry matching the `pos`-th occurrence of `weekday`.
    ///
    /// ## Panics
    ///
    /// Panics if `pos` is 0 or outside -53..=53; use
    /// [`WeekdayNum::every`] for the position-free form.
    #[must_use]
    pub fn nth(pos: i8, weekday: Weekday) -> Self {
        assert!(pos != 0 && (-53..=53).contains(&pos));
        Self { pos, weekday }
    }

    /// The position widened for the packed membership arithmetic.
    #[must_use]
    pub const fn position(self) -> i32 {
        self.pos as i32
    }
}

impl fmt::Display for WeekdayNum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.pos != 0 {
            write!(f, "{}", self.pos)?;
        }
        f.write_str(self.weekday.abbrev())
    }
}

/// UNTIL bound of a rule: a date or a date-time, both inclusive.
///
/// The expansion core never interprets this; the iterator wrapper turns it
/// into an inclusive cutoff on the emitted stream, a date covering the
/// whole of its day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RRuleUntil {
    /// Date-only bound.
    Date(NaiveDate),
    /// Date-time bound, compared as local wall-clock time.
    DateTime(NaiveDateTime),
}

impl fmt::Display for RRuleUntil {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Date(d) => write!(f, "{}", d.format("%Y%m%d")),
            Self::DateTime(dt) => write!(f, "{}", dt.format("%Y%m%dT%H%M%S")),
        }
    }
}

/// A recurrence rule (RFC 5545 §3.3.10, §3.8.5.3).
///
/// Fields mirror the stages of the expansion pipeline; a part left empty
/// (or `None`) simply has no stage. Build rules with struct-update syntax,
///
/// ```rust
/// use cadence::{Frequency, RRule, Weekday, WeekdayNum};
///
/// let second_tuesday = RRule {
///     by_day: vec![WeekdayNum::nth(2, Weekday::Tuesday)],
///     count: Some(10),
///     ..RRule::new(Frequency::Monthly)
/// };
/// assert_eq!(second_tuesday.to_string(), "FREQ=MONTHLY;COUNT=10;BYDAY=2TU");
/// ```
///
/// or parse the text form with [`crate::parse::parse_rrule`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RRule {
    /// Base frequency; expansion refuses rules without one.
    pub freq: Option<Frequency>,

    /// Periods to advance per source step; `None` means every period.
    pub interval: Option<u32>,

    /// Occurrence budget, spent by the iterator (mutually exclusive with
    /// `until`; the parser rejects rules carrying both).
    pub count: Option<u32>,

    /// Inclusive end bound, enforced by the iterator.
    pub until: Option<RRuleUntil>,

    /// First day of the week for week numbering; `None` means the RFC
    /// default, Monday.
    pub wkst: Option<Weekday>,

    /// Months to expand into or keep, 1-12.
    pub by_month: Vec<u8>,

    /// Week numbers to expand into, ±1..=53, negatives from the year's
    /// last week.
    pub by_weekno: Vec<i8>,

    /// Days of the year, ±1..=366, negatives from December 31st.
    pub by_yearday: Vec<i16>,

    /// Days of the month, ±1..=31, negatives from the month's last day.
    pub by_monthday: Vec<i8>,

    /// Weekday entries, positional within the rule's BYDAY scope.
    pub by_day: Vec<WeekdayNum>,

    /// Hours of the day, 0-23.
    pub by_hour: Vec<u8>,

    /// Minutes of the hour, 0-59.
    pub by_minute: Vec<u8>,

    /// Seconds of the minute, 0-60 (60 for a leap second).
    pub by_second: Vec<u8>,

    /// Positions to keep from each expanded batch, ±1..=366, negatives
    /// from the batch end.
    pub by_setpos: Vec<i16>,
}

impl RRule {
    /// A rule with the given base frequency and nothing else.
    #[must_use]
    pub fn new(freq: Frequency) -> Self {
        Self {
            freq: Some(freq),
            ..Self::default()
        }
    }

    /// The effective week start day (RFC 5545 default: Monday).
    #[must_use]
    pub fn week_start(&self) -> Weekday {
        self.wkst.unwrap_or(Weekday::Monday)
    }

    /// The effective interval (floor 1; the RFC forbids 0).
    #[must_use]
    pub fn effective_interval(&self) -> u32 {
        self.interval.unwrap_or(1).max(1)
    }
}

/// Writes `;` between parts, swallowing it before the first one.
fn separator(f: &mut fmt::Formatter<'_>, first: &mut bool) -> fmt::Result {
    if *first {
        *first = false;
        Ok(())
    } else {
        f.write_str(";")
    }
}

fn write_part(
    f: &mut fmt::Formatter<'_>,
    first: &mut bool,
    name: &str,
    value: impl fmt::Display,
) -> fmt::Result {
    separator(f, first)?;
    write!(f, "{name}={value}")
}

fn write_list<T: fmt::Display>(
    f: &mut fmt::Formatter<'_>,
    first: &mut bool,
    name: &str,
    values: &[T],
) -> fmt::Result {
    if values.is_empty() {
        return Ok(());
    }
    separator(f, first)?;
    write!(f, "{name}=")?;
    for (index, value) in values.iter().enumerate() {
        if index > 0 {
            f.write_str(",")?;
        }
        write!(f, "{value}")?;
    }
    Ok(())
}

impl fmt::Display for RRule {
    /// Emits RRULE text with the bounds first and the BY-parts in
    /// pipeline order (BYMONTH through BYSETPOS). The part order is not
    /// significant to parsers, so canonical output follows the order the
    /// engine applies.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        if let Some(freq) = self.freq {
            write_part(f, &mut first, "FREQ", freq)?;
        }
        if let Some(interval) = self.interval {
            write_part(f, &mut first, "INTERVAL", interval)?;
        }
        if let Some(count) = self.count {
            write_part(f, &mut first, "COUNT", count)?;
        }
        if let Some(until) = self.until {
            write_part(f, &mut first, "UNTIL", until)?;
        }
        if let Some(wkst) = self.wkst {
            write_part(f, &mut first, "WKST", wkst)?;
        }
        write_list(f, &mut first, "BYMONTH", &self.by_month)?;
        write_list(f, &mut first, "BYWEEKNO", &self.by_weekno)?;
        write_list(f, &mut first, "BYYEARDAY", &self.by_yearday)?;
        write_list(f, &mut first, "BYMONTHDAY", &self.by_monthday)?;
        write_list(f, &mut first, "BYDAY", &self.by_day)?;
        write_list(f, &mut first, "BYHOUR", &self.by_hour)?;
        write_list(f, &mut first, "BYMINUTE", &self.by_minute)?;
        write_list(f, &mut first, "BYSECOND", &self.by_second)?;
        write_list(f, &mut first, "BYSETPOS", &self.by_setpos)
    }
}
