//! RRULE text parsing (RFC 5545 §3.3.10).
//!
//! Parses the `FREQ=WEEKLY;BYDAY=MO,WE,FR` value form into an [`RRule`].
//! [`RRule`]'s `Display` implementation is the inverse, emitting canonical
//! RRULE text.

use chrono::{NaiveDate, NaiveDateTime};

use crate::core::{Frequency, RRule, RRuleUntil, Weekday, WeekdayNum};

use super::error::{ParseError, ParseErrorKind, ParseResult};

/// Parses an RRULE value such as `FREQ=MONTHLY;BYDAY=2TU;COUNT=10`.
///
/// Part names are case-insensitive and may come in any order; unknown
/// parts are ignored. Numeric parts are range-checked against the RFC
/// grammar (for example `BYMONTH=13` is rejected).
///
/// ## Errors
///
/// Returns a [`ParseError`] pointing at the offending part when the text
/// is not a valid RRULE, has no FREQ part, or carries both UNTIL and
/// COUNT.
pub fn parse_rrule(s: &str) -> ParseResult<RRule> {
    if s.is_empty() {
        return Err(ParseError::new(ParseErrorKind::MissingFrequency, 0));
    }

    let mut rrule = RRule::default();
    let mut position = 0;

    for part in s.split(';') {
        let eq_pos = part.find('=').ok_or_else(|| {
            ParseError::new(ParseErrorKind::MissingEquals, position).with_context(part)
        })?;

        let key = &part[..eq_pos];
        let value = &part[eq_pos + 1..];

        parse_rrule_part(&mut rrule, key, value, position)?;
        position += part.len() + 1;
    }

    if rrule.freq.is_none() {
        return Err(ParseError::new(ParseErrorKind::MissingFrequency, 0));
    }
    Ok(rrule)
}

/// Dispatches one `NAME=value` part into the rule under construction.
fn parse_rrule_part(rrule: &mut RRule, key: &str, value: &str, position: usize) -> ParseResult<()> {
    match key.to_ascii_uppercase().as_str() {
        "FREQ" => {
            rrule.freq = Some(Frequency::from_name(value).ok_or_else(|| {
                ParseError::new(ParseErrorKind::InvalidFrequency, position).with_context(value)
            })?);
        }
        "INTERVAL" => {
            let interval: u32 = parse_number(value, position)?;
            if interval < 1 {
                return Err(ParseError::new(ParseErrorKind::ValueOutOfRange, position)
                    .with_context("INTERVAL=0"));
            }
            rrule.interval = Some(interval);
        }
        "COUNT" => parse_rrule_count(rrule, value, position)?,
        "UNTIL" => parse_rrule_until(rrule, value, position)?,
        "WKST" => {
            rrule.wkst = Some(Weekday::from_abbrev(value).ok_or_else(|| {
                ParseError::new(ParseErrorKind::InvalidWeekday, position).with_context(value)
            })?);
        }
        "BYSECOND" => rrule.by_second = parse_unsigned_list(value, position, 60)?,
        "BYMINUTE" => rrule.by_minute = parse_unsigned_list(value, position, 59)?,
        "BYHOUR" => rrule.by_hour = parse_unsigned_list(value, position, 23)?,
        "BYDAY" => rrule.by_day = parse_byday(value, position)?,
        "BYMONTHDAY" => rrule.by_monthday = parse_signed_list(value, position, 31)?,
        "BYYEARDAY" => rrule.by_yearday = parse_signed_list(value, position, 366)?,
        "BYWEEKNO" => rrule.by_weekno = parse_signed_list(value, position, 53)?,
        "BYMONTH" => {
            let months = parse_unsigned_list(value, position, 12)?;
            if months.contains(&0) {
                return Err(ParseError::new(ParseErrorKind::ValueOutOfRange, position)
                    .with_context("BYMONTH=0"));
            }
            rrule.by_month = months;
        }
        "BYSETPOS" => rrule.by_setpos = parse_signed_list(value, position, 366)?,
        _ => {} // unrecognized parts pass through silently
    }
    Ok(())
}

/// Parses a COUNT value, rejecting rules that already carry UNTIL.
fn parse_rrule_count(rrule: &mut RRule, value: &str, position: usize) -> ParseResult<()> {
    if rrule.until.is_some() {
        return Err(ParseError::new(ParseErrorKind::UntilCountConflict, position));
    }
    rrule.count = Some(parse_number(value, position)?);
    Ok(())
}

/// Parses an UNTIL value into its date or date-time form.
///
/// A trailing `Z` marks UTC in the RFC; the expansion core works on naive
/// wall-clock values, so the marker is accepted and dropped.
fn parse_rrule_until(rrule: &mut RRule, value: &str, position: usize) -> ParseResult<()> {
    if rrule.count.is_some() {
        return Err(ParseError::new(ParseErrorKind::UntilCountConflict, position));
    }
    let trimmed = value.strip_suffix('Z').unwrap_or(value);
    rrule.until = Some(if trimmed.contains('T') {
        let datetime = NaiveDateTime::parse_from_str(trimmed, "%Y%m%dT%H%M%S").map_err(|_| {
            ParseError::new(ParseErrorKind::InvalidUntil, position).with_context(value)
        })?;
        RRuleUntil::DateTime(datetime)
    } else {
        let date = NaiveDate::parse_from_str(trimmed, "%Y%m%d").map_err(|_| {
            ParseError::new(ParseErrorKind::InvalidUntil, position).with_context(value)
        })?;
        RRuleUntil::Date(date)
    });
    Ok(())
}

/// Parses one number of the target integer type.
fn parse_number<T: std::str::FromStr>(value: &str, position: usize) -> ParseResult<T> {
    value.trim().parse().map_err(|_| {
        ParseError::new(ParseErrorKind::InvalidInteger, position).with_context(value)
    })
}

/// Parses a comma-separated list of integers in `0..=max`.
fn parse_unsigned_list(value: &str, position: usize, max: u8) -> ParseResult<Vec<u8>> {
    value
        .split(',')
        .map(|item| {
            let number: u8 = parse_number(item, position)?;
            if number > max {
                return Err(ParseError::new(ParseErrorKind::ValueOutOfRange, position)
                    .with_context(item.trim()));
            }
            Ok(number)
        })
        .collect()
}

/// Parses a comma-separated list of non-zero integers in `-max..=max`.
fn parse_signed_list<T>(value: &str, position: usize, max: i32) -> ParseResult<Vec<T>>
where
    T: std::str::FromStr + Copy + Into<i32>,
{
    value
        .split(',')
        .map(|item| {
            let number: T = parse_number(item, position)?;
            let widened: i32 = number.into();
            if widened == 0 || !(-max..=max).contains(&widened) {
                return Err(ParseError::new(ParseErrorKind::ValueOutOfRange, position)
                    .with_context(item.trim()));
            }
            Ok(number)
        })
        .collect()
}

/// Parses a BYDAY value into positional weekday entries.
fn parse_byday(value: &str, position: usize) -> ParseResult<Vec<WeekdayNum>> {
    value
        .split(',')
        .map(|item| parse_weekday_num(item.trim(), position))
        .collect()
}

/// Parses one BYDAY entry such as `MO`, `1MO` or `-1FR`.
fn parse_weekday_num(s: &str, position: usize) -> ParseResult<WeekdayNum> {
    if s.len() < 2 {
        return Err(ParseError::new(ParseErrorKind::InvalidWeekday, position).with_context(s));
    }

    let weekday_str = &s[s.len() - 2..];
    let pos_str = &s[..s.len() - 2];

    let weekday = Weekday::from_abbrev(weekday_str)
        .ok_or_else(|| ParseError::new(ParseErrorKind::InvalidWeekday, position).with_context(s))?;

    let pos = if pos_str.is_empty() {
        0
    } else {
        let pos: i8 = pos_str.parse().map_err(|_| {
            ParseError::new(ParseErrorKind::InvalidInteger, position).with_context(s)
        })?;
        if pos == 0 || !(-53..=53).contains(&pos) {
            return Err(ParseError::new(ParseErrorKind::ValueOutOfRange, position).with_context(s));
        }
        pos
    };

    Ok(WeekdayNum { pos, weekday })
}
