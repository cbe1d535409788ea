//! # cadence
//!
//! A recurrence rule expansion engine implementing RFC 5545 (and the RFC
//! 2445 superset where the older RFC was more permissive).
//!
//! Given a rule like "every second Tuesday of March and September" and a
//! start instant, the engine produces the ordered, possibly infinite
//! stream of occurrence date-times. Expansion is a pull-based pipeline of
//! per-BY-part stages working on packed integer instances; see the
//! [`expand`] module for the pipeline layout.
//!
//! ## Example
//!
//! ```rust
//! use cadence::parse_rrule;
//! use chrono::NaiveDate;
//!
//! let rule = parse_rrule("FREQ=YEARLY;BYMONTH=3,9;BYDAY=TU;BYSETPOS=2;COUNT=3")?;
//! let dtstart = NaiveDate::from_ymd_opt(2020, 3, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
//!
//! let occurrences: Vec<_> = rule.iter_from(dtstart)?.collect::<Result<_, _>>()?;
//! assert_eq!(occurrences.len(), 3);
//! assert_eq!(occurrences[0].date(), NaiveDate::from_ymd_opt(2020, 3, 10).unwrap());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! Instances travel through the pipeline as naive local wall-clock
//! values; attaching a time zone, as well as RDATE/EXDATE set arithmetic,
//! is the caller's concern.

pub mod core;
pub mod expand;
pub mod metrics;
pub mod parse;

pub use crate::core::{Frequency, Instance, RRule, RRuleUntil, Weekday, WeekdayNum};
pub use crate::expand::{ExpansionError, RecurrenceIterator};
pub use crate::metrics::CalendarMetrics;
pub use crate::parse::{ParseError, ParseErrorKind, parse_rrule};
