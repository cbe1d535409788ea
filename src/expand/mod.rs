//! Recurrence expansion pipeline (RFC 5545 §3.3.10).
//!
//! A rule is expanded by a chain of pull-based stages in the order the RFC
//! prescribes:
//!
//! ```text
//! source -> BYMONTH -> BYWEEKNO -> BYYEARDAY -> BYMONTHDAY -> BYDAY
//!        -> BYHOUR -> BYMINUTE -> BYSECOND -> BYSETPOS -> iterator
//! ```
//!
//! The source emits one seed per period of the base frequency; each
//! BY-part stage either expands candidates over its window or filters
//! them, depending on the frequency and the companion parts; BYSETPOS
//! selects by position from each expanded batch; and the
//! [`RecurrenceIterator`] applies COUNT/UNTIL and hands out `chrono`
//! date-times.

mod by_day;
mod by_month;
mod by_monthday;
mod by_setpos;
mod by_time;
mod by_weekno;
mod by_yearday;
mod error;
mod iterator;
mod source;
mod stage;

pub use error::ExpansionError;
pub use iterator::RecurrenceIterator;

use chrono::NaiveDateTime;

use crate::core::{Instance, RRule};
use crate::metrics::CalendarMetrics;

use by_day::ByDay;
use by_month::ByMonth;
use by_monthday::ByMonthDay;
use by_setpos::BySetPos;
use by_time::{ByHour, ByMinute, BySecond};
use by_weekno::ByWeekNo;
use by_yearday::ByYearDay;
use stage::{ByStage, RuleIterator};

impl RRule {
    /// Builds the occurrence iterator for this rule, anchored at `dtstart`.
    ///
    /// `dtstart` is the first instance candidate and supplies every field
    /// the rule leaves open (a monthly rule without BYMONTHDAY recurs on
    /// `dtstart`'s day of month, and so on). Sub-second precision is
    /// truncated.
    ///
    /// ## Errors
    ///
    /// Returns [`ExpansionError::MissingFrequency`] when the rule has no
    /// FREQ part.
    pub fn iter_from(&self, dtstart: NaiveDateTime) -> Result<RecurrenceIterator, ExpansionError> {
        let freq = self.freq.ok_or(ExpansionError::MissingFrequency)?;
        let start = Instance::from_naive(dtstart);
        let metrics = CalendarMetrics::new(self.week_start());

        #[expect(
            clippy::cast_possible_wrap,
            reason = "intervals beyond i32::MAX periods are not meaningful"
        )]
        let interval = self.effective_interval() as i32;
        let mut pipeline: Box<dyn RuleIterator> =
            Box::new(source::FrequencySource::new(metrics, freq, interval, start));
        let mut stages = vec!["SOURCE"];

        if !self.by_month.is_empty() {
            let part = ByMonth::new(self, metrics);
            pipeline = Box::new(ByStage::new(
                pipeline,
                Box::new(part),
                ByMonth::mode(freq),
                start,
            ));
            stages.push("BYMONTH");
        }
        if !self.by_weekno.is_empty() {
            let part = ByWeekNo::new(self, metrics);
            pipeline = Box::new(ByStage::new(
                pipeline,
                Box::new(part),
                ByWeekNo::mode(freq),
                start,
            ));
            stages.push("BYWEEKNO");
        }
        if !self.by_yearday.is_empty() {
            let part = ByYearDay::new(self, metrics);
            pipeline = Box::new(ByStage::new(
                pipeline,
                Box::new(part),
                ByYearDay::mode(freq, self),
                start,
            ));
            stages.push("BYYEARDAY");
        }
        if !self.by_monthday.is_empty() {
            let part = ByMonthDay::new(self, metrics);
            pipeline = Box::new(ByStage::new(
                pipeline,
                Box::new(part),
                ByMonthDay::mode(freq, self),
                start,
            ));
            stages.push("BYMONTHDAY");
        }
        if !self.by_day.is_empty() {
            let part = ByDay::new(self, freq, metrics);
            pipeline = Box::new(ByStage::new(
                pipeline,
                Box::new(part),
                ByDay::mode(freq, self),
                start,
            ));
            stages.push("BYDAY");
        }
        if !self.by_hour.is_empty() {
            let part = ByHour::new(self);
            pipeline = Box::new(ByStage::new(
                pipeline,
                Box::new(part),
                ByHour::mode(freq),
                start,
            ));
            stages.push("BYHOUR");
        }
        if !self.by_minute.is_empty() {
            let part = ByMinute::new(self);
            pipeline = Box::new(ByStage::new(
                pipeline,
                Box::new(part),
                ByMinute::mode(freq),
                start,
            ));
            stages.push("BYMINUTE");
        }
        if !self.by_second.is_empty() {
            let part = BySecond::new(self);
            pipeline = Box::new(ByStage::new(
                pipeline,
                Box::new(part),
                BySecond::mode(freq),
                start,
            ));
            stages.push("BYSECOND");
        }
        if !self.by_setpos.is_empty() {
            pipeline = Box::new(BySetPos::new(pipeline, self));
            stages.push("BYSETPOS");
        }

        tracing::debug!(rule = %self, ?stages, "assembled recurrence pipeline");
        Ok(RecurrenceIterator::new(
            pipeline,
            start,
            self.count,
            self.until,
        ))
    }
}

/// Sorted, deduplicated copy of a BY-part list.
///
/// Part lists hold a dozen entries at most; membership tests on a sorted
/// `Vec` beat a hash set at that size, so every part stores one of these
/// and scans it linearly.
pub(crate) fn sorted_list(values: impl IntoIterator<Item = i32>) -> Vec<i32> {
    let mut list: Vec<i32> = values.into_iter().collect();
    list.sort_unstable();
    list.dedup();
    list
}
