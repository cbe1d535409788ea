//! Public iterator over a rule's occurrences.

use chrono::NaiveDateTime;

use crate::core::{Instance, RRuleUntil};

use super::error::ExpansionError;
use super::stage::RuleIterator;

/// The occurrence stream of one rule, anchored at one start instant.
///
/// Wraps the stage pipeline and applies the caller-facing contract the
/// stages themselves do not: candidates before the start are skipped,
/// consecutive duplicates are collapsed, COUNT and UNTIL end the stream,
/// and a fatal pipeline error is reported once after which the iterator
/// stays exhausted.
///
/// Rules without COUNT or UNTIL are infinite; callers bound them with
/// [`Iterator::take`] or a date check.
pub struct RecurrenceIterator {
    pipeline: Box<dyn RuleIterator>,
    start: Instance,
    remaining: Option<u32>,
    until: Option<Instance>,
    last: Option<Instance>,
    peeked: Option<Instance>,
    exhausted: bool,
}

impl RecurrenceIterator {
    pub(crate) fn new(
        pipeline: Box<dyn RuleIterator>,
        start: Instance,
        count: Option<u32>,
        until: Option<RRuleUntil>,
    ) -> Self {
        Self {
            pipeline,
            start,
            remaining: count,
            until: until.map(until_bound),
            last: None,
            peeked: None,
            exhausted: false,
        }
    }

    /// Pulls the next raw candidate: at or after the start, never equal to
    /// the previously emitted one.
    fn pull(&mut self) -> Result<Instance, ExpansionError> {
        loop {
            let candidate = self.pipeline.next()?;
            if candidate < self.start {
                continue;
            }
            if self.last == Some(candidate) {
                continue;
            }
            self.last = Some(candidate);
            return Ok(candidate);
        }
    }

    /// Produces the next occurrence as a packed instance.
    ///
    /// Returns `Ok(None)` once COUNT is spent or UNTIL is passed. After an
    /// error the iterator is exhausted and keeps returning `Ok(None)`.
    ///
    /// ## Errors
    ///
    /// Returns [`ExpansionError::OverConstrained`] when the rule cannot
    /// produce instances, such as `FREQ=YEARLY;BYMONTH=2;BYMONTHDAY=31`.
    pub fn next_instance(&mut self) -> Result<Option<Instance>, ExpansionError> {
        match self.peek_instance()? {
            Some(instance) => {
                self.peeked = None;
                if let Some(remaining) = self.remaining.as_mut() {
                    *remaining -= 1;
                }
                Ok(Some(instance))
            }
            None => Ok(None),
        }
    }

    /// Looks at the next occurrence without consuming it.
    ///
    /// ## Errors
    ///
    /// Same as [`RecurrenceIterator::next_instance`].
    pub fn peek_instance(&mut self) -> Result<Option<Instance>, ExpansionError> {
        if self.exhausted || self.remaining == Some(0) {
            return Ok(None);
        }
        if self.peeked.is_none() {
            match self.pull() {
                Ok(instance) => self.peeked = Some(instance),
                Err(error) => {
                    self.exhausted = true;
                    return Err(error);
                }
            }
        }
        match self.peeked {
            Some(instance) => {
                if let Some(until) = self.until
                    && instance > until
                {
                    tracing::trace!(%instance, "stream ended by UNTIL");
                    self.exhausted = true;
                    return Ok(None);
                }
                Ok(Some(instance))
            }
            None => Ok(None),
        }
    }

    /// Skips occurrences strictly before `limit`. Skipped occurrences
    /// still count against COUNT.
    ///
    /// ## Errors
    ///
    /// Same as [`RecurrenceIterator::next_instance`].
    pub fn fast_forward(&mut self, limit: NaiveDateTime) -> Result<(), ExpansionError> {
        let limit = Instance::from_naive(limit);
        while let Some(instance) = self.peek_instance()? {
            if instance >= limit {
                break;
            }
            self.next_instance()?;
        }
        Ok(())
    }
}

impl Iterator for RecurrenceIterator {
    type Item = Result<NaiveDateTime, ExpansionError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.next_instance() {
                Ok(Some(instance)) => match instance.to_naive() {
                    Some(datetime) => return Some(Ok(datetime)),
                    // Unrepresentable in chrono (leap second); drop it.
                    None => continue,
                },
                Ok(None) => return None,
                Err(error) => return Some(Err(error)),
            }
        }
    }
}

impl std::iter::FusedIterator for RecurrenceIterator {}

/// An UNTIL bound as an inclusive packed instant; a date-only bound covers
/// its whole day.
fn until_bound(until: RRuleUntil) -> Instance {
    use chrono::Datelike;
    match until {
        RRuleUntil::Date(date) => Instance::new(
            date.year(),
            date.month0() as i32,
            date.day() as i32,
            23,
            59,
            59,
        ),
        RRuleUntil::DateTime(datetime) => Instance::from_naive(datetime),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::InstanceSet;
    use chrono::NaiveDate;

    /// Endless noon instances every `step` days, each emitted `repeat`
    /// times in a row.
    struct Noons {
        day: i32,
        step: i32,
        repeat: u32,
        emitted: u32,
        set: InstanceSet,
    }

    impl Noons {
        fn new(step: i32, repeat: u32) -> Self {
            Self {
                day: 1,
                step,
                repeat,
                emitted: 0,
                set: InstanceSet::new(),
            }
        }
    }

    impl RuleIterator for Noons {
        fn next(&mut self) -> Result<Instance, ExpansionError> {
            let instance = Instance::new(2024, 0, self.day, 12, 0, 0);
            self.emitted += 1;
            if self.emitted == self.repeat {
                self.emitted = 0;
                self.day += self.step;
            }
            Ok(instance)
        }

        fn next_set(&mut self) -> Result<&mut InstanceSet, ExpansionError> {
            self.set.clear();
            let instance = self.next()?;
            self.set.push(instance);
            Ok(&mut self.set)
        }
    }

    fn start(day: i32) -> Instance {
        Instance::new(2024, 0, day, 12, 0, 0)
    }

    #[test]
    fn count_limits_the_stream() {
        let mut iter =
            RecurrenceIterator::new(Box::new(Noons::new(1, 1)), start(1), Some(3), None);
        let days: Vec<i32> = std::iter::from_fn(|| iter.next_instance().unwrap())
            .map(|i| i.day_of_month())
            .collect();
        assert_eq!(days, vec![1, 2, 3]);
        assert_eq!(iter.next_instance().unwrap(), None);
    }

    #[test]
    fn until_is_inclusive() {
        let until = RRuleUntil::DateTime(
            NaiveDate::from_ymd_opt(2024, 1, 3)
                .unwrap()
                .and_hms_opt(12, 0, 0)
                .unwrap(),
        );
        let mut iter =
            RecurrenceIterator::new(Box::new(Noons::new(1, 1)), start(1), None, Some(until));
        let days: Vec<i32> = std::iter::from_fn(|| iter.next_instance().unwrap())
            .map(|i| i.day_of_month())
            .collect();
        assert_eq!(days, vec![1, 2, 3]);
    }

    #[test]
    fn until_date_covers_its_whole_day() {
        let until = RRuleUntil::Date(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        let mut iter =
            RecurrenceIterator::new(Box::new(Noons::new(1, 1)), start(1), None, Some(until));
        let days: Vec<i32> = std::iter::from_fn(|| iter.next_instance().unwrap())
            .map(|i| i.day_of_month())
            .collect();
        assert_eq!(days, vec![1, 2]);
    }

    #[test]
    fn duplicates_are_collapsed_and_pre_start_skipped() {
        let mut iter =
            RecurrenceIterator::new(Box::new(Noons::new(2, 3)), start(3), Some(3), None);
        let days: Vec<i32> = std::iter::from_fn(|| iter.next_instance().unwrap())
            .map(|i| i.day_of_month())
            .collect();
        assert_eq!(days, vec![3, 5, 7]);
    }

    #[test]
    fn peek_does_not_consume() {
        let mut iter =
            RecurrenceIterator::new(Box::new(Noons::new(1, 1)), start(1), Some(2), None);
        assert_eq!(iter.peek_instance().unwrap().unwrap().day_of_month(), 1);
        assert_eq!(iter.peek_instance().unwrap().unwrap().day_of_month(), 1);
        assert_eq!(iter.next_instance().unwrap().unwrap().day_of_month(), 1);
        assert_eq!(iter.peek_instance().unwrap().unwrap().day_of_month(), 2);
    }

    #[test]
    fn fast_forward_respects_count() {
        let mut iter =
            RecurrenceIterator::new(Box::new(Noons::new(1, 1)), start(1), Some(5), None);
        iter.fast_forward(
            NaiveDate::from_ymd_opt(2024, 1, 4)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
        )
        .unwrap();
        let days: Vec<i32> = std::iter::from_fn(|| iter.next_instance().unwrap())
            .map(|i| i.day_of_month())
            .collect();
        assert_eq!(days, vec![4, 5]);
    }

    #[test]
    fn chrono_iteration() {
        let iter = RecurrenceIterator::new(Box::new(Noons::new(1, 1)), start(1), Some(2), None);
        let dates: Vec<NaiveDateTime> = iter.map(Result::unwrap).collect();
        assert_eq!(
            dates,
            vec![
                NaiveDate::from_ymd_opt(2024, 1, 1)
                    .unwrap()
                    .and_hms_opt(12, 0, 0)
                    .unwrap(),
                NaiveDate::from_ymd_opt(2024, 1, 2)
                    .unwrap()
                    .and_hms_opt(12, 0, 0)
                    .unwrap(),
            ]
        );
    }
}
