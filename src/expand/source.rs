//! Frequency-driven seed iterator, the bottom of every pipeline.

use crate::core::{Frequency, Instance, InstanceSet};
use crate::metrics::CalendarMetrics;

use super::error::ExpansionError;
use super::stage::RuleIterator;

/// Emits one seed instance per period of the base frequency, starting at
/// the rule's first instance and advancing by the rule's interval.
///
/// Periods in which the seed date does not exist are skipped, never
/// clamped: a monthly rule anchored on the 31st jumps from January
/// straight to March, and a yearly rule anchored on February 29th emits
/// leap years only.
pub(crate) struct FrequencySource {
    metrics: CalendarMetrics,
    freq: Frequency,
    interval: i32,
    upcoming: Instance,
    set: InstanceSet,
}

impl FrequencySource {
    pub(crate) fn new(
        metrics: CalendarMetrics,
        freq: Frequency,
        interval: i32,
        start: Instance,
    ) -> Self {
        Self {
            metrics,
            freq,
            interval,
            upcoming: start,
            set: InstanceSet::new(),
        }
    }

    fn advance(&mut self, seed: Instance) -> Instance {
        match self.freq {
            Frequency::Yearly => {
                let mut year = seed.year() + self.interval;
                // A February 29th anchor only exists in leap years.
                while seed.day_of_month() > self.metrics.days_in_month(year, seed.month()) {
                    year += self.interval;
                }
                seed.with_year(year)
            }
            Frequency::Monthly => {
                let mut year = seed.year();
                let mut month = seed.month();
                loop {
                    month += self.interval;
                    year += month.div_euclid(12);
                    month = month.rem_euclid(12);
                    if seed.day_of_month() <= self.metrics.days_in_month(year, month) {
                        break;
                    }
                }
                seed.with_year(year).with_month(month)
            }
            Frequency::Weekly => self.add_days(seed, 7 * self.interval),
            Frequency::Daily => self.add_days(seed, self.interval),
            Frequency::Hourly => self.add_hours(seed, self.interval),
            Frequency::Minutely => {
                let total = seed.minute() + self.interval;
                let carried = self.add_hours(seed, total.div_euclid(60));
                carried.with_minute(total.rem_euclid(60))
            }
            Frequency::Secondly => {
                let total = seed.second() + self.interval;
                let minutes = seed.minute() + total.div_euclid(60);
                let carried = self.add_hours(seed, minutes.div_euclid(60));
                carried
                    .with_minute(minutes.rem_euclid(60))
                    .with_second(total.rem_euclid(60))
            }
        }
    }

    fn add_days(&self, seed: Instance, days: i32) -> Instance {
        let mut year = seed.year();
        let mut day = seed.day_of_month() + days;
        let mut month = seed.month();
        while day > self.metrics.days_in_month(year, month) {
            day -= self.metrics.days_in_month(year, month);
            month += 1;
            if month == 12 {
                month = 0;
                year += 1;
            }
        }
        seed.with_year(year).with_month(month).with_day_of_month(day)
    }

    fn add_hours(&self, seed: Instance, hours: i32) -> Instance {
        let total = seed.hour() + hours;
        let carried = self.add_days(seed, total.div_euclid(24));
        carried.with_hour(total.rem_euclid(24))
    }
}

impl RuleIterator for FrequencySource {
    fn next(&mut self) -> Result<Instance, ExpansionError> {
        let seed = self.upcoming;
        self.upcoming = self.advance(seed);
        Ok(seed)
    }

    fn next_set(&mut self) -> Result<&mut InstanceSet, ExpansionError> {
        self.set.clear();
        let seed = self.next()?;
        self.set.push(seed);
        Ok(&mut self.set)
    }
}
