//! BYYEARDAY rule part.

use crate::core::{Frequency, Instance, InstanceSet, RRule};
use crate::metrics::CalendarMetrics;

use super::sorted_list;
use super::stage::{ByPart, StageMode};

/// Limits or expands by day-of-year. Positive values count from January
/// 1st, negative values from December 31st (-1). Day 366 only exists in
/// leap years; values that fall outside the year are pruned.
///
/// RFC 5545 only allows this part with YEARLY rules, but RFC 2445 also
/// tolerated it with MONTHLY and WEEKLY ones, where it filters.
pub(crate) struct ByYearDay {
    metrics: CalendarMetrics,
    days: Vec<i32>,
}

impl ByYearDay {
    pub(crate) fn new(rule: &RRule, metrics: CalendarMetrics) -> Self {
        Self {
            metrics,
            days: sorted_list(rule.by_yearday.iter().map(|&d| i32::from(d))),
        }
    }

    pub(crate) fn mode(freq: Frequency, rule: &RRule) -> StageMode {
        if freq == Frequency::Yearly && rule.by_month.is_empty() && rule.by_monthday.is_empty() {
            StageMode::Expand
        } else {
            StageMode::Limit
        }
    }
}

impl ByPart for ByYearDay {
    fn label(&self) -> &'static str {
        "BYYEARDAY"
    }

    fn filter(&self, instance: Instance) -> bool {
        let year_day = self.metrics.day_of_year(
            instance.year(),
            instance.month(),
            instance.day_of_month(),
        );
        let year_days = self.metrics.days_in_year(instance.year());
        !self.days.contains(&year_day) && !self.days.contains(&(year_day - year_days - 1))
    }

    fn expand(&self, out: &mut InstanceSet, instance: Instance, _start: Instance) {
        let year = instance.year();
        let year_days = self.metrics.days_in_year(year);
        for &value in &self.days {
            let year_day = if value < 0 { year_days + value + 1 } else { value };
            if year_day < 1 || year_day > year_days {
                continue;
            }
            let (month, day) = self.metrics.month_and_day_of_year_day(year, year_day);
            out.push(instance.with_month(month).with_day_of_month(day));
        }
    }
}
