//! BYMONTHDAY rule part.

use crate::core::{Frequency, Instance, InstanceSet, RRule};
use crate::metrics::CalendarMetrics;

use super::sorted_list;
use super::stage::{ByPart, StageMode};

/// Limits or expands by day-of-month. Positive values index from the start
/// of the month, negative values from its end (-1 = last day). Values the
/// month cannot hold are skipped, never clamped.
pub(crate) struct ByMonthDay {
    metrics: CalendarMetrics,
    days: Vec<i32>,
}

impl ByMonthDay {
    pub(crate) fn new(rule: &RRule, metrics: CalendarMetrics) -> Self {
        Self {
            metrics,
            days: sorted_list(rule.by_monthday.iter().map(|&d| i32::from(d))),
        }
    }

    pub(crate) fn mode(freq: Frequency, rule: &RRule) -> StageMode {
        // Expansion applies to month-grained frequencies unless BYYEARDAY
        // already pinned the day. A BYDAY part does not downgrade this
        // stage; it filters the days produced here, which is what makes
        // rules like "every Friday the 13th" work.
        if (freq == Frequency::Yearly || freq == Frequency::Monthly)
            && rule.by_yearday.is_empty()
        {
            StageMode::Expand
        } else {
            StageMode::Limit
        }
    }
}

impl ByPart for ByMonthDay {
    fn label(&self) -> &'static str {
        "BYMONTHDAY"
    }

    fn filter(&self, instance: Instance) -> bool {
        let day = instance.day_of_month();
        let month_days = self
            .metrics
            .days_in_month(instance.year(), instance.month());
        !self.days.contains(&day) && !self.days.contains(&(day - month_days - 1))
    }

    fn expand(&self, out: &mut InstanceSet, instance: Instance, _start: Instance) {
        let month_days = self
            .metrics
            .days_in_month(instance.year(), instance.month());
        for &value in &self.days {
            let day = if value < 0 { month_days + value + 1 } else { value };
            if day >= 1 && day <= month_days {
                out.push(instance.with_day_of_month(day));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Weekday;

    fn part(days: Vec<i8>) -> ByMonthDay {
        let rule = RRule {
            by_monthday: days,
            ..RRule::new(Frequency::Monthly)
        };
        ByMonthDay::new(&rule, CalendarMetrics::new(Weekday::Monday))
    }

    fn expand_one(p: &ByMonthDay, seed: Instance) -> Vec<i32> {
        let mut out = InstanceSet::new();
        p.expand(&mut out, seed, seed);
        out.iter().map(|i| i.day_of_month()).collect()
    }

    #[test]
    fn mode_table() {
        let monthly = RRule {
            by_monthday: vec![13],
            ..RRule::new(Frequency::Monthly)
        };
        assert_eq!(ByMonthDay::mode(Frequency::Monthly, &monthly), StageMode::Expand);
        assert_eq!(ByMonthDay::mode(Frequency::Yearly, &monthly), StageMode::Expand);
        assert_eq!(ByMonthDay::mode(Frequency::Weekly, &monthly), StageMode::Limit);
        assert_eq!(ByMonthDay::mode(Frequency::Daily, &monthly), StageMode::Limit);

        let with_yearday = RRule {
            by_yearday: vec![100],
            ..monthly.clone()
        };
        assert_eq!(
            ByMonthDay::mode(Frequency::Monthly, &with_yearday),
            StageMode::Limit
        );

        // BYDAY does not downgrade the expansion.
        let friday_13th = RRule {
            by_day: vec![crate::core::WeekdayNum::every(Weekday::Friday)],
            ..monthly.clone()
        };
        assert_eq!(
            ByMonthDay::mode(Frequency::Monthly, &friday_13th),
            StageMode::Expand
        );
    }

    #[test]
    fn day_31_skips_short_months() {
        let p = part(vec![31]);
        assert_eq!(expand_one(&p, Instance::new(2024, 0, 1, 0, 0, 0)), vec![31]);
        assert!(expand_one(&p, Instance::new(2024, 1, 1, 0, 0, 0)).is_empty());
        assert!(expand_one(&p, Instance::new(2024, 3, 1, 0, 0, 0)).is_empty());
    }

    #[test]
    fn negative_days_count_from_month_end() {
        let p = part(vec![-1, -2]);
        assert_eq!(
            expand_one(&p, Instance::new(2024, 1, 1, 0, 0, 0)),
            vec![28, 29]
        );
        assert_eq!(
            expand_one(&p, Instance::new(2023, 1, 1, 0, 0, 0)),
            vec![27, 28]
        );
    }

    #[test]
    fn filter_matches_both_signs() {
        let p = part(vec![-1]);
        assert!(!p.filter(Instance::new(2024, 0, 31, 0, 0, 0)));
        assert!(!p.filter(Instance::new(2024, 1, 29, 0, 0, 0)));
        assert!(p.filter(Instance::new(2024, 0, 30, 0, 0, 0)));
    }
}
