//! BYWEEKNO rule part.

use crate::core::{Frequency, Instance, InstanceSet, RRule};
use crate::metrics::CalendarMetrics;

use super::sorted_list;
use super::stage::{ByPart, StageMode};

/// Limits or expands by week-of-year number. Meaningful with YEARLY rules,
/// where each seed expands into the week-start day of every configured
/// week; RFC 2445 tolerated it elsewhere, so other frequencies get a plain
/// week-number filter.
///
/// Negative week numbers count back from the final numbered week of the
/// year. Week 1 may begin in the previous December and the last week may
/// reach into the next January; the expansion emits the actual date either
/// way and leaves refining the day-of-week to the BYDAY stage.
pub(crate) struct ByWeekNo {
    metrics: CalendarMetrics,
    weeks: Vec<i32>,
}

impl ByWeekNo {
    pub(crate) fn new(rule: &RRule, metrics: CalendarMetrics) -> Self {
        Self {
            metrics,
            weeks: sorted_list(rule.by_weekno.iter().map(|&w| i32::from(w))),
        }
    }

    pub(crate) fn mode(freq: Frequency) -> StageMode {
        if freq == Frequency::Yearly {
            StageMode::Expand
        } else {
            StageMode::Limit
        }
    }
}

impl ByPart for ByWeekNo {
    fn label(&self) -> &'static str {
        "BYWEEKNO"
    }

    fn filter(&self, instance: Instance) -> bool {
        let week = self.metrics.week_of_year(
            instance.year(),
            instance.month(),
            instance.day_of_month(),
        );
        let total = self.metrics.weeks_in_year(instance.year());
        !self.weeks.contains(&week) && !self.weeks.contains(&(week - total - 1))
    }

    fn expand(&self, out: &mut InstanceSet, instance: Instance, _start: Instance) {
        let year = instance.year();
        let total = self.metrics.weeks_in_year(year);
        for &week in &self.weeks {
            let number = if week < 0 { total + week + 1 } else { week };
            if number < 1 || number > total {
                continue;
            }
            let start_day = self.metrics.year_day_of_week_start(year, number);
            let (y, month, day) = self.metrics.resolve_year_day(year, start_day);
            out.push(
                instance
                    .with_year(y)
                    .with_month(month)
                    .with_day_of_month(day),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Weekday;

    fn part(weeks: Vec<i8>, wkst: Weekday) -> ByWeekNo {
        let rule = RRule {
            by_weekno: weeks,
            ..RRule::new(Frequency::Yearly)
        };
        ByWeekNo::new(&rule, CalendarMetrics::new(wkst))
    }

    fn expand_one(p: &ByWeekNo, seed: Instance) -> Vec<(i32, i32, i32)> {
        let mut out = InstanceSet::new();
        p.expand(&mut out, seed, seed);
        out.iter()
            .map(|i| (i.year(), i.month(), i.day_of_month()))
            .collect()
    }

    #[test]
    fn week_one_may_start_in_previous_december() {
        let p = part(vec![1], Weekday::Monday);
        // Week 1 of 2025 starts on 2024-12-30.
        assert_eq!(
            expand_one(&p, Instance::new(2025, 0, 2, 10, 0, 0)),
            vec![(2024, 11, 30)]
        );
        // Week 1 of 2024 starts on January 1st.
        assert_eq!(
            expand_one(&p, Instance::new(2024, 0, 2, 10, 0, 0)),
            vec![(2024, 0, 1)]
        );
    }

    #[test]
    fn negative_week_counts_from_year_end() {
        let p = part(vec![-1], Weekday::Monday);
        // The last ISO week of 2020 is week 53, starting 2020-12-28.
        assert_eq!(
            expand_one(&p, Instance::new(2020, 5, 1, 0, 0, 0)),
            vec![(2020, 11, 28)]
        );
    }

    #[test]
    fn week_53_is_pruned_in_short_years() {
        let p = part(vec![53], Weekday::Monday);
        assert!(expand_one(&p, Instance::new(2023, 0, 1, 0, 0, 0)).is_empty());
        assert_eq!(
            expand_one(&p, Instance::new(2020, 0, 1, 0, 0, 0)),
            vec![(2020, 11, 28)]
        );
    }

    #[test]
    fn filter_matches_both_signs() {
        let p = part(vec![-1], Weekday::Monday);
        // 2020-12-28 is in week 53 of a 53-week year.
        assert!(!p.filter(Instance::new(2020, 11, 28, 0, 0, 0)));
        assert!(p.filter(Instance::new(2020, 5, 15, 0, 0, 0)));
    }

    #[test]
    fn expansion_keeps_the_time_of_day() {
        let p = part(vec![2], Weekday::Monday);
        let mut out = InstanceSet::new();
        let seed = Instance::new(2024, 0, 5, 14, 45, 30);
        p.expand(&mut out, seed, seed);
        let instance = out.next_instance().unwrap();
        assert_eq!(instance.hour(), 14);
        assert_eq!(instance.minute(), 45);
        assert_eq!(instance.second(), 30);
        assert_eq!(instance.day_of_month(), 8);
    }
}
