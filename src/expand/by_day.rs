//! BYDAY rule part.
//!
//! The most involved of the parts: positional entries such as `2TU` or
//! `-1FR` mean "the n-th such weekday", and what they are the n-th *of*
//! depends on the frequency and the companion parts. That window is the
//! scope, fixed at construction.
//!
//! Expansion applies to WEEKLY rules and to YEARLY/MONTHLY rules whose day
//! is not already pinned by BYYEARDAY or BYMONTHDAY; those pinned rules
//! (and all day-or-finer frequencies) filter instead, per RFC 5545
//! §3.3.10. RFC 2445 allowed BYYEARDAY with MONTHLY rules and the mode
//! computation covers that combination the same way.

use crate::core::{Frequency, Instance, InstanceSet, RRule, WeekdayNum};
use crate::metrics::CalendarMetrics;

use super::sorted_list;
use super::stage::{ByPart, StageMode};

/// The temporal window positional day entries refer to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Scope {
    Weekly,
    Monthly,
    WeeklyAndMonthly,
    Yearly,
}

impl Scope {
    /// Weeks cross month and year boundaries, months do not, so the scope
    /// follows from which window-defining parts accompany the rule.
    pub(crate) fn of(freq: Frequency, rule: &RRule) -> Self {
        let weekly = !rule.by_weekno.is_empty() || freq == Frequency::Weekly;
        let monthly = !rule.by_month.is_empty() || freq == Frequency::Monthly;
        match (weekly, monthly) {
            (true, true) => Self::WeeklyAndMonthly,
            (true, false) => Self::Weekly,
            (false, true) => Self::Monthly,
            (false, false) => Self::Yearly,
        }
    }
}

/// Packs a positional weekday so that membership is one integer compare.
const fn pack_weekday(pos: i32, weekday: i32) -> i32 {
    (pos << 8) | weekday
}

/// Limits or expands by (position, weekday) pairs.
pub(crate) struct ByDay {
    metrics: CalendarMetrics,
    days: Vec<WeekdayNum>,
    /// `(pos << 8) | weekday` for every entry, sorted.
    packed_days: Vec<i32>,
    has_positions: bool,
    scope: Scope,
    /// 0-based BYMONTH values when the weekly-and-monthly scope has to
    /// filter overlapping weeks by month; `None` means "keep the seed's
    /// own month".
    months: Option<Vec<i32>>,
}

impl ByDay {
    pub(crate) fn new(rule: &RRule, freq: Frequency, metrics: CalendarMetrics) -> Self {
        let days = rule.by_day.clone();
        let has_positions = days.iter().any(|d| d.position() != 0);
        let packed_days = sorted_list(
            days.iter()
                .map(|d| pack_weekday(d.position(), d.weekday.number())),
        );
        let scope = Scope::of(freq, rule);
        let months = if scope == Scope::WeeklyAndMonthly && !rule.by_month.is_empty() {
            Some(sorted_list(rule.by_month.iter().map(|&m| i32::from(m) - 1)))
        } else {
            None
        };
        Self {
            metrics,
            days,
            packed_days,
            has_positions,
            scope,
            months,
        }
    }

    pub(crate) fn mode(freq: Frequency, rule: &RRule) -> StageMode {
        let expands = ((freq == Frequency::Yearly || freq == Frequency::Monthly)
            && rule.by_yearday.is_empty()
            && rule.by_monthday.is_empty())
            || freq == Frequency::Weekly;
        if expands {
            StageMode::Expand
        } else {
            StageMode::Limit
        }
    }

    fn expand_weekly(&self, out: &mut InstanceSet, instance: Instance, day: WeekdayNum) {
        let year = instance.year();
        let month = instance.month();
        let week =
            self.metrics
                .week_of_year(year, month, instance.day_of_month());
        // The week number is the week's own; pick the year it belongs to.
        // A December date in week 1 counts into the next year, a January
        // date in a high-numbered week into the previous one.
        let anchor_year = if week == 1 && month > 0 {
            year + 1
        } else if week >= 10 && month == 0 {
            year - 1
        } else {
            year
        };
        let offset = (day.weekday.number() - self.metrics.week_start()).rem_euclid(7);
        let start_day = self.metrics.year_day_of_week_start(anchor_year, week) + offset;
        let (y, m, d) = self.metrics.resolve_year_day(anchor_year, start_day);
        out.push(
            instance
                .with_year(y)
                .with_month(m)
                .with_day_of_month(d),
        );
    }

    fn expand_weekly_and_monthly(&self, out: &mut InstanceSet, instance: Instance, day: WeekdayNum) {
        let year = instance.year();
        let week =
            self.metrics
                .week_of_year(year, instance.month(), instance.day_of_month());
        let offset = (day.weekday.number() - self.metrics.week_start()).rem_euclid(7);
        let start_day = self.metrics.year_day_of_week_start(year, week) + offset;
        let (y, m, d) = self.metrics.resolve_year_day(year, start_day);
        // Weeks overlap months, so only days landing in an allowed month
        // survive: the BYMONTH set when present, the seed's month
        // otherwise.
        let keep = match &self.months {
            Some(months) => months.contains(&m),
            None => m == instance.month(),
        };
        if keep {
            out.push(
                instance
                    .with_year(y)
                    .with_month(m)
                    .with_day_of_month(d),
            );
        }
    }

    fn expand_monthly(&self, out: &mut InstanceSet, instance: Instance, day: WeekdayNum) {
        let year = instance.year();
        let month = instance.month();
        let first_weekday = self.metrics.day_of_week(year, month, 1);
        let month_days = self.metrics.days_in_month(year, month);
        // First occurrence of the weekday in this month.
        let first_day = (day.weekday.number() - first_weekday).rem_euclid(7) + 1;
        let pos = day.position();
        if pos == 0 {
            let mut day_of_month = first_day;
            while day_of_month <= month_days {
                out.push(instance.with_day_of_month(day_of_month));
                day_of_month += 7;
            }
        } else {
            let occurrences = 1 + (month_days - first_day) / 7;
            if (pos > 0 && pos <= occurrences) || (pos < 0 && pos + occurrences + 1 > 0) {
                let index = if pos > 0 { pos - 1 } else { pos + occurrences };
                out.push(instance.with_day_of_month(first_day + index * 7));
            }
        }
    }

    fn expand_yearly(&self, out: &mut InstanceSet, instance: Instance, day: WeekdayNum) {
        let year = instance.year();
        let first_day =
            (day.weekday.number() - self.metrics.weekday_of_first_year_day(year)).rem_euclid(7) + 1;
        let year_days = self.metrics.days_in_year(year);
        let pos = day.position();
        if pos == 0 {
            let mut year_day = first_day;
            while year_day <= year_days {
                let (month, day_of_month) = self.metrics.month_and_day_of_year_day(year, year_day);
                out.push(instance.with_month(month).with_day_of_month(day_of_month));
                year_day += 7;
            }
        } else if pos > 0 {
            let year_day = first_day + (pos - 1) * 7;
            if year_day <= year_days {
                let (month, day_of_month) = self.metrics.month_and_day_of_year_day(year, year_day);
                out.push(instance.with_month(month).with_day_of_month(day_of_month));
            }
        } else {
            // Last occurrence of the weekday in this year.
            let mut last_day = first_day + year_days - year_days % 7;
            if last_day > year_days {
                last_day -= 7;
            }
            let year_day = last_day + (pos + 1) * 7;
            if year_day > 0 {
                let (month, day_of_month) = self.metrics.month_and_day_of_year_day(year, year_day);
                out.push(instance.with_month(month).with_day_of_month(day_of_month));
            }
        }
    }
}

impl ByPart for ByDay {
    fn label(&self) -> &'static str {
        "BYDAY"
    }

    fn filter(&self, instance: Instance) -> bool {
        let year = instance.year();
        let month = instance.month();
        let day = instance.day_of_month();
        let weekday = self.metrics.day_of_week(year, month, day);

        if !self.has_positions {
            return !self.packed_days.contains(&pack_weekday(0, weekday));
        }
        if self.packed_days.contains(&pack_weekday(0, weekday)) {
            return false;
        }
        match self.scope {
            // Positional entries are meaningless within a single week.
            Scope::Weekly => true,
            Scope::WeeklyAndMonthly | Scope::Monthly => {
                let nth = (day - 1) / 7 + 1;
                let last_nth = (day - self.metrics.days_in_month(year, month)) / 7 - 1;
                !self.packed_days.contains(&pack_weekday(nth, weekday))
                    && !self.packed_days.contains(&pack_weekday(last_nth, weekday))
            }
            Scope::Yearly => {
                let year_day = self.metrics.day_of_year(year, month, day);
                let nth = (year_day - 1) / 7 + 1;
                let last_nth = (year_day - self.metrics.days_in_year(year)) / 7 - 1;
                !self.packed_days.contains(&pack_weekday(nth, weekday))
                    && !self.packed_days.contains(&pack_weekday(last_nth, weekday))
            }
        }
    }

    fn expand(&self, out: &mut InstanceSet, instance: Instance, _start: Instance) {
        for &day in &self.days {
            match self.scope {
                Scope::Weekly => {
                    // Positions are ignored within a week; `1MO` reads as
                    // plain `MO`.
                    if day.position() == 0 || day.position() == 1 {
                        self.expand_weekly(out, instance, day);
                    }
                }
                Scope::WeeklyAndMonthly => {
                    if day.position() == 0 || day.position() == 1 {
                        self.expand_weekly_and_monthly(out, instance, day);
                    }
                }
                Scope::Monthly => self.expand_monthly(out, instance, day),
                Scope::Yearly => self.expand_yearly(out, instance, day),
            }
        }
    }
}

#[cfg(test)]
#[path = "by_day_tests.rs"]
mod tests;
