//! BYMONTH rule part.

use crate::core::{Frequency, Instance, InstanceSet, RRule};
use crate::metrics::CalendarMetrics;

use super::sorted_list;
use super::stage::{ByPart, StageMode};

/// Limits or expands by month. Yearly rules expand each seed into one
/// candidate per configured month; all finer frequencies keep only
/// candidates already in a configured month.
pub(crate) struct ByMonth {
    metrics: CalendarMetrics,
    /// 0-based months, sorted.
    months: Vec<i32>,
}

impl ByMonth {
    pub(crate) fn new(rule: &RRule, metrics: CalendarMetrics) -> Self {
        Self {
            metrics,
            months: sorted_list(rule.by_month.iter().map(|&m| i32::from(m) - 1)),
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

impl ByPart for ByMonth {
    fn label(&self) -> &'static str {
        "BYMONTH"
    }

    fn filter(&self, instance: Instance) -> bool {
        !self.months.contains(&instance.month())
    }

    fn expand(&self, out: &mut InstanceSet, instance: Instance, _start: Instance) {
        let year = instance.year();
        let day = instance.day_of_month();
        for &month in &self.months {
            // A day missing from the target month is skipped, not clamped.
            if day <= self.metrics.days_in_month(year, month) {
                out.push(instance.with_month(month));
            }
        }
    }
}
