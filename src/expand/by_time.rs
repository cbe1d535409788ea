//! BYHOUR, BYMINUTE and BYSECOND rule parts.
//!
//! The three time-of-day parts are symmetric: each expands when the base
//! frequency is coarser than its unit and limits otherwise.

use crate::core::{Frequency, Instance, InstanceSet, RRule};

use super::sorted_list;
use super::stage::{ByPart, StageMode};

pub(crate) struct ByHour {
    hours: Vec<i32>,
}

impl ByHour {
    pub(crate) fn new(rule: &RRule) -> Self {
        Self {
            hours: sorted_list(rule.by_hour.iter().map(|&h| i32::from(h))),
        }
    }

    pub(crate) fn mode(freq: Frequency) -> StageMode {
        if freq > Frequency::Hourly {
            StageMode::Expand
        } else {
            StageMode::Limit
        }
    }
}

impl ByPart for ByHour {
    fn label(&self) -> &'static str {
        "BYHOUR"
    }

    fn filter(&self, instance: Instance) -> bool {
        !self.hours.contains(&instance.hour())
    }

    fn expand(&self, out: &mut InstanceSet, instance: Instance, _start: Instance) {
        for &hour in &self.hours {
            out.push(instance.with_hour(hour));
        }
    }
}

pub(crate) struct ByMinute {
    minutes: Vec<i32>,
}

impl ByMinute {
    pub(crate) fn new(rule: &RRule) -> Self {
        Self {
            minutes: sorted_list(rule.by_minute.iter().map(|&m| i32::from(m))),
        }
    }

    pub(crate) fn mode(freq: Frequency) -> StageMode {
        if freq > Frequency::Minutely {
            StageMode::Expand
        } else {
            StageMode::Limit
        }
    }
}

impl ByPart for ByMinute {
    fn label(&self) -> &'static str {
        "BYMINUTE"
    }

    fn filter(&self, instance: Instance) -> bool {
        !self.minutes.contains(&instance.minute())
    }

    fn expand(&self, out: &mut InstanceSet, instance: Instance, _start: Instance) {
        for &minute in &self.minutes {
            out.push(instance.with_minute(minute));
        }
    }
}

pub(crate) struct BySecond {
    seconds: Vec<i32>,
}

impl BySecond {
    pub(crate) fn new(rule: &RRule) -> Self {
        Self {
            seconds: sorted_list(rule.by_second.iter().map(|&s| i32::from(s))),
        }
    }

    pub(crate) fn mode(freq: Frequency) -> StageMode {
        if freq > Frequency::Secondly {
            StageMode::Expand
        } else {
            StageMode::Limit
        }
    }
}

impl ByPart for BySecond {
    fn label(&self) -> &'static str {
        "BYSECOND"
    }

    fn filter(&self, instance: Instance) -> bool {
        !self.seconds.contains(&instance.second())
    }

    fn expand(&self, out: &mut InstanceSet, instance: Instance, _start: Instance) {
        for &second in &self.seconds {
            out.push(instance.with_second(second));
        }
    }
}
