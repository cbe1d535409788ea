//! The BYxxx stage framework.
//!
//! A pipeline is a chain of [`RuleIterator`]s: the frequency source at the
//! bottom, one [`ByStage`] per BY-part in the rule, and optionally a
//! BYSETPOS selector on top. Every stage pulls from the one below it, either
//! one instance at a time or one ordered batch at a time.
//!
//! A [`ByStage`] runs its rule part in one of two modes, fixed at
//! construction: EXPAND multiplies each upstream candidate into zero or
//! more candidates covering the period, LIMIT drops upstream candidates
//! that fail the part's predicate. Empty results are retried, but only up
//! to a fixed bound so that a rule which can never match fails instead of
//! spinning forever.

use crate::core::{Instance, InstanceSet};

use super::error::ExpansionError;

/// Give up after this many consecutive upstream pulls that expanded or
/// filtered to an empty batch.
pub(crate) const MAX_EMPTY_SETS: u32 = 1000;

/// Give up after this many consecutive single instances filtered in a row.
pub(crate) const MAX_EMPTY_INSTANCES: u32 = 1000;

/// A pull-based producer of ordered instances.
///
/// `next_set` hands out a reference to the stage's internal buffer; callers
/// must finish with it before the next pull, and no stage retains an
/// upstream batch across pulls.
pub(crate) trait RuleIterator {
    /// Produces the next instance.
    fn next(&mut self) -> Result<Instance, ExpansionError>;

    /// Produces the next non-empty ordered batch of instances.
    fn next_set(&mut self) -> Result<&mut InstanceSet, ExpansionError>;
}

/// Whether a stage multiplies candidates or drops them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StageMode {
    Expand,
    Limit,
}

/// One BY-part's behavior, plugged into a [`ByStage`].
pub(crate) trait ByPart {
    /// The rule part name, used in over-constrained errors.
    fn label(&self) -> &'static str;

    /// Returns `true` to drop the candidate (LIMIT mode).
    fn filter(&self, instance: Instance) -> bool;

    /// Appends this part's expansions of `instance` to `out` (EXPAND
    /// mode). `start` is the first instance of the rule; parts may use it
    /// to avoid work that cannot produce anything at or after the start.
    fn expand(&self, out: &mut InstanceSet, instance: Instance, start: Instance);
}

/// Composes a [`ByPart`] with its upstream stage and the shared pull logic.
pub(crate) struct ByStage {
    previous: Box<dyn RuleIterator>,
    part: Box<dyn ByPart>,
    mode: StageMode,
    start: Instance,
    /// Batch handed to `next_set` callers.
    result_set: InstanceSet,
    /// Batch being drained by `next` callers.
    working_set: InstanceSet,
}

impl ByStage {
    pub(crate) fn new(
        previous: Box<dyn RuleIterator>,
        part: Box<dyn ByPart>,
        mode: StageMode,
        start: Instance,
    ) -> Self {
        Self {
            previous,
            part,
            mode,
            start,
            result_set: InstanceSet::new(),
            working_set: InstanceSet::new(),
        }
    }

    /// Refills `result_set` with the next non-empty batch.
    fn fill_result_set(&mut self) -> Result<(), ExpansionError> {
        self.result_set.clear();
        let mut empty_rounds = 0;
        match self.mode {
            StageMode::Expand => {
                while !self.result_set.has_next() {
                    if empty_rounds == MAX_EMPTY_SETS {
                        tracing::warn!(stage = self.part.label(), "over-constrained rule");
                        return Err(ExpansionError::over_constrained(
                            self.part.label(),
                            MAX_EMPTY_SETS,
                        ));
                    }
                    empty_rounds += 1;
                    let candidate = self.previous.next()?;
                    self.part.expand(&mut self.result_set, candidate, self.start);
                }
                // Expansion appends in rule-part order, not time order.
                self.result_set.sort();
            }
            StageMode::Limit => {
                while !self.result_set.has_next() {
                    if empty_rounds == MAX_EMPTY_SETS {
                        tracing::warn!(stage = self.part.label(), "over-constrained rule");
                        return Err(ExpansionError::over_constrained(
                            self.part.label(),
                            MAX_EMPTY_SETS,
                        ));
                    }
                    empty_rounds += 1;
                    let upstream = self.previous.next_set()?;
                    for candidate in upstream.iter() {
                        if !self.part.filter(candidate) {
                            self.result_set.push(candidate);
                        }
                    }
                    // The upstream batch was sorted, so the survivors are.
                }
            }
        }
        Ok(())
    }
}

impl RuleIterator for ByStage {
    fn next(&mut self) -> Result<Instance, ExpansionError> {
        match self.mode {
            StageMode::Expand => loop {
                if let Some(instance) = self.working_set.next_instance() {
                    return Ok(instance);
                }
                self.fill_result_set()?;
                std::mem::swap(&mut self.working_set, &mut self.result_set);
            },
            StageMode::Limit => {
                let mut filtered = 0;
                loop {
                    if filtered == MAX_EMPTY_INSTANCES {
                        tracing::warn!(stage = self.part.label(), "over-constrained rule");
                        return Err(ExpansionError::over_constrained(
                            self.part.label(),
                            MAX_EMPTY_INSTANCES,
                        ));
                    }
                    let candidate = self.previous.next()?;
                    if !self.part.filter(candidate) {
                        return Ok(candidate);
                    }
                    filtered += 1;
                }
            }
        }
    }

    fn next_set(&mut self) -> Result<&mut InstanceSet, ExpansionError> {
        self.fill_result_set()?;
        Ok(&mut self.result_set)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Upstream stub yielding an endless run of January days of one year.
    struct Days {
        next_day: i32,
        set: InstanceSet,
    }

    impl Days {
        fn new() -> Self {
            Self {
                next_day: 1,
                set: InstanceSet::new(),
            }
        }
    }

    impl RuleIterator for Days {
        fn next(&mut self) -> Result<Instance, ExpansionError> {
            let day = self.next_day;
            self.next_day += 1;
            Ok(Instance::new(2024, 0, day, 12, 0, 0))
        }

        fn next_set(&mut self) -> Result<&mut InstanceSet, ExpansionError> {
            self.set.clear();
            let instance = self.next()?;
            self.set.push(instance);
            Ok(&mut self.set)
        }
    }

    /// Keeps even days; expands each day into minutes 10 and 5.
    struct EvenDays;

    impl ByPart for EvenDays {
        fn label(&self) -> &'static str {
            "TEST"
        }

        fn filter(&self, instance: Instance) -> bool {
            instance.day_of_month() % 2 != 0
        }

        fn expand(&self, out: &mut InstanceSet, instance: Instance, _start: Instance) {
            if instance.day_of_month() % 2 == 0 {
                out.push(instance.with_minute(10));
                out.push(instance.with_minute(5));
            }
        }
    }

    /// Drops or expands everything.
    struct Never;

    impl ByPart for Never {
        fn label(&self) -> &'static str {
            "NEVER"
        }

        fn filter(&self, _instance: Instance) -> bool {
            true
        }

        fn expand(&self, _out: &mut InstanceSet, _instance: Instance, _start: Instance) {}
    }

    fn start() -> Instance {
        Instance::new(2024, 0, 1, 12, 0, 0)
    }

    #[test]
    fn limit_mode_drops_filtered_instances() {
        let mut stage = ByStage::new(
            Box::new(Days::new()),
            Box::new(EvenDays),
            StageMode::Limit,
            start(),
        );
        assert_eq!(stage.next().unwrap().day_of_month(), 2);
        assert_eq!(stage.next().unwrap().day_of_month(), 4);
    }

    #[test]
    fn expand_mode_sorts_each_batch() {
        let mut stage = ByStage::new(
            Box::new(Days::new()),
            Box::new(EvenDays),
            StageMode::Expand,
            start(),
        );
        // Day 1 expands to nothing and is retried; day 2 yields minutes
        // 5 and 10, in sorted order even though they were pushed reversed.
        let batch = stage.next_set().unwrap();
        assert_eq!(batch.len(), 2);
        assert_eq!(batch.next_instance().unwrap().minute(), 5);
        assert_eq!(batch.next_instance().unwrap().minute(), 10);
    }

    #[test]
    fn expand_mode_single_pull_drains_batches() {
        let mut stage = ByStage::new(
            Box::new(Days::new()),
            Box::new(EvenDays),
            StageMode::Expand,
            start(),
        );
        let minutes: Vec<i32> = (0..4).map(|_| stage.next().unwrap().minute()).collect();
        assert_eq!(minutes, vec![5, 10, 5, 10]);
        assert_eq!(stage.next().unwrap().day_of_month(), 6);
    }

    #[test]
    fn over_constrained_expand_fails() {
        let mut stage = ByStage::new(
            Box::new(Days::new()),
            Box::new(Never),
            StageMode::Expand,
            start(),
        );
        assert_eq!(
            stage.next_set().unwrap_err(),
            ExpansionError::over_constrained("NEVER", MAX_EMPTY_SETS)
        );
    }

    #[test]
    fn over_constrained_limit_fails() {
        let mut stage = ByStage::new(
            Box::new(Days::new()),
            Box::new(Never),
            StageMode::Limit,
            start(),
        );
        assert_eq!(
            stage.next().unwrap_err(),
            ExpansionError::over_constrained("NEVER", MAX_EMPTY_INSTANCES)
        );
    }
}
