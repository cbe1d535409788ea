//! BYSETPOS selector stage.

use crate::core::{Instance, InstanceSet, RRule};

use super::error::ExpansionError;
use super::sorted_list;
use super::stage::{MAX_EMPTY_SETS, RuleIterator};

/// Keeps the n-th elements of each upstream batch.
///
/// Unlike the BY-parts this operates on whole sorted batches, not on
/// single instances, so it is its own stage rather than a
/// [`super::stage::ByPart`]. Positive positions are 1-indexed from the
/// front of the batch, negative ones from the back; positions a batch
/// cannot hold contribute nothing.
pub(crate) struct BySetPos {
    previous: Box<dyn RuleIterator>,
    positions: Vec<i32>,
    result_set: InstanceSet,
    working_set: InstanceSet,
}

impl BySetPos {
    pub(crate) fn new(previous: Box<dyn RuleIterator>, rule: &RRule) -> Self {
        Self {
            previous,
            positions: sorted_list(rule.by_setpos.iter().map(|&p| i32::from(p))),
            result_set: InstanceSet::new(),
            working_set: InstanceSet::new(),
        }
    }

    fn fill_result_set(&mut self) -> Result<(), ExpansionError> {
        self.result_set.clear();
        let mut empty_rounds = 0;
        while self.result_set.is_empty() {
            if empty_rounds == MAX_EMPTY_SETS {
                tracing::warn!(stage = "BYSETPOS", "over-constrained rule");
                return Err(ExpansionError::over_constrained("BYSETPOS", MAX_EMPTY_SETS));
            }
            empty_rounds += 1;
            let upstream = self.previous.next_set()?;
            let len = upstream.len() as i32;
            for &pos in &self.positions {
                let index = if pos > 0 { pos - 1 } else { len + pos };
                if (0..len).contains(&index)
                    && let Some(instance) = upstream.get(index as usize)
                {
                    self.result_set.push(instance);
                }
            }
        }
        // Mixed positive and negative positions select out of order.
        self.result_set.sort();
        Ok(())
    }
}

impl RuleIterator for BySetPos {
    fn next(&mut self) -> Result<Instance, ExpansionError> {
        loop {
            if let Some(instance) = self.working_set.next_instance() {
                return Ok(instance);
            }
            self.fill_result_set()?;
            std::mem::swap(&mut self.working_set, &mut self.result_set);
        }
    }

    fn next_set(&mut self) -> Result<&mut InstanceSet, ExpansionError> {
        self.fill_result_set()?;
        Ok(&mut self.result_set)
    }
}
