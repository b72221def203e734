//! Append-only execution history.

use crate::types::{ExecutionStep, StepRecord};

/// Ordered log of every step taken since the last initialize or reset.
///
/// Entries are numbered on append as `len + 1` and are never modified,
/// reordered or removed individually; [`Trace::clear`] is the only way to shrink it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Trace {
    steps: Vec<ExecutionStep>,
}

impl Trace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Numbers and appends a step, returning the stored entry.
    pub fn record(&mut self, record: StepRecord) -> &ExecutionStep {
        let step = record.numbered(self.steps.len() + 1);
        self.steps.push(step);
        &self.steps[self.steps.len() - 1]
    }

    pub fn clear(&mut self) {
        self.steps.clear();
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn last(&self) -> Option<&ExecutionStep> {
        self.steps.last()
    }

    /// Looks up a step by its 1-based number.
    pub fn get(&self, step_number: usize) -> Option<&ExecutionStep> {
        step_number
            .checked_sub(1)
            .and_then(|index| self.steps.get(index))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ExecutionStep> {
        self.steps.iter()
    }

    pub fn as_slice(&self) -> &[ExecutionStep] {
        &self.steps
    }
}

impl<'a> IntoIterator for &'a Trace {
    type Item = &'a ExecutionStep;
    type IntoIter = std::slice::Iter<'a, ExecutionStep>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
