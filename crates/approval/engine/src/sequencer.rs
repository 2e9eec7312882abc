//! Step sequencer: a stable, reorderable list of steps
//!
//! Order is a property of the sequence, not of any step in isolation:
//! after every mutation the steps are renumbered to a contiguous 1..N.
//! Steps are addressed by their stable id wherever the caller may hold
//! stale positions (drag-and-drop mid-edit); id-addressed operations on
//! unknown ids are a no-op rather than an error.

use approval_types::{Step, StepId};

/// An ordered sequence of steps with the contiguity invariant maintained
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StepSequence {
    steps: Vec<Step>,
}

impl StepSequence {
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    /// Wrap an existing step list, renumbering it to 1..N
    pub fn from_steps(steps: Vec<Step>) -> Self {
        let mut seq = Self { steps };
        seq.renumber();
        seq
    }

    /// Append a step; it receives order N+1
    pub fn push(&mut self, mut step: Step) {
        step.order = self.steps.len() as u32 + 1;
        self.steps.push(step);
    }

    /// Move the step at `from_index` to `to_index`.
    ///
    /// Pure array move: every step keeps its identity, only orders are
    /// recomputed. Out-of-range indexes are a no-op.
    pub fn reorder(&mut self, from_index: usize, to_index: usize) {
        if from_index >= self.steps.len() || to_index >= self.steps.len() {
            return;
        }
        let step = self.steps.remove(from_index);
        self.steps.insert(to_index, step);
        self.renumber();
    }

    /// Move a step, addressed by id, to `to_index`.
    ///
    /// Unknown ids are a no-op to tolerate stale UI state.
    pub fn move_step(&mut self, id: &StepId, to_index: usize) {
        let Some(from_index) = self.index_of(id) else {
            return;
        };
        let to_index = to_index.min(self.steps.len() - 1);
        self.reorder(from_index, to_index);
    }

    /// Edit a step in place, preserving its id and order.
    ///
    /// Unknown ids are a no-op.
    pub fn update(&mut self, id: &StepId, f: impl FnOnce(&mut Step)) {
        let Some(index) = self.index_of(id) else {
            return;
        };
        let keep_id = self.steps[index].id.clone();
        let keep_order = self.steps[index].order;
        f(&mut self.steps[index]);
        self.steps[index].id = keep_id;
        self.steps[index].order = keep_order;
    }

    /// Replace the step at an index, keeping the slot's id and order.
    ///
    /// Used by the editor, which addresses the entry being edited by its
    /// sequence index. Out-of-range indexes are a no-op.
    pub fn replace(&mut self, index: usize, mut step: Step) {
        if index >= self.steps.len() {
            return;
        }
        step.id = self.steps[index].id.clone();
        step.order = self.steps[index].order;
        self.steps[index] = step;
    }

    /// Remove a step by id; remaining steps are renumbered
    pub fn remove(&mut self, id: &StepId) -> Option<Step> {
        let index = self.index_of(id)?;
        let removed = self.steps.remove(index);
        self.renumber();
        Some(removed)
    }

    pub fn index_of(&self, id: &StepId) -> Option<usize> {
        self.steps.iter().position(|s| &s.id == id)
    }

    pub fn get(&self, id: &StepId) -> Option<&Step> {
        self.steps.iter().find(|s| &s.id == id)
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn into_steps(self) -> Vec<Step> {
        self.steps
    }

    fn renumber(&mut self) {
        for (i, step) in self.steps.iter_mut().enumerate() {
            step.order = i as u32 + 1;
        }
    }
}
