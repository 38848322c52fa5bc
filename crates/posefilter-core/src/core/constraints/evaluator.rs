use super::parser::ConstraintSet;
use crate::core::toolkit::InteractionHint;
use std::collections::BTreeMap;

/// Whether each referenced residue satisfies its predicate for one candidate pose.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InteractionObservation {
    satisfied: BTreeMap<i32, bool>,
}

impl InteractionObservation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the observation for one pose from its perceived interactions.
    ///
    /// Only residues referenced by `constraints` are recorded; each is `true` when at
    /// least one of its interactions satisfies the residue's predicate.
    pub fn perceive(constraints: &ConstraintSet, hints: &[InteractionHint]) -> Self {
        let satisfied = constraints
            .constraints()
            .map(|c| {
                let classes = hints
                    .iter()
                    .filter(|h| h.residue_number == c.residue_id)
                    .map(|h| h.class);
                (c.residue_id, c.predicate.is_satisfied_by(classes))
            })
            .collect();
        Self { satisfied }
    }

    pub fn insert(&mut self, residue_id: i32, satisfied: bool) {
        self.satisfied.insert(residue_id, satisfied);
    }

    pub fn get(&self, residue_id: i32) -> Option<bool> {
        self.satisfied.get(&residue_id).copied()
    }

    fn is_true(&self, residue_id: i32) -> bool {
        self.get(residue_id).unwrap_or(false)
    }
}

impl FromIterator<(i32, bool)> for InteractionObservation {
    fn from_iter<T: IntoIterator<Item = (i32, bool)>>(iter: T) -> Self {
        Self {
            satisfied: iter.into_iter().collect(),
        }
    }
}

/// Outcome of evaluating a [`ConstraintSet`] against one pose.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Evaluation {
    Accepted,
    /// No member of the OR-group at this position was satisfied.
    UnsatisfiedGroup(usize),
    /// This mandatory residue was unsatisfied or absent from the observation.
    UnsatisfiedResidue(i32),
}

impl Evaluation {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Evaluation::Accepted)
    }
}

impl ConstraintSet {
    /// Evaluates OR-groups first, then mandatory residues.
    ///
    /// Residues absent from the observation count as unsatisfied; observed residues
    /// outside the set are ignored.
    pub fn evaluate(&self, observation: &InteractionObservation) -> Evaluation {
        for (position, group) in self.or_groups().iter().enumerate() {
            if !group.iter().any(|&id| observation.is_true(id)) {
                return Evaluation::UnsatisfiedGroup(position);
            }
        }
        for &id in self.mandatory() {
            if !observation.is_true(id) {
                return Evaluation::UnsatisfiedResidue(id);
            }
        }
        Evaluation::Accepted
    }

    pub fn accepts(&self, observation: &InteractionObservation) -> bool {
        self.evaluate(observation).is_accepted()
    }
}
