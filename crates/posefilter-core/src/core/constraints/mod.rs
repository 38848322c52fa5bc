//! The residue interaction constraint mini-language.
//!
//! A constraint string such as `45B-67H:68S` requires residue 45 to form a salt bridge
//! and at least one of residue 67 (hydrogen bond) or residue 68 (pi stacking) to satisfy
//! its interaction. Parsing produces a [`ConstraintSet`](parser::ConstraintSet); evaluation
//! against one pose's [`InteractionObservation`](evaluator::InteractionObservation) is a
//! pure predicate.

pub mod evaluator;
pub mod parser;
pub mod predicate;
